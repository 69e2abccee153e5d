//! 외부 도구 묶음
//!
//! [`Harness`]는 스텝 핸들러가 사용하는 모든 외부 상호작용(프로비저닝 도구,
//! 수렴 대기, juju CLI, 클러스터 조회, 프로브)을 하나의 [`CommandRunner`]
//! 위에 구성합니다. 시나리오 간에 공유되며 내부 상태를 갖지 않습니다.

use std::sync::Arc;

use meshcheck_cluster::{ConvergencePoller, JujuCli, KubectlQuery, ResourceQuery};
use meshcheck_core::config::MeshcheckConfig;
use meshcheck_core::process::CommandRunner;
use meshcheck_core::types::Environment;
use meshcheck_probe::{ProbeRequest, Prober, RetryPolicy};
use meshcheck_terraform::{ProvisioningWorkspace, ResourceKind, TerraformError, TfManager};
use tracing::debug;

/// 스텝 실행에 필요한 외부 도구 묶음
#[derive(Clone)]
pub struct Harness {
    config: MeshcheckConfig,
    tf: TfManager,
    juju: JujuCli,
    poller: ConvergencePoller,
    query: Arc<dyn ResourceQuery>,
    prober: Prober,
    retry: RetryPolicy,
}

impl Harness {
    /// 설정으로 도구 묶음을 구성합니다.
    ///
    /// # Errors
    ///
    /// 프로비저닝 도구 바이너리를 결정하지 못하면 [`TerraformError::BinaryNotFound`]를 반환합니다.
    pub fn from_config(
        runner: Arc<dyn CommandRunner>,
        config: MeshcheckConfig,
    ) -> Result<Self, TerraformError> {
        let tf = TfManager::from_config(Arc::clone(&runner), &config.terraform)?;
        let juju = JujuCli::new(Arc::clone(&runner), &config.cluster.juju_binary);
        let poller = ConvergencePoller::new(juju.clone(), config.convergence.clone());
        let query: Arc<dyn ResourceQuery> = Arc::new(KubectlQuery::new(
            Arc::clone(&runner),
            &config.cluster.kubectl_binary,
        ));
        let prober = Prober::new(runner, &config.cluster.juju_binary);
        let retry = RetryPolicy::from_config(&config.probe);

        debug!(
            tool = tf.binary(),
            juju = juju.binary(),
            max_probe_attempts = retry.max_attempts,
            "harness configured"
        );

        Ok(Self {
            config,
            tf,
            juju,
            poller,
            query,
            prober,
            retry,
        })
    }

    /// 클러스터 조회 구현을 교체합니다.
    pub fn with_query(mut self, query: Arc<dyn ResourceQuery>) -> Self {
        self.query = query;
        self
    }

    /// 설정
    pub fn config(&self) -> &MeshcheckConfig {
        &self.config
    }

    /// 프로비저닝 도구 관리자
    pub fn tf(&self) -> &TfManager {
        &self.tf
    }

    /// juju CLI
    pub fn juju(&self) -> &JujuCli {
        &self.juju
    }

    /// 수렴 대기기
    pub fn poller(&self) -> &ConvergencePoller {
        &self.poller
    }

    /// 클러스터 조회
    pub fn query(&self) -> &dyn ResourceQuery {
        self.query.as_ref()
    }

    /// 프로브 실행기
    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// 스텝 레이어 프로브 재시도 정책
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 환경별로 격리된 워크스페이스
    pub fn workspace(&self, kind: ResourceKind, env: &Environment) -> ProvisioningWorkspace {
        ProvisioningWorkspace::for_environment(
            &self.config.terraform.root_dir,
            self.config.terraform.state_dir_path(),
            kind,
            env,
        )
    }

    /// 설정된 프로브 타임아웃을 적용한 요청
    pub fn request(&self, method: &str, url: impl Into<String>) -> ProbeRequest {
        ProbeRequest::new(method, url).with_timeout(self.config.probe.timeout())
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("tf", &self.tf)
            .field("juju", &self.juju)
            .field("prober", &self.prober)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
