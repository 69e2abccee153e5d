//! juju CLI 헬퍼
//!
//! 상태 스냅샷 조회와 관계(relation) 생성만 다룹니다.

use std::sync::Arc;

use meshcheck_core::process::{CommandOutput, CommandRunner, CommandSpec};
use meshcheck_core::types::Environment;
use tracing::{debug, info};

use crate::error::ClusterError;
use crate::status::ModelStatus;

/// juju CLI 래퍼
#[derive(Clone)]
pub struct JujuCli {
    runner: Arc<dyn CommandRunner>,
    binary: String,
}

impl JujuCli {
    /// 새 래퍼를 생성합니다.
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// juju 바이너리
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// 모델 상태 스냅샷을 조회합니다.
    ///
    /// `juju status --model <env> --format json`
    pub async fn status(&self, env: &Environment) -> Result<ModelStatus, ClusterError> {
        let spec = CommandSpec::new(&self.binary).args([
            "status",
            "--model",
            env.name(),
            "--format",
            "json",
        ]);
        let out = self.runner.run(spec).await?;
        if !out.success() {
            return Err(ClusterError::Status {
                model: env.name().to_owned(),
                reason: format!("exit code {}: {}", out.exit_code, out.stderr.trim()),
            });
        }
        ModelStatus::from_json(&out.stdout).map_err(|e| ClusterError::Status {
            model: env.name().to_owned(),
            reason: format!("invalid status json: {e}"),
        })
    }

    /// 두 엔드포인트 사이에 관계를 생성합니다.
    ///
    /// `juju relate --model <env> <a> <b>`
    pub async fn relate(
        &self,
        env: &Environment,
        endpoint_a: &str,
        endpoint_b: &str,
    ) -> Result<(), ClusterError> {
        info!(model = env.name(), endpoint_a, endpoint_b, "creating relation");
        self.cli(env, "relate", &[endpoint_a, endpoint_b])
            .await
            .map(drop)
    }

    /// 모델을 지정해 juju 하위 명령을 실행합니다.
    ///
    /// 0이 아닌 종료 코드는 [`ClusterError::Command`]로 변환됩니다.
    pub async fn cli(
        &self,
        env: &Environment,
        subcommand: &str,
        args: &[&str],
    ) -> Result<CommandOutput, ClusterError> {
        let spec = CommandSpec::new(&self.binary)
            .args([subcommand, "--model", env.name()])
            .args(args.iter().copied());
        let command = format!("{} {subcommand}", self.binary);
        debug!(command = %spec, "running juju command");

        let out = self.runner.run(spec).await?;
        if !out.success() {
            return Err(ClusterError::Command {
                command,
                exit_code: out.exit_code,
                stderr: out.stderr,
            });
        }
        Ok(out)
    }
}

impl std::fmt::Debug for JujuCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JujuCli")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use meshcheck_core::process::MockRunner;

    use super::*;

    fn cli(runner: &Arc<MockRunner>) -> JujuCli {
        JujuCli::new(runner.clone(), "juju")
    }

    #[tokio::test]
    async fn status_parses_json() {
        let runner = Arc::new(MockRunner::new());
        runner.on_ok(
            "juju status",
            r#"{"applications": {"istio-k8s": {"application-status": {"current": "active"}}}}"#,
        );
        let status = cli(&runner).status(&Environment::new("istio-system")).await.unwrap();
        assert!(status.applications.contains_key("istio-k8s"));
        assert_eq!(
            runner.calls()[0].args,
            vec!["status", "--model", "istio-system", "--format", "json"]
        );
    }

    #[tokio::test]
    async fn status_failure_is_status_error() {
        let runner = Arc::new(MockRunner::new());
        runner.on_fail("juju status", 1, "ERROR model not found");
        let err = cli(&runner).status(&Environment::new("gone")).await.unwrap_err();
        assert!(matches!(err, ClusterError::Status { .. }));
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn status_with_garbage_output_is_status_error() {
        let runner = Arc::new(MockRunner::new());
        runner.on_ok("juju status", "not json");
        let err = cli(&runner).status(&Environment::new("m")).await.unwrap_err();
        assert!(err.to_string().contains("invalid status json"));
    }

    #[tokio::test]
    async fn relate_passes_model_and_endpoints() {
        let runner = Arc::new(MockRunner::new());
        cli(&runner)
            .relate(
                &Environment::new("bookinfo"),
                "productpage:ingress",
                "istio-ingress-k8s:ingress",
            )
            .await
            .unwrap();
        assert_eq!(
            runner.calls()[0].args,
            vec![
                "relate",
                "--model",
                "bookinfo",
                "productpage:ingress",
                "istio-ingress-k8s:ingress"
            ]
        );
    }

    #[tokio::test]
    async fn relate_failure_is_command_error() {
        let runner = Arc::new(MockRunner::new());
        runner.on_fail("juju relate", 2, "ERROR no relations found");
        let err = cli(&runner)
            .relate(&Environment::new("m"), "a:x", "b:x")
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::Command { exit_code: 2, .. }));
    }
}
