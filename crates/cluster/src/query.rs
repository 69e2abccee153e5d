//! 클러스터 리소스 조회
//!
//! 네임스페이스 단위로 커스텀 리소스 이름 목록을 조회하는 [`ResourceQuery`] trait과
//! `kubectl` 기반 구현을 제공합니다.
//!
//! 권한 정책 조회([`list_authorization_policies`])는 조회 실패를 에러로 올리지 않고
//! 로그를 남긴 뒤 빈 목록으로 취급합니다. 그 외 조회(게이트웨이 주소)는 실패를 그대로 전파합니다.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use meshcheck_core::metrics as m;
use meshcheck_core::process::{BoxFuture, CommandRunner, CommandSpec};
use meshcheck_core::types::Environment;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::ClusterError;

/// 조회 대상 커스텀 리소스 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomResourceType {
    /// API 그룹
    pub group: &'static str,
    /// API 버전
    pub version: &'static str,
    /// 종류
    pub kind: &'static str,
    /// 복수형 리소스 이름
    pub plural: &'static str,
}

impl CustomResourceType {
    /// `plural.group` 형식의 정규화된 리소스 이름
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.plural, self.group)
    }

    /// `group/version` 형식의 API 버전
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

impl fmt::Display for CustomResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.api_version())
    }
}

/// 메시 권한 정책 리소스
pub const AUTHORIZATION_POLICY: CustomResourceType = CustomResourceType {
    group: "security.istio.io",
    version: "v1beta1",
    kind: "AuthorizationPolicy",
    plural: "authorizationpolicies",
};

/// `kubectl get` 한 번의 기본 제한 시간
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// 네임스페이스 단위 리소스 조회 인터페이스
pub trait ResourceQuery: Send + Sync {
    /// 네임스페이스의 리소스 이름 목록을 조회합니다.
    fn list_names<'a>(
        &'a self,
        resource: &'a CustomResourceType,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, ClusterError>>;

    /// 네임스페이스에서 로드밸런서 주소(IP 또는 호스트명)를 조회합니다.
    fn gateway_address<'a>(&'a self, namespace: &'a str)
    -> BoxFuture<'a, Result<String, ClusterError>>;
}

/// `kubectl` 기반 조회 구현
#[derive(Clone)]
pub struct KubectlQuery {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    timeout: Duration,
}

impl KubectlQuery {
    /// 새 조회기를 생성합니다.
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// 조회 명령의 제한 시간을 바꿉니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get_json(
        &self,
        resource: &str,
        namespace: &str,
    ) -> Result<String, ClusterError> {
        let spec = CommandSpec::new(&self.binary)
            .args(["get", resource, "-n", namespace, "-o", "json"])
            .timeout(self.timeout);
        let query_err = |reason: String| ClusterError::Query {
            resource: resource.to_owned(),
            namespace: namespace.to_owned(),
            reason,
        };
        let out = self
            .runner
            .run(spec)
            .await
            .map_err(|e| query_err(e.to_string()))?;
        if !out.success() {
            return Err(query_err(format!(
                "exit code {}: {}",
                out.exit_code,
                out.stderr.trim()
            )));
        }
        Ok(out.stdout)
    }
}

impl fmt::Debug for KubectlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubectlQuery")
            .field("binary", &self.binary)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct NamedObject {
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Default, Deserialize)]
struct Metadata {
    name: Option<String>,
}

#[derive(Deserialize)]
struct Service {
    #[serde(default)]
    status: ServiceStatus,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    #[serde(default)]
    load_balancer: LoadBalancerStatus,
}

#[derive(Default, Deserialize)]
struct LoadBalancerStatus {
    #[serde(default)]
    ingress: Vec<LoadBalancerIngress>,
}

#[derive(Deserialize)]
struct LoadBalancerIngress {
    ip: Option<String>,
    hostname: Option<String>,
}

impl ResourceQuery for KubectlQuery {
    fn list_names<'a>(
        &'a self,
        resource: &'a CustomResourceType,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, ClusterError>> {
        Box::pin(async move {
            let qualified = resource.qualified_name();
            let json = self.get_json(&qualified, namespace).await?;
            let list: ObjectList<NamedObject> =
                serde_json::from_str(&json).map_err(|e| ClusterError::Query {
                    resource: qualified.clone(),
                    namespace: namespace.to_owned(),
                    reason: format!("invalid list json: {e}"),
                })?;
            Ok(list
                .items
                .into_iter()
                .filter_map(|item| item.metadata.name)
                .collect())
        })
    }

    fn gateway_address<'a>(
        &'a self,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<String, ClusterError>> {
        Box::pin(async move {
            let json = self.get_json("services", namespace).await?;
            let list: ObjectList<Service> =
                serde_json::from_str(&json).map_err(|e| ClusterError::Query {
                    resource: "services".to_owned(),
                    namespace: namespace.to_owned(),
                    reason: format!("invalid list json: {e}"),
                })?;
            list.items
                .into_iter()
                .flat_map(|svc| svc.status.load_balancer.ingress)
                .find_map(|ingress| {
                    [ingress.ip, ingress.hostname]
                        .into_iter()
                        .flatten()
                        .find(|addr| !addr.is_empty())
                })
                .ok_or_else(|| ClusterError::NoGatewayAddress {
                    namespace: namespace.to_owned(),
                })
        })
    }
}

/// 환경 네임스페이스의 권한 정책 이름 목록을 조회합니다.
///
/// 조회가 실패하면 에러를 로그로 남기고 빈 목록을 반환합니다.
/// 호출자는 "정책 없음"과 "조회 실패"를 구분하지 않습니다.
pub async fn list_authorization_policies(
    query: &dyn ResourceQuery,
    env: &Environment,
) -> Vec<String> {
    match query.list_names(&AUTHORIZATION_POLICY, env.name()).await {
        Ok(names) => {
            info!(
                namespace = env.name(),
                count = names.len(),
                policies = ?names,
                "found authorization policies"
            );
            names
        }
        Err(e) => {
            error!(namespace = env.name(), error = %e, "failed to get authorization policies");
            metrics::counter!(m::QUERY_SOFT_FAILURES_TOTAL).increment(1);
            Vec::new()
        }
    }
}
