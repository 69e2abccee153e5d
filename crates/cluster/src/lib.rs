//! meshcheck 클러스터 상호작용
//!
//! 배포된 환경의 상태를 샘플링해 수렴을 기다리고, 클러스터 리소스를 조회합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`ClusterError`)
//! - [`status`]: 모델 상태 스냅샷과 조건 (`ModelStatus`, `all_active`, `all_agents_idle`, `any_error`)
//! - [`juju`]: juju CLI 헬퍼 (`JujuCli`)
//! - [`poller`]: 세 단계 수렴 대기 (`ConvergencePoller`, `SettlePolicy`, `WaitPhase`)
//! - [`query`]: 리소스 조회 (`ResourceQuery`, `KubectlQuery`, `list_authorization_policies`)

pub mod error;
pub mod juju;
pub mod poller;
pub mod query;
pub mod status;

pub use error::ClusterError;
pub use juju::JujuCli;
pub use poller::{ConvergencePoller, ConvergenceTarget, SettlePolicy, WaitPhase};
pub use query::{
    AUTHORIZATION_POLICY, CustomResourceType, KubectlQuery, ResourceQuery,
    list_authorization_policies,
};
pub use status::{ModelStatus, StatusPredicate, all_active, all_agents_idle, any_error};
