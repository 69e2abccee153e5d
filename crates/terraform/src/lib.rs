//! meshcheck 프로비저닝 도구 수명주기 관리
//!
//! 선언형 인프라 도구(terraform 또는 OpenTofu)를 일회성 서브프로세스로 호출해
//! 리소스 종류별 정의를 적용하고 출력 값을 읽습니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 (`TerraformError`, `ToolPhase`)
//! - [`workspace`]: 리소스 종류와 워크스페이스 (`ResourceKind`, `ProvisioningWorkspace`)
//! - [`vars`]: `TF_VAR_*` 입력 변수 (`TfVars`)
//! - [`discovery`]: PATH에서 도구 바이너리 탐색
//! - [`manager`]: init / apply / output (`TfManager`)
//!
//! # Architecture
//!
//! ```text
//! deployer ──► TfManager ──► CommandRunner ──► terraform {init|apply|output}
//!                 │                                 │
//!        ProvisioningWorkspace            {state_dir}/{kind}-{env}.tfstate
//! ```

pub mod discovery;
pub mod error;
pub mod manager;
pub mod vars;
pub mod workspace;

pub use discovery::resolve_binary;
pub use error::{TerraformError, ToolPhase};
pub use manager::TfManager;
pub use vars::TfVars;
pub use workspace::{ProvisioningWorkspace, ResourceKind, state_file_name};
