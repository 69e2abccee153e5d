//! meshcheck 공통 크레이트
//!
//! 모든 meshcheck 크레이트가 공유하는 도메인 타입, 에러, 설정,
//! 그리고 외부 프로세스 실행 추상화([`CommandRunner`])를 제공합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod process;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, MeshcheckError};

// 설정
pub use config::MeshcheckConfig;

// 프로세스 실행
pub use process::{BoxFuture, CommandOutput, CommandRunner, CommandSpec, ProcessError, ProcessRunner};

#[cfg(any(test, feature = "test-util"))]
pub use process::MockRunner;

// 도메인 타입
pub use types::{ComponentRegistration, ConfigurationAccumulator, Environment, ProbeOutcome};
