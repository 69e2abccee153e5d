//! 에러 타입: 도메인별 에러 정의
//!
//! 각 크레이트는 자체 도메인 에러를 정의하고 `From<...> for MeshcheckError`
//! 변환을 구현하여 상위 레이어에서 `?` 연산자로 전파합니다.

use crate::process::ProcessError;

/// meshcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum MeshcheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 외부 프로비저닝 도구(terraform/tofu) 호출 실패
    #[error("tool invocation error: {0}")]
    Tool(String),

    /// 수렴 대기 실패 (타임아웃 또는 에러 상태 감지)
    #[error("convergence error: {0}")]
    Convergence(String),

    /// 프로브 실행 또는 검증 실패
    #[error("probe error: {0}")]
    Probe(String),

    /// 클러스터 리소스 조회 실패
    #[error("query error: {0}")]
    Query(String),

    /// 시나리오 스텝 실행 실패
    #[error("step error: {0}")]
    Step(String),

    /// 외부 프로세스 실행 실패
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
