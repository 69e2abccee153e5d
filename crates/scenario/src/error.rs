//! 시나리오 에러 타입

use meshcheck_cluster::ClusterError;
use meshcheck_core::error::MeshcheckError;
use meshcheck_probe::ProbeError;
use meshcheck_terraform::TerraformError;

use crate::feature::StepKeyword;

/// 스텝 등록, 해석, 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// 스텝 패턴 컴파일 실패
    #[error("invalid step pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// 같은 키워드로 같은 패턴이 두 번 등록됨
    #[error("step already registered: {keyword} {pattern}")]
    DuplicatePattern {
        keyword: StepKeyword,
        pattern: String,
    },

    /// 일치하는 스텝 정의가 없음
    #[error("undefined step: {keyword} {text}")]
    Undefined { keyword: StepKeyword, text: String },

    /// 같은 우선순위의 정의가 여러 개 일치함
    #[error("ambiguous step: {keyword} {text} (matches: {})", candidates.join(", "))]
    Ambiguous {
        keyword: StepKeyword,
        text: String,
        candidates: Vec<String>,
    },

    /// 패턴에 없는 인자를 요청함
    #[error("missing step argument: {name}")]
    MissingArgument { name: String },

    /// 인자 값을 해석할 수 없음
    #[error("invalid value '{value}' for step argument '{name}': {reason}")]
    InvalidArgument {
        name: String,
        value: String,
        reason: String,
    },

    /// 이전 스텝이 준비해야 할 상태가 없음
    #[error("missing state: {0}")]
    MissingState(String),

    /// 단언 실패
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// 프로비저닝 도구 실패
    #[error(transparent)]
    Tool(#[from] TerraformError),

    /// 수렴 대기 또는 클러스터 명령 실패
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// 프로브 실패
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl From<StepError> for MeshcheckError {
    fn from(err: StepError) -> Self {
        match err {
            StepError::Tool(e) => e.into(),
            StepError::Cluster(e) => e.into(),
            StepError::Probe(e) => e.into(),
            other => MeshcheckError::Step(other.to_string()),
        }
    }
}
