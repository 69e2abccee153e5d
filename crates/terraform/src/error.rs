//! 프로비저닝 도구 에러 타입
//!
//! [`TerraformError`]는 외부 도구 호출에서 발생하는 모든 에러를 표현합니다.
//! `From<TerraformError> for MeshcheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use std::fmt;

use meshcheck_core::error::MeshcheckError;
use meshcheck_core::process::ProcessError;

/// 외부 도구 호출 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolPhase {
    /// `init`
    Init,
    /// `apply -auto-approve`
    Apply,
    /// `output -raw`
    Output,
}

impl ToolPhase {
    /// 도구 하위 명령 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Apply => "apply",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for ToolPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 프로비저닝 도구 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum TerraformError {
    /// 도구가 0이 아닌 종료 코드로 끝남
    ///
    /// 진단을 위해 캡처한 stdout/stderr를 그대로 보관합니다.
    #[error("{phase} failed with exit code {exit_code}: {}", stderr.trim())]
    ToolInvocation {
        /// 실패한 단계
        phase: ToolPhase,
        /// 종료 코드
        exit_code: i32,
        /// 캡처된 표준 출력
        stdout: String,
        /// 캡처된 표준 에러
        stderr: String,
    },

    /// PATH에서 도구 바이너리를 찾지 못함
    #[error("no provisioning tool found in PATH (searched: {searched})")]
    BinaryNotFound {
        /// 탐색한 바이너리 이름 목록
        searched: String,
    },

    /// 도구 프로세스를 시작하지 못했거나 타임아웃됨
    #[error("{phase} could not run: {source}")]
    Process {
        /// 실행하려던 단계
        phase: ToolPhase,
        /// 원인
        #[source]
        source: ProcessError,
    },
}

impl TerraformError {
    /// 실패한 단계 (바이너리 탐색 실패는 `None`)
    pub fn phase(&self) -> Option<ToolPhase> {
        match self {
            Self::ToolInvocation { phase, .. } | Self::Process { phase, .. } => Some(*phase),
            Self::BinaryNotFound { .. } => None,
        }
    }
}

impl From<TerraformError> for MeshcheckError {
    fn from(err: TerraformError) -> Self {
        MeshcheckError::Tool(err.to_string())
    }
}
