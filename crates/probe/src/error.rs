//! 프로브 에러 타입

use meshcheck_core::error::MeshcheckError;
use meshcheck_core::process::ProcessError;

/// 프로브 도메인 에러
///
/// 검증 실패(`TransportFailure`, `ExitCodeMismatch`, `HttpCodeMismatch`)는
/// 스텝의 일반적인 단언 실패로 보고됩니다. `Process`는 프로브 자체를 실행하지
/// 못한 경우(바이너리 없음, 타임아웃)입니다.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// 성공(종료 코드 0)을 기대했지만 전송 계층에서 실패함
    #[error("request failed at transport level with exit code {exit_code}: {}", stderr.trim())]
    TransportFailure {
        /// 실제 종료 코드
        exit_code: i32,
        /// 표준 에러
        stderr: String,
    },

    /// 기대한 종료 코드와 다름
    #[error("expected exit code {expected}, got {actual}: {}", stderr.trim())]
    ExitCodeMismatch {
        /// 기대한 종료 코드
        expected: i32,
        /// 실제 종료 코드
        actual: i32,
        /// 표준 에러
        stderr: String,
    },

    /// 기대한 HTTP 상태 마커가 표준 출력에 없음
    #[error("expected HTTP {expected}, got: {stdout}")]
    HttpCodeMismatch {
        /// 기대한 상태 코드
        expected: u16,
        /// 실제 표준 출력
        stdout: String,
    },

    /// 프로브 프로세스 실행 실패
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl From<ProbeError> for MeshcheckError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Process(e) => MeshcheckError::Process(e),
            other => MeshcheckError::Probe(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_display() {
        let err = ProbeError::TransportFailure {
            exit_code: 7,
            stderr: "curl: (7) Failed to connect\n".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "request failed at transport level with exit code 7: curl: (7) Failed to connect"
        );
    }

    #[test]
    fn http_mismatch_display() {
        let err = ProbeError::HttpCodeMismatch {
            expected: 200,
            stdout: "RBAC: access denied\nHTTP_CODE:403".to_owned(),
        };
        assert!(err.to_string().starts_with("expected HTTP 200"));
        assert!(err.to_string().contains("HTTP_CODE:403"));
    }

    #[test]
    fn assertion_failures_convert_to_probe_error() {
        let err = ProbeError::ExitCodeMismatch {
            expected: 1,
            actual: 0,
            stderr: String::new(),
        };
        let top: MeshcheckError = err.into();
        assert!(matches!(top, MeshcheckError::Probe(_)));
    }

    #[test]
    fn process_failures_stay_process_errors() {
        let err = ProbeError::Process(ProcessError::TimedOut {
            program: "juju".to_owned(),
            timeout_secs: 30,
        });
        let top: MeshcheckError = err.into();
        assert!(matches!(top, MeshcheckError::Process(_)));
    }
}
