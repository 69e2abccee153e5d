//! 프로브 결과 검증

use meshcheck_core::types::ProbeOutcome;

use crate::error::ProbeError;

/// 프로브 결과가 기대값과 일치하는지 검증합니다.
///
/// - `expected_exit_code`가 있으면 종료 코드가 정확히 같아야 합니다.
/// - `expected_http_code`가 있으면 `HTTP_CODE:<n>` 마커가 표준 출력에 그대로 있어야 합니다.
///
/// 종료 코드를 먼저 검사합니다. 둘 다 `None`이면 아무것도 검사하지 않습니다.
pub fn verify(
    outcome: &ProbeOutcome,
    expected_http_code: Option<u16>,
    expected_exit_code: Option<i32>,
) -> Result<(), ProbeError> {
    if let Some(expected) = expected_exit_code
        && outcome.exit_code != expected
    {
        if expected == 0 {
            return Err(ProbeError::TransportFailure {
                exit_code: outcome.exit_code,
                stderr: outcome.stderr.clone(),
            });
        }
        return Err(ProbeError::ExitCodeMismatch {
            expected,
            actual: outcome.exit_code,
            stderr: outcome.stderr.clone(),
        });
    }

    if let Some(expected) = expected_http_code
        && !outcome.has_http_code(expected)
    {
        return Err(ProbeError::HttpCodeMismatch {
            expected,
            stdout: outcome.stdout.clone(),
        });
    }

    Ok(())
}
