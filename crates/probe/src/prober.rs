//! 합성 HTTP 프로브 실행기
//!
//! [`Prober`]는 `curl`을 한 번 실행하고 결과를 그대로 [`ProbeOutcome`]으로 돌려줍니다.
//! 0이 아닌 종료 코드(연결 거부 등)도 정상적인 결과이며, 판정은 [`verify`](crate::verify)가 합니다.
//! 프로브 호출 자체는 재시도하지 않습니다. 재시도는 [`RetryPolicy`]로 스텝 레이어에서 수행합니다.

use std::fmt;
use std::sync::Arc;

use meshcheck_core::metrics as m;
use meshcheck_core::process::{CommandRunner, CommandSpec};
use meshcheck_core::types::ProbeOutcome;
use tracing::{debug, info, warn};

use crate::error::ProbeError;
use crate::request::{ProbeLocation, ProbeRequest};
use crate::retry::RetryPolicy;

/// 호스트에서 사용하는 HTTP 클라이언트 바이너리
pub const CURL_BINARY: &str = "curl";

/// 프로브 실행기
#[derive(Clone)]
pub struct Prober {
    runner: Arc<dyn CommandRunner>,
    juju_binary: String,
    curl_binary: String,
}

impl Prober {
    /// 새 프로브 실행기를 생성합니다.
    pub fn new(runner: Arc<dyn CommandRunner>, juju_binary: impl Into<String>) -> Self {
        Self {
            runner,
            juju_binary: juju_binary.into(),
            curl_binary: CURL_BINARY.to_owned(),
        }
    }

    /// 외부 호스트 프로브에 사용할 `curl` 바이너리를 바꿉니다.
    pub fn with_curl_binary(mut self, binary: impl Into<String>) -> Self {
        self.curl_binary = binary.into();
        self
    }

    fn command(&self, location: &ProbeLocation, request: &ProbeRequest) -> CommandSpec {
        let spec = match location {
            ProbeLocation::Unit { env, unit } => CommandSpec::new(&self.juju_binary)
                .args(["exec", "--model", env.name(), "--unit", unit, "--"])
                .arg(CURL_BINARY),
            ProbeLocation::External => CommandSpec::new(&self.curl_binary),
        };
        spec.args(request.curl_args()).timeout(request.timeout)
    }

    /// 프로브를 한 번 실행합니다.
    ///
    /// # Errors
    ///
    /// 프로세스를 시작하지 못했거나 타임아웃이 지나면 [`ProbeError::Process`]를 반환합니다.
    /// 전송 실패는 에러가 아니라 종료 코드가 0이 아닌 결과로 반환됩니다.
    pub async fn probe(
        &self,
        location: &ProbeLocation,
        request: &ProbeRequest,
    ) -> Result<ProbeOutcome, ProbeError> {
        let spec = self.command(location, request);
        debug!(command = %spec, "running probe");

        let output = match self.runner.run(spec).await {
            Ok(output) => output,
            Err(e) => {
                metrics::counter!(
                    m::PROBES_TOTAL,
                    m::LABEL_LOCATION => location.label(),
                    m::LABEL_RESULT => "error"
                )
                .increment(1);
                return Err(e.into());
            }
        };

        let outcome = ProbeOutcome::from(output);
        let result = if outcome.transport_ok() {
            "success"
        } else {
            "failure"
        };
        metrics::counter!(
            m::PROBES_TOTAL,
            m::LABEL_LOCATION => location.label(),
            m::LABEL_RESULT => result
        )
        .increment(1);

        info!(
            location = %location,
            request = %request,
            exit_code = outcome.exit_code,
            http_code = ?outcome.http_code(),
            "probe completed"
        );
        Ok(outcome)
    }

    /// 재시도 정책에 따라 프로브를 실행합니다.
    ///
    /// 전송 실패(0이 아닌 종료 코드)일 때만 다시 시도하며, 마지막 결과를 그대로 반환합니다.
    /// 프로세스 에러는 재시도하지 않고 즉시 전파합니다.
    pub async fn probe_with_retry(
        &self,
        location: &ProbeLocation,
        request: &ProbeRequest,
        policy: &RetryPolicy,
    ) -> Result<ProbeOutcome, ProbeError> {
        let mut outcome = self.probe(location, request).await?;

        for attempt in 1..policy.max_attempts {
            if outcome.transport_ok() {
                break;
            }
            let backoff = policy.backoff_for(attempt);
            warn!(
                location = %location,
                request = %request,
                attempt = attempt,
                exit_code = outcome.exit_code,
                backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                "retrying probe after transport failure"
            );
            metrics::counter!(m::PROBE_RETRIES_TOTAL).increment(1);
            tokio::time::sleep(backoff).await;
            outcome = self.probe(location, request).await?;
        }

        Ok(outcome)
    }
}

impl fmt::Debug for Prober {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prober")
            .field("juju_binary", &self.juju_binary)
            .field("curl_binary", &self.curl_binary)
            .finish_non_exhaustive()
    }
}
