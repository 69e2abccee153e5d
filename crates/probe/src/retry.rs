//! 스텝 레이어 프로브 재시도 정책

use std::time::Duration;

use meshcheck_core::config::ProbeConfig;

/// 프로브 재시도 정책
///
/// `max_attempts`는 최초 시도를 포함한 총 시도 횟수입니다. 1이면 재시도하지 않습니다.
/// n번째 재시도 전에는 `backoff * n`만큼 대기합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 총 시도 횟수 (최소 1)
    pub max_attempts: u32,
    /// 선형 백오프 기준 시간
    pub backoff: Duration,
}

impl RetryPolicy {
    /// 새 정책을 생성합니다. `max_attempts`가 0이면 1로 올립니다.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// 재시도하지 않는 정책
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// 설정에서 정책을 생성합니다.
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// n번째 재시도 전 대기 시간
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
