//! # meshcheck-probe
//!
//! 배포된 유닛 내부 또는 테스트 호스트에서 합성 HTTP 요청을 보내고 결과를 검증합니다.
//!
//! 모든 프로브는 응답 본문 뒤에 `HTTP_CODE:<status>` 마커를 붙여 받으므로
//! "HTTP 403을 받음"과 "연결 거부"(0이 아닌 종료 코드)를 구분할 수 있습니다.
//!
//! # 모듈 구성
//!
//! - [`request`]: 프로브 위치와 요청
//! - [`prober`]: `curl` 실행기
//! - [`verify`]: 결과 검증
//! - [`retry`]: 스텝 레이어 재시도 정책
//! - [`error`]: 에러 타입

pub mod error;
pub mod prober;
pub mod request;
pub mod retry;
pub mod verify;

pub use error::ProbeError;
pub use prober::Prober;
pub use request::{DEFAULT_PROBE_TIMEOUT, ProbeLocation, ProbeRequest};
pub use retry::RetryPolicy;
pub use verify::verify;
