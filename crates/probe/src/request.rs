//! 프로브 위치와 요청

use std::fmt;
use std::time::Duration;

use meshcheck_core::types::{Environment, HTTP_CODE_MARKER};

/// 기본 프로브 타임아웃
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// 프로브를 실행하는 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeLocation {
    /// 배포된 환경 안의 특정 유닛 (원격 명령으로 실행)
    Unit {
        /// 유닛이 속한 환경
        env: Environment,
        /// 유닛 이름 (`app/0`)
        unit: String,
    },
    /// 테스트 호스트에서 직접 실행 (로드밸런서 주소 등 네트워크 도달성 필요)
    External,
}

impl ProbeLocation {
    /// 애플리케이션의 첫 번째 유닛(`app/0`)을 가리키는 위치
    pub fn leader_unit(env: &Environment, app: &str) -> Self {
        Self::Unit {
            env: env.clone(),
            unit: format!("{app}/0"),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Unit { .. } => "unit",
            Self::External => "external",
        }
    }
}

impl fmt::Display for ProbeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit { env, unit } => write!(f, "{unit} in {env}"),
            Self::External => f.write_str("test host"),
        }
    }
}

/// 합성 HTTP 요청
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// 요청 URL
    pub url: String,
    /// HTTP 메서드
    pub method: String,
    /// 프로세스 타임아웃
    pub timeout: Duration,
}

impl ProbeRequest {
    /// GET 요청을 생성합니다.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// 메서드와 URL로 요청을 생성합니다.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `curl` 인자 목록
    ///
    /// 본문을 출력한 뒤 줄바꿈과 `HTTP_CODE:<status>` 마커를 덧붙입니다.
    pub fn curl_args(&self) -> Vec<String> {
        vec![
            "-X".to_owned(),
            self.method.clone(),
            "-s".to_owned(),
            "-w".to_owned(),
            format!("\\n{HTTP_CODE_MARKER}%{{http_code}}"),
            self.url.clone(),
        ]
    }
}

impl fmt::Display for ProbeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
