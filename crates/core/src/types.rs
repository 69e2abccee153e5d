//! 도메인 타입: 크레이트 전역에서 사용되는 공통 타입
//!
//! 환경(juju 모델), 컴포넌트 등록 정보, 프로브 결과,
//! 시나리오 단위 설정 누적기를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP 상태 코드 마커 접두어
///
/// 프로브는 응답 본문 뒤에 `HTTP_CODE:<status>` 형태로 상태 코드를 덧붙입니다.
pub const HTTP_CODE_MARKER: &str = "HTTP_CODE:";

/// 격리된 실행 환경 (juju 모델 = Kubernetes 네임스페이스)
///
/// 테스트 프레임워크가 스텝 실행 전에 생성하며, 이 크레이트는 식별자만 읽습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    name: String,
}

impl Environment {
    /// 환경 식별자로 새 환경 핸들을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 환경 식별자 (모델명이자 네임스페이스명)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 프로비저닝 apply 결과로 얻은 컴포넌트 등록 정보
///
/// 후속 스텝(의존 컴포넌트 연결 등)에서 읽습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRegistration {
    /// 배포된 애플리케이션 이름
    pub app_name: String,
    /// 서비스 메시 엔드포인트 이름 (선언된 경우)
    pub endpoint: Option<String>,
}

impl ComponentRegistration {
    /// 엔드포인트 없는 등록 정보를 생성합니다.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            endpoint: None,
        }
    }

    /// 엔드포인트를 포함한 등록 정보를 생성합니다.
    pub fn with_endpoint(app_name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            endpoint: Some(endpoint.into()),
        }
    }
}

impl fmt::Display for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Some(endpoint) => write!(f, "{} (endpoint: {endpoint})", self.app_name),
            None => f.write_str(&self.app_name),
        }
    }
}

/// 프로브 실행 결과
///
/// 생성 후 변경되지 않으며, 시나리오 결과 슬롯에 저장되어
/// 이후 검증 스텝에서 다시 읽힙니다.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// 표준 출력 원문 (응답 본문 + `HTTP_CODE:<n>` 마커)
    pub stdout: String,
    /// 표준 에러 원문
    pub stderr: String,
    /// 프로세스 종료 코드
    pub exit_code: i32,
}

impl ProbeOutcome {
    /// 새 프로브 결과를 생성합니다.
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// 전송 계층에서 성공했는지 여부 (종료 코드 0)
    pub fn transport_ok(&self) -> bool {
        self.exit_code == 0
    }

    /// 표준 출력에서 마지막 `HTTP_CODE:<n>` 마커의 상태 코드를 추출합니다.
    pub fn http_code(&self) -> Option<u16> {
        let idx = self.stdout.rfind(HTTP_CODE_MARKER)?;
        let digits: String = self.stdout[idx + HTTP_CODE_MARKER.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    /// 표준 출력에 `HTTP_CODE:<code>` 마커가 그대로 포함되어 있는지 확인합니다.
    pub fn has_http_code(&self, code: u16) -> bool {
        self.stdout.contains(&format!("{HTTP_CODE_MARKER}{code}"))
    }
}

/// 컴포넌트별 설정 옵션 누적기
///
/// 한 시나리오 안에서 단조 증가합니다. 나중의 "set option" 스텝은
/// 이전 스텝이 설정한 옵션을 보존한 채로 확장합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationAccumulator {
    options: BTreeMap<String, String>,
}

impl ConfigurationAccumulator {
    /// 빈 누적기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 옵션을 설정합니다. 같은 이름은 덮어쓰고, 다른 옵션은 유지합니다.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.insert(name.into(), value.into());
    }

    /// 옵션 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// 누적된 옵션이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// 누적된 옵션 수
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// 누적된 옵션 맵
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// 옵션 맵을 JSON 객체 문자열로 직렬화합니다 (`TF_VAR_config` 값).
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.options).unwrap_or_else(|_| "{}".to_owned())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigurationAccumulator {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut acc = Self::new();
        for (k, v) in iter {
            acc.set(k, v);
        }
        acc
    }
}
