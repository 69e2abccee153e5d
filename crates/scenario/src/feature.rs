//! 사전 파싱된 시나리오 문서 모델
//!
//! Gherkin 파싱은 외부 엔진이 담당하며, 이 모듈은 그 결과(JSON)를 읽습니다.
//! `And`/`But`은 엔진이 앞선 키워드로 해석한 상태로 전달되어야 합니다.

use std::fmt;
use std::path::Path;

use meshcheck_core::error::{ConfigError, MeshcheckError};
use serde::{Deserialize, Serialize};

use crate::tags::xfail_reason;

/// 스텝 키워드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKeyword {
    /// 전제 조건
    Given,
    /// 동작
    When,
    /// 기대 결과
    Then,
}

impl StepKeyword {
    /// 키워드 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단일 스텝
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 키워드
    pub keyword: StepKeyword,
    /// 스텝 문장
    pub text: String,
}

impl Step {
    /// 새 스텝을 생성합니다.
    pub fn new(keyword: StepKeyword, text: impl Into<String>) -> Self {
        Self {
            keyword,
            text: text.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.text)
    }
}

/// 시나리오
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// 시나리오 이름
    pub name: String,
    /// 시나리오 태그 (`@` 없이 또는 포함)
    #[serde(default)]
    pub tags: Vec<String>,
    /// 순서대로 실행할 스텝
    pub steps: Vec<Step>,
}

/// 기능 문서 (시나리오 묶음)
///
/// 하나의 기능 문서는 하나의 모듈 범위에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// 기능 이름
    pub name: String,
    /// 기능 태그 (모든 시나리오가 상속)
    #[serde(default)]
    pub tags: Vec<String>,
    /// 시나리오 목록
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// JSON 문자열에서 기능 문서를 읽습니다.
    pub fn from_json(json: &str) -> Result<Self, MeshcheckError> {
        serde_json::from_str(json).map_err(|e| {
            MeshcheckError::Config(ConfigError::ParseFailed {
                reason: format!("invalid feature document: {e}"),
            })
        })
    }

    /// 파일에서 기능 문서를 읽습니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MeshcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MeshcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                MeshcheckError::Io(e)
            }
        })?;
        Self::from_json(&content)
    }

    /// 기능 태그를 상속한 시나리오의 유효 태그
    pub fn effective_tags<'a>(&'a self, scenario: &'a Scenario) -> impl Iterator<Item = &'a str> {
        self.tags
            .iter()
            .chain(scenario.tags.iter())
            .map(String::as_str)
    }

    /// 시나리오의 예상 실패 사유 (예상 실패가 아니면 `None`)
    pub fn xfail_reason(&self, scenario: &Scenario) -> Option<String> {
        xfail_reason(self.effective_tags(scenario))
    }
}
