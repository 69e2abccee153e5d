//! `TF_VAR_*` 입력 변수
//!
//! 정의 파일은 절대 수정하지 않으며, 모든 입력은 환경변수로만 전달합니다.

use std::collections::BTreeMap;

use serde::Serialize;

/// 입력 변수 환경변수 접두어
pub const TF_VAR_PREFIX: &str = "TF_VAR_";

/// 프로비저닝 입력 변수 모음
///
/// 변수 이름에는 접두어를 붙이지 않습니다. [`TfVars::to_env`]가
/// `TF_VAR_<name>` 형태로 변환합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TfVars {
    vars: BTreeMap<String, String>,
}

impl TfVars {
    /// 빈 변수 모음을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 문자열 변수를 설정합니다.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// 값이 있을 때만 변수를 설정합니다.
    pub fn set_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// 값을 JSON으로 직렬화해 변수로 설정합니다 (맵, 객체 타입 변수용).
    pub fn set_json<T: Serialize>(
        self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let encoded = serde_json::to_string(value)?;
        Ok(self.set(name, encoded))
    }

    /// 변수 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// 설정된 변수가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `TF_VAR_<name>` 환경변수 목록으로 변환합니다.
    pub fn to_env(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(name, value)| (format!("{TF_VAR_PREFIX}{name}"), value.clone()))
            .collect()
    }
}
