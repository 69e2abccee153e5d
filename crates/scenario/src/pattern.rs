//! 스텝 문장 패턴
//!
//! `{name}` 자리표시자와 리터럴 텍스트로 구성된 패턴을 시작 시 한 번
//! 정규식으로 컴파일합니다. 자리표시자는 비어 있지 않은 최소 일치(`.+?`)이며,
//! 패턴은 문장 전체와 일치해야 합니다.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::StepError;

/// 컴파일된 스텝 패턴
#[derive(Debug, Clone)]
pub struct StepPattern {
    source: String,
    regex: Regex,
    params: Vec<String>,
    literal_len: usize,
}

impl StepPattern {
    /// 패턴을 컴파일합니다.
    ///
    /// # Errors
    ///
    /// 중괄호가 짝이 맞지 않거나, 자리표시자 이름이 식별자가 아니거나,
    /// 같은 이름이 두 번 나오면 [`StepError::InvalidPattern`]을 반환합니다.
    pub fn compile(source: &str) -> Result<Self, StepError> {
        let invalid = |reason: String| StepError::InvalidPattern {
            pattern: source.to_owned(),
            reason,
        };

        let mut expr = String::from("^");
        let mut params: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut literal_len = 0;
        let mut rest = source;

        while !rest.is_empty() {
            match rest.find(['{', '}']) {
                Some(idx) if rest[idx..].starts_with('}') => {
                    return Err(invalid(format!("unmatched '}}' at byte {}", source.len() - rest.len() + idx)));
                }
                Some(idx) => {
                    literal.push_str(&rest[..idx]);
                    let after = &rest[idx + 1..];
                    let end = after
                        .find('}')
                        .ok_or_else(|| invalid("unclosed '{'".to_owned()))?;
                    let name = &after[..end];
                    if !is_identifier(name) {
                        return Err(invalid(format!("invalid placeholder name '{name}'")));
                    }
                    if params.iter().any(|p| p == name) {
                        return Err(invalid(format!("duplicate placeholder '{name}'")));
                    }

                    literal_len += literal.chars().count();
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(&format!("(?P<{name}>.+?)"));
                    params.push(name.to_owned());
                    rest = &after[end + 1..];
                }
                None => {
                    literal.push_str(rest);
                    rest = "";
                }
            }
        }
        literal_len += literal.chars().count();
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            source: source.to_owned(),
            regex,
            params,
            literal_len,
        })
    }

    /// 원본 패턴 문자열
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 자리표시자 이름 (등장 순서)
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// 자리표시자를 제외한 리터럴 글자 수 (해석 우선순위)
    pub fn literal_len(&self) -> usize {
        self.literal_len
    }

    /// 문장 전체가 패턴과 일치하면 추출한 인자를 반환합니다.
    pub fn captures(&self, text: &str) -> Option<StepArgs> {
        let caps = self.regex.captures(text)?;
        let values = self
            .params
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.clone(), m.as_str().to_owned()))
            })
            .collect();
        Some(StepArgs { values })
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 스텝 문장에서 추출한 인자
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs {
    values: BTreeMap<String, String>,
}

impl StepArgs {
    /// 인자 값을 조회합니다.
    pub fn get(&self, name: &str) -> Result<&str, StepError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| StepError::MissingArgument {
                name: name.to_owned(),
            })
    }

    /// 인자 값을 지정한 타입으로 해석합니다.
    pub fn parse<T>(&self, name: &str) -> Result<T, StepError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.get(name)?;
        value.trim().parse().map_err(|e: T::Err| StepError::InvalidArgument {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: e.to_string(),
        })
    }

    /// 추출한 인자 수
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 인자가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
