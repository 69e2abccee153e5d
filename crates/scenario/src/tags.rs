//! 시나리오 태그 해석
//!
//! `xfail` 또는 `xfail:<사유>` 태그는 시나리오를 예상 실패로 표시합니다.
//! 스텝 실행과는 무관하게 결과 판정에만 영향을 줍니다.

const XFAIL_TAG: &str = "xfail";

/// 해석된 시나리오 태그
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioTag {
    /// 예상 실패 (사유는 비어 있을 수 있음)
    XFail { reason: String },
    /// 그 외 태그
    Other(String),
}

impl ScenarioTag {
    /// 태그 문자열을 해석합니다. 앞의 `@`는 무시합니다.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        let tag = tag.strip_prefix('@').unwrap_or(tag);

        if let Some(rest) = tag.strip_prefix(XFAIL_TAG) {
            if rest.is_empty() {
                return Self::XFail {
                    reason: String::new(),
                };
            }
            if let Some(reason) = rest.strip_prefix(':') {
                return Self::XFail {
                    reason: reason.trim().to_owned(),
                };
            }
        }
        Self::Other(tag.to_owned())
    }
}

/// 태그 목록에서 첫 번째 예상 실패 사유를 찾습니다.
pub fn xfail_reason<'a>(tags: impl IntoIterator<Item = &'a str>) -> Option<String> {
    tags.into_iter().find_map(|tag| match ScenarioTag::parse(tag) {
        ScenarioTag::XFail { reason } => Some(reason),
        ScenarioTag::Other(_) => None,
    })
}
