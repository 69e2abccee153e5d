//! 스텝 레지스트리
//!
//! 키워드별로 컴파일된 패턴과 핸들러를 보관하고, 스텝 문장을
//! 결정적으로 하나의 핸들러에 대응시킵니다.
//!
//! # 해석 규칙
//!
//! 1. 키워드가 같고 문장 전체와 일치하는 정의만 후보가 됩니다.
//! 2. 리터럴 글자 수가 가장 많은 후보가 선택됩니다 (구체적인 패턴 우선).
//! 3. 최댓값이 같은 후보가 둘 이상이면 [`StepError::Ambiguous`]입니다.
//!
//! 등록 순서는 결과에 영향을 주지 않습니다.

use meshcheck_core::process::BoxFuture;

use crate::error::StepError;
use crate::feature::StepKeyword;
use crate::pattern::{StepArgs, StepPattern};

/// 스텝 핸들러
///
/// 실행 상태(`W`)를 가변 참조로 받고, 추출된 인자를 읽습니다.
pub type StepHandler<W> =
    for<'a> fn(&'a mut W, &'a StepArgs) -> BoxFuture<'a, Result<(), StepError>>;

/// 등록된 스텝 정의
pub struct StepDefinition<W> {
    keyword: StepKeyword,
    pattern: StepPattern,
    handler: StepHandler<W>,
}

impl<W> StepDefinition<W> {
    /// 키워드
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// 패턴
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// 핸들러
    pub fn handler(&self) -> StepHandler<W> {
        self.handler
    }
}

impl<W> std::fmt::Debug for StepDefinition<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDefinition")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.source())
            .finish_non_exhaustive()
    }
}

/// 해석된 스텝 (정의 + 인자)
pub struct ResolvedStep<'r, W> {
    /// 선택된 정의
    pub definition: &'r StepDefinition<W>,
    /// 추출된 인자
    pub args: StepArgs,
}

impl<W> std::fmt::Debug for ResolvedStep<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedStep")
            .field("definition", self.definition)
            .field("args", &self.args)
            .finish()
    }
}

/// 스텝 레지스트리
pub struct StepRegistry<W> {
    definitions: Vec<StepDefinition<W>>,
}

impl<W> StepRegistry<W> {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// 스텝 정의를 등록합니다.
    ///
    /// # Errors
    ///
    /// 패턴이 잘못되었거나 같은 키워드로 같은 패턴이 이미 있으면 에러를 반환합니다.
    pub fn register(
        &mut self,
        keyword: StepKeyword,
        pattern: &str,
        handler: StepHandler<W>,
    ) -> Result<&mut Self, StepError> {
        if self
            .definitions
            .iter()
            .any(|d| d.keyword == keyword && d.pattern.source() == pattern)
        {
            return Err(StepError::DuplicatePattern {
                keyword,
                pattern: pattern.to_owned(),
            });
        }
        let pattern = StepPattern::compile(pattern)?;
        self.definitions.push(StepDefinition {
            keyword,
            pattern,
            handler,
        });
        Ok(self)
    }

    /// `Given` 스텝을 등록합니다.
    pub fn given(&mut self, pattern: &str, handler: StepHandler<W>) -> Result<&mut Self, StepError> {
        self.register(StepKeyword::Given, pattern, handler)
    }

    /// `When` 스텝을 등록합니다.
    pub fn when(&mut self, pattern: &str, handler: StepHandler<W>) -> Result<&mut Self, StepError> {
        self.register(StepKeyword::When, pattern, handler)
    }

    /// `Then` 스텝을 등록합니다.
    pub fn then(&mut self, pattern: &str, handler: StepHandler<W>) -> Result<&mut Self, StepError> {
        self.register(StepKeyword::Then, pattern, handler)
    }

    /// 스텝 문장을 정의 하나로 해석합니다.
    ///
    /// # Errors
    ///
    /// 일치하는 정의가 없으면 [`StepError::Undefined`],
    /// 가장 구체적인 후보가 둘 이상이면 [`StepError::Ambiguous`]를 반환합니다.
    pub fn resolve(
        &self,
        keyword: StepKeyword,
        text: &str,
    ) -> Result<ResolvedStep<'_, W>, StepError> {
        let candidates: Vec<(&StepDefinition<W>, StepArgs)> = self
            .definitions
            .iter()
            .filter(|d| d.keyword == keyword)
            .filter_map(|d| d.pattern.captures(text).map(|args| (d, args)))
            .collect();

        let Some(best) = candidates.iter().map(|(d, _)| d.pattern.literal_len()).max() else {
            return Err(StepError::Undefined {
                keyword,
                text: text.to_owned(),
            });
        };

        let mut top: Vec<(&StepDefinition<W>, StepArgs)> = candidates
            .into_iter()
            .filter(|(d, _)| d.pattern.literal_len() == best)
            .collect();

        if top.len() > 1 {
            return Err(StepError::Ambiguous {
                keyword,
                text: text.to_owned(),
                candidates: top
                    .iter()
                    .map(|(d, _)| d.pattern.source().to_owned())
                    .collect(),
            });
        }

        match top.pop() {
            Some((definition, args)) => Ok(ResolvedStep { definition, args }),
            None => Err(StepError::Undefined {
                keyword,
                text: text.to_owned(),
            }),
        }
    }

    /// 등록된 정의 수
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 등록된 정의가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 등록된 정의 목록
    pub fn definitions(&self) -> &[StepDefinition<W>] {
        &self.definitions
    }
}

impl<W> Default for StepRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> std::fmt::Debug for StepRegistry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("definitions", &self.definitions.len())
            .finish()
    }
}
