//! 스텝 간 공유 상태
//!
//! 두 가지 범위로 나뉩니다.
//!
//! - [`ModuleContext`]: 기능 문서 하나 동안 유지됩니다. 제어 평면 환경, 애플리케이션 환경,
//!   배포된 비컨/인그레스 등록 정보를 담습니다.
//! - [`ScenarioContext`]: 시나리오마다 새로 만들어집니다. 컴포넌트별 설정 누적기와
//!   마지막 프로브 결과 슬롯을 담습니다.

use meshcheck_core::types::{ComponentRegistration, ConfigurationAccumulator, Environment, ProbeOutcome};
use uuid::Uuid;

use crate::error::StepError;

/// 모듈 범위 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContext {
    /// 제어 평면이 배포되는 환경
    pub istio_system: Environment,
    /// 샘플 애플리케이션이 배포되는 환경
    pub bookinfo: Environment,
    /// 배포된 비컨 컴포넌트
    pub beacon: Option<ComponentRegistration>,
    /// 배포된 인그레스 컴포넌트
    pub ingress: Option<ComponentRegistration>,
}

impl ModuleContext {
    /// 두 환경으로 모듈 상태를 생성합니다.
    pub fn new(istio_system: Environment, bookinfo: Environment) -> Self {
        Self {
            istio_system,
            bookinfo,
            beacon: None,
            ingress: None,
        }
    }

    /// 배포된 인그레스 등록 정보
    pub fn require_ingress(&self) -> Result<&ComponentRegistration, StepError> {
        self.ingress
            .as_ref()
            .ok_or_else(|| StepError::MissingState("ingress app not deployed".to_owned()))
    }
}

/// 시나리오 범위 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioContext {
    /// 시나리오 실행 식별자 (로그 상관용)
    pub run_id: Uuid,
    /// 제어 평면 설정 누적기
    pub istio_config: ConfigurationAccumulator,
    /// 비컨 설정 누적기
    pub beacon_config: ConfigurationAccumulator,
    /// 인그레스 설정 누적기
    pub ingress_config: ConfigurationAccumulator,
    /// 마지막 프로브 결과
    pub last_request: Option<ProbeOutcome>,
}

impl ScenarioContext {
    /// 비어 있는 시나리오 상태를 생성합니다.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            istio_config: ConfigurationAccumulator::new(),
            beacon_config: ConfigurationAccumulator::new(),
            ingress_config: ConfigurationAccumulator::new(),
            last_request: None,
        }
    }

    /// 마지막 프로브 결과
    pub fn last_request(&self) -> Result<&ProbeOutcome, StepError> {
        self.last_request
            .as_ref()
            .ok_or_else(|| StepError::Assertion("no request result found".to_owned()))
    }
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_context_starts_empty() {
        let ctx = ScenarioContext::new();
        assert!(ctx.istio_config.is_empty());
        assert!(ctx.beacon_config.is_empty());
        assert!(ctx.ingress_config.is_empty());
        assert!(matches!(ctx.last_request(), Err(StepError::Assertion(_))));
    }

    #[test]
    fn each_scenario_gets_a_new_run_id() {
        assert_ne!(ScenarioContext::new().run_id, ScenarioContext::new().run_id);
    }

    #[test]
    fn missing_ingress_is_reported() {
        let ctx = ModuleContext::new(Environment::new("istio-system"), Environment::new("bookinfo"));
        assert!(matches!(ctx.require_ingress(), Err(StepError::MissingState(_))));
    }
}
