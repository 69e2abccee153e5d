//! 스텝 핸들러가 받는 실행 상태

use std::sync::Arc;

use meshcheck_core::types::Environment;
use uuid::Uuid;

use crate::context::{ModuleContext, ScenarioContext};
use crate::harness::Harness;

/// 스텝 핸들러에 전달되는 실행 상태
///
/// 기능 문서 하나 동안 같은 인스턴스가 유지되며, 시나리오가 시작될 때마다
/// [`begin_scenario`](Self::begin_scenario)로 시나리오 범위 상태만 새로 만듭니다.
#[derive(Debug)]
pub struct World {
    harness: Arc<Harness>,
    /// 모듈 범위 상태
    pub module: ModuleContext,
    /// 시나리오 범위 상태
    pub scenario: ScenarioContext,
}

impl World {
    /// 새 실행 상태를 생성합니다.
    pub fn new(harness: Arc<Harness>, module: ModuleContext) -> Self {
        Self {
            harness,
            module,
            scenario: ScenarioContext::new(),
        }
    }

    /// 외부 도구 묶음
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// 샘플 애플리케이션 환경
    pub fn bookinfo(&self) -> &Environment {
        &self.module.bookinfo
    }

    /// 시나리오 범위 상태를 초기화하고 새 실행 식별자를 반환합니다.
    pub fn begin_scenario(&mut self) -> Uuid {
        self.scenario = ScenarioContext::new();
        self.scenario.run_id
    }
}
