//! # meshcheck-scenario
//!
//! 선언형 스텝 문장을 핸들러에 대응시키고, 사전 파싱된 기능 문서를 실행합니다.
//!
//! # 모듈 구성
//!
//! - [`feature`]: 기능 문서 모델 (`Feature`, `Scenario`, `Step`)
//! - [`tags`]: `xfail:<사유>` 태그 해석
//! - [`pattern`]: `{name}` 자리표시자 패턴 컴파일
//! - [`registry`]: 구체성 우선 해석을 하는 스텝 레지스트리
//! - [`context`]: 모듈 범위, 시나리오 범위 상태
//! - [`harness`]: 외부 도구 묶음
//! - [`deploy`]: 리소스 종류별 배포 절차
//! - [`world`]: 핸들러가 받는 실행 상태
//! - [`steps`]: 스텝 정의
//! - [`runner`]: 기능 문서 실행과 결과 보고
//!
//! # 실행 흐름
//!
//! ```text
//! Feature ──► FeatureRunner ──► World(ModuleContext) ──┬─► Scenario 1 (ScenarioContext)
//!                   │                                  └─► Scenario 2 (ScenarioContext)
//!            StepRegistry::resolve ──► handler(&mut World, &StepArgs)
//! ```

pub mod context;
pub mod deploy;
pub mod error;
pub mod feature;
pub mod harness;
pub mod pattern;
pub mod registry;
pub mod runner;
pub mod steps;
pub mod tags;
pub mod world;

pub use context::{ModuleContext, ScenarioContext};
pub use error::StepError;
pub use feature::{Feature, Scenario, Step, StepKeyword};
pub use harness::Harness;
pub use pattern::{StepArgs, StepPattern};
pub use registry::{StepHandler, StepRegistry};
pub use runner::{FeatureReport, FeatureRunner, ScenarioOutcome, ScenarioReport};
pub use world::World;
