//! 스텝 정의
//!
//! 모든 스텝은 [`registry`]에서 명시적으로 등록됩니다. 겹치는 패턴은
//! 레지스트리의 구체성 규칙으로 해석되므로 등록 순서에 의존하지 않습니다.
//!
//! - [`deployment`]: 환경 준비, 컴포넌트 배포와 설정, 스케일링
//! - [`requests`]: 유닛 내부 프로브와 결과 판정
//! - [`policies`]: 비컨의 권한 정책 관리 모드
//! - [`ingress`]: 인그레스 게이트웨이와 외부 요청

pub mod deployment;
pub mod ingress;
pub mod policies;
pub mod requests;

use crate::error::StepError;
use crate::registry::StepRegistry;
use crate::world::World;

/// 제어 평면 컴포넌트 이름
pub const ISTIO_CHARM: &str = "istio-k8s";
/// 비컨 컴포넌트 이름
pub const BEACON_CHARM: &str = "istio-beacon-k8s";
/// 인그레스 컴포넌트 이름
pub const INGRESS_CHARM: &str = "istio-ingress-k8s";

/// 모든 스텝이 등록된 레지스트리를 만듭니다.
pub fn registry() -> Result<StepRegistry<World>, StepError> {
    let mut registry = StepRegistry::new();
    deployment::register(&mut registry)?;
    requests::register(&mut registry)?;
    policies::register(&mut registry)?;
    ingress::register(&mut registry)?;
    Ok(registry)
}
