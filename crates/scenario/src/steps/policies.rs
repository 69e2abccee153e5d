//! 비컨 권한 정책 관리 모드 스텝

use meshcheck_cluster::list_authorization_policies;
use meshcheck_core::types::ConfigurationAccumulator;
use tracing::info;

use crate::error::StepError;
use crate::pattern::StepArgs;
use crate::registry::StepRegistry;
use crate::world::World;

const MANAGE_POLICIES_OPTION: &str = "manage-authorization-policies";

pub(crate) fn register(registry: &mut StepRegistry<World>) -> Result<(), StepError> {
    registry
        .given(
            "istio-beacon-k8s has manage-authorization-policies set to {value}",
            |w, a| Box::pin(configure_managed_mode(w, a)),
        )?
        .then("istio-beacon-k8s has created authorization policies", |w, _| {
            Box::pin(policies_created(w))
        })?
        .then(
            "istio-beacon-k8s has not created authorization policies",
            |w, _| Box::pin(policies_not_created(w)),
        )?;
    Ok(())
}

/// 관리 모드만 지정한 새 설정으로 비컨을 다시 배포하고 샘플 애플리케이션을 다시 연결합니다.
///
/// 시나리오의 비컨 설정 누적기는 사용하지도 변경하지도 않습니다.
async fn configure_managed_mode(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let value = args.get("value")?;
    info!(value, "redeploying beacon with manage-authorization-policies");

    let config: ConfigurationAccumulator = [(MANAGE_POLICIES_OPTION, value)].into_iter().collect();
    let beacon = world
        .harness()
        .deploy_istio_beacon(world.bookinfo(), Some(&config))
        .await?;
    world
        .harness()
        .deploy_bookinfo(world.bookinfo(), Some(&beacon))
        .await?;
    world.module.beacon = Some(beacon);

    world.harness().poller().settle(&[world.bookinfo()]).await?;
    Ok(())
}

async fn policies_created(world: &mut World) -> Result<(), StepError> {
    let policies = list_authorization_policies(world.harness().query(), world.bookinfo()).await;
    if policies.is_empty() {
        return Err(StepError::Assertion(
            "expected istio-beacon to create authorization policies, but found none".to_owned(),
        ));
    }
    info!(?policies, "istio-beacon created authorization policies");
    Ok(())
}

async fn policies_not_created(world: &mut World) -> Result<(), StepError> {
    let policies = list_authorization_policies(world.harness().query(), world.bookinfo()).await;
    if !policies.is_empty() {
        return Err(StepError::Assertion(format!(
            "expected istio-beacon not to create authorization policies, but found: {policies:?}"
        )));
    }
    info!("istio-beacon has not created authorization policies");
    Ok(())
}
