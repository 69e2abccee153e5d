//! 인그레스 게이트웨이 스텝

use meshcheck_probe::ProbeLocation;
use tracing::info;

use super::requests::send;
use crate::deploy::RELATION_SETTLE_TIMEOUT;
use crate::error::StepError;
use crate::pattern::StepArgs;
use crate::registry::StepRegistry;
use crate::world::World;

pub(crate) fn register(registry: &mut StepRegistry<World>) -> Result<(), StepError> {
    registry
        .given("istio-ingress-k8s is deployed", |w, a| {
            Box::pin(ingress_deployed(w, a))
        })?
        .given("productpage is exposed via ingress", |w, a| {
            Box::pin(productpage_exposed(w, a))
        })?
        .when(
            "external client requests {method} {path} on the ingress gateway",
            |w, a| Box::pin(external_client_requests(w, a)),
        )?;
    Ok(())
}

async fn ingress_deployed(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    info!(model = world.bookinfo().name(), "deploying istio-ingress-k8s");
    let ingress = world
        .harness()
        .deploy_istio_ingress(world.bookinfo(), None)
        .await?;
    world.module.ingress = Some(ingress);
    Ok(())
}

async fn productpage_exposed(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    let ingress_endpoint = format!("{}:ingress", world.module.require_ingress()?.app_name);
    info!(
        ingress = ingress_endpoint.as_str(),
        settle_timeout_secs = RELATION_SETTLE_TIMEOUT.as_secs(),
        "relating productpage to ingress"
    );
    world
        .harness()
        .relate(world.bookinfo(), "productpage:ingress", &ingress_endpoint)
        .await
}

/// 게이트웨이 주소를 조회해 테스트 호스트에서 직접 요청합니다.
///
/// URL: `http://<gateway>/<model>-productpage<path>`
async fn external_client_requests(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let method = args.get("method")?;
    let path = args.get("path")?;
    let model = world.bookinfo().name().to_owned();

    let gateway = world.harness().query().gateway_address(&model).await?;
    let url = format!("http://{gateway}/{model}-productpage{path}");
    let request = world.harness().request(method, url);
    send(world, ProbeLocation::External, request).await
}
