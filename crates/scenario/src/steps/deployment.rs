//! 환경 준비, 배포, 설정, 스케일링 스텝

use tracing::info;

use super::{BEACON_CHARM, INGRESS_CHARM, ISTIO_CHARM};
use crate::error::StepError;
use crate::pattern::StepArgs;
use crate::registry::StepRegistry;
use crate::world::World;

const MESH_ENABLED: &str = "with istio-beacon-k8s integration";

pub(crate) fn register(registry: &mut StepRegistry<World>) -> Result<(), StepError> {
    registry
        .given("a juju model with istio-k8s deployed", |w, a| {
            Box::pin(istio_system_deployed(w, a))
        })?
        .given("a juju model for bookinfo services", |w, a| {
            Box::pin(bookinfo_model(w, a))
        })?
        .given(
            "the bookinfo services are deployed with istio-beacon-k8s integration",
            |w, a| Box::pin(bookinfo_deployed_with_beacon(w, a)),
        )?
        .given("the bookinfo services are deployed {mesh_enabled}", |w, a| {
            Box::pin(bookinfo_deployed(w, a))
        })?
        .given("{charm} has {config} set to {value}", |w, a| {
            Box::pin(charm_has_config_set(w, a))
        })?
        .when("you deploy the bookinfo services {mesh_enabled}", |w, a| {
            Box::pin(bookinfo_deployed(w, a))
        })?
        .when("you scale {app_name} to {units} unit", |w, a| {
            Box::pin(scale_app(w, a))
        })?
        .when("you scale {app_name} to {units} units", |w, a| {
            Box::pin(scale_app(w, a))
        })?
        .then("all charms are active", |w, a| Box::pin(all_charms_active(w, a)))?;
    Ok(())
}

fn mesh_enabled(text: &str) -> bool {
    text.to_lowercase() == MESH_ENABLED
}

async fn istio_system_deployed(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    info!(model = world.module.istio_system.name(), "istio-system model ready");
    world
        .harness()
        .deploy_istio(&world.module.istio_system, None)
        .await
}

async fn bookinfo_model(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    info!(model = world.bookinfo().name(), "bookinfo model ready");
    Ok(())
}

/// 시나리오에서 누적한 비컨 설정으로 비컨을 배포한 뒤 샘플 애플리케이션을 연결합니다.
async fn bookinfo_deployed_with_beacon(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    let config = &world.scenario.beacon_config;
    info!(config = ?config.options(), "deploying istio-beacon and bookinfo services");

    let beacon = world
        .harness()
        .deploy_istio_beacon(world.bookinfo(), Some(config))
        .await?;
    world
        .harness()
        .deploy_bookinfo(world.bookinfo(), Some(&beacon))
        .await?;
    world.module.beacon = Some(beacon);

    world.harness().poller().settle(&[world.bookinfo()]).await?;
    Ok(())
}

async fn bookinfo_deployed(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let enabled = mesh_enabled(args.get("mesh_enabled")?);
    info!(service_mesh = enabled, "deploying bookinfo services");

    if enabled {
        let beacon = world
            .harness()
            .deploy_istio_beacon(world.bookinfo(), None)
            .await?;
        world
            .harness()
            .deploy_bookinfo(world.bookinfo(), Some(&beacon))
            .await?;
        world.module.beacon = Some(beacon);
    } else {
        world.harness().deploy_bookinfo(world.bookinfo(), None).await?;
    }
    Ok(())
}

/// 옵션을 시나리오 누적기에 더한 뒤 누적된 전체 설정으로 컴포넌트를 다시 배포합니다.
async fn charm_has_config_set(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let charm = args.get("charm")?;
    let option = args.get("config")?;
    let value = args.get("value")?;
    info!(charm, option, value, "setting charm config");

    match charm {
        ISTIO_CHARM => {
            world.scenario.istio_config.set(option, value);
            world
                .harness()
                .deploy_istio(&world.module.istio_system, Some(&world.scenario.istio_config))
                .await
        }
        BEACON_CHARM => {
            world.scenario.beacon_config.set(option, value);
            let beacon = world
                .harness()
                .deploy_istio_beacon(world.bookinfo(), Some(&world.scenario.beacon_config))
                .await?;
            world.module.beacon = Some(beacon);
            Ok(())
        }
        INGRESS_CHARM => {
            world.scenario.ingress_config.set(option, value);
            let ingress = world
                .harness()
                .deploy_istio_ingress(world.bookinfo(), Some(&world.scenario.ingress_config))
                .await?;
            world.module.ingress = Some(ingress);
            Ok(())
        }
        other => Err(StepError::InvalidArgument {
            name: "charm".to_owned(),
            value: other.to_owned(),
            reason: format!("expected one of {ISTIO_CHARM}, {BEACON_CHARM}, {INGRESS_CHARM}"),
        }),
    }
}

async fn scale_app(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let app = args.get("app_name")?;
    let units: u32 = args.parse("units")?;

    world
        .harness()
        .scale_application(world.bookinfo(), app, units, world.module.beacon.as_ref())
        .await?;
    world.harness().poller().settle(&[world.bookinfo()]).await?;
    Ok(())
}

async fn all_charms_active(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    world.harness().poller().settle(&[world.bookinfo()]).await?;
    Ok(())
}
