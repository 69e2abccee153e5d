//! 유닛 내부 요청과 결과 판정 스텝
//!
//! 요청 스텝은 결과를 시나리오의 마지막 프로브 결과 슬롯에 저장하고,
//! 판정 스텝은 그 슬롯을 읽습니다.

use meshcheck_probe::{ProbeLocation, ProbeRequest, verify};
use tracing::info;

use crate::error::StepError;
use crate::pattern::StepArgs;
use crate::registry::StepRegistry;
use crate::world::World;

/// 책 정보 응답에 나타나야 하는 필드 (하나 이상)
const BOOK_FIELDS: [&str; 4] = ["id", "type", "year", "ISBN"];

pub(crate) fn register(registry: &mut StepRegistry<World>) -> Result<(), StepError> {
    registry
        .when("productpage calls the details service", |w, a| {
            Box::pin(productpage_calls_details(w, a))
        })?
        .when("{app} requests {method} {path} on {service}", |w, a| {
            Box::pin(app_requests_service(w, a))
        })?
        .then("the request succeeds", |w, _| {
            Box::pin(async move { expect_last(w, Some(200), Some(0)) })
        })?
        .then("the request is rejected", |w, _| {
            Box::pin(async move { expect_last(w, None, Some(1)) })
        })?
        .then("the request is forbidden", |w, _| {
            Box::pin(async move { expect_last(w, Some(403), Some(0)) })
        })?
        .then("the request is unavailable", |w, _| {
            Box::pin(async move { expect_last(w, Some(503), Some(0)) })
        })?
        .then("details returns valid book information", |w, _| {
            Box::pin(async move { details_returns_book_info(w) })
        })?;
    Ok(())
}

/// 프로브를 실행하고 결과를 시나리오 슬롯에 저장합니다.
pub(crate) async fn send(
    world: &mut World,
    location: ProbeLocation,
    request: ProbeRequest,
) -> Result<(), StepError> {
    info!(run_id = %world.scenario.run_id, from = %location, request = %request, "sending request");
    let harness = world.harness();
    let outcome = harness
        .prober()
        .probe_with_retry(&location, &request, harness.retry())
        .await?;
    info!(stdout = outcome.stdout.as_str(), "request result");
    world.scenario.last_request = Some(outcome);
    Ok(())
}

async fn productpage_calls_details(world: &mut World, _: &StepArgs) -> Result<(), StepError> {
    let location = ProbeLocation::leader_unit(world.bookinfo(), "productpage");
    let request = world
        .harness()
        .request("GET", "http://details:9080/details/0");
    send(world, location, request).await
}

async fn app_requests_service(world: &mut World, args: &StepArgs) -> Result<(), StepError> {
    let app = args.get("app")?;
    let method = args.get("method")?;
    let path = args.get("path")?;
    let service = args.get("service")?;

    let location = ProbeLocation::leader_unit(world.bookinfo(), app);
    let request = world
        .harness()
        .request(method, format!("http://{service}{path}"));
    send(world, location, request).await
}

fn expect_last(
    world: &World,
    http_code: Option<u16>,
    exit_code: Option<i32>,
) -> Result<(), StepError> {
    verify(world.scenario.last_request()?, http_code, exit_code)?;
    Ok(())
}

fn details_returns_book_info(world: &World) -> Result<(), StepError> {
    let stdout = &world.scenario.last_request()?.stdout;
    if BOOK_FIELDS.iter().any(|field| stdout.contains(field)) {
        info!(response = stdout.as_str(), "details returned book information");
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "response missing book information: {stdout}"
        )))
    }
}
