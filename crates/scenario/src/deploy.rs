//! 리소스 종류별 배포 절차
//!
//! 모든 배포는 같은 순서를 따릅니다.
//!
//! ```text
//! init ──► apply (TF_VAR_model, TF_VAR_channel, TF_VAR_config?) ──► output* ──► settle
//! ```
//!
//! 워크스페이스 정의 파일은 읽기 전용이며, 입력은 환경변수로만 전달합니다.

use std::time::Duration;

use meshcheck_core::types::{ComponentRegistration, ConfigurationAccumulator, Environment};
use meshcheck_terraform::{ResourceKind, TfVars};
use serde::Serialize;
use tracing::info;

use crate::error::StepError;
use crate::harness::Harness;

/// 관계 생성 후 1단계 수렴 타임아웃
pub const RELATION_SETTLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Serialize)]
struct UnitCount {
    units: u32,
}

impl Harness {
    fn base_vars(&self, env: &Environment, channel: &str) -> TfVars {
        TfVars::new()
            .set("model", env.name())
            .set("channel", channel)
    }

    fn with_config(vars: TfVars, config: Option<&ConfigurationAccumulator>) -> TfVars {
        vars.set_opt(
            "config",
            config.filter(|c| !c.is_empty()).map(ConfigurationAccumulator::to_json),
        )
    }

    fn with_beacon(vars: TfVars, beacon: Option<&ComponentRegistration>) -> TfVars {
        match beacon {
            Some(beacon) => vars
                .set("beacon_app_name", &beacon.app_name)
                .set_opt("beacon_service_mesh_endpoint", beacon.endpoint.as_deref()),
            None => vars,
        }
    }

    /// 제어 평면을 배포하고 수렴을 기다립니다.
    pub async fn deploy_istio(
        &self,
        env: &Environment,
        config: Option<&ConfigurationAccumulator>,
    ) -> Result<(), StepError> {
        let channel = &self.config().deploy.istio_channel;
        info!(model = env.name(), channel = channel.as_str(), config = ?config.map(ConfigurationAccumulator::options), "deploying istio-k8s");

        let ws = self.workspace(ResourceKind::Istio, env);
        self.tf().init(&ws).await?;
        let vars = Self::with_config(self.base_vars(env, channel), config);
        self.tf().apply(&ws, &vars).await?;

        self.poller().settle(&[env]).await?;
        Ok(())
    }

    /// 비컨을 배포하고 등록 정보(앱 이름, 서비스 메시 엔드포인트)를 반환합니다.
    pub async fn deploy_istio_beacon(
        &self,
        env: &Environment,
        config: Option<&ConfigurationAccumulator>,
    ) -> Result<ComponentRegistration, StepError> {
        let channel = &self.config().deploy.istio_channel;
        info!(model = env.name(), channel = channel.as_str(), config = ?config.map(ConfigurationAccumulator::options), "deploying istio-beacon-k8s");

        let ws = self.workspace(ResourceKind::IstioBeacon, env);
        self.tf().init(&ws).await?;
        let vars = Self::with_config(self.base_vars(env, channel), config);
        self.tf().apply(&ws, &vars).await?;

        let app_name = self.tf().output(&ws, "app_name").await?;
        let endpoint = self.tf().output(&ws, "service_mesh_endpoint").await?;
        let beacon = ComponentRegistration::with_endpoint(app_name, endpoint);
        info!(model = env.name(), beacon = %beacon, "istio-beacon-k8s deployed");

        self.poller().settle(&[env]).await?;
        Ok(beacon)
    }

    /// 인그레스 게이트웨이를 배포하고 등록 정보(앱 이름)를 반환합니다.
    pub async fn deploy_istio_ingress(
        &self,
        env: &Environment,
        config: Option<&ConfigurationAccumulator>,
    ) -> Result<ComponentRegistration, StepError> {
        let channel = &self.config().deploy.istio_channel;
        info!(model = env.name(), channel = channel.as_str(), config = ?config.map(ConfigurationAccumulator::options), "deploying istio-ingress-k8s");

        let ws = self.workspace(ResourceKind::IstioIngress, env);
        self.tf().init(&ws).await?;
        let vars = Self::with_config(self.base_vars(env, channel), config);
        self.tf().apply(&ws, &vars).await?;

        let ingress = ComponentRegistration::new(self.tf().output(&ws, "app_name").await?);
        info!(model = env.name(), ingress = %ingress, "istio-ingress-k8s deployed");

        self.poller().settle(&[env]).await?;
        Ok(ingress)
    }

    /// 샘플 애플리케이션을 배포합니다. 비컨이 있으면 메시에 연결합니다.
    pub async fn deploy_bookinfo(
        &self,
        env: &Environment,
        beacon: Option<&ComponentRegistration>,
    ) -> Result<(), StepError> {
        let channel = &self.config().deploy.bookinfo_channel;
        info!(
            model = env.name(),
            beacon = ?beacon.map(|b| b.app_name.as_str()),
            endpoint = ?beacon.and_then(|b| b.endpoint.as_deref()),
            "deploying bookinfo"
        );

        let ws = self.workspace(ResourceKind::Bookinfo, env);
        self.tf().init(&ws).await?;
        let vars = Self::with_beacon(self.base_vars(env, channel), beacon);
        self.tf().apply(&ws, &vars).await?;

        self.poller().settle(&[env]).await?;
        Ok(())
    }

    /// 샘플 애플리케이션 하나의 유닛 수를 바꿉니다.
    ///
    /// 이미 초기화된 워크스페이스에 다시 apply만 수행하며 수렴은 기다리지 않습니다.
    pub async fn scale_application(
        &self,
        env: &Environment,
        app: &str,
        units: u32,
        beacon: Option<&ComponentRegistration>,
    ) -> Result<(), StepError> {
        info!(model = env.name(), app, units, "scaling application");

        let ws = self.workspace(ResourceKind::Bookinfo, env);
        let vars = self
            .base_vars(env, &self.config().deploy.bookinfo_channel)
            .set_json(app, &UnitCount { units })
            .map_err(|e| StepError::InvalidArgument {
                name: "units".to_owned(),
                value: units.to_string(),
                reason: e.to_string(),
            })?;
        let vars = Self::with_beacon(vars, beacon);
        self.tf().apply(&ws, &vars).await?;
        Ok(())
    }

    /// 두 엔드포인트를 연결하고 수렴을 기다립니다.
    pub async fn relate(
        &self,
        env: &Environment,
        endpoint_a: &str,
        endpoint_b: &str,
    ) -> Result<(), StepError> {
        self.juju().relate(env, endpoint_a, endpoint_b).await?;
        self.poller()
            .settle_with_bulk_timeout(&[env], RELATION_SETTLE_TIMEOUT)
            .await?;
        Ok(())
    }
}
