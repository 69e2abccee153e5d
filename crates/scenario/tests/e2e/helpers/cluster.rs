//! Mock cluster wiring.
//!
//! [`MockCluster`] scripts the external tools the way a healthy cluster answers:
//! every model is active and idle, provisioning succeeds, and component outputs
//! resolve to the usual charm names.

use std::sync::Arc;

use meshcheck_core::config::MeshcheckConfig;
use meshcheck_core::process::{CommandSpec, MockRunner};
use meshcheck_core::types::Environment;
use meshcheck_scenario::{FeatureRunner, Harness, ModuleContext};

pub const ISTIO_SYSTEM: &str = "istio-system-e2e";
pub const BOOKINFO: &str = "bookinfo-e2e";
pub const STATE_DIR: &str = "/tmp/meshcheck-e2e/state";

/// `juju status --format json` for a model whose units are all active and idle.
pub const ACTIVE_IDLE: &str = r#"{"applications": {
    "productpage": {
        "application-status": {"current": "active"},
        "units": {"productpage/0": {
            "workload-status": {"current": "active"},
            "juju-status": {"current": "idle"}
        }}
    },
    "details": {
        "application-status": {"current": "active"},
        "units": {"details/0": {
            "workload-status": {"current": "active"},
            "juju-status": {"current": "idle"}
        }}
    }
}}"#;

/// Response body of the details service as printed by the probe command.
pub const DETAILS_BODY: &str =
    r#"{"id":0,"author":"William Shakespeare","year":1595,"type":"paperback","ISBN-10":"1234567890"}"#;

/// Probe stdout carrying the given HTTP status marker.
pub fn probe_stdout(body: &str, http_code: u16) -> String {
    format!("{body}\nHTTP_CODE:{http_code}")
}

/// Mock runner plus the harness built on top of it.
#[allow(dead_code)]
pub struct MockCluster {
    pub runner: Arc<MockRunner>,
    pub harness: Arc<Harness>,
}

#[allow(dead_code)]
impl MockCluster {
    /// Healthy cluster with default convergence and probe settings.
    pub fn healthy() -> Self {
        Self::with_config(test_config())
    }

    /// Healthy cluster with a caller-provided configuration.
    pub fn with_config(config: MeshcheckConfig) -> Self {
        let runner = Arc::new(MockRunner::new());
        runner.on_ok("juju status", ACTIVE_IDLE);
        runner.on_ok(
            &format!("terraform output -state={STATE_DIR}/istio-beacon-{BOOKINFO}.tfstate app_name"),
            "istio-beacon-k8s\n",
        );
        runner.on_ok(
            &format!(
                "terraform output -state={STATE_DIR}/istio-beacon-{BOOKINFO}.tfstate service_mesh_endpoint"
            ),
            "service-mesh\n",
        );
        runner.on_ok(
            &format!("terraform output -state={STATE_DIR}/istio-ingress-{BOOKINFO}.tfstate app_name"),
            "istio-ingress-k8s\n",
        );

        let harness = Harness::from_config(runner.clone(), config)
            .unwrap_or_else(|e| panic!("harness: {e}"));
        Self {
            runner,
            harness: Arc::new(harness),
        }
    }

    /// Runner with the full step vocabulary.
    pub fn feature_runner(&self) -> FeatureRunner {
        FeatureRunner::new(self.harness.clone()).unwrap_or_else(|e| panic!("registry: {e}"))
    }

    /// `terraform apply` invocations against the given state file prefix (`<kind>-<env>`).
    pub fn applies_for(&self, state: &str) -> Vec<CommandSpec> {
        self.runner
            .calls_matching(&format!("terraform apply -state={STATE_DIR}/{state}.tfstate"))
    }

    /// Probe commands that targeted the given URL.
    pub fn probes_to(&self, url: &str) -> Vec<CommandSpec> {
        self.runner.calls_matching(&format!("curl {url}"))
    }
}

/// Module context for the two e2e models.
pub fn module() -> ModuleContext {
    ModuleContext::new(Environment::new(ISTIO_SYSTEM), Environment::new(BOOKINFO))
}

fn test_config() -> MeshcheckConfig {
    let mut config = MeshcheckConfig::default();
    config.terraform.binary = "terraform".to_owned();
    config.terraform.root_dir = "/repo/terraform".to_owned();
    config.terraform.state_dir = STATE_DIR.to_owned();
    config
}
