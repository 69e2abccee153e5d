//! Feature document builders.

use meshcheck_scenario::{Feature, Scenario, Step, StepKeyword};

#[allow(dead_code)]
pub fn given(text: &str) -> Step {
    Step::new(StepKeyword::Given, text)
}

#[allow(dead_code)]
pub fn when(text: &str) -> Step {
    Step::new(StepKeyword::When, text)
}

#[allow(dead_code)]
pub fn then(text: &str) -> Step {
    Step::new(StepKeyword::Then, text)
}

#[allow(dead_code)]
pub fn scenario(name: &str, steps: Vec<Step>) -> Scenario {
    Scenario {
        name: name.to_owned(),
        tags: Vec::new(),
        steps,
    }
}

#[allow(dead_code)]
pub fn tagged(mut scenario: Scenario, tag: &str) -> Scenario {
    scenario.tags.push(tag.to_owned());
    scenario
}

#[allow(dead_code)]
pub fn feature(name: &str, scenarios: Vec<Scenario>) -> Feature {
    Feature {
        name: name.to_owned(),
        tags: Vec::new(),
        scenarios,
    }
}

/// Background steps shared by the mesh scenarios.
#[allow(dead_code)]
pub fn mesh_background() -> Vec<Step> {
    vec![
        given("a juju model with istio-k8s deployed"),
        given("a juju model for bookinfo services"),
        given("the bookinfo services are deployed with istio-beacon-k8s integration"),
    ]
}
