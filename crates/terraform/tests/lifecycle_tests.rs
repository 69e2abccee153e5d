//! 프로비저닝 수명주기 통합 테스트
//!
//! 실제 셸 스크립트를 도구 바이너리로 사용해 `ProcessRunner` 경로 전체를 검증합니다.

#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;

use meshcheck_core::process::{MockRunner, ProcessRunner};
use meshcheck_core::types::Environment;
use meshcheck_terraform::{
    ProvisioningWorkspace, ResourceKind, TerraformError, TfManager, TfVars, ToolPhase,
};

/// 호출 인자와 TF_VAR 환경변수를 기록하고, apply 시 상태 파일을 쓰는 가짜 도구
const FAKE_TOOL: &str = r#"#!/bin/sh
echo "$@" >> calls.log
case "$1" in
  init) exit 0 ;;
  apply)
    for arg in "$@"; do
      case "$arg" in
        -state=*) echo "{\"model\":\"$TF_VAR_model\"}" > "${arg#-state=}" ;;
      esac
    done
    exit 0 ;;
  output)
    for last in "$@"; do :; done
    if [ "$last" = "app_name" ]; then echo "  istio-beacon-k8s  "; exit 0; fi
    echo "Error: Output \"$last\" not found" >&2
    exit 1 ;;
esac
exit 2
"#;

fn install_fake_tool(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-terraform");
    std::fs::write(&path, FAKE_TOOL).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn full_lifecycle_against_isolated_state() {
    let root = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();
    let bin_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("istio-beacon")).unwrap();
    let binary = install_fake_tool(bin_dir.path());

    let env = Environment::new("istio-system-1a2b");
    let ws = ProvisioningWorkspace::for_environment(
        root.path(),
        state.path(),
        ResourceKind::IstioBeacon,
        &env,
    );
    let tf = TfManager::new(Arc::new(ProcessRunner::new()), binary);

    tf.init(&ws).await.unwrap();
    let vars = TfVars::new().set("model", env.name());
    tf.apply(&ws, &vars).await.unwrap();
    let app = tf.output(&ws, "app_name").await.unwrap();

    assert_eq!(app, "istio-beacon-k8s");
    let state_file = state.path().join("istio-beacon-istio-system-1a2b.tfstate");
    let recorded = std::fs::read_to_string(&state_file).unwrap();
    assert!(recorded.contains("istio-system-1a2b"));

    let log = std::fs::read_to_string(root.path().join("istio-beacon/calls.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "init");
    assert!(lines[1].starts_with("apply -auto-approve -state="));
}

#[tokio::test]
async fn missing_output_surfaces_stderr() {
    let root = tempfile::tempdir().unwrap();
    let bin_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("istio-ingress")).unwrap();
    let binary = install_fake_tool(bin_dir.path());

    let ws = ProvisioningWorkspace::for_environment(
        root.path(),
        root.path(),
        ResourceKind::IstioIngress,
        &Environment::new("m"),
    );
    let tf = TfManager::new(Arc::new(ProcessRunner::new()), binary);

    let err = tf.output(&ws, "service_mesh_endpoint").await.unwrap_err();
    match err {
        TerraformError::ToolInvocation {
            phase,
            exit_code,
            stderr,
            ..
        } => {
            assert_eq!(phase, ToolPhase::Output);
            assert_eq!(exit_code, 1);
            assert!(stderr.contains("service_mesh_endpoint"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn repeated_apply_with_identical_vars_issues_identical_commands() {
    let runner = Arc::new(MockRunner::new());
    let tf = TfManager::new(runner.clone(), "terraform");
    let ws = ProvisioningWorkspace::for_environment(
        "terraform",
        "/tmp",
        ResourceKind::Bookinfo,
        &Environment::new("bookinfo-x"),
    );
    let vars = TfVars::new()
        .set("model", "bookinfo-x")
        .set("channel", "latest/stable");

    tf.apply(&ws, &vars).await.unwrap();
    tf.apply(&ws, &vars).await.unwrap();

    let calls = runner.calls_matching("terraform apply");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn environments_never_share_a_state_record() {
    let runner = Arc::new(MockRunner::new());
    let tf = TfManager::new(runner.clone(), "terraform");

    for model in ["bookinfo-a", "bookinfo-b"] {
        let ws = ProvisioningWorkspace::for_environment(
            "terraform",
            "/tmp",
            ResourceKind::Bookinfo,
            &Environment::new(model),
        );
        tf.apply(&ws, &TfVars::new().set("model", model)).await.unwrap();
    }

    let calls = runner.calls();
    assert_eq!(calls[0].cwd, calls[1].cwd);
    assert_ne!(calls[0].args, calls[1].args);
}
