//! 프로비저닝 도구 수명주기 관리자
//!
//! [`TfManager`]는 `init`, `apply`, `output` 세 가지 연산만 제공합니다.
//! 모든 호출은 워크스페이스의 정의 디렉토리에서 실행되는 일회성 서브프로세스이며,
//! 0이 아닌 종료 코드는 캡처된 stdout/stderr와 함께
//! [`TerraformError::ToolInvocation`]으로 정규화됩니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use meshcheck_core::config::TerraformConfig;
use meshcheck_core::metrics as m;
use meshcheck_core::process::{CommandOutput, CommandRunner, CommandSpec};
use tracing::{debug, error, info};

use crate::discovery::resolve_binary;
use crate::error::{TerraformError, ToolPhase};
use crate::vars::TfVars;
use crate::workspace::ProvisioningWorkspace;

/// 외부 프로비저닝 도구 래퍼
#[derive(Clone)]
pub struct TfManager {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    timeout: Option<Duration>,
}

impl TfManager {
    /// 지정한 바이너리를 사용하는 관리자를 생성합니다.
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            timeout: None,
        }
    }

    /// 설정에서 바이너리를 결정하여 관리자를 생성합니다.
    ///
    /// # Errors
    ///
    /// 바이너리가 설정되지 않았고 PATH에서도 찾지 못하면
    /// [`TerraformError::BinaryNotFound`]를 반환합니다.
    pub fn from_config(
        runner: Arc<dyn CommandRunner>,
        config: &TerraformConfig,
    ) -> Result<Self, TerraformError> {
        let binary = resolve_binary(&config.binary)?;
        Ok(Self::new(runner, binary))
    }

    /// 호출마다 적용할 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 사용 중인 도구 바이너리
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// 워크스페이스를 초기화합니다 (프로바이더, 모듈 설치).
    ///
    /// 여러 번 호출해도 안전합니다.
    pub async fn init(&self, ws: &ProvisioningWorkspace) -> Result<(), TerraformError> {
        self.invoke(ToolPhase::Init, ws, vec!["init".to_owned()], None)
            .await
            .map(drop)
    }

    /// 정의를 적용합니다.
    ///
    /// 입력은 `vars`의 `TF_VAR_*` 환경변수로만 전달되며, 워크스페이스에 격리된
    /// 상태 파일이 있으면 `-state=<path>`로 지정합니다.
    ///
    /// # Errors
    ///
    /// 0이 아닌 종료 코드는 [`TerraformError::ToolInvocation`]이며
    /// 부분 성공으로 해석하지 않습니다.
    pub async fn apply(
        &self,
        ws: &ProvisioningWorkspace,
        vars: &TfVars,
    ) -> Result<(), TerraformError> {
        let mut args = vec!["apply".to_owned(), "-auto-approve".to_owned()];
        args.extend(ws.state_arg());
        self.invoke(ToolPhase::Apply, ws, args, Some(vars))
            .await
            .map(drop)
    }

    /// 이름이 지정된 출력 값을 읽어 앞뒤 공백을 제거해 반환합니다.
    ///
    /// # Errors
    ///
    /// 출력이 없거나 도구가 실패하면 [`TerraformError::ToolInvocation`]을 반환합니다.
    pub async fn output(
        &self,
        ws: &ProvisioningWorkspace,
        name: &str,
    ) -> Result<String, TerraformError> {
        let mut args = vec!["output".to_owned()];
        args.extend(ws.state_arg());
        args.push("-raw".to_owned());
        args.push(name.to_owned());

        let out = self.invoke(ToolPhase::Output, ws, args, None).await?;
        let value = out.stdout.trim().to_owned();
        debug!(kind = %ws.kind(), output = name, value = value.as_str(), "read tool output");
        Ok(value)
    }

    async fn invoke(
        &self,
        phase: ToolPhase,
        ws: &ProvisioningWorkspace,
        args: Vec<String>,
        vars: Option<&TfVars>,
    ) -> Result<CommandOutput, TerraformError> {
        let mut spec = CommandSpec::new(&self.binary)
            .args(args)
            .current_dir(ws.dir());
        if let Some(vars) = vars {
            for (key, value) in vars.to_env() {
                spec = spec.env(key, value);
            }
        }
        if let Some(timeout) = self.timeout {
            spec = spec.timeout(timeout);
        }

        info!(
            kind = %ws.kind(),
            phase = %phase,
            dir = %ws.dir().display(),
            "running provisioning tool"
        );

        let started = Instant::now();
        let result = self.runner.run(spec).await;
        metrics::histogram!(m::TOOL_INVOCATION_DURATION_SECONDS, m::LABEL_PHASE => phase.as_str())
            .record(started.elapsed().as_secs_f64());

        let out = match result {
            Ok(out) => out,
            Err(source) => {
                error!(kind = %ws.kind(), phase = %phase, error = %source, "provisioning tool could not run");
                record(phase, "error");
                return Err(TerraformError::Process { phase, source });
            }
        };

        if !out.success() {
            error!(
                kind = %ws.kind(),
                phase = %phase,
                exit_code = out.exit_code,
                stdout = out.stdout.as_str(),
                stderr = out.stderr.as_str(),
                "provisioning tool failed"
            );
            record(phase, "failure");
            return Err(TerraformError::ToolInvocation {
                phase,
                exit_code: out.exit_code,
                stdout: out.stdout,
                stderr: out.stderr,
            });
        }

        record(phase, "success");
        Ok(out)
    }
}

fn record(phase: ToolPhase, result: &'static str) {
    metrics::counter!(
        m::TOOL_INVOCATIONS_TOTAL,
        m::LABEL_PHASE => phase.as_str(),
        m::LABEL_RESULT => result
    )
    .increment(1);
}

impl std::fmt::Debug for TfManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfManager")
            .field("binary", &self.binary)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
