//! External process abstraction for testability.
//!
//! Every external binary this harness drives (terraform/tofu, juju, kubectl,
//! curl) is invoked through the [`CommandRunner`] trait. Production code uses
//! [`ProcessRunner`]; tests use `MockRunner`, which returns scripted outputs
//! and records every call.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐ ┌─────────┐ ┌────────┐
//! │ TfManager │ │ Poller  │ │ Prober │
//! └─────┬─────┘ └────┬────┘ └───┬────┘
//!       └────────────┼──────────┘
//!                    ▼
//!            ┌──────────────┐
//!            │CommandRunner │ (trait)
//!            └──────────────┘
//!               │        │
//!               ▼        ▼
//!         ┌─────────┐ ┌──────┐
//!         │ Process │ │ Mock │
//!         └────┬────┘ └──────┘
//!              ▼
//!        one-shot subprocess
//! ```
//!
//! The runner never interprets the exit code: a non-zero exit is returned as a
//! normal [`CommandOutput`]. Callers decide whether that is fatal (tool
//! invocations) or an expected outcome (probes).

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tracing::debug;

use crate::types::ProbeOutcome;

/// `dyn` 호환 trait 메서드에서 사용하는 boxed future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A one-shot subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments, passed verbatim (no shell).
    pub args: Vec<String>,
    /// Working directory, if any.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables, layered on top of the inherited environment.
    pub envs: Vec<(String, String)>,
    /// Hard timeout; the child is killed when it elapses.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Starts a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            timeout: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the value of an extra environment variable, if set.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argv: Vec<&str> = self.argv().collect();
        f.write_str(&argv.join(" "))
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<CommandOutput> for ProbeOutcome {
    fn from(output: CommandOutput) -> Self {
        ProbeOutcome::new(output.stdout, output.stderr, output.exit_code)
    }
}

/// 프로세스 실행 에러
///
/// 종료 코드가 0이 아닌 경우는 에러가 아닙니다.
/// 프로세스를 시작하지 못했거나 타임아웃이 발생한 경우만 표현합니다.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// 프로세스 시작 실패 (바이너리 없음, 권한 없음 등)
    #[error("failed to spawn '{program}': {reason}")]
    Spawn {
        /// 실행하려던 프로그램
        program: String,
        /// 실패 사유
        reason: String,
    },

    /// 타임아웃 초과로 프로세스를 종료함
    #[error("'{program}' timed out after {timeout_secs}s")]
    TimedOut {
        /// 실행한 프로그램
        program: String,
        /// 적용된 타임아웃 (초)
        timeout_secs: u64,
    },
}

/// Trait abstracting subprocess execution.
///
/// Returns a [`BoxFuture`] so the runner can be shared as
/// `Arc<dyn CommandRunner>` across every layer of the harness.
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion and captures its output.
    ///
    /// # Errors
    ///
    /// - `ProcessError::Spawn`: the program could not be started
    /// - `ProcessError::TimedOut`: the timeout elapsed (the child is killed)
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandOutput, ProcessError>>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandOutput, ProcessError>> {
        Box::pin(async move {
            debug!(command = %spec, "spawning subprocess");

            let mut cmd = tokio::process::Command::new(&spec.program);
            cmd.args(&spec.args)
                .stdin(Stdio::null())
                .kill_on_drop(true);
            if let Some(cwd) = &spec.cwd {
                cmd.current_dir(cwd);
            }
            cmd.envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

            let spawn_err = |e: std::io::Error| ProcessError::Spawn {
                program: spec.program.clone(),
                reason: e.to_string(),
            };

            let output = match spec.timeout {
                Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                    .await
                    .map_err(|_elapsed| ProcessError::TimedOut {
                        program: spec.program.clone(),
                        timeout_secs: timeout.as_secs(),
                    })?
                    .map_err(spawn_err)?,
                None => cmd.output().await.map_err(spawn_err)?,
            };

            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code().unwrap_or(-1),
            })
        })
    }
}

/// 테스트용 Mock 러너
///
/// 패턴(공백으로 구분된 토큰)마다 응답 큐를 등록합니다. 명령의 argv에
/// 패턴의 모든 토큰이 포함되면 매칭되며, 여러 규칙이 매칭되면 토큰이 가장 많은
/// 규칙이 선택됩니다. 큐의 마지막 응답은 소진되지 않고 반복됩니다.
/// 매칭되는 규칙이 없으면 종료 코드 0의 빈 출력을 반환합니다.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct MockRunner {
    rules: std::sync::Mutex<Vec<MockRule>>,
    calls: std::sync::Mutex<Vec<CommandSpec>>,
}

#[cfg(any(test, feature = "test-util"))]
struct MockRule {
    tokens: Vec<String>,
    responses: std::collections::VecDeque<Result<CommandOutput, String>>,
}

#[cfg(any(test, feature = "test-util"))]
fn lock<T>(m: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(any(test, feature = "test-util"))]
impl MockRunner {
    /// 규칙이 없는 mock 러너를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, response: Result<CommandOutput, String>) -> &Self {
        let tokens: Vec<String> = pattern.split_whitespace().map(str::to_owned).collect();
        let mut rules = lock(&self.rules);
        if let Some(rule) = rules.iter_mut().find(|r| r.tokens == tokens) {
            rule.responses.push_back(response);
        } else {
            rules.push(MockRule {
                tokens,
                responses: std::collections::VecDeque::from([response]),
            });
        }
        self
    }

    /// 패턴에 응답을 추가합니다.
    pub fn on(&self, pattern: &str, output: CommandOutput) -> &Self {
        self.push(pattern, Ok(output))
    }

    /// 패턴에 성공 응답(stdout)을 추가합니다.
    pub fn on_ok(&self, pattern: &str, stdout: &str) -> &Self {
        self.on(pattern, CommandOutput::ok(stdout))
    }

    /// 패턴에 실패 응답(종료 코드, stderr)을 추가합니다.
    pub fn on_fail(&self, pattern: &str, exit_code: i32, stderr: &str) -> &Self {
        self.on(pattern, CommandOutput::failed(exit_code, stderr))
    }

    /// 패턴에 프로세스 시작 실패를 추가합니다.
    pub fn on_spawn_error(&self, pattern: &str, reason: &str) -> &Self {
        self.push(pattern, Err(reason.to_owned()))
    }

    /// 기록된 모든 호출을 반환합니다.
    pub fn calls(&self) -> Vec<CommandSpec> {
        lock(&self.calls).clone()
    }

    /// 패턴에 매칭되는 호출만 반환합니다.
    pub fn calls_matching(&self, pattern: &str) -> Vec<CommandSpec> {
        let tokens: Vec<&str> = pattern.split_whitespace().collect();
        lock(&self.calls)
            .iter()
            .filter(|spec| tokens.iter().all(|t| spec.argv().any(|a| a == *t)))
            .cloned()
            .collect()
    }

    fn respond(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        let mut rules = lock(&self.rules);
        let best = rules
            .iter_mut()
            .filter(|rule| rule.tokens.iter().all(|t| spec.argv().any(|a| a == t)))
            .fold(None::<&mut MockRule>, |best, rule| match best {
                Some(b) if b.tokens.len() >= rule.tokens.len() => Some(b),
                _ => Some(rule),
            });

        let response = match best {
            Some(rule) if rule.responses.len() > 1 => rule.responses.pop_front(),
            Some(rule) => rule.responses.front().cloned(),
            None => None,
        };

        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(reason)) => Err(ProcessError::Spawn {
                program: spec.program.clone(),
                reason,
            }),
            None => Ok(CommandOutput::default()),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl CommandRunner for MockRunner {
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandOutput, ProcessError>> {
        let result = self.respond(&spec);
        lock(&self.calls).push(spec);
        Box::pin(async move { result })
    }
}
