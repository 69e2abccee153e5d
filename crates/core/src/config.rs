//! 설정 관리: meshcheck.toml 파싱 및 런타임 설정
//!
//! [`MeshcheckConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`MESHCHECK_PROBE_TIMEOUT_SECS=60` 형식, `ISTIO_CHANNEL` 포함)
//! 3. 설정 파일 (`meshcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), meshcheck_core::error::MeshcheckError> {
//! use meshcheck_core::config::MeshcheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = MeshcheckConfig::load("meshcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = MeshcheckConfig::parse("[probe]\ntimeout_secs = 60")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, MeshcheckError};

/// 배포 채널을 지정하는 환경변수 (섹션 접두어 없음)
pub const ISTIO_CHANNEL_ENV: &str = "ISTIO_CHANNEL";

/// meshcheck 통합 설정
///
/// `meshcheck.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 프로비저닝 도구 설정
    #[serde(default)]
    pub terraform: TerraformConfig,
    /// 배포 채널 설정
    #[serde(default)]
    pub deploy: DeployConfig,
    /// 수렴 대기 정책
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    /// 프로브 설정
    #[serde(default)]
    pub probe: ProbeConfig,
    /// 클러스터 CLI 설정
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl MeshcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MeshcheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, MeshcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MeshcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                MeshcheckError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, MeshcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            MeshcheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `MESHCHECK_{SECTION}_{FIELD}`
    /// 예: `MESHCHECK_CONVERGENCE_DELAY_SECS=10`
    ///
    /// `ISTIO_CHANNEL`은 `MESHCHECK_DEPLOY_ISTIO_CHANNEL`보다 먼저 적용되므로
    /// 둘 다 설정된 경우 후자가 우선합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "MESHCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "MESHCHECK_GENERAL_LOG_FORMAT");

        // Terraform
        override_string(&mut self.terraform.binary, "MESHCHECK_TERRAFORM_BINARY");
        override_string(&mut self.terraform.root_dir, "MESHCHECK_TERRAFORM_ROOT_DIR");
        override_string(
            &mut self.terraform.state_dir,
            "MESHCHECK_TERRAFORM_STATE_DIR",
        );

        // Deploy
        override_string(&mut self.deploy.istio_channel, ISTIO_CHANNEL_ENV);
        override_string(
            &mut self.deploy.istio_channel,
            "MESHCHECK_DEPLOY_ISTIO_CHANNEL",
        );
        override_string(
            &mut self.deploy.bookinfo_channel,
            "MESHCHECK_DEPLOY_BOOKINFO_CHANNEL",
        );

        // Convergence
        override_u64(
            &mut self.convergence.delay_secs,
            "MESHCHECK_CONVERGENCE_DELAY_SECS",
        );
        override_u32(
            &mut self.convergence.bulk_successes,
            "MESHCHECK_CONVERGENCE_BULK_SUCCESSES",
        );
        override_u32(
            &mut self.convergence.gate_successes,
            "MESHCHECK_CONVERGENCE_GATE_SUCCESSES",
        );
        override_u64(
            &mut self.convergence.bulk_timeout_secs,
            "MESHCHECK_CONVERGENCE_BULK_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.convergence.gate_timeout_secs,
            "MESHCHECK_CONVERGENCE_GATE_TIMEOUT_SECS",
        );

        // Probe
        override_u64(&mut self.probe.timeout_secs, "MESHCHECK_PROBE_TIMEOUT_SECS");
        override_u32(&mut self.probe.max_attempts, "MESHCHECK_PROBE_MAX_ATTEMPTS");
        override_u64(
            &mut self.probe.retry_backoff_ms,
            "MESHCHECK_PROBE_RETRY_BACKOFF_MS",
        );

        // Cluster
        override_string(&mut self.cluster.juju_binary, "MESHCHECK_CLUSTER_JUJU_BINARY");
        override_string(
            &mut self.cluster.kubectl_binary,
            "MESHCHECK_CLUSTER_KUBECTL_BINARY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MeshcheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.terraform.root_dir.is_empty() {
            return Err(invalid("terraform.root_dir", "must not be empty".to_owned()));
        }

        if self.deploy.istio_channel.is_empty() {
            return Err(invalid("deploy.istio_channel", "must not be empty".to_owned()));
        }
        if self.deploy.bookinfo_channel.is_empty() {
            return Err(invalid(
                "deploy.bookinfo_channel",
                "must not be empty".to_owned(),
            ));
        }

        let positive = [
            ("convergence.delay_secs", self.convergence.delay_secs),
            (
                "convergence.bulk_successes",
                u64::from(self.convergence.bulk_successes),
            ),
            (
                "convergence.gate_successes",
                u64::from(self.convergence.gate_successes),
            ),
            (
                "convergence.bulk_timeout_secs",
                self.convergence.bulk_timeout_secs,
            ),
            (
                "convergence.gate_timeout_secs",
                self.convergence.gate_timeout_secs,
            ),
            ("probe.timeout_secs", self.probe.timeout_secs),
            ("probe.max_attempts", u64::from(self.probe.max_attempts)),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(invalid(field, "must be greater than 0".to_owned()));
            }
        }

        if self.cluster.juju_binary.is_empty() {
            return Err(invalid("cluster.juju_binary", "must not be empty".to_owned()));
        }
        if self.cluster.kubectl_binary.is_empty() {
            return Err(invalid(
                "cluster.kubectl_binary",
                "must not be empty".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> MeshcheckError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 프로비저닝 도구 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// 도구 바이너리 (비어 있으면 PATH에서 terraform, tofu 순으로 탐색)
    pub binary: String,
    /// 리소스 종류별 정의 디렉토리의 루트
    pub root_dir: String,
    /// 상태 파일 디렉토리 (비어 있으면 시스템 임시 디렉토리)
    pub state_dir: String,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: String::new(),
            root_dir: "terraform".to_owned(),
            state_dir: String::new(),
        }
    }
}

impl TerraformConfig {
    /// 상태 파일 디렉토리를 결정합니다.
    pub fn state_dir_path(&self) -> PathBuf {
        if self.state_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.state_dir)
        }
    }
}

/// 배포 채널 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// 메시 컴포넌트 채널
    pub istio_channel: String,
    /// 샘플 애플리케이션 채널
    pub bookinfo_channel: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            istio_channel: "2/edge".to_owned(),
            bookinfo_channel: "latest/stable".to_owned(),
        }
    }
}

/// 수렴 대기 정책
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// 샘플 간 대기 시간 (초)
    pub delay_secs: u64,
    /// 1단계(bulk settle)에서 요구하는 연속 성공 횟수
    pub bulk_successes: u32,
    /// 2, 3단계에서 요구하는 연속 성공 횟수
    pub gate_successes: u32,
    /// 1단계 타임아웃 (초)
    pub bulk_timeout_secs: u64,
    /// 2, 3단계 타임아웃 (초)
    pub gate_timeout_secs: u64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            delay_secs: 5,
            bulk_successes: 5,
            gate_successes: 3,
            bulk_timeout_secs: 20 * 60,
            gate_timeout_secs: 5 * 60,
        }
    }
}

impl ConvergenceConfig {
    /// 샘플 간 대기 시간
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// 1단계 타임아웃
    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(self.bulk_timeout_secs)
    }

    /// 2, 3단계 타임아웃
    pub fn gate_timeout(&self) -> Duration {
        Duration::from_secs(self.gate_timeout_secs)
    }
}

/// 프로브 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// 프로브 1회 타임아웃 (초)
    pub timeout_secs: u64,
    /// 스텝 레이어의 최대 시도 횟수 (1 = 재시도 없음)
    pub max_attempts: u32,
    /// 재시도 기본 대기 시간 (밀리초, 시도 횟수에 비례해 증가)
    pub retry_backoff_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 1,
            retry_backoff_ms: 2000,
        }
    }
}

impl ProbeConfig {
    /// 프로브 1회 타임아웃
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 클러스터 CLI 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// juju 바이너리
    pub juju_binary: String,
    /// kubectl 바이너리
    pub kubectl_binary: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            juju_binary: "juju".to_owned(),
            kubectl_binary: "kubectl".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
