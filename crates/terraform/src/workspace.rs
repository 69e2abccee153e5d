//! 프로비저닝 워크스페이스
//!
//! 워크스페이스는 (정의 디렉토리, 리소스 종류, 격리된 상태 파일 경로)의 묶음입니다.
//! 정의 디렉토리는 읽기 전용 템플릿으로 여러 환경이 공유하고,
//! 상태 파일은 `{kind}-{environment}.tfstate`로 환경마다 분리됩니다.
//! 같은 (종류, 환경)은 항상 같은 상태 파일을 가리키고, 다른 조합은 절대
//! 겹치지 않으므로 잠금 없이 격리됩니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use meshcheck_core::types::Environment;
use serde::{Deserialize, Serialize};

/// 상태 파일 확장자
pub const STATE_FILE_EXTENSION: &str = "tfstate";

/// 프로비저닝 대상 리소스 종류
///
/// 각 종류는 `{root_dir}/{kind}` 아래에 고정된 정의 파일을 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// 메시 컨트롤 플레인 (istio-k8s)
    Istio,
    /// 사이드카리스 메시 비컨 (istio-beacon-k8s)
    IstioBeacon,
    /// 인그레스 게이트웨이 (istio-ingress-k8s)
    IstioIngress,
    /// 샘플 애플리케이션
    Bookinfo,
}

impl ResourceKind {
    /// 모든 리소스 종류
    pub const ALL: [ResourceKind; 4] = [
        Self::Istio,
        Self::IstioBeacon,
        Self::IstioIngress,
        Self::Bookinfo,
    ];

    /// 정의 디렉토리 이름이자 상태 파일 접두어
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Istio => "istio",
            Self::IstioBeacon => "istio-beacon",
            Self::IstioIngress => "istio-ingress",
            Self::Bookinfo => "bookinfo",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind: {s}"))
    }
}

/// 하나의 (리소스 종류, 환경)에 대한 프로비저닝 워크스페이스
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningWorkspace {
    dir: PathBuf,
    kind: ResourceKind,
    state_path: Option<PathBuf>,
}

impl ProvisioningWorkspace {
    /// 환경별로 격리된 상태 파일을 가진 워크스페이스를 생성합니다.
    ///
    /// - 정의 디렉토리: `{root_dir}/{kind}`
    /// - 상태 파일: `{state_dir}/{kind}-{environment}.tfstate`
    pub fn for_environment(
        root_dir: impl AsRef<Path>,
        state_dir: impl AsRef<Path>,
        kind: ResourceKind,
        env: &Environment,
    ) -> Self {
        Self {
            dir: root_dir.as_ref().join(kind.as_str()),
            kind,
            state_path: Some(state_dir.as_ref().join(state_file_name(kind, env))),
        }
    }

    /// 도구의 기본 상태 위치(정의 디렉토리 내부)를 쓰는 워크스페이스를 생성합니다.
    pub fn shared(dir: impl Into<PathBuf>, kind: ResourceKind) -> Self {
        Self {
            dir: dir.into(),
            kind,
            state_path: None,
        }
    }

    /// 정의 디렉토리
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 리소스 종류
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// 격리된 상태 파일 경로 (있는 경우)
    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    /// `-state=<path>` 인자 (격리된 상태 파일이 있는 경우)
    pub(crate) fn state_arg(&self) -> Option<String> {
        self.state_path
            .as_ref()
            .map(|path| format!("-state={}", path.display()))
    }
}

/// 상태 파일 이름: `{kind}-{environment}.tfstate`
pub fn state_file_name(kind: ResourceKind, env: &Environment) -> String {
    format!("{}-{}.{STATE_FILE_EXTENSION}", kind.as_str(), env.name())
}
