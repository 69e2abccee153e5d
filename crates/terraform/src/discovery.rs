//! 도구 바이너리 탐색
//!
//! 설정에 바이너리가 지정되지 않으면 PATH에서 `terraform`, `tofu` 순으로 찾습니다.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TerraformError;

/// 탐색 순서대로 나열한 도구 이름
pub const TOOL_CANDIDATES: [&str; 2] = ["terraform", "tofu"];

/// 사용할 도구 바이너리를 결정합니다.
///
/// `configured`가 비어 있지 않으면 그대로 사용하고,
/// 비어 있으면 현재 프로세스의 PATH에서 후보를 탐색합니다.
pub fn resolve_binary(configured: &str) -> Result<String, TerraformError> {
    if !configured.is_empty() {
        return Ok(configured.to_owned());
    }
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    discover_in(&path_var)
}

/// 주어진 PATH 값에서 첫 번째 후보 도구를 찾습니다.
pub fn discover_in(path_var: &OsStr) -> Result<String, TerraformError> {
    for candidate in TOOL_CANDIDATES {
        if let Some(found) = find_in_path(candidate, path_var) {
            debug!(binary = %found.display(), "provisioning tool discovered");
            return Ok(found.display().to_string());
        }
    }
    Err(TerraformError::BinaryNotFound {
        searched: TOOL_CANDIDATES.join(", "),
    })
}

/// PATH 디렉토리들에서 실행 가능한 `name` 파일을 찾습니다.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
