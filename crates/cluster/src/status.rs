//! 모델 상태 스냅샷과 수렴 조건
//!
//! `juju status --format json` 출력 중 수렴 판정에 필요한 부분만 역직렬화합니다.
//! 조건 함수는 스냅샷 하나만 보고 판정하며 부수 효과가 없습니다.

use std::collections::BTreeMap;

use serde::Deserialize;

/// 워크로드 정상 상태
pub const STATUS_ACTIVE: &str = "active";
/// 에이전트 유휴 상태
pub const STATUS_IDLE: &str = "idle";
/// 명시적 에러 상태
pub const STATUS_ERROR: &str = "error";

/// 스냅샷을 판정하는 조건 함수
pub type StatusPredicate = fn(&ModelStatus) -> bool;

/// 한 시점의 모델 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelStatus {
    /// 애플리케이션별 상태
    #[serde(default)]
    pub applications: BTreeMap<String, AppStatus>,
}

/// 애플리케이션 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppStatus {
    /// 애플리케이션 전체 상태
    #[serde(default)]
    pub application_status: StatusInfo,
    /// 유닛별 상태 (`app/0` 형식 키)
    #[serde(default)]
    pub units: BTreeMap<String, UnitStatus>,
}

/// 유닛 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitStatus {
    /// 워크로드 상태
    #[serde(default)]
    pub workload_status: StatusInfo,
    /// 유닛 에이전트 상태
    #[serde(default)]
    pub juju_status: StatusInfo,
    /// 종속(subordinate) 유닛
    #[serde(default)]
    pub subordinates: BTreeMap<String, UnitStatus>,
}

/// 상태 값과 메시지
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusInfo {
    /// 현재 상태 (active, waiting, blocked, error, idle, executing 등)
    #[serde(default)]
    pub current: String,
    /// 상태 메시지
    #[serde(default)]
    pub message: String,
}

impl StatusInfo {
    fn describe(&self) -> String {
        if self.message.is_empty() {
            self.current.clone()
        } else {
            format!("{} ({})", self.current, self.message)
        }
    }
}

impl ModelStatus {
    /// JSON 문자열에서 상태를 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 종속 유닛을 포함한 모든 유닛을 (이름, 상태) 쌍으로 나열합니다.
    pub fn units(&self) -> Vec<(&str, &UnitStatus)> {
        let mut out = Vec::new();
        for app in self.applications.values() {
            for (name, unit) in &app.units {
                collect_units(name, unit, &mut out);
            }
        }
        out
    }

    /// 에러 상태인 애플리케이션과 유닛의 설명 목록
    pub fn errors(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, app) in &self.applications {
            if app.application_status.current == STATUS_ERROR {
                out.push(format!("{name}: {}", app.application_status.describe()));
            }
        }
        for (name, unit) in self.units() {
            if unit.workload_status.current == STATUS_ERROR {
                out.push(format!("{name}: {}", unit.workload_status.describe()));
            }
            if unit.juju_status.current == STATUS_ERROR {
                out.push(format!("{name} agent: {}", unit.juju_status.describe()));
            }
        }
        out
    }

    /// 로그와 에러 메시지에 쓰는 한 줄 요약
    pub fn summary(&self) -> String {
        if self.applications.is_empty() {
            return "no applications".to_owned();
        }
        let mut parts = Vec::new();
        for (name, app) in &self.applications {
            parts.push(format!("{name}: {}", app.application_status.current));
        }
        for (name, unit) in self.units() {
            parts.push(format!(
                "{name}: {}/{}",
                unit.workload_status.current, unit.juju_status.current
            ));
        }
        parts.join(", ")
    }
}

fn collect_units<'a>(name: &'a str, unit: &'a UnitStatus, out: &mut Vec<(&'a str, &'a UnitStatus)>) {
    out.push((name, unit));
    for (sub_name, sub) in &unit.subordinates {
        collect_units(sub_name, sub, out);
    }
}

/// 모든 애플리케이션과 유닛의 워크로드가 active인지 판정합니다.
///
/// 애플리케이션이 하나도 없으면 참입니다.
pub fn all_active(status: &ModelStatus) -> bool {
    status.applications.values().all(|app| {
        app.application_status.current == STATUS_ACTIVE
            && app.units.iter().all(|(name, unit)| {
                let mut units = Vec::new();
                collect_units(name, unit, &mut units);
                units
                    .iter()
                    .all(|(_, u)| u.workload_status.current == STATUS_ACTIVE)
            })
    })
}

/// 모든 유닛 에이전트가 idle인지 판정합니다.
pub fn all_agents_idle(status: &ModelStatus) -> bool {
    status
        .units()
        .iter()
        .all(|(_, unit)| unit.juju_status.current == STATUS_IDLE)
}

/// 애플리케이션이나 유닛 중 하나라도 에러 상태인지 판정합니다.
pub fn any_error(status: &ModelStatus) -> bool {
    !status.errors().is_empty()
}
