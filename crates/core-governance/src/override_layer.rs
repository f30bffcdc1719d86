//! Per-user layout overrides (§3.2, C11). `overrides` is stored as raw
//! `panelId -> viewMode` strings rather than the typed `PanelModeMap`: once
//! a template changes (a panel is renamed, removed, or newly locked) an
//! override entry recorded against an older template can become stale or
//! invalid, and §4.11/§4.12 require that staleness to survive as
//! *informational* data (`droppedOverridePanelIds`, `rebaseOverrides`'
//! `droppedPanels`) rather than be rejected outright at storage time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::panel::{is_valid_panel_id, is_valid_view_mode};
use crate::reason::{GovernanceOutcome, GovernanceReason};
use crate::template::ProjectTemplateLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLayoutOverride {
    pub user_id: String,
    pub project_id: String,
    pub base_version: u64,
    /// Raw `panelId -> viewMode`; validated lazily by the cascade/rebase,
    /// never at write time beyond `set_override`'s own format check.
    pub overrides: BTreeMap<String, String>,
    pub last_synced_at: DateTime<Utc>,
    pub device_id: String,
}

/// `createOverride` (§4.10): a factory, no capability check (see
/// `template::create_template` for the same rationale).
pub fn create_override(
    user_id: &str,
    project_id: &str,
    base_version: u64,
    device_id: &str,
    ts: DateTime<Utc>,
) -> UserLayoutOverride {
    UserLayoutOverride {
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        base_version,
        overrides: BTreeMap::new(),
        last_synced_at: ts,
        device_id: device_id.to_string(),
    }
}

/// `setOverride` (§4.10): denied if `panel_id` is currently locked, or if
/// either string fails format validation — a *direct* write is held to a
/// higher bar than an override inherited across a template change.
pub fn set_override(
    override_: &UserLayoutOverride,
    panel_id: &str,
    mode: &str,
    template: &ProjectTemplateLayout,
    ts: DateTime<Utc>,
) -> GovernanceOutcome<UserLayoutOverride> {
    if !is_valid_panel_id(panel_id) {
        return GovernanceOutcome::err(GovernanceReason::UnknownPanelId(panel_id.to_string()));
    }
    if !is_valid_view_mode(mode) {
        return GovernanceOutcome::err(GovernanceReason::Other(format!(
            "invalid view mode {mode:?}"
        )));
    }
    let panel = panel_id.parse().expect("validated above");
    if template.locked_panels.contains(&panel) {
        return GovernanceOutcome::err(GovernanceReason::PanelLocked(panel_id.to_string()));
    }

    let mut next = override_.clone();
    next.overrides.insert(panel_id.to_string(), mode.to_string());
    next.last_synced_at = ts;
    GovernanceOutcome::ok(next)
}

/// `clearOverride` (§4.10).
pub fn clear_override(override_: &UserLayoutOverride, panel_id: &str, ts: DateTime<Utc>) -> UserLayoutOverride {
    let mut next = override_.clone();
    next.overrides.remove(panel_id);
    next.last_synced_at = ts;
    next
}

/// `clearAllOverrides` (§4.10).
pub fn clear_all_overrides(override_: &UserLayoutOverride, ts: DateTime<Utc>) -> UserLayoutOverride {
    let mut next = override_.clone();
    next.overrides.clear();
    next.last_synced_at = ts;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::create_template;

    fn ts(offset: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
    }

    #[test]
    fn create_override_starts_empty() {
        let ov = create_override("user-1", "proj-1", 1, "device-a", ts(0));
        assert!(ov.overrides.is_empty());
    }

    #[test]
    fn set_override_denies_locked_panel() {
        let mut template = create_template("proj-1", "owner-1", ts(0));
        template.locked_panels.insert(crate::panel::PanelId::Memory);
        let ov = create_override("user-1", "proj-1", 1, "device-a", ts(0));
        let outcome = set_override(&ov, "memory", "pro", &template, ts(1));
        assert!(!outcome.ok);
    }

    #[test]
    fn set_override_accepts_unlocked_panel() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let ov = create_override("user-1", "proj-1", 1, "device-a", ts(0));
        let outcome = set_override(&ov, "stack", "pro", &template, ts(1));
        assert!(outcome.ok);
        let updated = outcome.value.unwrap();
        assert_eq!(updated.overrides.get("stack"), Some(&"pro".to_string()));
        assert_eq!(updated.last_synced_at, ts(1));
    }

    #[test]
    fn clear_override_removes_single_entry() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let ov = create_override("user-1", "proj-1", 1, "device-a", ts(0));
        let ov = set_override(&ov, "stack", "pro", &template, ts(1)).value.unwrap();
        let ov = clear_override(&ov, "stack", ts(2));
        assert!(ov.overrides.is_empty());
    }
}
