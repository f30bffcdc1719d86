//! Project templates and their versioning protocol (§4.9, C10).
//!
//! Every mutator refuses to touch its input and returns a fresh
//! `GovernanceOutcome` instead: `{ok:true, template}` on success,
//! `{ok:false, reason}` on refusal (stale version, insufficient role, a
//! locked panel). `layoutVersion` only ever increases by exactly one per
//! §3.2 invariant 3 — every mutator here bumps it exactly once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::can::can;
use crate::hash;
use crate::panel::{default_panel_modes, PanelId, PanelModeMap};
use crate::reason::{GovernanceOutcome, GovernanceReason};
use crate::role::ProjectRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTemplateLayout {
    pub project_id: String,
    pub layout_version: u64,
    pub panel_modes: PanelModeMap,
    pub locked_panels: BTreeSet<PanelId>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
    pub previous_hash: String,
}

fn content_digest_input(template: &ProjectTemplateLayout) -> String {
    let modes: Vec<String> = template
        .panel_modes
        .iter()
        .map(|(p, m)| format!("{}={}", p.as_str(), m.as_str()))
        .collect();
    let locks: Vec<&str> = template.locked_panels.iter().map(|p| p.as_str()).collect();
    format!(
        "{}|{}|{}|{}|{}|{}",
        template.project_id,
        template.layout_version,
        modes.join(","),
        locks.join(","),
        template.updated_by,
        template.updated_at.to_rfc3339(),
    )
}

/// `createTemplate(projectId, userId, ts)` (§4.9): a factory, not a
/// mutator — no capability is checked because there is no prior template
/// for the caller to be insufficiently privileged against. The host
/// decides who may call it (ordinarily gated on `create_template`, Owner).
pub fn create_template(project_id: &str, user_id: &str, ts: DateTime<Utc>) -> ProjectTemplateLayout {
    ProjectTemplateLayout {
        project_id: project_id.to_string(),
        layout_version: 1,
        panel_modes: default_panel_modes(),
        locked_panels: BTreeSet::new(),
        updated_by: user_id.to_string(),
        updated_at: ts,
        previous_hash: hash::genesis(project_id),
    }
}

pub(crate) fn next_version(
    template: &ProjectTemplateLayout,
    user_id: &str,
    ts: DateTime<Utc>,
    panel_modes: PanelModeMap,
    locked_panels: BTreeSet<PanelId>,
) -> ProjectTemplateLayout {
    ProjectTemplateLayout {
        project_id: template.project_id.clone(),
        layout_version: template.layout_version + 1,
        panel_modes,
        locked_panels,
        updated_by: user_id.to_string(),
        updated_at: ts,
        previous_hash: hash::digest(&content_digest_input(template)),
    }
}

pub(crate) fn require(role: ProjectRole, capability: &str) -> Result<(), GovernanceReason> {
    let check = can(role.as_str(), capability, None);
    if check.granted {
        Ok(())
    } else {
        Err(GovernanceReason::InsufficientRole(
            check.reason.unwrap_or_else(|| capability.to_string()),
        ))
    }
}

fn any_locked(patch_keys: impl Iterator<Item = PanelId>, locked: &BTreeSet<PanelId>) -> Option<PanelId> {
    patch_keys.into_iter().find(|p| locked.contains(p))
}

/// `updateTemplate` (§4.9): applies a partial `panel_modes` patch. A patch
/// entry naming a locked panel is refused wholesale (§3.2 invariant 2: a
/// lock denies modification to every role) rather than silently dropped —
/// silent drop is reserved for *resolution* (cascade/rebase), not for a
/// direct edit attempt.
pub fn update_template(
    template: &ProjectTemplateLayout,
    role: ProjectRole,
    user_id: &str,
    ts: DateTime<Utc>,
    panel_modes_patch: &PanelModeMap,
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "update_template") {
        return GovernanceOutcome::err(reason);
    }
    if let Some(panel) = any_locked(panel_modes_patch.keys().copied(), &template.locked_panels) {
        return GovernanceOutcome::err(GovernanceReason::PanelLocked(panel.as_str().to_string()));
    }

    let mut panel_modes = template.panel_modes.clone();
    panel_modes.extend(panel_modes_patch.iter().map(|(k, v)| (*k, *v)));

    GovernanceOutcome::ok(next_version(
        template,
        user_id,
        ts,
        panel_modes,
        template.locked_panels.clone(),
    ))
}

/// `resetTemplate` (§4.9): restores `panel_modes` to the system default.
/// Locks are a separate concern (the `panel_lock` action) and survive a
/// content reset — resetting a layout should not silently unlock a panel
/// an instructor deliberately pinned.
pub fn reset_template(
    template: &ProjectTemplateLayout,
    role: ProjectRole,
    user_id: &str,
    ts: DateTime<Utc>,
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "reset_template") {
        return GovernanceOutcome::err(reason);
    }
    GovernanceOutcome::ok(next_version(
        template,
        user_id,
        ts,
        default_panel_modes(),
        template.locked_panels.clone(),
    ))
}

/// `publishDraft` (§4.9): replaces the full `panel_modes` map with a
/// drafted one. A draft that disagrees with the template on a locked
/// panel's value is refused outright, same rationale as `update_template`.
pub fn publish_draft(
    template: &ProjectTemplateLayout,
    role: ProjectRole,
    user_id: &str,
    ts: DateTime<Utc>,
    draft_panel_modes: &PanelModeMap,
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "publish_draft") {
        return GovernanceOutcome::err(reason);
    }
    for panel in &template.locked_panels {
        if draft_panel_modes.get(panel) != template.panel_modes.get(panel) {
            return GovernanceOutcome::err(GovernanceReason::PanelLocked(panel.as_str().to_string()));
        }
    }

    GovernanceOutcome::ok(next_version(
        template,
        user_id,
        ts,
        draft_panel_modes.clone(),
        template.locked_panels.clone(),
    ))
}

/// Panel lock change (§3.2 invariant 3 lists "panel lock change" as its own
/// version-incrementing action). `panel_ids` is validated here (every entry
/// must be a known `PanelId`) because it arrives as raw strings from
/// whatever transport the host uses.
pub fn lock_panels(
    template: &ProjectTemplateLayout,
    role: ProjectRole,
    user_id: &str,
    ts: DateTime<Utc>,
    panel_ids: &[String],
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "lock_panel") {
        return GovernanceOutcome::err(reason);
    }

    let mut locked = BTreeSet::new();
    for raw in panel_ids {
        match raw.parse::<PanelId>() {
            Ok(panel) => {
                locked.insert(panel);
            }
            Err(_) => return GovernanceOutcome::err(GovernanceReason::UnknownPanelId(raw.clone())),
        }
    }

    GovernanceOutcome::ok(next_version(
        template,
        user_id,
        ts,
        template.panel_modes.clone(),
        locked,
    ))
}

/// `rollbackTemplate` (§4.13, §9): the lower-level primitive that publishes
/// a reconstructed `(panel_modes, locked_panels)` pair as a new version,
/// with no history lookup of its own. `rollback::perform_rollback` is the
/// canonical entry point; it finds the target snapshot and calls this.
pub fn rollback_template(
    template: &ProjectTemplateLayout,
    role: ProjectRole,
    user_id: &str,
    ts: DateTime<Utc>,
    reconstructed_panel_modes: PanelModeMap,
    reconstructed_locked_panels: BTreeSet<PanelId>,
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "rollback_template") {
        return GovernanceOutcome::err(reason);
    }
    GovernanceOutcome::ok(next_version(
        template,
        user_id,
        ts,
        reconstructed_panel_modes,
        reconstructed_locked_panels,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    Current,
    Stale,
    Ahead,
}

/// `validateVersionForUpdate` (§4.9): only an exactly-equal client version
/// passes.
pub fn validate_version_for_update(client_version: u64, current: &ProjectTemplateLayout) -> VersionCheck {
    if client_version < current.layout_version {
        VersionCheck::Stale
    } else if client_version > current.layout_version {
        VersionCheck::Ahead
    } else {
        VersionCheck::Current
    }
}

/// `verifyVersionIntegrity` (§4.9): returns every violation found, empty
/// when the history is well-formed. Checked: versions form `1,2,3,...`
/// with no gaps or duplicates, `updatedAt` is non-decreasing, and every
/// entry shares one `projectId`.
pub fn verify_version_integrity(history: &[ProjectTemplateLayout]) -> Vec<GovernanceReason> {
    let mut violations = Vec::new();
    if history.is_empty() {
        return violations;
    }

    let project_id = &history[0].project_id;
    let mut last_timestamp: Option<DateTime<Utc>> = None;
    for (index, entry) in history.iter().enumerate() {
        let expected = index as u64 + 1;
        if entry.layout_version != expected {
            violations.push(GovernanceReason::Other(format!(
                "expected version {expected} at position {index}, found {}",
                entry.layout_version
            )));
        }
        if &entry.project_id != project_id {
            violations.push(GovernanceReason::Other(format!(
                "projectId mismatch at version {}: expected {project_id:?}, found {:?}",
                entry.layout_version, entry.project_id
            )));
        }
        if let Some(last) = last_timestamp {
            if entry.updated_at < last {
                violations.push(GovernanceReason::Other(format!(
                    "updatedAt regressed at version {}",
                    entry.layout_version
                )));
            }
        }
        last_timestamp = Some(entry.updated_at);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(offset_seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset_seconds, 0).unwrap()
    }

    #[test]
    fn create_template_is_v1_all_default_no_locks() {
        let template = create_template("proj-1", "owner-1", ts(0));
        assert_eq!(template.layout_version, 1);
        assert!(template.locked_panels.is_empty());
        assert_eq!(template.panel_modes.len(), 7);
    }

    #[test]
    fn update_template_bumps_version_by_exactly_one() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let mut patch = PanelModeMap::new();
        patch.insert(PanelId::Stack, crate::panel::ViewMode::Pro);
        let outcome = update_template(&template, ProjectRole::Instructor, "inst-1", ts(1), &patch);
        assert!(outcome.ok);
        let updated = outcome.value.unwrap();
        assert_eq!(updated.layout_version, 2);
        assert_eq!(updated.panel_modes[&PanelId::Stack], crate::panel::ViewMode::Pro);
    }

    #[test]
    fn update_template_refuses_insufficient_role() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let patch = PanelModeMap::new();
        let outcome = update_template(&template, ProjectRole::Viewer, "v-1", ts(1), &patch);
        assert!(!outcome.ok);
    }

    #[test]
    fn update_template_refuses_patch_to_locked_panel() {
        let mut template = create_template("proj-1", "owner-1", ts(0));
        template.locked_panels.insert(PanelId::Memory);
        let mut patch = PanelModeMap::new();
        patch.insert(PanelId::Memory, crate::panel::ViewMode::Pro);
        let outcome = update_template(&template, ProjectRole::Owner, "owner-1", ts(1), &patch);
        assert!(!outcome.ok);
        assert_eq!(
            outcome.reason,
            Some(GovernanceReason::PanelLocked("memory".to_string()))
        );
    }

    #[test]
    fn lock_panels_validates_every_entry() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let outcome = lock_panels(
            &template,
            ProjectRole::Instructor,
            "inst-1",
            ts(1),
            &["memory".to_string(), "bogus".to_string()],
        );
        assert!(!outcome.ok);
    }

    #[test]
    fn validate_version_for_update_accepts_only_equal() {
        let template = create_template("proj-1", "owner-1", ts(0));
        assert_eq!(validate_version_for_update(1, &template), VersionCheck::Current);
        assert_eq!(validate_version_for_update(0, &template), VersionCheck::Stale);
        assert_eq!(validate_version_for_update(2, &template), VersionCheck::Ahead);
    }

    #[test]
    fn verify_version_integrity_accepts_well_formed_history() {
        let v1 = create_template("proj-1", "owner-1", ts(0));
        let v2 = next_version(&v1, "owner-1", ts(1), v1.panel_modes.clone(), v1.locked_panels.clone());
        assert!(verify_version_integrity(&[v1, v2]).is_empty());
    }

    #[test]
    fn verify_version_integrity_flags_duplicate_version() {
        let v1 = create_template("proj-1", "owner-1", ts(0));
        let mut duplicate = v1.clone();
        duplicate.updated_at = ts(1);
        assert!(!verify_version_integrity(&[v1, duplicate]).is_empty());
    }
}
