//! Non-destructive rollback (§4.13, C14). Rollback never edits history —
//! it looks up an old snapshot and republishes its content as a brand new,
//! higher-numbered version (§3.2 invariant 4: "rollback never reduces
//! layoutVersion; it publishes the reconstructed state at current+1").

use chrono::{DateTime, Utc};

use crate::reason::{GovernanceOutcome, GovernanceReason};
use crate::role::ProjectRole;
use crate::template::{next_version, require, verify_version_integrity, ProjectTemplateLayout};

/// `reconstructTemplateAtVersion` (§4.13): finds the entry whose
/// `layoutVersion` equals `version` in `history`.
pub fn reconstruct_template_at_version(
    history: &[ProjectTemplateLayout],
    version: u64,
) -> Option<&ProjectTemplateLayout> {
    history.iter().find(|entry| entry.layout_version == version)
}

/// `performRollback` (§4.13): the canonical rollback entry point. Per spec,
/// it "requires `template:reset`" — the `reset_template` capability, granted
/// from `Instructor` — even though it composes the same version-publishing
/// step as the lower-level `rollback_template` primitive (which is gated
/// more strictly, at `Owner`, for callers that invoke it directly). Requires
/// `1 <= target_version < current.layout_version`. `history` is read, never
/// mutated; the returned template is the caller's to append.
///
/// `new_hash`, when given, overrides the normally content-derived
/// `previous_hash` on the published entry — a host reconstructing rollback
/// across a transport boundary may already have computed the chained hash
/// itself and want the VM-side computation skipped.
pub fn perform_rollback(
    current: &ProjectTemplateLayout,
    target_version: u64,
    history: &[ProjectTemplateLayout],
    user_id: &str,
    role: ProjectRole,
    ts: DateTime<Utc>,
    new_hash: Option<&str>,
) -> GovernanceOutcome<ProjectTemplateLayout> {
    if let Err(reason) = require(role, "reset_template") {
        return GovernanceOutcome::err(reason);
    }

    if target_version < 1 || target_version >= current.layout_version {
        return GovernanceOutcome::err(GovernanceReason::InvalidRollbackTarget {
            target: target_version,
            current: current.layout_version,
        });
    }

    let Some(snapshot) = reconstruct_template_at_version(history, target_version) else {
        return GovernanceOutcome::err(GovernanceReason::VersionNotFound(target_version));
    };

    let mut template = next_version(
        current,
        user_id,
        ts,
        snapshot.panel_modes.clone(),
        snapshot.locked_panels.clone(),
    );
    if let Some(hash) = new_hash {
        template.previous_hash = hash.to_string();
    }
    GovernanceOutcome::ok(template)
}

/// `verifyRollbackIntegrity` (§4.13): `verify_version_integrity` plus an
/// explicit "no version number is ever reused" check, stated separately per
/// spec wording even though a well-formed sequential history already
/// implies it.
pub fn verify_rollback_integrity(history: &[ProjectTemplateLayout]) -> Vec<String> {
    let mut violations: Vec<String> = verify_version_integrity(history)
        .into_iter()
        .map(|reason| reason.to_string())
        .collect();

    let mut seen = std::collections::BTreeSet::new();
    for entry in history {
        if !seen.insert(entry.layout_version) {
            violations.push(format!("version {} reused", entry.layout_version));
        }
    }

    violations
}
