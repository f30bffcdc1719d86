//! The 21-capability matrix (§3.2, §4.8, C9). Represented as a single table
//! (capability -> minimum role) per §9 "Design notes" so adding a
//! capability is mechanical and the cardinalities are checkable by a test
//! rather than by inspection.
//!
//! Capabilities are granted at-or-above a minimum role, so the subset chain
//! (§8 "Capability subset invariants") falls directly out of `ProjectRole`'s
//! ordering: nothing else needs to enforce it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::role::ProjectRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // granted from Viewer (3)
    ViewLayout,
    ViewTrace,
    ViewOutput,
    // granted from Maintainer (+3 = 6)
    EditOwnOverride,
    ResetOwnOverride,
    SyncDevice,
    // granted from Instructor (+8 = 14)
    UpdateTemplate,
    LockPanel,
    UnlockPanel,
    ViewAuditLog,
    PublishDraft,
    ResetTemplate,
    ForceSyncOthers,
    ViewAllOverrides,
    // granted from Owner (+7 = 21)
    CreateTemplate,
    RollbackTemplate,
    DeleteProject,
    ManageRoles,
    TransferOwnership,
    ConfigureCapabilityMatrix,
    PurgeAuditLog,
}

/// `(capability, minimum role)` pairs, in declaration order. This is the
/// single source of truth §9 calls for; `can()` and `permitted_actions()`
/// both read through it rather than duplicating the thresholds.
const MATRIX: &[(Capability, ProjectRole)] = &[
    (Capability::ViewLayout, ProjectRole::Viewer),
    (Capability::ViewTrace, ProjectRole::Viewer),
    (Capability::ViewOutput, ProjectRole::Viewer),
    (Capability::EditOwnOverride, ProjectRole::Maintainer),
    (Capability::ResetOwnOverride, ProjectRole::Maintainer),
    (Capability::SyncDevice, ProjectRole::Maintainer),
    (Capability::UpdateTemplate, ProjectRole::Instructor),
    (Capability::LockPanel, ProjectRole::Instructor),
    (Capability::UnlockPanel, ProjectRole::Instructor),
    (Capability::ViewAuditLog, ProjectRole::Instructor),
    (Capability::PublishDraft, ProjectRole::Instructor),
    (Capability::ResetTemplate, ProjectRole::Instructor),
    (Capability::ForceSyncOthers, ProjectRole::Instructor),
    (Capability::ViewAllOverrides, ProjectRole::Instructor),
    (Capability::CreateTemplate, ProjectRole::Owner),
    (Capability::RollbackTemplate, ProjectRole::Owner),
    (Capability::DeleteProject, ProjectRole::Owner),
    (Capability::ManageRoles, ProjectRole::Owner),
    (Capability::TransferOwnership, ProjectRole::Owner),
    (Capability::ConfigureCapabilityMatrix, ProjectRole::Owner),
    (Capability::PurgeAuditLog, ProjectRole::Owner),
];

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ViewLayout => "view_layout",
            Capability::ViewTrace => "view_trace",
            Capability::ViewOutput => "view_output",
            Capability::EditOwnOverride => "edit_own_override",
            Capability::ResetOwnOverride => "reset_own_override",
            Capability::SyncDevice => "sync_device",
            Capability::UpdateTemplate => "update_template",
            Capability::LockPanel => "lock_panel",
            Capability::UnlockPanel => "unlock_panel",
            Capability::ViewAuditLog => "view_audit_log",
            Capability::PublishDraft => "publish_draft",
            Capability::ResetTemplate => "reset_template",
            Capability::ForceSyncOthers => "force_sync_others",
            Capability::ViewAllOverrides => "view_all_overrides",
            Capability::CreateTemplate => "create_template",
            Capability::RollbackTemplate => "rollback_template",
            Capability::DeleteProject => "delete_project",
            Capability::ManageRoles => "manage_roles",
            Capability::TransferOwnership => "transfer_ownership",
            Capability::ConfigureCapabilityMatrix => "configure_capability_matrix",
            Capability::PurgeAuditLog => "purge_audit_log",
        }
    }

    pub fn minimum_role(self) -> ProjectRole {
        MATRIX
            .iter()
            .find(|(cap, _)| *cap == self)
            .map(|(_, role)| *role)
            .expect("every Capability variant has a matrix entry")
    }
}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MATRIX
            .iter()
            .map(|(cap, _)| *cap)
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0:?}")]
pub struct UnknownCapability(pub String);

/// `isValidCapability` (§6).
pub fn is_valid_capability(s: &str) -> bool {
    s.parse::<Capability>().is_ok()
}

/// Every capability granted to `role` or any role below it in the chain.
/// Used by §8's subset-chain property test and by `canAll`/`canAny`
/// callers that want to enumerate rather than probe one capability at a
/// time.
pub fn permitted_actions(role: ProjectRole) -> Vec<Capability> {
    MATRIX
        .iter()
        .filter(|(_, min_role)| role >= *min_role)
        .map(|(cap, _)| *cap)
        .collect()
}
