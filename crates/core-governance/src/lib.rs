//! The governance state machine (C9–C14): roles and capabilities, template
//! versioning, per-user overrides and the three-layer layout cascade,
//! rebase/last-writer-wins conflict merge, an append-only audit log, and
//! non-destructive rollback.
//!
//! Everything here is, like `core-vm`, a pure value transformer: every
//! mutator takes `&T` and returns an owned `T` (or a `GovernanceOutcome<T>`
//! wrapping one), never a `Result`/`?` chain — refusals are data, per §7.
//! This crate has no dependency on `core-ir`/`core-heap`/`core-vm`; the
//! two engines compose only at the host application, never through a Rust
//! dependency edge (see SPEC_FULL.md §1A).

pub mod audit;
pub mod can;
pub mod capability;
pub mod cascade;
pub mod hash;
pub mod merge;
pub mod override_layer;
pub mod panel;
pub mod reason;
pub mod rollback;
pub mod role;
pub mod template;

pub use audit::{
    compute_audit_delta, create_audit_entry, create_audit_entry_from_delta, new_entry_id,
    verify_log_integrity, AuditAction, LayoutAuditEntry, ALL_AUDIT_ACTIONS,
    VERSION_NO_INCREMENT_ACTIONS, VERSION_INCREMENT_TRIGGERS,
};
pub use can::{can, can_all, can_any, can_modify_panel, CapabilityCheck, DenialCode, PanelLockContext};
pub use capability::{is_valid_capability, permitted_actions, Capability};
pub use cascade::{resolve_layout, resolve_layout_with_validation, MergeWarning};
pub use merge::{
    compare_sync_state, compare_versions, merge_overrides, rebase_and_resolve_conflict,
    rebase_overrides, RebaseResult, SyncState, VersionComparison,
};
pub use override_layer::{clear_all_overrides, clear_override, create_override, set_override, UserLayoutOverride};
pub use panel::{
    default_panel_modes, is_valid_panel_id, is_valid_view_mode, PanelId, PanelModeMap, ViewMode,
    CANONICAL_PANEL_ORDER,
};
pub use reason::{GovernanceOutcome, GovernanceReason};
pub use rollback::{perform_rollback, reconstruct_template_at_version, verify_rollback_integrity};
pub use role::{is_valid_role, ProjectRole, ALL_ROLES};
pub use template::{
    create_template, lock_panels, publish_draft, reset_template, rollback_template, update_template,
    validate_version_for_update, verify_version_integrity, ProjectTemplateLayout, VersionCheck,
};
