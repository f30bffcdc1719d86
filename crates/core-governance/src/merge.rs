//! Version-aware rebase and last-writer-wins conflict merge (§4.11, C12).
//!
//! `rebase_overrides` is the single place that decides whether a
//! previously-valid override entry survives a template change; both
//! `rebase_and_resolve_conflict` (multi-device LWW) and any host-driven
//! "template just published a new version" flow route through it, so lock
//! supremacy is enforced in one spot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::override_layer::UserLayoutOverride;
use crate::panel::{is_valid_panel_id, is_valid_view_mode, PanelId};
use crate::template::ProjectTemplateLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComparison {
    Current,
    Stale,
    Ahead,
}

/// `compareVersions` (§4.11).
pub fn compare_versions(override_: &UserLayoutOverride, template: &ProjectTemplateLayout) -> VersionComparison {
    if override_.base_version < template.layout_version {
        VersionComparison::Stale
    } else if override_.base_version > template.layout_version {
        VersionComparison::Ahead
    } else {
        VersionComparison::Current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    pub version: VersionComparison,
    pub in_sync: bool,
}

/// `compareSyncState` (§4.11): a convenience wrapper over `compare_versions`
/// for callers that just want a yes/no "does this device need to sync".
pub fn compare_sync_state(override_: &UserLayoutOverride, template: &ProjectTemplateLayout) -> SyncState {
    let version = compare_versions(override_, template);
    SyncState {
        version,
        in_sync: matches!(version, VersionComparison::Current),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebaseResult {
    pub override_: UserLayoutOverride,
    pub rebased: bool,
    pub dropped_panels: Vec<String>,
    pub version_comparison: VersionComparison,
}

/// `rebaseOverrides` (§4.11): drops an entry if its key is unknown, its
/// mode is invalid, or the panel is now locked in `new_template`; rewrites
/// `base_version` to the new template's version. `rebased` is true whenever
/// the version actually moved or any panel was dropped, so a host can tell
/// "nothing to do" apart from "we touched it but it came out identical".
pub fn rebase_overrides(
    override_: &UserLayoutOverride,
    new_template: &ProjectTemplateLayout,
    ts: DateTime<Utc>,
) -> RebaseResult {
    let version_comparison = compare_versions(override_, new_template);
    let mut kept = BTreeMap::new();
    let mut dropped_panels = Vec::new();

    for (raw_panel, raw_mode) in &override_.overrides {
        let valid_panel = is_valid_panel_id(raw_panel);
        let valid_mode = is_valid_view_mode(raw_mode);
        let locked = valid_panel
            && new_template
                .locked_panels
                .contains(&raw_panel.parse::<PanelId>().expect("validated above"));

        if !valid_panel || !valid_mode || locked {
            dropped_panels.push(raw_panel.clone());
            continue;
        }
        kept.insert(raw_panel.clone(), raw_mode.clone());
    }

    let version_changed = override_.base_version != new_template.layout_version;
    let rebased = version_changed || !dropped_panels.is_empty();

    let mut next = override_.clone();
    next.overrides = kept;
    next.base_version = new_template.layout_version;
    if rebased {
        next.last_synced_at = ts;
    }

    RebaseResult {
        override_: next,
        rebased,
        dropped_panels,
        version_comparison,
    }
}

/// `mergeOverrides` (§6): the raw last-writer-wins union of two raw
/// override maps, `primary` winning on key collision. Exposed standalone
/// because `rebase_and_resolve_conflict` is this plus a rebase pass, and a
/// host may want the union alone (e.g. to preview a merge before
/// committing it).
pub fn merge_overrides(
    primary: &BTreeMap<String, String>,
    secondary: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = secondary.clone();
    merged.extend(primary.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// `rebaseAndResolveConflict` (§4.11): last-writer-wins per panel, with
/// lock supremacy enforced by routing the unified override through
/// `rebase_overrides` afterward. Ties in `lastSyncedAt` favour `local`.
pub fn rebase_and_resolve_conflict(
    local: &UserLayoutOverride,
    remote: &UserLayoutOverride,
    template: &ProjectTemplateLayout,
    ts: DateTime<Utc>,
) -> RebaseResult {
    let local_is_primary = local.last_synced_at >= remote.last_synced_at;
    let (primary, secondary) = if local_is_primary {
        (local, remote)
    } else {
        (remote, local)
    };

    let merged_overrides = merge_overrides(&primary.overrides, &secondary.overrides);
    let base_version = local.base_version.max(remote.base_version);

    let mut unified = primary.clone();
    unified.overrides = merged_overrides;
    unified.base_version = base_version;

    rebase_overrides(&unified, template, ts)
}
