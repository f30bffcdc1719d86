//! The three-layer layout cascade (§4.10, C11): system default -> project
//! template -> user override, with lock supremacy. `resolve_layout` always
//! returns a complete 7-key map in canonical order; unknown panel ids and
//! invalid view modes in the raw override are silently dropped, with
//! `resolve_layout_with_validation` surfacing *why* as `MergeWarning`s.

use crate::override_layer::UserLayoutOverride;
use crate::panel::{default_panel_modes, PanelId, PanelModeMap, CANONICAL_PANEL_ORDER};
use crate::template::ProjectTemplateLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    UnknownOverridePanelId { panel_id: String },
    InvalidOverrideViewMode { panel_id: String, mode: String },
}

/// `resolveLayout` (§4.10). For every canonical `PanelId`: start from the
/// system default, take the template's value, and — unless the panel is
/// locked — let a valid override entry win.
pub fn resolve_layout(
    template: Option<&ProjectTemplateLayout>,
    override_: Option<&UserLayoutOverride>,
) -> PanelModeMap {
    resolve_layout_with_validation(template, override_).0
}

/// `resolveLayoutWithValidation` (§4.10): same resolution, plus the
/// diagnostics. `dropped_override_panel_ids` lists override entries that
/// were silenced specifically by a lock (distinct from entries silenced for
/// being unknown/invalid, which show up only as warnings) — they remain in
/// the override record, purely informational.
pub fn resolve_layout_with_validation(
    template: Option<&ProjectTemplateLayout>,
    override_: Option<&UserLayoutOverride>,
) -> (PanelModeMap, Vec<MergeWarning>, Vec<PanelId>) {
    let mut resolved = default_panel_modes();
    let mut warnings = Vec::new();
    let mut dropped_for_lock = Vec::new();

    if let Some(template) = template {
        for panel in CANONICAL_PANEL_ORDER {
            if let Some(mode) = template.panel_modes.get(&panel) {
                resolved.insert(panel, *mode);
            }
        }
    }

    let locked_panels = template.map(|t| &t.locked_panels);

    if let Some(override_) = override_ {
        for (raw_panel, raw_mode) in &override_.overrides {
            let Ok(panel) = raw_panel.parse::<PanelId>() else {
                warnings.push(MergeWarning::UnknownOverridePanelId {
                    panel_id: raw_panel.clone(),
                });
                continue;
            };
            if locked_panels.is_some_and(|locked| locked.contains(&panel)) {
                dropped_for_lock.push(panel);
                continue;
            }
            match raw_mode.parse() {
                Ok(mode) => {
                    resolved.insert(panel, mode);
                }
                Err(_) => warnings.push(MergeWarning::InvalidOverrideViewMode {
                    panel_id: raw_panel.clone(),
                    mode: raw_mode.clone(),
                }),
            }
        }
    }

    (resolved, warnings, dropped_for_lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::override_layer::create_override;
    use crate::panel::ViewMode;
    use crate::template::create_template;
    use chrono::{DateTime, Utc};

    fn ts(offset: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
    }

    #[test]
    fn resolve_layout_with_no_inputs_is_all_default() {
        let resolved = resolve_layout(None, None);
        assert_eq!(resolved.len(), 7);
        assert!(resolved.values().all(|m| *m == ViewMode::Learning));
    }

    #[test]
    fn scenario_governance_cascade_with_lock() {
        // §8 scenario 6.
        let mut template = create_template("proj-1", "owner-1", ts(0));
        template.panel_modes.insert(PanelId::Memory, ViewMode::Pro);
        template.locked_panels.insert(PanelId::Memory);

        let mut override_ = create_override("user-1", "proj-1", 1, "device-a", ts(1));
        override_
            .overrides
            .insert("memory".to_string(), "learning".to_string());
        override_.overrides.insert("stack".to_string(), "pro".to_string());

        let (resolved, _warnings, dropped) =
            resolve_layout_with_validation(Some(&template), Some(&override_));

        assert_eq!(resolved[&PanelId::Memory], ViewMode::Pro);
        assert_eq!(resolved[&PanelId::Stack], ViewMode::Pro);
        for panel in [
            PanelId::ControlFlow,
            PanelId::Variables,
            PanelId::Instructions,
            PanelId::Narration,
            PanelId::Output,
        ] {
            assert_eq!(resolved[&panel], ViewMode::Learning);
        }
        assert_eq!(dropped, vec![PanelId::Memory]);
    }

    #[test]
    fn unknown_and_invalid_override_entries_never_appear_in_output() {
        let template = create_template("proj-1", "owner-1", ts(0));
        let mut override_ = create_override("user-1", "proj-1", 1, "device-a", ts(1));
        override_
            .overrides
            .insert("not_a_panel".to_string(), "pro".to_string());
        override_
            .overrides
            .insert("stack".to_string(), "expert".to_string());

        let (resolved, warnings, _dropped) =
            resolve_layout_with_validation(Some(&template), Some(&override_));

        assert_eq!(resolved[&PanelId::Stack], ViewMode::Learning);
        assert_eq!(warnings.len(), 2);
    }
}
