//! `can`/`canAll`/`canAny`/`canModifyPanel` (§4.8, C9): the single entry
//! point for capability checks. Never panics, never returns an exception —
//! every outcome, including malformed input, is a value (§7 "governance
//! errors are always returned as values").

use std::collections::BTreeSet;

use crate::capability::Capability;
use crate::panel::PanelId;
use crate::role::ProjectRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialCode {
    UnknownRole,
    UnknownCapability,
    InsufficientRole,
    PanelLocked,
}

impl DenialCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialCode::UnknownRole => "unknown_role",
            DenialCode::UnknownCapability => "unknown_capability",
            DenialCode::InsufficientRole => "insufficient_role",
            DenialCode::PanelLocked => "panel_locked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityCheck {
    pub granted: bool,
    pub code: Option<DenialCode>,
    pub reason: Option<String>,
}

impl CapabilityCheck {
    fn granted() -> Self {
        Self {
            granted: true,
            code: None,
            reason: None,
        }
    }

    fn denied(code: DenialCode, reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            code: Some(code),
            reason: Some(reason.into()),
        }
    }
}

/// Optional lock gate (§4.8): if `panel_id` names a panel in
/// `locked_panels`, the check is denied regardless of role, applied *after*
/// the matrix check passes.
#[derive(Debug, Clone, Copy)]
pub struct PanelLockContext<'a> {
    pub panel_id: &'a str,
    pub locked_panels: &'a BTreeSet<PanelId>,
}

/// The sole entry point for capability checks (§4.8). Accepts raw strings
/// for `role`/`capability` because the governance layer's callers (a UI, a
/// sync transport) speak JSON, not Rust enums; malformed input is reported
/// as a denial, never a panic.
pub fn can(role: &str, capability: &str, context: Option<PanelLockContext<'_>>) -> CapabilityCheck {
    let Ok(role) = role.parse::<ProjectRole>() else {
        return CapabilityCheck::denied(DenialCode::UnknownRole, format!("unknown role {role:?}"));
    };
    let Ok(capability) = capability.parse::<Capability>() else {
        return CapabilityCheck::denied(
            DenialCode::UnknownCapability,
            format!("unknown capability {capability:?}"),
        );
    };

    if role < capability.minimum_role() {
        tracing::debug!(
            role = role.as_str(),
            capability = capability.as_str(),
            required = capability.minimum_role().as_str(),
            "capability check refused: insufficient role"
        );
        return CapabilityCheck::denied(
            DenialCode::InsufficientRole,
            format!(
                "{} requires at least {}",
                capability.as_str(),
                capability.minimum_role().as_str()
            ),
        );
    }

    if let Some(ctx) = context {
        if let Ok(panel) = ctx.panel_id.parse::<PanelId>() {
            if ctx.locked_panels.contains(&panel) {
                tracing::debug!(panel = panel.as_str(), "capability check refused: panel locked");
                return CapabilityCheck::denied(
                    DenialCode::PanelLocked,
                    format!("panel {:?} is locked", panel.as_str()),
                );
            }
        }
    }

    CapabilityCheck::granted()
}

/// Short-circuits on the first denial.
pub fn can_all(
    role: &str,
    capabilities: &[&str],
    context: Option<PanelLockContext<'_>>,
) -> CapabilityCheck {
    for capability in capabilities {
        let check = can(role, capability, context);
        if !check.granted {
            return check;
        }
    }
    CapabilityCheck::granted()
}

/// Passes on the first grant; otherwise reports the last denial seen.
pub fn can_any(
    role: &str,
    capabilities: &[&str],
    context: Option<PanelLockContext<'_>>,
) -> CapabilityCheck {
    let mut last = CapabilityCheck::denied(DenialCode::UnknownCapability, "no capabilities given");
    for capability in capabilities {
        let check = can(role, capability, context);
        if check.granted {
            return check;
        }
        last = check;
    }
    last
}

/// Convenience wrapper used by the override/template layers: "can `role`
/// exercise `capability` against `panel_id`, given the template's current
/// lock set?"
pub fn can_modify_panel(
    role: &str,
    capability: &str,
    panel_id: &str,
    locked_panels: &BTreeSet<PanelId>,
) -> CapabilityCheck {
    can(
        role,
        capability,
        Some(PanelLockContext {
            panel_id,
            locked_panels,
        }),
    )
}
