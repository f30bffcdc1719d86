//! The seven fixed panels and two view modes (§3.2), plus the system
//! default layout every cascade resolution starts from (§4.10 step 1).
//!
//! `PanelId`'s declaration order *is* the canonical order required
//! throughout (`resolveLayout`, GC-style "sorted order" traversal, audit
//! delta iteration): deriving `Ord` from declaration order means a
//! `BTreeMap<PanelId, _>` iterates in canonical order for free.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelId {
    Memory,
    ControlFlow,
    Variables,
    Stack,
    Instructions,
    Narration,
    Output,
}

pub const CANONICAL_PANEL_ORDER: [PanelId; 7] = [
    PanelId::Memory,
    PanelId::ControlFlow,
    PanelId::Variables,
    PanelId::Stack,
    PanelId::Instructions,
    PanelId::Narration,
    PanelId::Output,
];

impl PanelId {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelId::Memory => "memory",
            PanelId::ControlFlow => "controlFlow",
            PanelId::Variables => "variables",
            PanelId::Stack => "stack",
            PanelId::Instructions => "instructions",
            PanelId::Narration => "narration",
            PanelId::Output => "output",
        }
    }
}

impl FromStr for PanelId {
    type Err = UnknownPanelId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CANONICAL_PANEL_ORDER
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPanelId(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel id: {0:?}")]
pub struct UnknownPanelId(pub String);

/// `isValidPanelId` (§6).
pub fn is_valid_panel_id(s: &str) -> bool {
    s.parse::<PanelId>().is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Learning,
    Pro,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Learning => "learning",
            ViewMode::Pro => "pro",
        }
    }
}

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning" => Ok(ViewMode::Learning),
            "pro" => Ok(ViewMode::Pro),
            other => Err(UnknownViewMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view mode: {0:?}")]
pub struct UnknownViewMode(pub String);

/// `isValidViewMode` (§6).
pub fn is_valid_view_mode(s: &str) -> bool {
    s.parse::<ViewMode>().is_ok()
}

/// A complete mapping from every `PanelId` to a `ViewMode` (§3.2). Backed by
/// a `BTreeMap` rather than a 7-element struct so the same type serves both
/// "always complete" uses (`ProjectTemplateLayout::panel_modes`, a resolved
/// layout) without a separate builder type — completeness is enforced by
/// `PanelModeMap::default()` and by construction helpers, not by the type
/// itself.
pub type PanelModeMap = BTreeMap<PanelId, ViewMode>;

/// The system default every cascade starts from (§4.10 step 1). This
/// project ships "learning" mode everywhere by default — an educational VM
/// should not greet a first-time user with the dense pro layout (see
/// DESIGN.md, "Open question: default panel modes").
pub fn default_panel_modes() -> PanelModeMap {
    CANONICAL_PANEL_ORDER
        .into_iter()
        .map(|p| (p, ViewMode::Learning))
        .collect()
}
