//! Refusal reasons (§4.15 "governance operations never use `Result`/`?`:
//! every refusable operation returns an explicit outcome value"). Kept as a
//! distinct taxonomy from `core_ir::VmError` because a governance refusal
//! is ordinary data a caller branches on, not an exceptional condition.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GovernanceReason {
    #[error("insufficient role: {0}")]
    InsufficientRole(String),
    #[error("panel is locked: {0}")]
    PanelLocked(String),
    #[error("unknown panel id: {0}")]
    UnknownPanelId(String),
    #[error("client version {client} is stale against current {current}")]
    StaleVersion { client: u64, current: u64 },
    #[error("client version {client} is ahead of current {current}")]
    VersionAhead { client: u64, current: u64 },
    #[error("version {0} not found in history")]
    VersionNotFound(u64),
    #[error("rollback target {target} must be in [1, {current})")]
    InvalidRollbackTarget { target: u64, current: u64 },
    #[error("history is empty")]
    EmptyHistory,
    #[error("{0}")]
    Other(String),
}

/// `{ok:true, ...}` / `{ok:false, reason}` (§4.9–§4.13, §7). Generic over
/// the success payload so templates, overrides, and rollback reconstruction
/// all share one outcome shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GovernanceOutcome<T> {
    pub ok: bool,
    pub value: Option<T>,
    pub reason: Option<GovernanceReason>,
}

impl<T> GovernanceOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            ok: true,
            value: Some(value),
            reason: None,
        }
    }

    pub fn err(reason: GovernanceReason) -> Self {
        Self {
            ok: false,
            value: None,
            reason: Some(reason),
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}
