//! `ProjectRole` (§3.2). The four roles form the strict subset chain
//! `viewer ⊂ maintainer ⊂ instructor ⊂ owner` that `capability.rs` builds
//! its matrix on; ordering here (derived from declaration order) is what
//! lets `can()` compare "does this role meet the minimum" with a single
//! `>=`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Viewer,
    Maintainer,
    Instructor,
    Owner,
}

pub const ALL_ROLES: [ProjectRole; 4] = [
    ProjectRole::Viewer,
    ProjectRole::Maintainer,
    ProjectRole::Instructor,
    ProjectRole::Owner,
];

impl ProjectRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Viewer => "viewer",
            ProjectRole::Maintainer => "maintainer",
            ProjectRole::Instructor => "instructor",
            ProjectRole::Owner => "owner",
        }
    }
}

impl FromStr for ProjectRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ROLES
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

/// `isValidRole` (§6).
pub fn is_valid_role(s: &str) -> bool {
    s.parse::<ProjectRole>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_order_as_the_subset_chain() {
        assert!(ProjectRole::Viewer < ProjectRole::Maintainer);
        assert!(ProjectRole::Maintainer < ProjectRole::Instructor);
        assert!(ProjectRole::Instructor < ProjectRole::Owner);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(!is_valid_role("admin"));
        assert!(is_valid_role("owner"));
    }
}
