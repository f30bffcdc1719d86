//! Deterministic content hashing used to chain successive template/audit
//! versions (`previousHash`, §3.2). Not a security boundary — just a cheap
//! way to make "this history was not edited out from under us"
//! mechanically checkable, the same role a content hash plays in any
//! append-only log.

use sha2::{Digest, Sha256};

/// Hashes the canonical text form of an already-formatted record. Callers
/// build that text by joining their fields in a fixed order (see
/// `template::content_digest_input`, `audit::content_digest_input`) rather
/// than relying on any particular `serde` output, so the hash is stable
/// across serialisation format changes.
pub fn digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The hash chain's root value, used as `previousHash` for the first
/// version of any template or audit log.
pub fn genesis(seed: &str) -> String {
    digest(&format!("genesis:{seed}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(digest("abc"), digest("abc"));
        assert_ne!(digest("abc"), digest("abd"));
    }

    #[test]
    fn genesis_depends_on_seed() {
        assert_ne!(genesis("project-a"), genesis("project-b"));
    }
}
