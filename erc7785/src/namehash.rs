//! ENS namehash ([EIP-137]) and label hashing.
//!
//! The hash layer is case-sensitive. This crate applies a single
//! normalization rule (trim, then lower-case) at its boundary, so that the
//! write path and the read path always hash the same bytes.
//!
//! [EIP-137]: https://eips.ethereum.org/EIPS/eip-137

use alloy::primitives::{B256, Keccak256, keccak256};

/// Trim surrounding whitespace and lower-case the whole name.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `keccak256(utf8(label))`.
///
/// No normalization is applied; pass an already-normalized label.
#[must_use]
pub fn label_hash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// Compute the namehash of a dot-separated name.
///
/// The name is normalized first. The empty name is the root and hashes to
/// [`B256::ZERO`]. Labels are folded right to left:
/// `node = keccak256(node || keccak256(label))`.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    let name = normalize(name);
    if name.is_empty() {
        return B256::ZERO;
    }

    // `[node @ 0..32, label_hash @ 32..64]`
    let mut buffer = [0u8; 64];
    for label in name.rsplit('.') {
        buffer[32..].copy_from_slice(label_hash(label).as_slice());

        let mut hasher = Keccak256::new();
        hasher.update(buffer);
        buffer[..32].copy_from_slice(hasher.finalize().as_slice());
    }
    B256::from_slice(&buffer[..32])
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::*;

    #[test]
    fn root_is_zero() {
        assert_eq!(namehash(""), B256::ZERO, "empty name is the root");
        assert_eq!(namehash("   "), B256::ZERO, "whitespace trims to root");
    }

    #[test]
    fn known_vectors() {
        for (name, expected) in [
            (
                "eth",
                b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"),
            ),
            (
                "foo.eth",
                b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"),
            ),
            (
                "alice.eth",
                b256!("787192fc5378cc32aa956ddfdedbf26b24e8d78e40109add0eea2c1a012c3dec"),
            ),
            (
                "base.cid.eth",
                b256!("1e16f34c43f2046bde82808c3fc6f1ccda19f6846a4aa5e696099a6c1bc1c146"),
            ),
        ] {
            assert_eq!(namehash(name), expected, "namehash({name})");
        }
    }

    #[test]
    fn matches_manual_fold() {
        let concat = |a: B256, b: B256| {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(a.as_slice());
            buf[32..].copy_from_slice(b.as_slice());
            keccak256(buf)
        };
        let n1 = concat(B256::ZERO, keccak256("eth"));
        let n2 = concat(n1, keccak256("cid"));
        let n3 = concat(n2, keccak256("base"));

        assert_eq!(namehash("base.cid.eth"), n3, "fold order is right to left");
        assert_eq!(namehash("cid.eth"), n2, "parent node");
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(
            namehash("  Base.CID.eth "),
            namehash("base.cid.eth"),
            "namehash normalizes before hashing"
        );
        assert_ne!(
            label_hash("Base"),
            label_hash("base"),
            "label_hash itself is case-sensitive"
        );
    }

    #[test]
    fn deterministic_and_label_sensitive() {
        let a = namehash("base.cid.eth");
        assert_eq!(a, namehash("base.cid.eth"), "deterministic");
        for other in ["bass.cid.eth", "base.cie.eth", "base.cid.etc"] {
            assert_ne!(a, namehash(other), "altering a label changes the node: {other}");
        }
    }
}
