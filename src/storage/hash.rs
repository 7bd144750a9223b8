use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a blob's bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute the SHA-256 hash of the given data.
    pub fn compute(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(hash.into())
    }

    /// Return the hash as a 64-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        let h1 = ContentHash::compute(b"profile photo bytes");
        let h2 = ContentHash::compute(b"profile photo bytes");
        assert_eq!(h1, h2);
    }

    #[test]
    fn compute_differs_for_different_data() {
        assert_ne!(ContentHash::compute(b"hello"), ContentHash::compute(b"world"));
    }

    #[test]
    fn hex_is_lowercase_sha256() {
        // sha256("abc")
        assert_eq!(
            ContentHash::compute(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn display_matches_to_hex() {
        let hash = ContentHash::compute(b"display test");
        assert_eq!(format!("{hash}"), hash.to_hex());
    }
}
