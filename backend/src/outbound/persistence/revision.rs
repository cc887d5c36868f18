//! Content fingerprints for stored blobs.

use sha2::{Digest, Sha256};

use crate::domain::ports::Revision;

/// SHA-256 of `contents`, hex encoded.
pub(crate) fn revision_of(contents: &str) -> Revision {
    Revision::new(hex::encode(Sha256::digest(contents.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_share_a_revision() {
        assert_eq!(revision_of("{}"), revision_of("{}"));
        assert_ne!(revision_of("{}"), revision_of("{ }"));
    }

    #[test]
    fn revision_is_lowercase_hex_sha256() {
        assert_eq!(
            revision_of("").as_ref(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
