/*!
 * Content-addressed fingerprints for translated segments.
 */

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Separator placed between context and text before hashing
pub const FINGERPRINT_SEPARATOR: &str = "|||";

/// Number of hex characters kept from the digest
pub const FINGERPRINT_LENGTH: usize = 16;

/// Truncated lowercase-hex SHA-256 of `context ||| text`
///
/// The target language is not hashed in; it is a separate component of the
/// cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint a segment's context and text
pub fn fingerprint(context: &str, text: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(context.as_bytes());
    hasher.update(FINGERPRINT_SEPARATOR.as_bytes());
    hasher.update(text.as_bytes());

    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LENGTH);
    Fingerprint(hex)
}
