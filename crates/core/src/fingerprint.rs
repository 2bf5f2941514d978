//! De-duplication fingerprint.
//!
//! Hashes the fields that define submission intent. Company and locale are
//! deliberately excluded: the same person resubmitting with a corrected
//! company name or a different language still counts as a duplicate.

use sha2::{Digest, Sha256};

use crate::types::SanitizedSubmission;

pub fn fingerprint(sub: &SanitizedSubmission) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sub.name.as_bytes());
    hasher.update(b"|");
    hasher.update(sub.email.as_bytes());
    hasher.update(b"|");
    hasher.update(sub.phone.as_bytes());
    hasher.update(b"|");
    hasher.update(sub.interest.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
