//! Fingerprint of the subframe list a report was computed from.

use sha2::{Digest, Sha256};

use crate::core::domain::Subframe;

/// SHA-256 over each subframe's file name, exposure and filter, in order.
///
/// Two reports with the same checksum were measured on the same ordered
/// input; directory moves do not change it.
pub fn subframes_checksum(subframes: &[Subframe]) -> String {
    let mut hasher = Sha256::new();
    for sub in subframes {
        hasher.update(sub.file_name().as_bytes());
        hasher.update(b"\t");
        hasher.update(format!("{:.3}", sub.exposure.value()).as_bytes());
        hasher.update(b"\t");
        hasher.update(sub.filter.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
