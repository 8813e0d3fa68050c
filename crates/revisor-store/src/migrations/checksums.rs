//! Checksum validation for migrations
//!
//! A SHA256 checksum of the DDL records which configuration created a table

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
