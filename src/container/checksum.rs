//! Component digests
//!
//! - blob CRC32 (IEEE polynomial), written as `crc32:xxxxxxxx`
//! - component SHA-256, written as 64 lowercase hex characters

use crc32fast::Hasher;
use sha2::{Digest, Sha256};

/// CRC32 of `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a CRC32 as `crc32:xxxxxxxx` (lowercase, zero-padded)
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses `crc32:xxxxxxxx`; `None` if malformed
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let stripped = formatted.strip_prefix("crc32:")?;
    if stripped.len() != 8 {
        return None;
    }
    u32::from_str_radix(stripped, 16).ok()
}

/// SHA-256 of `data` as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
