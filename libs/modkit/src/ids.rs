//! 24-character hexadecimal record identifiers.
//!
//! Layout: 4 bytes of big-endian Unix seconds followed by 8 random bytes,
//! hex-encoded in lower case. Ids created in later seconds sort after earlier ones.

use chrono::Utc;

pub const HEX_ID_LEN: usize = 24;

/// Generate a new identifier.
pub fn new_hex_id() -> String {
    let secs = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..].copy_from_slice(&rand::random::<[u8; 8]>());
    hex::encode(bytes)
}

/// Parse a user-supplied identifier, normalizing to lower case.
pub fn parse_hex_id(raw: &str) -> Option<String> {
    if raw.len() == HEX_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(raw.to_ascii_lowercase())
    } else {
        None
    }
}
