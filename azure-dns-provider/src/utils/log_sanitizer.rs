//! Log sanitization utilities
//!
//! Keeps client secrets and bearer tokens out of logs and bounds the size of
//! logged response bodies (record set listings can be large).

/// Maximum number of bytes of a body included in log output.
const TRUNCATE_LIMIT: usize = 512;

/// Number of leading characters of a secret left visible.
const MASK_VISIBLE: usize = 4;

/// Largest char boundary not above `index` (`str::floor_char_boundary` needs 1.91).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a body for logging, noting the total length when cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a secret, keeping only its first few characters.
///
/// Short secrets are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= MASK_VISIBLE * 2 {
        "****".to_string()
    } else {
        let visible: String = secret.chars().take(MASK_VISIBLE).collect();
        format!("{visible}****")
    }
}
