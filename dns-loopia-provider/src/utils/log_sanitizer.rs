//! Log sanitization utilities
//!
//! XML-RPC responses can be large (whole zone listings) and every request
//! carries the account password, so neither is ever logged verbatim.

/// Maximum number of bytes of a payload included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters left visible by [`mask_secret`].
const MASK_VISIBLE_CHARS: usize = 2;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a payload for logging, noting the original size when cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    format!(
        "{}... [truncated, total {} bytes]",
        &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
        s.len()
    )
}

/// Mask an identifier so only its first characters remain readable.
///
/// `"user@loopiaapi"` becomes `"us************"`; short values are fully masked.
pub fn mask_secret(s: &str) -> String {
    let total = s.chars().count();
    if total <= MASK_VISIBLE_CHARS * 2 {
        return "*".repeat(total);
    }
    let visible: String = s.chars().take(MASK_VISIBLE_CHARS).collect();
    format!("{visible}{}", "*".repeat(total - MASK_VISIBLE_CHARS))
}
