//! Utility modules.

/// Log sanitization utilities to keep secrets and large payloads out of logs.
pub mod log_sanitizer;
