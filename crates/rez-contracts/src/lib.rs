//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O: CLI reports and the value wire format consumed by
//! the native entry points.

pub const REZ_CONCAT_REPORT_SCHEMA_VERSION: &str = "rez.concat.report@0.1.0";
pub const REZ_HTML_REPORT_SCHEMA_VERSION: &str = "rez.html.report@0.1.0";
pub const REZ_EXPORTS_REPORT_SCHEMA_VERSION: &str = "rez.exports.report@0.1.0";

/// Leading bytes of every encoded value document.
pub const REZ_WIRE_MAGIC: &[u8; 4] = b"RZV1";
