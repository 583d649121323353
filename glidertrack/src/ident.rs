//! Tracker address normalization.
//!
//! OGN devices appear on the feed under callsigns such as `FLRDDA5BA` or
//! `ICA3D2B51`, while users tend to type either the full callsign or just the
//! device address. Every lookup in the tracking store goes through
//! [`normalize`] so that both forms meet on the same key.

/// Number of trailing characters that make up a canonical identifier.
pub const CANONICAL_ID_LEN: usize = 6;

/// Canonicalize a raw tracker address.
///
/// Trims surrounding whitespace, uppercases, and keeps only the last
/// [`CANONICAL_ID_LEN`] characters of longer inputs. Empty input yields an
/// empty string; callers treat that as a usage error.
///
/// # Example
///
/// ```
/// use glidertrack::ident::normalize;
///
/// assert_eq!(normalize("  flarm1234ab "), "1234AB");
/// assert_eq!(normalize("dd5ba"), "DD5BA");
/// ```
pub fn normalize(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let len = upper.chars().count();
    if len <= CANONICAL_ID_LEN {
        return upper;
    }
    upper.chars().skip(len - CANONICAL_ID_LEN).collect()
}
