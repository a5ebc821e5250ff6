//! Conditional request validation.
//!
//! Tokens are derived from `(mtime, size)` rather than content hashes: a
//! stat is enough to answer `If-None-Match` and the file body is never read
//! for a 304. Two files with identical mtime and size compare equal.

use std::fmt;
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// `Cache-Control` sent with every 200. Dev content is treated as immutable
/// for the lifetime of a run; clients revalidate with the ETag.
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Opaque validation token sent as `ETag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheToken(String);

impl CacheToken {
    /// Build a token from a modification time and a size.
    pub fn new(modified: Option<SystemTime>, size: u64) -> Self {
        let mtime_ms = modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self(format!("\"{:x}-{:x}\"", mtime_ms, size))
    }

    /// Build a token from file metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self::new(metadata.modified().ok(), metadata.len())
    }

    /// The header value, quotes included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an `If-None-Match` header value matches this token.
    ///
    /// Accepts a single tag, a comma-separated list, or `*`. Weak
    /// comparison is used, so `W/"x"` matches `"x"`.
    pub fn matches(&self, if_none_match: &str) -> bool {
        let ours = strip_weak(&self.0);
        if_none_match
            .split(',')
            .map(str::trim)
            .any(|tag| tag == "*" || strip_weak(tag) == ours)
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Compute the server token for `metadata` and check it against the
/// client's `If-None-Match`.
///
/// Returns `(token, is_fresh)`.
pub fn validate(metadata: &Metadata, client_token: Option<&str>) -> (CacheToken, bool) {
    let token = CacheToken::from_metadata(metadata);
    let fresh = client_token.is_some_and(|t| token.matches(t));
    (token, fresh)
}
