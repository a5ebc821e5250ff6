//! Request path → filesystem path resolution.
//!
//! # Responsibilities
//! - Strip query/fragment and percent-decode the URL path
//! - Map `/`-separated segments onto host path components
//! - Append `index.html` for paths ending in `/`
//! - Keep every resolved path inside the served root
//!
//! # Design Decisions
//! - `..` is resolved lexically and may never climb above the root
//! - Decoded segments containing a separator or drive prefix are rejected
//! - Symlinks are checked after the file is known to exist (`confine`)

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::files::error::ServeError;

/// File served for directory requests.
pub const INDEX_FILE: &str = "index.html";

/// Absolute path of the file a request maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    path: PathBuf,
}

impl ResolvedTarget {
    /// Resolve a request URL (path plus optional query) against `root`.
    pub fn resolve(root: &Path, url: &str) -> Result<Self, ServeError> {
        let raw_path = url.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent_decode_str(raw_path)
            .decode_utf8()
            .map_err(|_| ServeError::MalformedPath(url.to_string()))?;

        if decoded.contains('\0') {
            return Err(ServeError::MalformedPath(url.to_string()));
        }

        let mut path = root.to_path_buf();
        let mut depth = 0usize;

        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if depth == 0 {
                        return Err(ServeError::OutsideRoot(url.to_string()));
                    }
                    path.pop();
                    depth -= 1;
                }
                segment => {
                    // A single URL segment must stay a single normal component.
                    let mut components = Path::new(segment).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(_)), None) => {}
                        _ => return Err(ServeError::OutsideRoot(url.to_string())),
                    }
                    path.push(segment);
                    depth += 1;
                }
            }
        }

        if decoded.is_empty() || decoded.ends_with('/') {
            path.push(INDEX_FILE);
        }

        Ok(Self { path })
    }

    /// The resolved absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the existing file still lives under `root` once symlinks are
    /// followed. `root` must already be canonical.
    pub async fn confine(&self, root: &Path) -> Result<(), ServeError> {
        let real = tokio::fs::canonicalize(&self.path)
            .await
            .map_err(|e| ServeError::io(&self.path, e))?;

        if real.starts_with(root) {
            Ok(())
        } else {
            Err(ServeError::OutsideRoot(self.path.display().to_string()))
        }
    }
}
