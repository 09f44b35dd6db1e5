//! Request path classification.
//!
//! A browsing path is `<mount>`, `<mount>/<store>` or `<mount>/<store>/<key>`.
//! Segments are percent-decoded before splitting, so a key that itself
//! contains `/` cannot be addressed.

/// Browsing mode selected by a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowsePath {
    /// `<mount>` or `<mount>/`
    Stores,
    /// `<mount>/<store>`
    Keys(String),
    /// `<mount>/<store>/<key>`
    Value(String, String),
    Malformed,
}

impl BrowsePath {
    /// Classify `path` against an already normalised `mount`.
    pub fn parse(mount: &str, path: &str) -> Self {
        let Some(rest) = path.strip_prefix(mount) else {
            return BrowsePath::Malformed;
        };

        // `/kvwebx` shares the prefix but is not under the mount.
        let rest = match rest.strip_prefix('/') {
            Some(rest) => rest,
            None if rest.is_empty() => return BrowsePath::Stores,
            None => return BrowsePath::Malformed,
        };
        if rest.is_empty() {
            return BrowsePath::Stores;
        }

        let Ok(decoded) = urlencoding::decode(rest) else {
            return BrowsePath::Malformed;
        };

        // A trailing slash is only tolerated after the store segment.
        let segments: Vec<&str> = decoded.split('/').collect();
        match segments.as_slice() {
            [store] | [store, ""] if !store.is_empty() => BrowsePath::Keys((*store).to_string()),
            [store, key] if !store.is_empty() && !key.is_empty() => {
                BrowsePath::Value((*store).to_string(), (*key).to_string())
            }
            _ => BrowsePath::Malformed,
        }
    }
}

/// Normalise a configured mount prefix: leading `/`, no trailing `/`.
///
/// The root mount (`""` or `"/"`) normalises to the empty string.
pub fn normalize_mount(mount: &str) -> String {
    let trimmed = mount.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
