//! Object key normalization
//!
//! Keys coming from URIs and listings are normalized before any prefix
//! arithmetic: the bucket root is the empty string and trailing slashes
//! are dropped.

/// Normalize an object key.
///
/// Blank keys and the root marker `/` become the empty string; every
/// trailing `/` is stripped from anything else.
pub fn normalize_key(key: &str) -> String {
    if key.trim().is_empty() || key == "/" {
        return String::new();
    }
    key.trim_end_matches('/').to_string()
}

/// Listing prefix for a normalized key: empty for the bucket root,
/// otherwise the key with a single trailing `/`.
pub fn list_prefix(normalized: &str) -> String {
    if normalized.is_empty() {
        String::new()
    } else {
        format!("{normalized}/")
    }
}

/// Relative path of a listed key under `prefix`.
///
/// Returns `None` when the key does not live under the prefix or when
/// nothing remains after stripping it, which is the case for the
/// directory marker addressed by the prefix itself.
pub fn relative_key(prefix: &str, key: &str) -> Option<String> {
    let normalized = normalize_key(key);
    let relative = normalized.strip_prefix(prefix)?;
    if relative.is_empty() {
        None
    } else {
        Some(relative.to_string())
    }
}

/// Whether a key is a directory marker (`dir/`)
pub fn is_dir_marker(key: &str) -> bool {
    key.len() > 1 && key.ends_with('/')
}
