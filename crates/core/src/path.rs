//! Endpoint parsing
//!
//! Remote endpoints use the format `s3://bucket[/key]`. Anything else is a
//! local filesystem path and is passed through as-is.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::key::normalize_key;

/// URI scheme marking a remote endpoint
pub const SCHEME: &str = "s3://";

/// A bucket and normalized key in the object store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    /// Bucket name, never empty
    pub bucket: String,
    /// Normalized object key (empty for bucket root)
    pub key: String,
}

impl RemotePath {
    /// Create a new RemotePath, normalizing the key
    pub fn new(bucket: impl Into<String>, key: &str) -> Self {
        Self {
            bucket: bucket.into(),
            key: normalize_key(key),
        }
    }

    /// Create a RemotePath for a key exactly as listed, without normalization
    pub fn raw(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether this addresses the bucket root
    pub fn is_root(&self) -> bool {
        self.key.is_empty()
    }

    /// Re-base a relative path under this key.
    ///
    /// Joins with a single `/`; a root key yields the relative path verbatim.
    pub fn join(&self, relative: &str) -> Self {
        let key = if self.key.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.key, relative)
        };
        Self {
            bucket: self.bucket.clone(),
            key,
        }
    }

    /// Full URI (s3://bucket/key)
    pub fn to_uri(&self) -> String {
        if self.key.is_empty() {
            format!("{SCHEME}{}", self.bucket)
        } else {
            format!("{SCHEME}{}/{}", self.bucket, self.key)
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

/// A classified source or target reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Local filesystem path
    Local(PathBuf),
    /// Object store location
    Remote(RemotePath),
}

impl Endpoint {
    /// Check if this is a remote endpoint
    pub fn is_remote(&self) -> bool {
        matches!(self, Endpoint::Remote(_))
    }

    /// Check if this is a local endpoint
    pub fn is_local(&self) -> bool {
        matches!(self, Endpoint::Local(_))
    }

    pub fn as_remote(&self) -> Option<&RemotePath> {
        match self {
            Endpoint::Remote(p) => Some(p),
            Endpoint::Local(_) => None,
        }
    }

    pub fn as_local(&self) -> Option<&PathBuf> {
        match self {
            Endpoint::Local(p) => Some(p),
            Endpoint::Remote(_) => None,
        }
    }
}

/// Whether a (trimmed) value names a remote endpoint
pub fn is_remote(value: &str) -> bool {
    value.starts_with(SCHEME)
}

/// Parse a value into an Endpoint.
///
/// The value is trimmed first. Blank values fail with `MissingArgument`
/// naming `what`.
pub fn parse_endpoint(value: &str, what: &str) -> Result<Endpoint> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingArgument(what.to_string()));
    }

    if is_remote(value) {
        parse_remote(value).map(Endpoint::Remote)
    } else {
        Ok(Endpoint::Local(PathBuf::from(value)))
    }
}

/// Parse an `s3://bucket[/key]` URI
pub fn parse_remote(value: &str) -> Result<RemotePath> {
    let value = value.trim();
    let rest = value.strip_prefix(SCHEME).ok_or_else(|| {
        Error::InvalidArguments(format!("'{value}' is not a storage URI ({SCHEME}bucket/key)"))
    })?;

    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));

    if bucket.is_empty() {
        return Err(Error::InvalidArguments(format!(
            "'{value}' has no bucket name"
        )));
    }

    Ok(RemotePath::new(bucket, key))
}
