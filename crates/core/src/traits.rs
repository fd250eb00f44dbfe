//! Storage collaborator traits
//!
//! `ObjectStore` is the interface the traversal engine drives for listing
//! and per-item transfers. `LocalLister` enumerates local files for
//! recursive uploads. Both allow the engine to be tested without the SDK
//! or a real filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::RemotePath;

/// Metadata for a listed or transferred object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo with a known size
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: None,
            etag: None,
        }
    }

    /// Create a new ObjectInfo for a key only
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            etag: None,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResult {
    /// Listed objects
    pub items: Vec<ObjectInfo>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Trait for S3-compatible storage operations
///
/// Each transfer call completes (or fails) before it returns; the engine
/// issues them one at a time against a single long-lived instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys in a bucket, recursively (no delimiter)
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult>;

    /// Upload a local file to `target`
    async fn upload_file(&self, source: &Path, target: &RemotePath) -> Result<ObjectInfo>;

    /// Download `source` into a local file, creating parent directories
    async fn download_file(&self, source: &RemotePath, target: &Path) -> Result<ObjectInfo>;

    /// Server-side copy between two remote locations
    async fn copy_object(&self, source: &RemotePath, target: &RemotePath) -> Result<ObjectInfo>;

    /// Delete a single object
    async fn delete_object(&self, target: &RemotePath) -> Result<()>;
}

/// Files yielded by a `LocalLister`. Dropping it releases the walk.
pub type LocalFiles<'a> = Box<dyn Iterator<Item = Result<PathBuf>> + Send + 'a>;

/// Enumerates regular files under a local root
pub trait LocalLister: Send + Sync {
    /// List every file below `root`, directories excluded
    fn list_files<'a>(&'a self, root: &Path) -> Result<LocalFiles<'a>>;
}
