//! xfer-core: Core library for the xfer S3 copy/remove CLI
//!
//! This crate provides the path-resolution and traversal engine, including:
//! - Key normalization and glob filtering of relative paths
//! - Endpoint parsing and operation classification
//! - Lazy recursive resolution of transfer items
//! - Sequential dispatch against an `ObjectStore`
//! - Configuration management
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod key;
pub mod local;
pub mod path;
pub mod plan;
pub mod resolve;
pub mod traits;

pub use config::{Config, ConfigManager, StorageConfig};
pub use dispatch::{Dispatcher, TransferObserver, TransferSummary};
pub use error::{Error, Result};
pub use filter::{FilterSpec, GlobFilter, GlobPattern};
pub use key::{list_prefix, normalize_key, relative_key};
pub use local::FsLister;
pub use path::{Endpoint, RemotePath, parse_endpoint, parse_remote};
pub use plan::{OperationMode, Plan, classify};
pub use resolve::{Locator, TransferItem, resolve};
pub use traits::{ListOptions, ListResult, LocalLister, ObjectInfo, ObjectStore};
