//! Operation classification
//!
//! Turns raw command-line endpoints into a `Plan`: which direction the
//! transfer runs in and the parsed roots on each side.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::path::{Endpoint, RemotePath, is_remote, parse_endpoint, parse_remote};

/// Transfer direction derived from a source/target pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Local file(s) to the object store
    Upload,
    /// Object store to local file(s)
    Download,
    /// Object store to object store
    Copy,
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationMode::Upload => "upload",
            OperationMode::Download => "download",
            OperationMode::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Classify a source/target pair.
///
/// Both values are trimmed before inspection.
pub fn classify(source: &str, target: &str) -> Result<OperationMode> {
    let source = source.trim();
    let target = target.trim();

    if source.is_empty() {
        return Err(Error::MissingArgument("source".into()));
    }
    if target.is_empty() {
        return Err(Error::MissingArgument("target".into()));
    }

    match (is_remote(source), is_remote(target)) {
        (false, true) => Ok(OperationMode::Upload),
        (true, false) => Ok(OperationMode::Download),
        (true, true) => Ok(OperationMode::Copy),
        (false, false) => Err(Error::InvalidArguments(
            "source or target must be a storage URI".into(),
        )),
    }
}

/// A classified operation with its parsed roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Upload { source: PathBuf, target: RemotePath },
    Download { source: RemotePath, target: PathBuf },
    Copy { source: RemotePath, target: RemotePath },
    Delete { target: RemotePath },
}

impl Plan {
    /// Build the plan for `cp <source> <target>`
    pub fn copy(source: &str, target: &str) -> Result<Self> {
        let mode = classify(source, target)?;
        let source = parse_endpoint(source, "source")?;
        let target = parse_endpoint(target, "target")?;

        let plan = match (mode, source, target) {
            (OperationMode::Upload, Endpoint::Local(source), Endpoint::Remote(target)) => {
                Plan::Upload { source, target }
            }
            (OperationMode::Download, Endpoint::Remote(source), Endpoint::Local(target)) => {
                Plan::Download { source, target }
            }
            (OperationMode::Copy, Endpoint::Remote(source), Endpoint::Remote(target)) => {
                Plan::Copy { source, target }
            }
            _ => {
                return Err(Error::InvalidArguments(
                    "source or target must be a storage URI".into(),
                ));
            }
        };

        Ok(plan)
    }

    /// Build the plan for `rm <path>`
    pub fn delete(path: &str) -> Result<Self> {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::MissingArgument("path".into()));
        }
        Ok(Plan::Delete {
            target: parse_remote(path)?,
        })
    }

    /// Transfer direction, `None` for deletes
    pub fn mode(&self) -> Option<OperationMode> {
        match self {
            Plan::Upload { .. } => Some(OperationMode::Upload),
            Plan::Download { .. } => Some(OperationMode::Download),
            Plan::Copy { .. } => Some(OperationMode::Copy),
            Plan::Delete { .. } => None,
        }
    }

    /// The remote root that gets listed in recursive mode
    pub fn remote_source(&self) -> Option<&RemotePath> {
        match self {
            Plan::Download { source, .. } | Plan::Copy { source, .. } => Some(source),
            Plan::Delete { target } => Some(target),
            Plan::Upload { .. } => None,
        }
    }

    /// Reject single-object plans that address a bucket root.
    ///
    /// Recursive plans may use the bucket root on either side.
    pub fn check_single(&self) -> Result<()> {
        let empty = |side: &str, path: &RemotePath| {
            Error::InvalidArguments(format!(
                "{side} '{path}' has no object key; use -r/--recursive for a prefix"
            ))
        };

        match self {
            Plan::Upload { target, .. } if target.is_root() => Err(empty("target", target)),
            Plan::Download { source, .. } if source.is_root() => Err(empty("source", source)),
            Plan::Copy { source, .. } if source.is_root() => Err(empty("source", source)),
            Plan::Copy { target, .. } if target.is_root() => Err(empty("target", target)),
            Plan::Delete { target } if target.is_root() => Err(empty("path", target)),
            _ => Ok(()),
        }
    }
}
