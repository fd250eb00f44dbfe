//! Recursive resolution of transfer items
//!
//! A `Plan` is expanded into a lazy stream of `TransferItem`s. Recursive
//! plans enumerate either the local root (uploads) or the remote prefix
//! (downloads, copies, deletes), compute each candidate's relative path
//! once, run it through the glob filter and re-base it onto the other
//! side. Items come out in the order the lister or listing yields them.

use std::path::{Component, Path, PathBuf};

use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::error::{Error, Result};
use crate::filter::GlobFilter;
use crate::key::{is_dir_marker, list_prefix, relative_key};
use crate::path::RemotePath;
use crate::plan::Plan;
use crate::traits::{ListOptions, LocalLister, ObjectInfo, ObjectStore};

/// Page size requested from the object store while listing
pub const LIST_PAGE_SIZE: i32 = 1000;

/// One side of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Local(PathBuf),
    Remote(RemotePath),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Local(path) => write!(f, "{}", path.display()),
            Locator::Remote(path) => write!(f, "{path}"),
        }
    }
}

/// A resolved (source, target) pair ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    pub source: Locator,
    /// `None` for deletes
    pub target: Option<Locator>,
    /// `/`-delimited path relative to the traversal root, used for filtering
    pub relative: String,
}

/// Expand a plan into the stream of accepted transfer items.
///
/// Non-recursive plans yield exactly one item and ignore the filter.
/// A listing error ends the stream with that error.
pub fn resolve<'a>(
    plan: &'a Plan,
    recursive: bool,
    filter: &'a GlobFilter,
    store: &'a dyn ObjectStore,
    lister: &'a dyn LocalLister,
) -> BoxStream<'a, Result<TransferItem>> {
    if !recursive {
        return stream::once(future::ready(single_item(plan))).boxed();
    }

    match plan {
        Plan::Upload { source, target } => local_items(source, target, filter, lister),
        Plan::Download { source, .. } | Plan::Copy { source, .. } => {
            remote_items(plan, source, filter, store)
        }
        Plan::Delete { target } => remote_items(plan, target, filter, store),
    }
}

fn single_item(plan: &Plan) -> Result<TransferItem> {
    plan.check_single()?;

    let item = match plan {
        Plan::Upload { source, target } => TransferItem {
            source: Locator::Local(source.clone()),
            target: Some(Locator::Remote(target.clone())),
            relative: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        },
        Plan::Download { source, target } => TransferItem {
            source: Locator::Remote(source.clone()),
            target: Some(Locator::Local(target.clone())),
            relative: last_segment(&source.key),
        },
        Plan::Copy { source, target } => TransferItem {
            source: Locator::Remote(source.clone()),
            target: Some(Locator::Remote(target.clone())),
            relative: last_segment(&source.key),
        },
        Plan::Delete { target } => TransferItem {
            source: Locator::Remote(target.clone()),
            target: None,
            relative: last_segment(&target.key),
        },
    };

    Ok(item)
}

fn last_segment(key: &str) -> String {
    key.rsplit('/').next().unwrap_or(key).to_string()
}

fn local_items<'a>(
    root: &'a Path,
    target: &'a RemotePath,
    filter: &'a GlobFilter,
    lister: &'a dyn LocalLister,
) -> BoxStream<'a, Result<TransferItem>> {
    let files = match lister.list_files(root) {
        Ok(files) => files,
        Err(e) => return stream::once(future::ready(Err(e))).boxed(),
    };

    stream::iter(files)
        .try_filter_map(move |path| future::ready(local_item(root, target, filter, path)))
        .boxed()
}

fn local_item(
    root: &Path,
    target: &RemotePath,
    filter: &GlobFilter,
    path: PathBuf,
) -> Result<Option<TransferItem>> {
    let relative = relative_path(root, &path).ok_or_else(|| {
        Error::ListingFailure(format!(
            "{} is not under {}",
            path.display(),
            root.display()
        ))
    })?;

    if relative.is_empty() {
        return Ok(None);
    }

    if !filter.accepts(&relative) {
        tracing::debug!(relative = %relative, "Filtered out");
        return Ok(None);
    }

    Ok(Some(TransferItem {
        source: Locator::Local(path),
        target: Some(Locator::Remote(target.join(&relative))),
        relative,
    }))
}

/// Relative path of `path` under `root`, joined with `/`.
///
/// `.` components are ignored on both sides so that `./a` and `a` agree.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let not_curdir = |c: &Component<'_>| !matches!(c, Component::CurDir);
    let mut components = path.components().filter(not_curdir);

    for expected in root.components().filter(not_curdir) {
        if components.next() != Some(expected) {
            return None;
        }
    }

    let parts: Vec<String> = components
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn remote_items<'a>(
    plan: &'a Plan,
    source: &'a RemotePath,
    filter: &'a GlobFilter,
    store: &'a dyn ObjectStore,
) -> BoxStream<'a, Result<TransferItem>> {
    let bucket = source.bucket.as_str();
    let prefix = list_prefix(&source.key);

    tracing::debug!(bucket = %bucket, prefix = %prefix, "Listing objects");

    // None: listing finished. Some(None): first page. Some(Some(token)): next page.
    let page_prefix = prefix.clone();
    let pages = stream::try_unfold(Some(None::<String>), move |state| {
        let prefix = page_prefix.clone();
        async move {
            let Some(continuation_token) = state else {
                return Ok::<_, Error>(None);
            };

            let options = ListOptions {
                prefix: (!prefix.is_empty()).then_some(prefix),
                max_keys: Some(LIST_PAGE_SIZE),
                continuation_token,
            };
            let page = store.list_objects(bucket, options).await?;

            let next = match (page.truncated, page.continuation_token) {
                (true, Some(token)) => Some(Some(token)),
                _ => None,
            };
            Ok::<_, Error>(Some((page.items, next)))
        }
    });

    pages
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<ObjectInfo, Error>)))
        .try_flatten()
        .try_filter_map(move |info| future::ready(remote_candidate(plan, &prefix, filter, info.key)))
        .boxed()
}

fn remote_candidate(
    plan: &Plan,
    prefix: &str,
    filter: &GlobFilter,
    key: String,
) -> Result<Option<TransferItem>> {
    let Some(relative) = relative_key(prefix, &key) else {
        tracing::debug!(key = %key, "Skipping key with empty relative path");
        return Ok(None);
    };

    if !filter.accepts(&relative) {
        tracing::debug!(key = %key, relative = %relative, "Filtered out");
        return Ok(None);
    }

    remote_item(plan, key, relative)
}

fn remote_item(plan: &Plan, key: String, relative: String) -> Result<Option<TransferItem>> {
    let item = match plan {
        Plan::Download { source, target } => {
            if is_dir_marker(&key) {
                tracing::debug!(key = %key, "Skipping directory marker");
                return Ok(None);
            }
            let local = rebase_local(target, &relative).ok_or_else(|| {
                Error::TransferFailure(format!(
                    "refusing to write '{key}' outside {}",
                    target.display()
                ))
            })?;
            TransferItem {
                source: Locator::Remote(RemotePath::raw(&source.bucket, key)),
                target: Some(Locator::Local(local)),
                relative,
            }
        }
        Plan::Copy { source, target } => {
            let mut dest = target.join(&relative);
            if is_dir_marker(&key) {
                dest.key.push('/');
            }
            TransferItem {
                source: Locator::Remote(RemotePath::raw(&source.bucket, key)),
                target: Some(Locator::Remote(dest)),
                relative,
            }
        }
        Plan::Delete { target } => TransferItem {
            source: Locator::Remote(RemotePath::raw(&target.bucket, key)),
            target: None,
            relative,
        },
        Plan::Upload { .. } => return Ok(None),
    };

    Ok(Some(item))
}

/// Join a `/`-delimited relative path onto a local root.
///
/// Returns `None` if a `..` segment would climb out of the root.
fn rebase_local(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}
