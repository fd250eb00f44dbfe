//! Sequential dispatch of transfer items
//!
//! Items are pulled from the resolver one at a time and each is handed to
//! the object store before the next one is requested. The first failure
//! stops the run; items already transferred are left in place.

use futures::stream::{BoxStream, TryStreamExt};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::filter::GlobFilter;
use crate::plan::Plan;
use crate::resolve::{Locator, TransferItem, resolve};
use crate::traits::{LocalLister, ObjectInfo, ObjectStore};

/// Receives progress notifications while items are dispatched
pub trait TransferObserver: Send + Sync {
    /// Called before the store is invoked for `item`
    fn on_start(&self, _item: &TransferItem) {}

    /// Called after `item` completed. `info` is `None` for deletes and dry runs.
    fn on_complete(&self, _item: &TransferItem, _info: Option<&ObjectInfo>) {}
}

impl TransferObserver for () {}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    /// Items completed
    pub items: usize,
    /// Bytes reported by the store for completed transfers
    pub bytes: u64,
}

/// Drives transfer items into an `ObjectStore`
pub struct Dispatcher<'a> {
    store: &'a dyn ObjectStore,
    observer: &'a dyn TransferObserver,
    dry_run: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            observer: &(),
            dry_run: false,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn TransferObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Report items without touching the store
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolve `plan` and dispatch every accepted item
    pub async fn run_plan(
        &self,
        plan: &Plan,
        recursive: bool,
        filter: &GlobFilter,
        lister: &dyn LocalLister,
    ) -> Result<TransferSummary> {
        tracing::debug!(?plan, recursive, "Starting run");
        let items = resolve(plan, recursive, filter, self.store, lister);
        self.run(items).await
    }

    /// Dispatch items in order, stopping at the first error
    pub async fn run(&self, mut items: BoxStream<'_, Result<TransferItem>>) -> Result<TransferSummary> {
        let mut summary = TransferSummary::default();

        while let Some(item) = items.try_next().await? {
            self.observer.on_start(&item);

            let info = if self.dry_run {
                None
            } else {
                self.dispatch(&item).await?
            };

            summary.items += 1;
            if let Some(size) = info.as_ref().and_then(|i| i.size_bytes) {
                summary.bytes += size.max(0) as u64;
            }

            self.observer.on_complete(&item, info.as_ref());
        }

        Ok(summary)
    }

    /// Perform the single store call matching an item's locators
    pub async fn dispatch(&self, item: &TransferItem) -> Result<Option<ObjectInfo>> {
        match (&item.source, &item.target) {
            (Locator::Local(source), Some(Locator::Remote(target))) => {
                tracing::info!("Uploading {} to {}", source.display(), target);
                self.store.upload_file(source, target).await.map(Some)
            }
            (Locator::Remote(source), Some(Locator::Local(target))) => {
                tracing::info!("Downloading {} to {}", source, target.display());
                self.store.download_file(source, target).await.map(Some)
            }
            (Locator::Remote(source), Some(Locator::Remote(target))) => {
                tracing::info!("Copying {} to {}", source, target);
                self.store.copy_object(source, target).await.map(Some)
            }
            (Locator::Remote(target), None) => {
                tracing::info!("Deleting {}", target);
                self.store.delete_object(target).await.map(|()| None)
            }
            (Locator::Local(_), _) => Err(Error::InvalidArguments(
                "source or target must be a storage URI".into(),
            )),
        }
    }
}
