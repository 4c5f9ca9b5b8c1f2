use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

use crate::config::TableNames;
use crate::error::{RunFailure, SeedError};
use crate::logic::ingest::AssetIngest;
use crate::model::{generate_id, link_row_fields, Id, MenuItemSeed, SeedDataset};
use crate::store::traits::{BlobStore, RowStore};

/// The phase a run was in when it failed, for reporting. Phases run strictly
/// in this order; a run that returns `Ok` passed through all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Clearing,
    SeedingCategories,
    SeedingCustomisations,
    SeedingMenu,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Clearing => "clearing",
            Phase::SeedingCategories => "seeding categories",
            Phase::SeedingCustomisations => "seeding customisations",
            Phase::SeedingMenu => "seeding menu",
        };
        f.write_str(name)
    }
}

/// What a successful run did to the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub cleared_rows: usize,
    pub cleared_blobs: usize,
    pub categories: usize,
    pub customisations: usize,
    pub menu_items: usize,
    pub links: usize,
}

/// Drives the clear-and-reseed workflow:
/// wipe all four tables and the bucket, then create categories,
/// customisations, and menu items (images ingested first, link rows last),
/// carrying name → id maps between phases.
///
/// Each phase is a barrier: its operations run concurrently up to
/// `max_concurrency`, and the next phase starts only once all of them are
/// done. Any error aborts the run; there is no rollback, and the defined
/// recovery is a subsequent successful run. Concurrent runs against the same
/// project are unsafe; serializing them is the caller's job.
pub struct SeedOrchestrator {
    rows: Arc<dyn RowStore>,
    blobs: Arc<dyn BlobStore>,
    ingestor: Arc<dyn AssetIngest>,
    tables: TableNames,
    limiter: Semaphore,
    cancel: CancellationToken,
}

impl SeedOrchestrator {
    pub fn new(
        rows: Arc<dyn RowStore>,
        blobs: Arc<dyn BlobStore>,
        ingestor: Arc<dyn AssetIngest>,
        tables: TableNames,
        max_concurrency: usize,
    ) -> Self {
        Self {
            rows,
            blobs,
            ingestor,
            tables,
            limiter: Semaphore::new(max_concurrency.max(1)),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the run's cancellation token. Cancellation is observed
    /// between phases and before each unit of work; in-flight remote calls
    /// are left to finish.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, dataset: &SeedDataset) -> Result<SeedSummary, RunFailure> {
        info!(
            "starting seeding run: {} categories, {} customisations, {} menu items",
            dataset.categories.len(),
            dataset.customisations.len(),
            dataset.menu.len()
        );

        let (cleared_rows, cleared_blobs) = self
            .clear_all()
            .await
            .map_err(|e| RunFailure::new(Phase::Clearing, e))?;
        info!("cleared {cleared_rows} rows and {cleared_blobs} blobs");

        let category_ids = self.seed_categories(dataset).await?;
        info!("created {} categories", category_ids.len());

        let customisation_ids = self.seed_customisations(dataset).await?;
        info!("created {} customisations", customisation_ids.len());

        let (menu_ids, links) = self
            .seed_menu(dataset, &category_ids, &customisation_ids)
            .await?;
        info!("created {} menu items and {links} link rows", menu_ids.len());

        Ok(SeedSummary {
            cleared_rows,
            cleared_blobs,
            categories: category_ids.len(),
            customisations: customisation_ids.len(),
            menu_items: menu_ids.len(),
            links,
        })
    }

    fn checkpoint(&self) -> Result<(), SeedError> {
        if self.cancel.is_cancelled() {
            Err(SeedError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>, SeedError> {
        // The semaphore is only closed on shutdown.
        self.limiter.acquire().await.map_err(|_| SeedError::Cancelled)
    }

    /// Wipe all four tables, then the bucket. The tables have no
    /// interdependency at this point, so they clear concurrently. Blob
    /// clearing is driven by the bucket listing, which also removes stray
    /// objects a previously interrupted run left behind.
    ///
    /// One gate spans the whole phase: after the first failure no further
    /// deletion starts anywhere, but deletions whose request is already out
    /// run to completion before the error is surfaced.
    async fn clear_all(&self) -> Result<(usize, usize), SeedError> {
        self.checkpoint()?;
        let gate = CancellationToken::new();
        let tables = [
            self.tables.categories.as_str(),
            self.tables.customisations.as_str(),
            self.tables.menu.as_str(),
            self.tables.menu_customisations.as_str(),
        ];
        let results = join_all(tables.iter().map(|table| self.clear_table(table, &gate))).await;
        let counts = settle(results, |e| matches!(e, SeedError::Cancelled))?;
        let cleared_blobs = self.clear_bucket(&gate).await?;
        Ok((counts.iter().sum(), cleared_blobs))
    }

    async fn clear_table(&self, table: &str, gate: &CancellationToken) -> Result<usize, SeedError> {
        let rows = match self.rows.list_rows(table).await {
            Ok(rows) => rows,
            Err(e) => {
                gate.cancel();
                return Err(e.into());
            }
        };
        let count = rows.len();
        let results = join_all(rows.into_iter().map(|row| async move {
            self.checkpoint()?;
            if gate.is_cancelled() {
                return Err(SeedError::Cancelled);
            }
            let _permit = self.acquire().await?;
            if gate.is_cancelled() {
                return Err(SeedError::Cancelled);
            }
            self.rows.delete_row(table, &row.id).await.map_err(|e| {
                gate.cancel();
                SeedError::from(e)
            })
        }))
        .await;
        settle(results, |e| matches!(e, SeedError::Cancelled))?;
        debug!("cleared {count} rows from '{table}'");
        Ok(count)
    }

    async fn clear_bucket(&self, gate: &CancellationToken) -> Result<usize, SeedError> {
        let blobs = self.blobs.list_blobs().await?;
        let count = blobs.len();
        let results = join_all(blobs.into_iter().map(|blob| async move {
            self.checkpoint()?;
            if gate.is_cancelled() {
                return Err(SeedError::Cancelled);
            }
            let _permit = self.acquire().await?;
            if gate.is_cancelled() {
                return Err(SeedError::Cancelled);
            }
            self.blobs.delete_blob(&blob.id).await.map_err(|e| {
                gate.cancel();
                SeedError::from(e)
            })
        }))
        .await;
        settle(results, |e| matches!(e, SeedError::Cancelled))?;
        debug!("cleared {count} blobs from bucket");
        Ok(count)
    }

    /// Creates one row per category in dataset order. The returned map is
    /// the only record of the generated ids; the menu phase joins against it
    /// by `category_name`.
    async fn seed_categories(
        &self,
        dataset: &SeedDataset,
    ) -> Result<HashMap<String, Id>, RunFailure> {
        let mut ids = HashMap::new();
        for seed in &dataset.categories {
            self.checkpoint()
                .map_err(|e| RunFailure::on_entity(Phase::SeedingCategories, &seed.name, e))?;
            let row = self
                .rows
                .create_row(&self.tables.categories, &generate_id(), seed.row_fields())
                .await
                .map_err(|e| {
                    RunFailure::on_entity(Phase::SeedingCategories, &seed.name, e.into())
                })?;
            ids.insert(seed.name.clone(), row.id);
        }
        Ok(ids)
    }

    async fn seed_customisations(
        &self,
        dataset: &SeedDataset,
    ) -> Result<HashMap<String, Id>, RunFailure> {
        let mut ids = HashMap::new();
        for seed in &dataset.customisations {
            self.checkpoint()
                .map_err(|e| RunFailure::on_entity(Phase::SeedingCustomisations, &seed.name, e))?;
            let row = self
                .rows
                .create_row(
                    &self.tables.customisations,
                    &generate_id(),
                    seed.row_fields(),
                )
                .await
                .map_err(|e| {
                    RunFailure::on_entity(Phase::SeedingCustomisations, &seed.name, e.into())
                })?;
            ids.insert(seed.name.clone(), row.id);
        }
        Ok(ids)
    }

    /// Menu items are independent of each other and run concurrently under
    /// the limit; within one item the order is fixed by the data
    /// dependencies (image before row, row before link rows).
    ///
    /// The unit of in-flight work is one item: once an item's image has been
    /// ingested it runs through its row and link creates even if a sibling
    /// item has already failed, so the store never holds a menu row whose
    /// links were abandoned halfway. Items that have not started yet are not
    /// started after the first failure.
    async fn seed_menu(
        &self,
        dataset: &SeedDataset,
        category_ids: &HashMap<String, Id>,
        customisation_ids: &HashMap<String, Id>,
    ) -> Result<(HashMap<String, Id>, usize), RunFailure> {
        let gate = CancellationToken::new();
        let results = join_all(dataset.menu.iter().map(|item| {
            let gate = gate.clone();
            async move {
                let fail = |e| RunFailure::on_entity(Phase::SeedingMenu, &item.name, e);
                self.checkpoint().map_err(fail)?;
                if gate.is_cancelled() {
                    return Err(fail(SeedError::Cancelled));
                }
                let _permit = self.acquire().await.map_err(fail)?;
                if gate.is_cancelled() {
                    return Err(fail(SeedError::Cancelled));
                }
                self.seed_menu_item(item, category_ids, customisation_ids)
                    .await
                    .map_err(|e| {
                        gate.cancel();
                        fail(e)
                    })
            }
        }))
        .await;
        let results = settle(results, |f| matches!(f.error, SeedError::Cancelled))?;

        let mut menu_ids = HashMap::new();
        let mut links = 0;
        for (name, id, item_links) in results {
            menu_ids.insert(name, id);
            links += item_links;
        }
        Ok((menu_ids, links))
    }

    async fn seed_menu_item(
        &self,
        item: &MenuItemSeed,
        category_ids: &HashMap<String, Id>,
        customisation_ids: &HashMap<String, Id>,
    ) -> Result<(String, Id, usize), SeedError> {
        // An item without a valid image reference is invalid, so the image
        // goes first and its failure aborts the run.
        let image_url = self.ingestor.ingest(&item.image_url).await?;

        let category_id =
            category_ids
                .get(&item.category_name)
                .ok_or_else(|| SeedError::DatasetIntegrity {
                    kind: "category",
                    name: item.category_name.clone(),
                })?;

        let row = self
            .rows
            .create_row(
                &self.tables.menu,
                &generate_id(),
                item.row_fields(&image_url, category_id),
            )
            .await?;

        let mut links = 0;
        for customisation_name in &item.customisations {
            let customisation_id = customisation_ids.get(customisation_name).ok_or_else(|| {
                SeedError::DatasetIntegrity {
                    kind: "customisation",
                    name: customisation_name.clone(),
                }
            })?;
            self.rows
                .create_row(
                    &self.tables.menu_customisations,
                    &generate_id(),
                    link_row_fields(&row.id, customisation_id),
                )
                .await?;
            links += 1;
        }

        Ok((item.name.clone(), row.id, links))
    }
}

/// Collapse the settled results of one phase barrier. Every unit future has
/// already run to completion by the time this is called; the first real
/// error wins over the knock-on cancellations of units that never started.
fn settle<T, E>(results: Vec<Result<T, E>>, cancelled: impl Fn(&E) -> bool) -> Result<Vec<T>, E> {
    let mut values = Vec::with_capacity(results.len());
    let mut first_error: Option<E> = None;
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => {
                let keep = match &first_error {
                    None => true,
                    Some(existing) => cancelled(existing) && !cancelled(&error),
                };
                if keep {
                    first_error = Some(error);
                }
            }
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(values),
    }
}
