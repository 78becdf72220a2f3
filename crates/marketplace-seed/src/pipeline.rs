//! Seeding run orchestration.
//!
//! A run executes its stages strictly in order:
//!
//! 1. [`Stage::StagingReset`] empties the staging directory.
//! 2. [`Stage::StoreReset`] deletes every row in dependency order.
//! 3. [`Stage::Categories`] loads the category taxonomy.
//! 4. [`Stage::Actors`] creates the seller and the viewer pool.
//! 5. [`Stage::FixedProducts`] and [`Stage::RandomProducts`] run together.
//!
//! The first failure aborts the run. Nothing is rolled back; the next run's
//! reset stages clear whatever an aborted run left behind.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use mockable::Clock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span};

use crate::actors::load_actors;
use crate::catalogue::{DEFAULT_CATEGORY_TITLES, load_categories};
use crate::error::SeedError;
use crate::ports::{FixtureStore, FixtureStoreError, PasswordHasher, StoreTable};
use crate::products::{
    GenerationContext, ProductMaterializer, ProductPlan, fixed_product_plans,
    random_product_plans,
};
use crate::staging::{ImagePool, StagingArea};

/// Named pipeline stages, used as the `stage` field of each stage span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Empty the staging directory.
    StagingReset,
    /// Delete every stored row.
    StoreReset,
    /// Load the category taxonomy.
    Categories,
    /// Create the seller and viewers.
    Actors,
    /// Stage and write the flagship products.
    FixedProducts,
    /// Stage and write the random products.
    RandomProducts,
}

impl Stage {
    /// Stable snake_case stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StagingReset => "staging_reset",
            Self::StoreReset => "store_reset",
            Self::Categories => "categories",
            Self::Actors => "actors",
            Self::FixedProducts => "fixed_products",
            Self::RandomProducts => "random_products",
        }
    }

    fn span(self) -> tracing::Span {
        info_span!("seed_stage", stage = self.as_str())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows deleted from one table during the store reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReset {
    /// Table name.
    pub table: &'static str,
    /// Rows removed.
    pub deleted: u64,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// Seed the run RNG was built from. Re-running with it reproduces every
    /// generated value except view timestamps, which follow the clock.
    pub rng_seed: u64,
    /// Entries removed from the staging directory.
    pub stale_files_removed: usize,
    /// Per-table deletions, in reset order.
    pub deleted_rows: Vec<TableReset>,
    /// Categories created.
    pub category_count: usize,
    /// Viewers created, excluding the seller.
    pub viewer_count: usize,
    /// Flagship products created.
    pub fixed_product_count: usize,
    /// Random products created.
    pub random_product_count: usize,
    /// Views created across all products.
    pub view_count: usize,
    /// Files in the staging directory when the run finished.
    pub staged_files: BTreeSet<String>,
}

/// Deletes every row of every table in [`StoreTable::RESET_ORDER`].
///
/// # Errors
///
/// Returns the first [`FixtureStoreError`]; later tables are left untouched.
pub async fn reset_store<S>(store: &S) -> Result<Vec<TableReset>, FixtureStoreError>
where
    S: FixtureStore + ?Sized,
{
    let mut deleted_rows = Vec::with_capacity(StoreTable::RESET_ORDER.len());
    for table in StoreTable::RESET_ORDER {
        let deleted = store.delete_all(table).await?;
        debug!(%table, deleted, "table cleared");
        deleted_rows.push(TableReset {
            table: table.as_str(),
            deleted,
        });
    }
    Ok(deleted_rows)
}

/// Runs the full reset-and-populate sequence against one store and one
/// staging directory.
///
/// A pipeline assumes exclusive access to both for the duration of a run.
pub struct SeedPipeline<S: ?Sized, H: ?Sized> {
    store: Arc<S>,
    hasher: Arc<H>,
    staging: StagingArea,
    images: ImagePool,
    clock: Arc<dyn Clock>,
    rng_seed: Option<u64>,
    category_titles: Vec<String>,
}

impl<S, H> SeedPipeline<S, H>
where
    S: FixtureStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    /// Create a pipeline with the default category catalogue and a fresh
    /// seed per run.
    pub fn new(
        store: Arc<S>,
        hasher: Arc<H>,
        staging: StagingArea,
        images: ImagePool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            staging,
            images,
            clock,
            rng_seed: None,
            category_titles: DEFAULT_CATEGORY_TITLES
                .iter()
                .map(|title| (*title).to_owned())
                .collect(),
        }
    }

    /// Draw every random value from `seed`.
    #[must_use]
    pub const fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Replace the category catalogue. Titles must slugify distinctly.
    #[must_use]
    pub fn with_category_titles(mut self, titles: Vec<String>) -> Self {
        self.category_titles = titles;
        self
    }

    /// Executes one run.
    ///
    /// # Errors
    ///
    /// Returns the first [`SeedError`] raised by any stage. Stages after the
    /// failing one do not start; work already done is kept.
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        let rng_seed = self.rng_seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        info!(seed = rng_seed, staging = %self.staging.path(), "seeding run started");

        let stale_files_removed = async {
            let removed = self.staging.reset().await?;
            info!(removed, "stage complete");
            Ok::<_, SeedError>(removed)
        }
        .instrument(Stage::StagingReset.span())
        .await?;

        let deleted_rows = async {
            let deleted = reset_store(self.store.as_ref()).await?;
            let total: u64 = deleted.iter().map(|entry| entry.deleted).sum();
            info!(deleted = total, "stage complete");
            Ok::<_, SeedError>(deleted)
        }
        .instrument(Stage::StoreReset.span())
        .await?;

        let categories = async {
            let created =
                load_categories(self.store.as_ref(), &self.category_titles, &mut rng).await?;
            info!(count = created.len(), "stage complete");
            Ok::<_, SeedError>(created)
        }
        .instrument(Stage::Categories.span())
        .await?;

        let actors = async {
            let created = load_actors(self.store.as_ref(), self.hasher.as_ref(), &mut rng).await?;
            info!(viewers = created.viewers.len(), "stage complete");
            Ok::<_, SeedError>(created)
        }
        .instrument(Stage::Actors.span())
        .await?;

        let ctx = GenerationContext {
            seller: &actors.seller,
            viewers: &actors.viewers,
            categories: &categories,
            images: &self.images,
            now: self.clock.utc(),
        };
        let fixed_plans = fixed_product_plans(&mut rng, &ctx)?;
        let random_plans = random_product_plans(&mut rng, &ctx)?;
        let view_count = count_views(&fixed_plans) + count_views(&random_plans);

        let materializer = ProductMaterializer::new(
            Arc::clone(&self.store),
            self.staging.clone(),
            self.images.clone(),
        );
        let (fixed, random) = tokio::try_join!(
            materialize_stage(&materializer, Stage::FixedProducts, fixed_plans),
            materialize_stage(&materializer, Stage::RandomProducts, random_plans),
        )?;

        let staged_files = self.staging.file_names().await?;
        let report = SeedReport {
            rng_seed,
            stale_files_removed,
            deleted_rows,
            category_count: categories.len(),
            viewer_count: actors.viewers.len(),
            fixed_product_count: fixed,
            random_product_count: random,
            view_count,
            staged_files,
        };
        info!(
            seed = report.rng_seed,
            categories = report.category_count,
            viewers = report.viewer_count,
            fixed = report.fixed_product_count,
            random = report.random_product_count,
            views = report.view_count,
            "seeding run finished"
        );
        Ok(report)
    }
}

async fn materialize_stage<S>(
    materializer: &ProductMaterializer<S>,
    stage: Stage,
    plans: Vec<ProductPlan>,
) -> Result<usize, SeedError>
where
    S: FixtureStore + ?Sized,
{
    async {
        let created = materializer.materialize_all(plans).await?;
        info!(count = created.len(), "stage complete");
        Ok(created.len())
    }
    .instrument(stage.span())
    .await
}

fn count_views(plans: &[ProductPlan]) -> usize {
    plans.iter().map(|plan| plan.bundle.views.len()).sum()
}
