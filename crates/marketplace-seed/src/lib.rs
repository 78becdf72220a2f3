//! Consistent fixture generation for the marketplace store.
//!
//! This crate resets and repopulates a marketplace database with a snapshot
//! of synthetic data, staging the attachment files that product rows point
//! at. A run produces:
//!
//! - a fixed category taxonomy with slugs derived from titles
//! - one seller with literal credentials and a randomized viewer pool
//! - five flagship products with literal, stable identifiers
//! - a randomized long tail of ordinary products
//! - one staged attachment file per product, plus view history
//!
//! Persistence and password hashing are reached through the ports in
//! [`ports`], so the pipeline runs against PostgreSQL in production
//! ([`outbound::DieselFixtureStore`]) and against an in-memory double in
//! tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use camino::Utf8Path;
//! use marketplace_seed::outbound::{BcryptPasswordHasher, DbPool, DieselFixtureStore, PoolConfig};
//! use marketplace_seed::{ImagePool, SeedPipeline, StagingArea};
//! use mockable::DefaultClock;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
//! let pipeline = SeedPipeline::new(
//!     Arc::new(DieselFixtureStore::new(pool)),
//!     Arc::new(BcryptPasswordHasher::default()),
//!     StagingArea::open(Utf8Path::new("temp"))?,
//!     ImagePool::open(Utf8Path::new("fixtures/images"))?,
//!     Arc::new(DefaultClock),
//! );
//! let report = pipeline.run().await?;
//! assert_eq!(report.fixed_product_count, 5);
//! # Ok(())
//! # }
//! ```

mod actors;
mod catalogue;
pub mod config;
mod error;
pub mod identity;
pub mod outbound;
mod pipeline;
pub mod ports;
mod products;
mod records;
mod slug;
mod staging;
mod synthetic;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use actors::{Actors, VIEWER_POOL_MAX, VIEWER_POOL_MIN, load_actors};
pub use catalogue::{DEFAULT_CATEGORY_TITLES, load_categories};
pub use error::{GenerationError, SeedError, StagingError};
pub use pipeline::{SeedPipeline, SeedReport, Stage, TableReset, reset_store};
pub use products::{
    GenerationContext, ProductMaterializer, ProductPlan, RANDOM_PRODUCT_MAX, RANDOM_PRODUCT_MIN,
    VIEW_WINDOW_DAYS, fixed_product_plans, random_product_plans,
};
pub use records::{Attachment, Category, Product, ProductBundle, ProductStatus, User, View};
pub use slug::slugify;
pub use staging::{ImagePool, StagingArea};
