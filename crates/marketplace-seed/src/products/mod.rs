//! Product generation shared by the fixed and random generators.
//!
//! Generation happens in two phases. Planning draws every random value from
//! the run RNG and produces [`ProductPlan`]s without touching I/O.
//! Materializing stages each plan's attachment file and then writes the
//! product with its attachment and views. Plans are independent, so they are
//! materialized concurrently and joined with fail-fast semantics.

mod fixed;
mod random;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{GenerationError, SeedError};
use crate::identity::fresh_id;
use crate::ports::FixtureStore;
use crate::records::{Category, Product, ProductBundle, User, View};
use crate::staging::{ImagePool, StagingArea};
use crate::synthetic;

pub use fixed::fixed_product_plans;
pub use random::{RANDOM_PRODUCT_MAX, RANDOM_PRODUCT_MIN, random_product_plans};

/// Number of days view timestamps are backdated over.
pub const VIEW_WINDOW_DAYS: u32 = 50;

/// Rows and resources products are generated against.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Owner of every product.
    pub seller: &'a User,
    /// Users views are attributed to.
    pub viewers: &'a [User],
    /// Categories products are assigned to.
    pub categories: &'a [Category],
    /// Images attachments are staged from.
    pub images: &'a ImagePool,
    /// Upper bound of the view timestamp window.
    pub now: DateTime<Utc>,
}

impl GenerationContext<'_> {
    fn pick_category(&self, rng: &mut ChaCha8Rng) -> Result<&Category, GenerationError> {
        self.categories
            .choose(rng)
            .ok_or(GenerationError::NoCategories)
    }

    /// Draws views for a distinct subset of viewers with at least
    /// `min_viewers` members.
    fn views(&self, rng: &mut ChaCha8Rng, min_viewers: usize) -> Vec<View> {
        synthetic::select_subset(rng, self.viewers, min_viewers)
            .into_iter()
            .map(|viewer| View {
                id: fresh_id(rng),
                viewer_id: viewer.id,
                created_at: synthetic::recent_timestamp(rng, self.now, VIEW_WINDOW_DAYS),
            })
            .collect()
    }
}

/// A product ready to be staged and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPlan {
    /// Rows written in one unit of work.
    pub bundle: ProductBundle,
    /// Pool image copied to the attachment's path.
    pub source_image: String,
}

/// Stages attachments and writes planned products.
pub struct ProductMaterializer<S: ?Sized> {
    store: Arc<S>,
    staging: StagingArea,
    images: ImagePool,
}

impl<S: ?Sized> Clone for ProductMaterializer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            staging: self.staging.clone(),
            images: self.images.clone(),
        }
    }
}

impl<S> ProductMaterializer<S>
where
    S: FixtureStore + ?Sized,
{
    /// Create a materializer writing to `store` and staging into `staging`.
    pub const fn new(store: Arc<S>, staging: StagingArea, images: ImagePool) -> Self {
        Self {
            store,
            staging,
            images,
        }
    }

    /// Stages the plan's attachment, then writes the product bundle.
    ///
    /// The file is in place before the row commits, so a stored attachment
    /// never points at a missing file.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] if staging or the store write fails.
    pub async fn materialize(&self, plan: ProductPlan) -> Result<Product, SeedError> {
        let ProductPlan {
            bundle,
            source_image,
        } = plan;
        self.staging
            .stage(&self.images, &source_image, &bundle.attachment.path)
            .await?;
        let view_count = bundle.views.len();
        let product = self.store.create_product(bundle).await?;
        debug!(
            product_id = %product.id,
            status = %product.status,
            views = view_count,
            image = %source_image,
            "product created"
        );
        Ok(product)
    }

    /// Materializes every plan concurrently, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`SeedError`] raised by any plan. Plans already
    /// written stay written.
    pub async fn materialize_all(&self, plans: Vec<ProductPlan>) -> Result<Vec<Product>, SeedError> {
        try_join_all(plans.into_iter().map(|plan| self.materialize(plan))).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    //! Shared fixtures for product generator tests.

    use chrono::TimeZone;
    use rand::SeedableRng;
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;
    use crate::ports::{FixtureStoreError, MockFixtureStore};
    use crate::records::{Attachment, ProductStatus};

    pub(crate) struct Fixture {
        pub seller: User,
        pub viewers: Vec<User>,
        pub categories: Vec<Category>,
        pub images: ImagePool,
        pub _pool_dir: TempDir,
    }

    impl Fixture {
        pub(crate) fn context(&self) -> GenerationContext<'_> {
            GenerationContext {
                seller: &self.seller,
                viewers: &self.viewers,
                categories: &self.categories,
                images: &self.images,
                now: Utc
                    .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                    .single()
                    .expect("valid timestamp"),
            }
        }
    }

    fn user(n: u128) -> User {
        User {
            id: Uuid::from_u128(0x1000 + n),
            name: format!("user-{n}"),
            email: format!("user-{n}@example.com"),
            password_hash: "secret".to_owned(),
            phone: "555-0100".to_owned(),
        }
    }

    pub(crate) fn fixture() -> Fixture {
        let pool_dir = TempDir::new().expect("temp dir");
        for name in ["a.png", "b.png", "c.png"] {
            std::fs::write(pool_dir.path().join(name), name).expect("write image");
        }
        let path = camino::Utf8PathBuf::from_path_buf(pool_dir.path().to_path_buf())
            .expect("utf-8 temp dir");
        Fixture {
            seller: user(0),
            viewers: (1..=6).map(user).collect(),
            categories: (0..3)
                .map(|n| Category {
                    id: Uuid::from_u128(0x2000 + n),
                    title: format!("Category {n}"),
                    slug: format!("category-{n}"),
                })
                .collect(),
            images: ImagePool::open(&path).expect("open pool"),
            _pool_dir: pool_dir,
        }
    }

    fn plan(id: u128) -> ProductPlan {
        let product_id = Uuid::from_u128(id);
        ProductPlan {
            bundle: ProductBundle {
                product: Product {
                    id: product_id,
                    title: "Lamp".to_owned(),
                    description: "Bright".to_owned(),
                    price_in_cents: 1_000,
                    owner_id: Uuid::from_u128(0x1000),
                    status: ProductStatus::Available,
                    category_id: Uuid::from_u128(0x2000),
                },
                attachment: Attachment {
                    id: product_id,
                    path: crate::identity::attachment_file_name(product_id),
                },
                views: Vec::new(),
            },
            source_image: "a.png".to_owned(),
        }
    }

    #[test]
    fn missing_categories_are_a_generation_error() {
        let mut fx = fixture();
        fx.categories.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ctx = fx.context();
        let result = ctx.pick_category(&mut rng);
        assert_eq!(result.err(), Some(GenerationError::NoCategories));
    }

    #[tokio::test]
    async fn materialize_stages_the_file_before_writing() {
        let fx = fixture();
        let staging_dir = TempDir::new().expect("temp dir");
        let staged_path = staging_dir.path().join(crate::identity::attachment_file_name(
            Uuid::from_u128(9),
        ));
        let observed = staged_path.clone();

        let mut store = MockFixtureStore::new();
        store
            .expect_create_product()
            .times(1)
            .returning(move |bundle| {
                assert!(observed.exists(), "file must be staged before the write");
                Ok(bundle.product)
            });

        let staging = StagingArea::open(
            &camino::Utf8PathBuf::from_path_buf(staging_dir.path().to_path_buf())
                .expect("utf-8 temp dir"),
        )
        .expect("open staging");
        let materializer = ProductMaterializer::new(Arc::new(store), staging, fx.images.clone());

        let product = materializer.materialize(plan(9)).await.expect("materialize");

        assert_eq!(product.id, Uuid::from_u128(9));
        assert!(staged_path.exists());
    }

    #[tokio::test]
    async fn materialize_all_fails_fast_on_a_store_error() {
        let fx = fixture();
        let staging_dir = TempDir::new().expect("temp dir");
        let mut store = MockFixtureStore::new();
        store.expect_create_product().returning(|bundle| {
            if bundle.product.id == Uuid::from_u128(2) {
                Err(FixtureStoreError::constraint("products_category_id_fkey"))
            } else {
                Ok(bundle.product)
            }
        });
        let staging = StagingArea::open(
            &camino::Utf8PathBuf::from_path_buf(staging_dir.path().to_path_buf())
                .expect("utf-8 temp dir"),
        )
        .expect("open staging");
        let materializer = ProductMaterializer::new(Arc::new(store), staging, fx.images.clone());

        let error = materializer
            .materialize_all(vec![plan(1), plan(2), plan(3)])
            .await
            .expect_err("second plan fails");

        assert!(matches!(error, SeedError::Store(FixtureStoreError::Constraint { .. })));
    }
}
