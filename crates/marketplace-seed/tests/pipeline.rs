//! End-to-end seeding runs against the in-memory store and a temporary
//! staging directory.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use marketplace_seed::identity::{FIXED_PRODUCTS, SELLER_EMAIL, attachment_file_name};
use marketplace_seed::outbound::BcryptPasswordHasher;
use marketplace_seed::ports::FixtureStoreError;
use marketplace_seed::test_support::{FixedClock, InMemoryFixtureStore, TempWorkspace};
use marketplace_seed::{
    DEFAULT_CATEGORY_TITLES, RANDOM_PRODUCT_MAX, RANDOM_PRODUCT_MIN, SeedError, SeedPipeline,
    SeedReport, StagingArea, StagingError, VIEWER_POOL_MAX, VIEWER_POOL_MIN,
};
use rstest::{fixture, rstest};
use uuid::Uuid;

struct Harness {
    workspace: TempWorkspace,
    store: Arc<InMemoryFixtureStore>,
}

impl Harness {
    fn pipeline(&self, seed: u64) -> SeedPipeline<InMemoryFixtureStore, BcryptPasswordHasher> {
        SeedPipeline::new(
            Arc::clone(&self.store),
            Arc::new(BcryptPasswordHasher::new(4)),
            self.workspace.staging_area().expect("staging opens"),
            self.workspace.image_pool().expect("pool opens"),
            Arc::new(FixedClock::default()),
        )
        .with_rng_seed(seed)
    }

    async fn run(&self, seed: u64) -> SeedReport {
        self.pipeline(seed).run().await.expect("run succeeds")
    }

    async fn staged(&self) -> BTreeSet<String> {
        self.workspace
            .staging_area()
            .expect("staging opens")
            .file_names()
            .await
            .expect("staging lists")
    }
}

fn new_harness() -> Harness {
    Harness {
        workspace: TempWorkspace::new().expect("workspace"),
        store: Arc::new(InMemoryFixtureStore::new()),
    }
}

#[fixture]
fn harness() -> Harness {
    new_harness()
}

fn rows(count: usize) -> u64 {
    u64::try_from(count).expect("row count fits")
}

/// Checks referential closure, the 1:1 attachment rule and file mirroring.
fn assert_consistent(store: &InMemoryFixtureStore, staged: &BTreeSet<String>) {
    let users = store.users();
    let seller = users
        .iter()
        .find(|user| user.email == SELLER_EMAIL)
        .expect("seller exists");
    let viewer_ids: HashSet<Uuid> = users
        .iter()
        .filter(|user| user.id != seller.id)
        .map(|user| user.id)
        .collect();
    let category_ids: HashSet<Uuid> = store.categories().iter().map(|c| c.id).collect();
    let products = store.products();
    let product_ids: HashSet<Uuid> = products.iter().map(|p| p.id).collect();

    for product in &products {
        assert_eq!(product.owner_id, seller.id);
        assert!(category_ids.contains(&product.category_id));
    }

    let mut attachments_per_product: HashMap<Uuid, usize> = HashMap::new();
    for stored in store.attachments() {
        let product_id = stored.product_id.expect("attachment is linked");
        assert!(product_ids.contains(&product_id));
        assert_eq!(stored.attachment.path, attachment_file_name(stored.attachment.id));
        assert!(staged.contains(&stored.attachment.path));
        *attachments_per_product.entry(product_id).or_default() += 1;
    }
    assert_eq!(attachments_per_product.len(), products.len());
    assert!(attachments_per_product.values().all(|count| *count == 1));
    assert_eq!(staged.len(), products.len());

    let mut pairs = HashSet::new();
    for stored in store.views() {
        assert!(product_ids.contains(&stored.product_id));
        assert!(viewer_ids.contains(&stored.view.viewer_id));
        assert!(
            pairs.insert((stored.product_id, stored.view.viewer_id)),
            "viewer counted twice for one product"
        );
    }
}

#[rstest]
#[tokio::test]
async fn fresh_run_populates_a_consistent_snapshot(harness: Harness) {
    let report = harness.run(1).await;
    let staged = harness.staged().await;

    assert_eq!(harness.store.categories().len(), DEFAULT_CATEGORY_TITLES.len());
    let users = harness.store.users();
    assert_eq!(users.iter().filter(|u| u.email == SELLER_EMAIL).count(), 1);
    assert!((VIEWER_POOL_MIN..=VIEWER_POOL_MAX).contains(&(users.len() - 1)));
    let products = harness.store.products().len();
    assert!((FIXED_PRODUCTS.len() + RANDOM_PRODUCT_MIN..=FIXED_PRODUCTS.len() + RANDOM_PRODUCT_MAX)
        .contains(&products));
    assert_eq!(staged.len(), products);
    assert_consistent(&harness.store, &staged);

    assert_eq!(report.rng_seed, 1);
    assert_eq!(report.stale_files_removed, 0);
    assert_eq!(report.category_count, 10);
    assert_eq!(report.viewer_count, users.len() - 1);
    assert_eq!(report.fixed_product_count, 5);
    assert_eq!(report.fixed_product_count + report.random_product_count, products);
    assert_eq!(report.view_count, harness.store.views().len());
    assert_eq!(report.staged_files, staged);
    assert!(report.deleted_rows.iter().all(|entry| entry.deleted == 0));
}

#[rstest]
#[case(3)]
#[case(17)]
#[case(2026)]
#[tokio::test]
async fn fixed_products_keep_their_literal_identity(harness: Harness, #[case] seed: u64) {
    harness.run(seed).await;

    let products = harness.store.products();
    for fixed in FIXED_PRODUCTS {
        let product = products
            .iter()
            .find(|p| p.id == fixed.id)
            .expect("fixed product stored");
        assert_eq!(product.title, fixed.title);
        assert_eq!(product.status.as_str(), "available");
    }
    let staged = harness.staged().await;
    for fixed in FIXED_PRODUCTS {
        assert!(staged.contains(&attachment_file_name(fixed.id)));
    }
    let flagship_views: HashSet<Uuid> = harness
        .store
        .views()
        .iter()
        .map(|stored| stored.product_id)
        .collect();
    assert!(FIXED_PRODUCTS.iter().all(|f| flagship_views.contains(&f.id)));
}

#[rstest]
#[tokio::test]
async fn rerun_replaces_the_previous_snapshot(harness: Harness) {
    let first = harness.run(5).await;
    let first_staged = harness.staged().await;

    let second = harness.run(6).await;
    let second_staged = harness.staged().await;

    assert_consistent(&harness.store, &second_staged);
    assert_eq!(second.stale_files_removed, first_staged.len());
    let deleted: HashMap<&str, u64> = second
        .deleted_rows
        .iter()
        .map(|entry| (entry.table, entry.deleted))
        .collect();
    let first_products = first.fixed_product_count + first.random_product_count;
    assert_eq!(deleted.get("products"), Some(&rows(first_products)));
    assert_eq!(deleted.get("attachments"), Some(&rows(first_products)));
    assert_eq!(deleted.get("views"), Some(&rows(first.view_count)));
    assert_eq!(deleted.get("categories"), Some(&10));
    assert_eq!(deleted.get("users"), Some(&rows(first.viewer_count + 1)));

    let fixed_names: BTreeSet<String> = FIXED_PRODUCTS
        .iter()
        .map(|f| attachment_file_name(f.id))
        .collect();
    let carried_over: BTreeSet<_> = first_staged.intersection(&second_staged).cloned().collect();
    assert_eq!(carried_over, fixed_names);
}

#[rstest]
#[tokio::test]
async fn stale_staging_entries_are_replaced(harness: Harness) {
    harness
        .workspace
        .write_stale_file("leftover.png")
        .expect("stale file");
    harness
        .workspace
        .write_stale_file("notes.txt")
        .expect("stale file");
    harness
        .workspace
        .write_stale_dir("orphaned")
        .expect("stale dir");

    let report = harness.run(9).await;
    let staged = harness.staged().await;

    assert_eq!(report.stale_files_removed, 3);
    assert!(!staged.contains("leftover.png"));
    assert!(!staged.contains("notes.txt"));
    assert!(!staged.contains("orphaned"));
    assert_consistent(&harness.store, &staged);
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn stale_entry_with_a_non_utf8_name_is_removed(harness: Harness) {
    use std::os::unix::ffi::OsStrExt;

    let raw = std::ffi::OsStr::from_bytes(b"stale-\xff.png");
    std::fs::write(harness.workspace.staging_path().as_std_path().join(raw), b"x")
        .expect("stale file");

    let report = harness.run(13).await;

    assert_eq!(report.stale_files_removed, 1);
    assert_consistent(&harness.store, &harness.staged().await);
}

#[tokio::test]
async fn same_seed_reproduces_the_snapshot() {
    let first = new_harness();
    let second = new_harness();

    let first_report = first.run(42).await;
    let second_report = second.run(42).await;

    assert_eq!(first_report, second_report);
    let sorted_products = |harness: &Harness| {
        let mut products = harness.store.products();
        products.sort_by_key(|p| p.id);
        products
    };
    assert_eq!(sorted_products(&first), sorted_products(&second));
    let identities = |harness: &Harness| -> Vec<(Uuid, String, String)> {
        harness
            .store
            .users()
            .into_iter()
            .map(|u| (u.id, u.name, u.email))
            .collect()
    };
    assert_eq!(identities(&first), identities(&second));
}

#[rstest]
#[tokio::test]
async fn failed_product_write_aborts_and_next_run_recovers(harness: Harness) {
    harness.store.reject_product(Uuid::from_u128(1));

    let error = harness.pipeline(11).run().await.expect_err("run aborts");
    assert!(matches!(error, SeedError::Store(FixtureStoreError::Query { .. })));
    assert_eq!(harness.store.categories().len(), 10);
    assert!(!harness.store.users().is_empty());

    // Copies spawned by the aborted run keep running after its join is dropped.
    tokio::time::sleep(Duration::from_millis(100)).await;
    harness.store.accept_all_products();
    harness.run(12).await;
    assert_consistent(&harness.store, &harness.staged().await);
}

#[rstest]
#[tokio::test]
async fn custom_catalogue_replaces_the_default(harness: Harness) {
    let report = harness
        .pipeline(4)
        .with_category_titles(vec!["Jardim".to_owned(), "Ferramentas Elétricas".to_owned()])
        .run()
        .await
        .expect("run succeeds");

    assert_eq!(report.category_count, 2);
    let slugs: Vec<String> = harness
        .store
        .categories()
        .into_iter()
        .map(|c| c.slug)
        .collect();
    assert_eq!(slugs, ["jardim", "ferramentas-eletricas"]);
    assert_consistent(&harness.store, &harness.staged().await);
}

#[rstest]
#[tokio::test]
async fn colliding_slugs_abort_before_any_user_is_created(harness: Harness) {
    let error = harness
        .pipeline(4)
        .with_category_titles(vec!["Móveis".to_owned(), "moveis".to_owned()])
        .run()
        .await
        .expect_err("slug collision");

    assert!(matches!(error, SeedError::Store(FixtureStoreError::Constraint { .. })));
    assert!(harness.store.users().is_empty());
    assert!(harness.staged().await.is_empty());
}

#[rstest]
fn missing_staging_directory_is_not_created(harness: Harness) {
    let missing = harness.workspace.staging_path().join("absent");

    let error = StagingArea::open(&missing).expect_err("directory must exist");

    assert!(matches!(error, StagingError::OpenDirectory { .. }));
    assert!(!missing.exists());
}
