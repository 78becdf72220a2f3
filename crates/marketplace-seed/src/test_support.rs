//! Test utilities for the marketplace-seed crate.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration suites under `tests/`.

pub mod store {
    //! In-memory fixture store enforcing the relational rules of the real
    //! schema.
    //!
    //! Writes are rejected with [`FixtureStoreError::Constraint`] wherever
    //! PostgreSQL would reject them: duplicate primary keys, duplicate
    //! category slugs or user e-mails, dangling references, and deletes of
    //! rows still referenced by another table. Every call is all-or-nothing.

    use std::collections::HashSet;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::ports::{FixtureStore, FixtureStoreError, StoreTable};
    use crate::records::{Attachment, Category, Product, ProductBundle, User, View};

    /// A stored attachment with its nullable product link.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StoredAttachment {
        /// The attachment row.
        pub attachment: Attachment,
        /// Owning product, cleared when the product is deleted.
        pub product_id: Option<Uuid>,
    }

    /// A stored view with its owning product.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StoredView {
        /// The view row.
        pub view: View,
        /// Viewed product.
        pub product_id: Uuid,
    }

    #[derive(Debug, Default)]
    struct Tables {
        categories: Vec<Category>,
        users: Vec<User>,
        products: Vec<Product>,
        attachments: Vec<StoredAttachment>,
        views: Vec<StoredView>,
    }

    /// Thread-safe in-memory [`FixtureStore`].
    #[derive(Debug, Default)]
    pub struct InMemoryFixtureStore {
        tables: Mutex<Tables>,
        rejected_products: Mutex<HashSet<Uuid>>,
    }

    fn violation(message: String) -> FixtureStoreError {
        FixtureStoreError::constraint(message)
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn count(rows: usize) -> u64 {
        u64::try_from(rows).unwrap_or(u64::MAX)
    }

    impl InMemoryFixtureStore {
        /// Create an empty store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every later write of product `id` fail with a query error.
        pub fn reject_product(&self, id: Uuid) {
            lock(&self.rejected_products).insert(id);
        }

        /// Accept writes of every product again.
        pub fn accept_all_products(&self) {
            lock(&self.rejected_products).clear();
        }

        /// Stored categories in insertion order.
        #[must_use]
        pub fn categories(&self) -> Vec<Category> {
            lock(&self.tables).categories.clone()
        }

        /// Stored users in insertion order.
        #[must_use]
        pub fn users(&self) -> Vec<User> {
            lock(&self.tables).users.clone()
        }

        /// Stored products in insertion order.
        #[must_use]
        pub fn products(&self) -> Vec<Product> {
            lock(&self.tables).products.clone()
        }

        /// Stored attachments in insertion order.
        #[must_use]
        pub fn attachments(&self) -> Vec<StoredAttachment> {
            lock(&self.tables).attachments.clone()
        }

        /// Stored views in insertion order.
        #[must_use]
        pub fn views(&self) -> Vec<StoredView> {
            lock(&self.tables).views.clone()
        }
    }

    impl Tables {
        fn delete_all(&mut self, table: StoreTable) -> Result<u64, FixtureStoreError> {
            match table {
                StoreTable::View => Ok(count(self.views.drain(..).count())),
                StoreTable::Product => {
                    if let Some(view) = self.views.first() {
                        return Err(violation(format!(
                            "views_product_id_fkey: product {} is still viewed",
                            view.product_id
                        )));
                    }
                    for stored in &mut self.attachments {
                        stored.product_id = None;
                    }
                    Ok(count(self.products.drain(..).count()))
                }
                StoreTable::User => {
                    if let Some(product) = self.products.first() {
                        return Err(violation(format!(
                            "products_owner_id_fkey: user {} still owns products",
                            product.owner_id
                        )));
                    }
                    if let Some(view) = self.views.first() {
                        return Err(violation(format!(
                            "views_viewer_id_fkey: user {} still has views",
                            view.view.viewer_id
                        )));
                    }
                    Ok(count(self.users.drain(..).count()))
                }
                StoreTable::Category => {
                    if let Some(product) = self.products.first() {
                        return Err(violation(format!(
                            "products_category_id_fkey: category {} still has products",
                            product.category_id
                        )));
                    }
                    Ok(count(self.categories.drain(..).count()))
                }
                StoreTable::Attachment => Ok(count(self.attachments.drain(..).count())),
            }
        }

        fn check_users(&self, users: &[User]) -> Result<(), FixtureStoreError> {
            let mut ids: HashSet<Uuid> = self.users.iter().map(|user| user.id).collect();
            let mut emails: HashSet<&str> =
                self.users.iter().map(|user| user.email.as_str()).collect();
            for user in users {
                if !ids.insert(user.id) {
                    return Err(violation(format!("users_pkey: duplicate id {}", user.id)));
                }
                if !emails.insert(&user.email) {
                    return Err(violation(format!(
                        "users_email_key: duplicate email {}",
                        user.email
                    )));
                }
            }
            Ok(())
        }

        fn check_categories(&self, categories: &[Category]) -> Result<(), FixtureStoreError> {
            let mut ids: HashSet<Uuid> = self.categories.iter().map(|c| c.id).collect();
            let mut slugs: HashSet<&str> =
                self.categories.iter().map(|c| c.slug.as_str()).collect();
            for category in categories {
                if !ids.insert(category.id) {
                    return Err(violation(format!(
                        "categories_pkey: duplicate id {}",
                        category.id
                    )));
                }
                if !slugs.insert(&category.slug) {
                    return Err(violation(format!(
                        "categories_slug_key: duplicate slug {}",
                        category.slug
                    )));
                }
            }
            Ok(())
        }

        fn check_bundle(&self, bundle: &ProductBundle) -> Result<(), FixtureStoreError> {
            let product = &bundle.product;
            if self.products.iter().any(|p| p.id == product.id) {
                return Err(violation(format!("products_pkey: duplicate id {}", product.id)));
            }
            if !self.users.iter().any(|u| u.id == product.owner_id) {
                return Err(violation(format!(
                    "products_owner_id_fkey: no user {}",
                    product.owner_id
                )));
            }
            if !self.categories.iter().any(|c| c.id == product.category_id) {
                return Err(violation(format!(
                    "products_category_id_fkey: no category {}",
                    product.category_id
                )));
            }
            if self
                .attachments
                .iter()
                .any(|stored| stored.attachment.id == bundle.attachment.id)
            {
                return Err(violation(format!(
                    "attachments_pkey: duplicate id {}",
                    bundle.attachment.id
                )));
            }
            let mut view_ids: HashSet<Uuid> = self.views.iter().map(|v| v.view.id).collect();
            for view in &bundle.views {
                if !view_ids.insert(view.id) {
                    return Err(violation(format!("views_pkey: duplicate id {}", view.id)));
                }
                if !self.users.iter().any(|u| u.id == view.viewer_id) {
                    return Err(violation(format!(
                        "views_viewer_id_fkey: no user {}",
                        view.viewer_id
                    )));
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl FixtureStore for InMemoryFixtureStore {
        async fn delete_all(&self, table: StoreTable) -> Result<u64, FixtureStoreError> {
            lock(&self.tables).delete_all(table)
        }

        async fn create_categories(
            &self,
            categories: Vec<Category>,
        ) -> Result<Vec<Category>, FixtureStoreError> {
            let mut tables = lock(&self.tables);
            tables.check_categories(&categories)?;
            tables.categories.extend(categories.iter().cloned());
            Ok(categories)
        }

        async fn create_user(&self, user: User) -> Result<User, FixtureStoreError> {
            let mut tables = lock(&self.tables);
            tables.check_users(std::slice::from_ref(&user))?;
            tables.users.push(user.clone());
            Ok(user)
        }

        async fn create_users(&self, users: Vec<User>) -> Result<Vec<User>, FixtureStoreError> {
            let mut tables = lock(&self.tables);
            tables.check_users(&users)?;
            tables.users.extend(users.iter().cloned());
            Ok(users)
        }

        async fn create_product(
            &self,
            bundle: ProductBundle,
        ) -> Result<Product, FixtureStoreError> {
            if lock(&self.rejected_products).contains(&bundle.product.id) {
                return Err(FixtureStoreError::query(format!(
                    "product {} rejected",
                    bundle.product.id
                )));
            }
            let mut tables = lock(&self.tables);
            tables.check_bundle(&bundle)?;

            let ProductBundle {
                product,
                attachment,
                views,
            } = bundle;
            tables.attachments.push(StoredAttachment {
                attachment,
                product_id: Some(product.id),
            });
            tables
                .views
                .extend(views.into_iter().map(|view| StoredView {
                    view,
                    product_id: product.id,
                }));
            tables.products.push(product.clone());
            Ok(product)
        }
    }
}

pub mod workspace {
    //! Temporary staging directory and image pool for pipeline tests.

    use std::io;

    use camino::{Utf8Path, Utf8PathBuf};
    use cap_std::{ambient_authority, fs::Dir};
    use tempfile::TempDir;

    use crate::error::StagingError;
    use crate::staging::{ImagePool, StagingArea};

    /// Image names written into every temporary pool.
    pub const POOL_IMAGES: [&str; 5] = [
        "camiseta.png",
        "carro.png",
        "liquidificador.png",
        "moto.png",
        "sofa.png",
    ];

    /// A temporary directory holding `staging/` and `images/`.
    ///
    /// Both are removed when the workspace is dropped.
    #[derive(Debug)]
    pub struct TempWorkspace {
        _root: TempDir,
        staging: Utf8PathBuf,
        images: Utf8PathBuf,
    }

    fn utf8(path: std::path::PathBuf) -> io::Result<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(path)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "temp dir is not UTF-8"))
    }

    impl TempWorkspace {
        /// Create the workspace and fill the pool with [`POOL_IMAGES`].
        ///
        /// # Errors
        ///
        /// Returns any I/O error raised while creating the directories.
        pub fn new() -> io::Result<Self> {
            let root = TempDir::new()?;
            let dir = Dir::open_ambient_dir(root.path(), ambient_authority())?;
            dir.create_dir("staging")?;
            dir.create_dir("images")?;
            let pool = dir.open_dir("images")?;
            for name in POOL_IMAGES {
                pool.write(name, name.as_bytes())?;
            }
            let staging = utf8(root.path().join("staging"))?;
            let images = utf8(root.path().join("images"))?;
            Ok(Self {
                _root: root,
                staging,
                images,
            })
        }

        /// Staging directory path.
        #[must_use]
        pub fn staging_path(&self) -> &Utf8Path {
            &self.staging
        }

        /// Open the staging directory.
        ///
        /// # Errors
        ///
        /// Returns [`StagingError`] if the directory cannot be opened.
        pub fn staging_area(&self) -> Result<StagingArea, StagingError> {
            StagingArea::open(&self.staging)
        }

        /// Open the image pool.
        ///
        /// # Errors
        ///
        /// Returns [`StagingError`] if the pool cannot be opened.
        pub fn image_pool(&self) -> Result<ImagePool, StagingError> {
            ImagePool::open(&self.images)
        }

        /// Drop a stale file into the staging directory.
        ///
        /// # Errors
        ///
        /// Returns any I/O error raised by the write.
        pub fn write_stale_file(&self, name: &str) -> io::Result<()> {
            let dir = Dir::open_ambient_dir(&self.staging, ambient_authority())?;
            dir.write(name, b"stale")
        }

        /// Drop a stale sub-directory with one file into the staging directory.
        ///
        /// # Errors
        ///
        /// Returns any I/O error raised while creating it.
        pub fn write_stale_dir(&self, name: &str) -> io::Result<()> {
            let dir = Dir::open_ambient_dir(&self.staging, ambient_authority())?;
            dir.create_dir(name)?;
            dir.open_dir(name)?.write("nested.png", b"stale")
        }
    }
}

pub mod clock {
    //! Deterministic clock.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;

    /// A clock frozen at one instant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FixedClock(pub DateTime<Utc>);

    impl Default for FixedClock {
        fn default() -> Self {
            Self(
                Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                    .single()
                    .unwrap_or_default(),
            )
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }
}

pub use clock::FixedClock;
pub use store::{InMemoryFixtureStore, StoredAttachment, StoredView};
pub use workspace::{POOL_IMAGES, TempWorkspace};
