//! Ports the pipeline drives: the relational store and the password hasher.
//!
//! Adapters live in [`crate::outbound`]; the in-memory double used by the
//! test suites lives in `test_support`.

mod macros;
pub(crate) use macros::define_port_error;

use std::fmt;

use async_trait::async_trait;

use crate::records::{Category, Product, ProductBundle, User};

define_port_error! {
    /// Persistence errors raised by fixture store adapters.
    pub enum FixtureStoreError {
        /// Store connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String,
        } => "fixture store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String,
        } => "fixture store query failed: {message}",
        /// A uniqueness or foreign-key rule rejected the write.
        Constraint {
            /// Adapter-supplied detail.
            message: String,
        } => "fixture store constraint violated: {message}",
    }
}

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The hashing function rejected its input or parameters.
        Hash {
            /// Adapter-supplied detail.
            message: String,
        } => "password hashing failed: {message}",
    }
}

/// Tables populated by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreTable {
    /// Product views.
    View,
    /// Product listings.
    Product,
    /// Seller and viewers.
    User,
    /// Category taxonomy.
    Category,
    /// Staged file records.
    Attachment,
}

impl StoreTable {
    /// Delete order that never removes a row still referenced by another.
    ///
    /// Views reference products and users, products reference users and
    /// categories. Attachments lose their product link when the product goes,
    /// so they are cleared last.
    pub const RESET_ORDER: [Self; 5] = [
        Self::View,
        Self::Product,
        Self::User,
        Self::Category,
        Self::Attachment,
    ];

    /// Table name in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "views",
            Self::Product => "products",
            Self::User => "users",
            Self::Category => "categories",
            Self::Attachment => "attachments",
        }
    }
}

impl fmt::Display for StoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for the transactional CRUD surface the generator writes through.
///
/// Implementations must:
/// - Reject writes that violate primary-key, unique or foreign-key rules
///   with [`FixtureStoreError::Constraint`].
/// - Create a [`ProductBundle`] atomically: the product, its attachment and
///   every view commit together or not at all.
/// - Return created rows unchanged so callers can reference their ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// Delete every row of `table`, returning the number removed.
    async fn delete_all(&self, table: StoreTable) -> Result<u64, FixtureStoreError>;

    /// Insert categories in one batch.
    async fn create_categories(
        &self,
        categories: Vec<Category>,
    ) -> Result<Vec<Category>, FixtureStoreError>;

    /// Insert a single user.
    async fn create_user(&self, user: User) -> Result<User, FixtureStoreError>;

    /// Insert users in one batch.
    async fn create_users(&self, users: Vec<User>) -> Result<Vec<User>, FixtureStoreError>;

    /// Insert a product with its attachment and views as one unit of work.
    async fn create_product(&self, bundle: ProductBundle) -> Result<Product, FixtureStoreError>;
}

/// One-way password transform applied to credentials that authenticate.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` for storage.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] if the transform rejects its input.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;
}
