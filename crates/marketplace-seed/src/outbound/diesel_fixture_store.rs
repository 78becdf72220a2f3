//! PostgreSQL-backed fixture store.
//!
//! Implements the `FixtureStore` port. Each product is written with its
//! attachment and views inside one transaction; every other call is a single
//! statement.

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use super::models::{NewAttachmentRow, NewCategoryRow, NewProductRow, NewUserRow, NewViewRow};
use super::pool::{DbPool, PoolError};
use super::schema::{attachments, categories, products, users, views};
use crate::ports::{FixtureStore, FixtureStoreError, StoreTable};
use crate::records::{Category, Product, ProductBundle, User};

/// Diesel-backed implementation of [`FixtureStore`].
#[derive(Clone)]
pub struct DieselFixtureStore {
    pool: DbPool,
}

impl DieselFixtureStore {
    /// Create a store writing through `pool`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use marketplace_seed::outbound::{DbPool, DieselFixtureStore, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
    /// let store = DieselFixtureStore::new(pool);
    /// # let _ = store;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Writes the product, its attachment and its views in one transaction.
    async fn write_bundle(&self, bundle: &ProductBundle) -> Result<(), FixtureStoreError> {
        let product_id = bundle.product.id;
        let product_row = NewProductRow::from(&bundle.product);
        let attachment_row = NewAttachmentRow::for_product(&bundle.attachment, product_id);
        let view_rows: Vec<NewViewRow> = bundle
            .views
            .iter()
            .map(|view| NewViewRow::for_product(view, product_id))
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(products::table)
                    .values(&product_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(attachments::table)
                    .values(&attachment_row)
                    .execute(conn)
                    .await?;
                if !view_rows.is_empty() {
                    diesel::insert_into(views::table)
                        .values(&view_rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

fn map_pool_error(error: PoolError) -> FixtureStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FixtureStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FixtureStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                error = %error_message,
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error_message,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            FixtureStoreError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation,
            info,
        ) => FixtureStoreError::constraint(info.message().to_owned()),
        DieselError::DatabaseError(_, info) => FixtureStoreError::query(info.message().to_owned()),
        _ => FixtureStoreError::query(error_message),
    }
}

fn affected_rows(count: usize) -> Result<u64, FixtureStoreError> {
    u64::try_from(count).map_err(|_| FixtureStoreError::query("deleted row count overflow"))
}

#[async_trait]
impl FixtureStore for DieselFixtureStore {
    async fn delete_all(&self, table: StoreTable) -> Result<u64, FixtureStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = match table {
            StoreTable::View => diesel::delete(views::table).execute(&mut conn).await,
            StoreTable::Product => diesel::delete(products::table).execute(&mut conn).await,
            StoreTable::User => diesel::delete(users::table).execute(&mut conn).await,
            StoreTable::Category => diesel::delete(categories::table).execute(&mut conn).await,
            StoreTable::Attachment => diesel::delete(attachments::table).execute(&mut conn).await,
        }
        .map_err(map_diesel_error)?;
        affected_rows(deleted)
    }

    async fn create_categories(
        &self,
        categories: Vec<Category>,
    ) -> Result<Vec<Category>, FixtureStoreError> {
        if categories.is_empty() {
            return Ok(categories);
        }
        let rows: Vec<NewCategoryRow<'_>> = categories.iter().map(NewCategoryRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(categories::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(categories)
    }

    async fn create_user(&self, user: User) -> Result<User, FixtureStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(&user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(user)
    }

    async fn create_users(&self, users: Vec<User>) -> Result<Vec<User>, FixtureStoreError> {
        if users.is_empty() {
            return Ok(users);
        }
        let rows: Vec<NewUserRow<'_>> = users.iter().map(NewUserRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(users)
    }

    async fn create_product(&self, bundle: ProductBundle) -> Result<Product, FixtureStoreError> {
        self.write_bundle(&bundle).await?;
        Ok(bundle.product)
    }
}
