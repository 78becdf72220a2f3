//! Outbound adapters: PostgreSQL persistence and bcrypt hashing.

mod bcrypt_hasher;
mod diesel_fixture_store;
mod models;
mod pool;
mod schema;

pub use bcrypt_hasher::BcryptPasswordHasher;
pub use diesel_fixture_store::DieselFixtureStore;
pub use pool::{DbPool, PoolConfig, PoolError};
