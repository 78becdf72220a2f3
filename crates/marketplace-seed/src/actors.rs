//! Seller and viewer pool loading.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{GenerationError, SeedError};
use crate::identity::{SELLER_EMAIL, SELLER_NAME, SELLER_PASSWORD, fresh_id};
use crate::ports::{FixtureStore, PasswordHasher};
use crate::records::User;
use crate::synthetic;

/// Smallest viewer pool generated.
pub const VIEWER_POOL_MIN: usize = 1;

/// Largest viewer pool generated.
pub const VIEWER_POOL_MAX: usize = 15;

/// Maximum number of draws for one unique viewer e-mail.
const MAX_EMAIL_ATTEMPTS: usize = 100;

/// Users created by the actor loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actors {
    /// The single seller owning every product.
    pub seller: User,
    /// Viewers that products' views are attributed to.
    pub viewers: Vec<User>,
}

/// Creates the seller and a randomized viewer pool.
///
/// The seller carries literal credentials with its password run through
/// `hasher`; only its phone number is random. Viewers get random names,
/// e-mails, phones and plain-text passwords, since they never log in. The
/// pool size is uniform in [`VIEWER_POOL_MIN`]..=[`VIEWER_POOL_MAX`] and
/// viewer e-mails are distinct from each other and from the seller's.
///
/// # Errors
///
/// Returns [`SeedError`] if hashing fails, a unique e-mail cannot be drawn,
/// or the store rejects either write.
pub async fn load_actors<S, H>(
    store: &S,
    hasher: &H,
    rng: &mut ChaCha8Rng,
) -> Result<Actors, SeedError>
where
    S: FixtureStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let new_seller = User {
        id: fresh_id(rng),
        name: SELLER_NAME.to_owned(),
        email: SELLER_EMAIL.to_owned(),
        password_hash: hasher.hash(SELLER_PASSWORD)?,
        phone: synthetic::phone(rng),
    };
    let new_viewers = viewer_pool(rng)?;

    let seller = store.create_user(new_seller).await?;
    let viewers = store.create_users(new_viewers).await?;
    debug!(seller_id = %seller.id, viewers = viewers.len(), "actors created");

    Ok(Actors { seller, viewers })
}

fn viewer_pool(rng: &mut ChaCha8Rng) -> Result<Vec<User>, GenerationError> {
    let count = rng.random_range(VIEWER_POOL_MIN..=VIEWER_POOL_MAX);
    let mut taken: HashSet<String> = HashSet::from([SELLER_EMAIL.to_owned()]);
    let mut viewers = Vec::with_capacity(count);

    for _ in 0..count {
        let email = unique_email(rng, &mut taken)?;
        viewers.push(User {
            id: fresh_id(rng),
            name: synthetic::person_name(rng),
            email,
            password_hash: synthetic::password(rng),
            phone: synthetic::phone(rng),
        });
    }

    Ok(viewers)
}

fn unique_email(
    rng: &mut ChaCha8Rng,
    taken: &mut HashSet<String>,
) -> Result<String, GenerationError> {
    for _ in 0..MAX_EMAIL_ATTEMPTS {
        let candidate = synthetic::email(rng);
        if taken.insert(candidate.clone()) {
            return Ok(candidate);
        }
    }

    Err(GenerationError::UniqueEmailExhausted {
        max_attempts: MAX_EMAIL_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rstest::rstest;

    use super::*;
    use crate::ports::{FixtureStoreError, MockFixtureStore, MockPasswordHasher, PasswordHashError};

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password.to_string() == SELLER_PASSWORD)
            .returning(|password| Ok(format!("hashed:{password}")));
        hasher
    }

    fn echo_store() -> MockFixtureStore {
        let mut store = MockFixtureStore::new();
        store.expect_create_user().times(1).returning(Ok);
        store.expect_create_users().times(1).returning(Ok);
        store
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(2026)]
    #[tokio::test]
    async fn seller_keeps_literal_credentials(#[case] seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let actors = load_actors(&echo_store(), &hasher(), &mut rng)
            .await
            .expect("actors load");

        assert_eq!(actors.seller.name, SELLER_NAME);
        assert_eq!(actors.seller.email, SELLER_EMAIL);
        assert_eq!(actors.seller.password_hash, "hashed:123456");
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(2026)]
    #[tokio::test]
    async fn viewer_pool_is_bounded_and_unique(#[case] seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let actors = load_actors(&echo_store(), &hasher(), &mut rng)
            .await
            .expect("actors load");

        let count = actors.viewers.len();
        assert!((VIEWER_POOL_MIN..=VIEWER_POOL_MAX).contains(&count));
        let emails: HashSet<_> = actors.viewers.iter().map(|v| v.email.as_str()).collect();
        assert_eq!(emails.len(), count);
        assert!(!emails.contains(SELLER_EMAIL));
        assert!(actors.viewers.iter().all(|v| v.id != actors.seller.id));
    }

    #[tokio::test]
    async fn hashing_failure_aborts_before_any_write() {
        let mut store = MockFixtureStore::new();
        store.expect_create_user().times(0);
        store.expect_create_users().times(0);
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Err(PasswordHashError::hash("invalid cost")));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let error = load_actors(&store, &hasher, &mut rng)
            .await
            .expect_err("hashing should fail");

        assert!(matches!(error, SeedError::PasswordHash(_)));
    }

    #[tokio::test]
    async fn viewer_write_failure_propagates() {
        let mut store = MockFixtureStore::new();
        store.expect_create_user().times(1).returning(Ok);
        store
            .expect_create_users()
            .return_once(|_| Err(FixtureStoreError::query("connection reset")));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let error = load_actors(&store, &hasher(), &mut rng)
            .await
            .expect_err("write should fail");

        assert!(matches!(error, SeedError::Store(FixtureStoreError::Query { .. })));
    }
}
