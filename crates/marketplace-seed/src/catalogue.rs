//! Category taxonomy loading.

use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::identity::fresh_id;
use crate::ports::{FixtureStore, FixtureStoreError};
use crate::records::Category;
use crate::slug::slugify;

/// Category titles created by default, in creation order.
///
/// Slugs must stay distinct; the store rejects a colliding slug.
pub const DEFAULT_CATEGORY_TITLES: [&str; 10] = [
    "Eletrodomésticos",
    "Eletrônicos",
    "Informática",
    "Móveis",
    "Decoração",
    "Moda",
    "Esportes",
    "Brinquedos",
    "Livros",
    "Alimentos",
];

/// Creates one category per title and returns the stored rows.
///
/// Each category gets a fresh identifier and a slug derived from its title.
/// Slug collisions are not resolved here; the store's unique constraint
/// rejects them and the error propagates.
///
/// # Errors
///
/// Returns [`FixtureStoreError`] if the store rejects the batch.
pub async fn load_categories<S>(
    store: &S,
    titles: &[String],
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Category>, FixtureStoreError>
where
    S: FixtureStore + ?Sized,
{
    let categories: Vec<Category> = titles
        .iter()
        .map(|title| Category {
            id: fresh_id(rng),
            title: title.clone(),
            slug: slugify(title),
        })
        .collect();

    let created = store.create_categories(categories).await?;
    debug!(count = created.len(), "categories created");
    Ok(created)
}
