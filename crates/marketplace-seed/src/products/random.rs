//! The randomized long tail of ordinary products.

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;

use super::{GenerationContext, ProductPlan};
use crate::error::GenerationError;
use crate::identity::{attachment_file_name, fresh_id};
use crate::records::{Attachment, Product, ProductBundle, ProductStatus};
use crate::synthetic;

/// Fewest random products generated per run.
pub const RANDOM_PRODUCT_MIN: usize = 5;

/// Most random products generated per run.
pub const RANDOM_PRODUCT_MAX: usize = 20;

/// Plans between [`RANDOM_PRODUCT_MIN`] and [`RANDOM_PRODUCT_MAX`] products.
///
/// Every field is random: fresh product and attachment ids, a commerce
/// title, any status, and a possibly empty set of views.
///
/// # Errors
///
/// Returns [`GenerationError::NoCategories`] if `ctx` holds no categories.
pub fn random_product_plans(
    rng: &mut ChaCha8Rng,
    ctx: &GenerationContext<'_>,
) -> Result<Vec<ProductPlan>, GenerationError> {
    let count = rng.random_range(RANDOM_PRODUCT_MIN..=RANDOM_PRODUCT_MAX);
    (0..count).map(|_| random_plan(rng, ctx)).collect()
}

fn random_plan(
    rng: &mut ChaCha8Rng,
    ctx: &GenerationContext<'_>,
) -> Result<ProductPlan, GenerationError> {
    let category = ctx.pick_category(rng)?;
    let status = ProductStatus::ALL
        .choose(rng)
        .copied()
        .unwrap_or_default();
    let product = Product {
        id: fresh_id(rng),
        title: synthetic::product_title(rng),
        description: synthetic::product_description(rng),
        price_in_cents: synthetic::price_in_cents(rng),
        owner_id: ctx.seller.id,
        status,
        category_id: category.id,
    };
    let attachment_id = fresh_id(rng);
    let source_image = ctx.images.choose(rng).to_owned();
    let views = ctx.views(rng, 0);

    Ok(ProductPlan {
        bundle: ProductBundle {
            product,
            attachment: Attachment {
                id: attachment_id,
                path: attachment_file_name(attachment_id),
            },
            views,
        },
        source_image,
    })
}
