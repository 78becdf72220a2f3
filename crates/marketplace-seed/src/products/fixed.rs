//! The five flagship products with literal identifiers.

use rand_chacha::ChaCha8Rng;

use super::{GenerationContext, ProductPlan};
use crate::error::GenerationError;
use crate::identity::{FIXED_PRODUCTS, attachment_file_name};
use crate::records::{Attachment, Product, ProductBundle, ProductStatus};
use crate::synthetic;

/// Every flagship product is viewed at least once.
const FIXED_MIN_VIEWERS: usize = 1;

/// Plans the flagship products in their literal order.
///
/// Each product reuses its literal id as its attachment id, so the staged
/// file name is stable across runs. Images are assigned round-robin from the
/// pool. Status is always available; description, price and category are
/// drawn from `rng`, as are the views.
///
/// # Errors
///
/// Returns [`GenerationError::NoCategories`] if `ctx` holds no categories.
pub fn fixed_product_plans(
    rng: &mut ChaCha8Rng,
    ctx: &GenerationContext<'_>,
) -> Result<Vec<ProductPlan>, GenerationError> {
    FIXED_PRODUCTS
        .iter()
        .enumerate()
        .map(|(index, fixed)| {
            let category = ctx.pick_category(rng)?;
            let product = Product {
                id: fixed.id,
                title: fixed.title.to_owned(),
                description: synthetic::product_description(rng),
                price_in_cents: synthetic::price_in_cents(rng),
                owner_id: ctx.seller.id,
                status: ProductStatus::Available,
                category_id: category.id,
            };
            let views = ctx.views(rng, FIXED_MIN_VIEWERS);
            Ok(ProductPlan {
                bundle: ProductBundle {
                    product,
                    attachment: Attachment {
                        id: fixed.id,
                        path: attachment_file_name(fixed.id),
                    },
                    views,
                },
                source_image: ctx.images.round_robin(index).to_owned(),
            })
        })
        .collect()
}
