//! Identity literals and identifier helpers.
//!
//! The seller credentials and the fixed product identifiers are an external
//! contract: integration tests, demo links and documentation address these
//! records directly. Changing any literal here breaks that tooling.

use rand::Rng;
use uuid::{Builder, Uuid};

/// Display name of the seller.
pub const SELLER_NAME: &str = "Seller";

/// Login e-mail of the seller.
pub const SELLER_EMAIL: &str = "seller@mba.com";

/// Plain-text password of the seller before hashing.
pub const SELLER_PASSWORD: &str = "123456";

/// bcrypt cost factor applied to the seller password.
pub const SELLER_HASH_COST: u32 = 8;

/// Extension given to every staged attachment file.
pub const ATTACHMENT_EXTENSION: &str = "png";

/// A flagship product with a literal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProduct {
    /// Literal product identifier, reused across runs.
    pub id: Uuid,
    /// Literal product title.
    pub title: &'static str,
}

/// Flagship products in staging order.
pub const FIXED_PRODUCTS: [FixedProduct; 5] = [
    FixedProduct {
        id: Uuid::from_u128(1),
        title: "Seiya de Pégaso",
    },
    FixedProduct {
        id: Uuid::from_u128(2),
        title: "Shiryu de Dragão",
    },
    FixedProduct {
        id: Uuid::from_u128(3),
        title: "Hyoga de Cisne",
    },
    FixedProduct {
        id: Uuid::from_u128(4),
        title: "Shun de Andrômeda",
    },
    FixedProduct {
        id: Uuid::from_u128(5),
        title: "Ikki de Fênix",
    },
];

/// Draws a fresh v4 identifier from the generator's RNG.
///
/// Drawing from the run RNG rather than the OS keeps seeded runs
/// reproducible.
pub fn fresh_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.random()).into_uuid()
}

/// Returns the staged file name for an attachment identifier.
///
/// # Examples
///
/// ```
/// use marketplace_seed::identity::{FIXED_PRODUCTS, attachment_file_name};
///
/// let first = FIXED_PRODUCTS.first().map(|product| product.id).unwrap_or_default();
/// assert_eq!(
///     attachment_file_name(first),
///     "00000000-0000-0000-0000-000000000001.png"
/// );
/// ```
#[must_use]
pub fn attachment_file_name(attachment_id: Uuid) -> String {
    format!("{}.{ATTACHMENT_EXTENSION}", attachment_id.hyphenated())
}
