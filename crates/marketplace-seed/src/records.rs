//! Row types written to the marketplace store.
//!
//! Identifiers are assigned by the generator rather than the database, so the
//! same types describe both the rows being written and the rows returned.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category with a URL-safe slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Primary key.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Lowercase hyphenated form of the title, unique per run.
    pub slug: String,
}

/// A marketplace user: either the seller or one of the viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login e-mail, unique across users.
    pub email: String,
    /// Stored credential. A bcrypt hash for the seller; viewers never
    /// authenticate and keep the generated password as-is.
    pub password_hash: String,
    /// Contact phone number.
    pub phone: String,
}

/// Lifecycle state of a product listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and purchasable.
    #[default]
    Available,
    /// Withdrawn by the seller.
    Cancelled,
    /// Purchased.
    Sold,
}

impl ProductStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Cancelled, Self::Sold];

    /// Column value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Cancelled => "cancelled",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product listing owned by the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Primary key. Literal for the fixed products.
    pub id: Uuid,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Price in cents.
    pub price_in_cents: i32,
    /// Owning user; always the seller.
    pub owner_id: Uuid,
    /// Listing state.
    pub status: ProductStatus,
    /// Category the listing belongs to.
    pub category_id: Uuid,
}

/// A staged file attached to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Primary key; also the stem of the staged file name.
    pub id: Uuid,
    /// Basename of the file in the staging directory.
    pub path: String,
}

/// One recorded view of a product by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Primary key.
    pub id: Uuid,
    /// Viewer that looked at the product. Never the seller.
    pub viewer_id: Uuid,
    /// Backdated view time.
    pub created_at: DateTime<Utc>,
}

/// A product together with the children created in the same unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductBundle {
    /// The product row.
    pub product: Product,
    /// Its single attachment.
    pub attachment: Attachment,
    /// Its view history, possibly empty.
    pub views: Vec<View>,
}
