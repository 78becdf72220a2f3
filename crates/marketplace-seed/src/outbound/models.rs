//! Insertable row structs for the fixture tables.
//!
//! Rows borrow from the records they are built from, so a bundle is written
//! without cloning its strings.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{attachments, categories, products, users, views};
use crate::records::{Attachment, Category, Product, User, View};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(super) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
}

impl<'a> From<&'a Category> for NewCategoryRow<'a> {
    fn from(category: &'a Category) -> Self {
        Self {
            id: category.id,
            title: &category.title,
            slug: &category.slug,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(super) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            name: &user.name,
            email: &user.email,
            password: &user.password_hash,
            phone: &user.phone,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(super) struct NewProductRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price_in_cents: i32,
    pub status: &'static str,
    pub owner_id: Uuid,
    pub category_id: Uuid,
}

impl<'a> From<&'a Product> for NewProductRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            id: product.id,
            title: &product.title,
            description: &product.description,
            price_in_cents: product.price_in_cents,
            status: product.status.as_str(),
            owner_id: product.owner_id,
            category_id: product.category_id,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attachments)]
pub(super) struct NewAttachmentRow<'a> {
    pub id: Uuid,
    pub path: &'a str,
    pub product_id: Option<Uuid>,
}

impl<'a> NewAttachmentRow<'a> {
    pub(super) fn for_product(attachment: &'a Attachment, product_id: Uuid) -> Self {
        Self {
            id: attachment.id,
            path: &attachment.path,
            product_id: Some(product_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = views)]
pub(super) struct NewViewRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub viewer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewViewRow {
    pub(super) const fn for_product(view: &View, product_id: Uuid) -> Self {
        Self {
            id: view.id,
            product_id,
            viewer_id: view.viewer_id,
            created_at: view.created_at,
        }
    }
}
