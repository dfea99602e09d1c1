//! Product entity: stored record, request bodies, and wire DTO.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Per-size stock levels for a variant.
///
/// The map stays nested under a `stock` field so the JSON shape of a variant
/// is `{"color": ..., "images": [...], "stock": {"stock": {"M": 4}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStock {
    pub stock: BTreeMap<String, u32>,
}

/// A purchasable color variant of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub color: String,
    pub images: Vec<String>,
    pub stock: VariantStock,
}

/// Discount attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub is_active: bool,
    /// Percent off, 0 to 100.
    pub percentage: f64,
    pub discounted_price: f64,
}

/// A product document as persisted in the `products` collection.
///
/// Carries two identities: the store-assigned `_id` and the caller-assigned
/// business `id` (unique-indexed). `category` is a denormalized name, not a
/// foreign key; the category's `products` array is the other half of that
/// relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub system_id: ObjectId,
    /// Caller-assigned business id, e.g. `prod_001`.
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Denormalized category name.
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Minimum order quantity, at least 1.
    pub moq: u32,
    /// Set by the store on insert. Optional so documents written by other
    /// tooling still deserialize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

impl ProductRecord {
    /// Build a record from a create request. Timestamps are left unset; the
    /// store assigns them at insert time.
    #[must_use]
    pub fn from_create(req: CreateProductRequest) -> Self {
        Self {
            system_id: ObjectId::new(),
            id: req.id,
            title: req.title,
            description: req.description,
            brand: req.brand,
            category: req.category,
            gender: req.gender,
            price: req.price,
            discount: req.discount,
            available_sizes: req.available_sizes,
            variants: req.variants,
            material: req.material,
            care_instructions: req.care_instructions,
            rating: req.rating,
            reviews: req.reviews,
            tags: req.tags,
            moq: req.moq,
            created_at: None,
            updated_at: None,
        }
    }

    /// Convert to the wire DTO.
    ///
    /// Missing timestamps resolve to "now" here, in the transform only; the
    /// persisted document is never backfilled.
    #[must_use]
    pub fn into_dto(self) -> ProductDto {
        let created_at = self.created_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        let updated_at = self.updated_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        ProductDto {
            system_id: self.system_id.to_hex(),
            id: self.id,
            title: self.title,
            description: self.description,
            brand: self.brand,
            category: self.category,
            gender: self.gender,
            price: self.price,
            discount: self.discount,
            available_sizes: self.available_sizes,
            variants: self.variants,
            material: self.material,
            care_instructions: self.care_instructions,
            rating: self.rating,
            reviews: self.reviews,
            tags: self.tags,
            moq: self.moq,
            created_at,
            updated_at,
        }
    }
}

/// Wire representation of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    /// Store-assigned identity, hex-encoded.
    #[serde(rename = "_id")]
    pub system_id: String,
    /// Caller-assigned business id.
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub available_sizes: Vec<String>,
    pub variants: Vec<Variant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub moq: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<Discount>,
    pub available_sizes: Vec<String>,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub care_instructions: Option<Vec<String>>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub moq: u32,
}

/// Body of `PUT /api/products/{id}`: a partial-field merge.
///
/// Also the patch document handed to the store; absent fields are left
/// untouched by the update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_sizes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moq: Option<u32>,
}

impl ProductPatch {
    /// True when no field is set; the store skips the write entirely.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.gender.is_none()
            && self.price.is_none()
            && self.discount.is_none()
            && self.available_sizes.is_none()
            && self.variants.is_none()
            && self.material.is_none()
            && self.care_instructions.is_none()
            && self.rating.is_none()
            && self.reviews.is_none()
            && self.tags.is_none()
            && self.moq.is_none()
    }
}
