//! Category entity: stored record, request bodies, and wire DTOs.

use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::product::ProductDto;

/// A category document as persisted in the `categories` collection.
///
/// `products` is a denormalized back-index of product references, the mirror
/// of each product's `category` name string. It is an ordered set: appends
/// are idempotent and never introduce duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    #[serde(rename = "_id")]
    pub system_id: ObjectId,
    /// Unique, compared case-insensitively at the application level.
    pub name: String,
    #[serde(default)]
    pub products: Vec<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

impl CategoryRecord {
    /// Convert to the wire DTO, product references as hex strings.
    #[must_use]
    pub fn into_dto(self) -> CategoryDto {
        let created_at = self.created_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        let updated_at = self.updated_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        CategoryDto {
            system_id: self.system_id.to_hex(),
            name: self.name,
            products: self.products.iter().map(|id| id.to_hex()).collect(),
            created_at,
            updated_at,
        }
    }

    /// Convert to the resolved view, with product references replaced by the
    /// given full records.
    #[must_use]
    pub fn into_with_products(self, products: Vec<ProductDto>) -> CategoryWithProducts {
        let created_at = self.created_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        let updated_at = self.updated_at.map_or_else(Utc::now, bson::DateTime::to_chrono);
        CategoryWithProducts {
            system_id: self.system_id.to_hex(),
            name: self.name,
            products,
            created_at,
            updated_at,
        }
    }
}

/// Wire representation of a category, references unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(rename = "_id")]
    pub system_id: String,
    pub name: String,
    pub products: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its product references resolved to full products.
///
/// Dangling references resolve to nothing, so `products` may be shorter than
/// the stored reference list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithProducts {
    #[serde(rename = "_id")]
    pub system_id: String,
    pub name: String,
    pub products: Vec<ProductDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Body of `PUT /api/categories/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_renders_references_as_hex() {
        let product_ref = ObjectId::new();
        let record = CategoryRecord {
            system_id: ObjectId::new(),
            name: "Shirts".to_owned(),
            products: vec![product_ref],
            created_at: Some(bson::DateTime::now()),
            updated_at: Some(bson::DateTime::now()),
        };
        let dto = record.into_dto();
        assert_eq!(dto.products, vec![product_ref.to_hex()]);
    }

    #[test]
    fn resolved_view_serializes_with_system_id_field() {
        let record = CategoryRecord {
            system_id: ObjectId::new(),
            name: "Shirts".to_owned(),
            products: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        let value =
            serde_json::to_value(record.into_with_products(Vec::new())).expect("serialize");
        assert!(value.get("_id").is_some());
        assert_eq!(value["products"], serde_json::json!([]));
    }
}
