//! Catalog entities and their wire representations.
//!
//! Each entity comes in two shapes: a `*Record` as persisted in the document
//! store (BSON object ids, BSON timestamps) and a `*Dto` as serialized over
//! HTTP (hex ids, RFC 3339 timestamps, camelCase fields). Request bodies have
//! their own types so partial updates stay distinguishable from full writes.

pub mod category;
pub mod product;

pub use category::{
    CategoryDto, CategoryRecord, CategoryWithProducts, CreateCategoryRequest,
    UpdateCategoryRequest,
};
pub use product::{CreateProductRequest, Discount, ProductDto, ProductPatch, ProductRecord};
