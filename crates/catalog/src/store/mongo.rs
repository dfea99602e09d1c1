//! MongoDB-backed stores.
//!
//! Collections: `products` (unique index on the business `id`) and
//! `categories` (unique index on `name`). Case-insensitive lookups are
//! anchored regexes built here from caller input; the input is escaped so
//! metacharacters in a name or title match literally.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use secrecy::{ExposeSecret, SecretString};

use super::{CategoryStore, ProductStore, StoreError};
use crate::models::category::CategoryRecord;
use crate::models::product::{ProductPatch, ProductRecord};

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";

/// Connect to MongoDB and select the catalog database.
///
/// # Errors
///
/// Returns `mongodb::error::Error` if the connection string is invalid or the
/// server cannot be reached.
pub async fn connect(
    mongodb_url: &SecretString,
    database: &str,
) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(mongodb_url.expose_secret()).await?;
    Ok(client.database(database))
}

/// Create the unique indexes both stores rely on.
///
/// Idempotent; safe to run on every startup.
///
/// # Errors
///
/// Returns `mongodb::error::Error` if index creation fails.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let products: Collection<ProductRecord> = db.collection(PRODUCTS);
    products
        .create_index(
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let categories: Collection<CategoryRecord> = db.collection(CATEGORIES);
    categories
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    Ok(())
}

/// Anchored case-insensitive matcher for caller-supplied text.
fn ci_exact(value: &str) -> Bson {
    Bson::RegularExpression(bson::Regex {
        pattern: format!("^{}$", regex::escape(value)),
        options: "i".to_owned(),
    })
}

/// True when the server rejected a write on a unique index.
///
/// Inserts report this as a write error, findAndModify as a command error;
/// both carry server code 11000.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// Product store over the `products` collection.
#[derive(Clone)]
pub struct MongoProductStore {
    db: Database,
    products: Collection<ProductRecord>,
}

impl MongoProductStore {
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            products: db.collection(PRODUCTS),
        }
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let cursor = self.products.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_system_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.products.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_business_id(
        &self,
        business_id: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.products.find_one(doc! { "id": business_id }).await?)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self
            .products
            .find_one(doc! { "title": ci_exact(title) })
            .await?)
    }

    async fn find_conflicting(
        &self,
        business_id: &str,
        title: &str,
        exclude: Option<ObjectId>,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let mut filter = doc! { "$or": [ { "id": business_id }, { "title": title } ] };
        if let Some(exclude) = exclude {
            filter.insert("_id", doc! { "$ne": exclude });
        }
        Ok(self.products.find_one(filter).await?)
    }

    async fn find_by_system_ids(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<ProductRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .products
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let cursor = self
            .products
            .find(doc! { "category": ci_exact(category) })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, mut record: ProductRecord) -> Result<ProductRecord, StoreError> {
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        self.products.insert_one(&record).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate("id")
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(record)
    }

    async fn update(
        &self,
        id: ObjectId,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let mut set = bson::to_document(patch)
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?;
        set.insert("updatedAt", bson::DateTime::now());
        let updated = self
            .products
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate("id")
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(updated)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let result = self.products.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Category store over the `categories` collection.
#[derive(Clone)]
pub struct MongoCategoryStore {
    categories: Collection<CategoryRecord>,
}

impl MongoCategoryStore {
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection(CATEGORIES),
        }
    }
}

#[async_trait]
impl CategoryStore for MongoCategoryStore {
    async fn find_all(&self) -> Result<Vec<CategoryRecord>, StoreError> {
        let cursor = self.categories.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_system_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        Ok(self.categories.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, StoreError> {
        Ok(self
            .categories
            .find_one(doc! { "name": ci_exact(name) })
            .await?)
    }

    async fn insert(&self, name: &str) -> Result<CategoryRecord, StoreError> {
        let now = bson::DateTime::now();
        let record = CategoryRecord {
            system_id: ObjectId::new(),
            name: name.to_owned(),
            products: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.categories.insert_one(&record).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate("name")
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(record)
    }

    async fn rename(
        &self,
        id: ObjectId,
        name: &str,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let updated = self
            .categories
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "name": name, "updatedAt": bson::DateTime::now() } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate("name")
                } else {
                    StoreError::Database(e)
                }
            })?;
        Ok(updated)
    }

    async fn set_products(
        &self,
        id: ObjectId,
        products: Vec<ObjectId>,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let updated = self
            .categories
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "products": products, "updatedAt": bson::DateTime::now() } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let result = self.categories.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ci_matcher_is_anchored_and_case_insensitive() {
        let Bson::RegularExpression(regex) = ci_exact("Shirts") else {
            panic!("expected a regex");
        };
        assert_eq!(regex.pattern, "^Shirts$");
        assert_eq!(regex.options, "i");
    }

    #[test]
    fn ci_matcher_escapes_metacharacters() {
        let Bson::RegularExpression(regex) = ci_exact("T-Shirts (V2)?") else {
            panic!("expected a regex");
        };
        // Parens, question mark, and the rest must match literally.
        assert_eq!(regex.pattern, r"^T\-Shirts \(V2\)\?$");
    }
}
