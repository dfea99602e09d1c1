//! Error taxonomy for the catalog services.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the catalog services.
///
/// Maps one-to-one onto response statuses: `NotFound` → 404, `Conflict` →
/// 409, `BadRequest` → 400, `Internal` → 500.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Referenced entity (by id, name, or title) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint (business id, title, category name) would be
    /// violated.
    #[error("{0}")]
    Conflict(String),

    /// Malformed identifier, missing required field, or out-of-range value.
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected store or cache failure.
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            // Reaching this without a service-level pre-check means a race;
            // the taxonomy kind is the same either way.
            StoreError::Duplicate(field) => {
                Self::Conflict(format!("duplicate value for unique field \"{field}\""))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
