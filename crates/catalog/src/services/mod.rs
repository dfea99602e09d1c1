//! Catalog services.
//!
//! [`ProductCatalog`] and [`CategoryCatalog`] are peers over their own
//! collections, cooperating through a narrow interface: the product side
//! calls the category side to keep the denormalized back-index in sync.
//! Those linkage calls are best-effort: their failure is logged by the
//! caller and never aborts the primary operation.

mod categories;
mod error;
mod products;

pub use categories::CategoryCatalog;
pub use error::CatalogError;
pub use products::ProductCatalog;
