//! Threadline catalog library.
//!
//! CRUD product-catalog backend: products and categories over MongoDB, with
//! response caching on the read paths. The two entities denormalize one
//! relation twice (each product carries its category's name, each category
//! carries an array of product references) and the services keep the two
//! sides in sync best-effort on every mutation.
//!
//! The binary in `main.rs` wires this library to axum; everything here is
//! also usable against the in-memory store for tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
