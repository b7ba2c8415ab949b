//! Serve in-memory or lazily computed arrays as a Zarr v2 hierarchy over HTTP or as a zarrs store.

pub mod array;
pub mod attributes;
pub mod chunk;
pub mod chunk_grid;
pub mod chunk_key_encoding;
pub mod config;
pub mod data_type;
pub mod dataset;
mod error;
pub mod metadata;
pub mod resource;
pub mod sample;
pub mod server;
pub mod storage;

pub use zarrs;

pub use error::{Error, Result};
