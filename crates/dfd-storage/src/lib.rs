//! Analysis result persistence.
//!
//! This crate provides:
//! - The `ResultStore` contract (write once under a fresh id, read back by id)
//! - A local-filesystem store writing `<id>.json` records
//! - A Cloudflare R2 (S3-compatible) store

pub mod client;
pub mod error;
pub mod local;
pub mod r2;
pub mod store;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use local::LocalResultStore;
pub use r2::R2ResultStore;
pub use store::{decode_record, encode_record, record_key, ResultStore};
