//! Lumen Storage Library
//!
//! Storage abstraction for accepted uploads and a local filesystem implementation.
//!
//! # Storage key format
//!
//! Every stored image lives under `images/{uuid}.{extension}`. Keys must not contain
//! `..` or a leading `/`. Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
