//! File Storage Layer
//!
//! This crate provides a single storage contract, [`StorageService`],
//! with in-memory, local disk, and S3-compatible object storage backends.
//! Files are addressed by [`Location`] and read back as [`StorageObject`]s.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod location;
pub mod memory;
pub mod object;
pub mod remote;
pub mod s3;

#[cfg(test)]
mod conformance;

pub use backend::StorageService;
pub use client::{ObjectClient, ObjectStoreClient, RemoteObject};
pub use config::{LocalStorageConfig, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use location::Location;
pub use memory::MemoryStorage;
pub use object::{
    ByteStream, StorageObject, collect_bytes, copy_to_path, stream_from_bytes, stream_from_reader,
};
pub use remote::RemoteStorage;
pub use s3::S3Config;
