//! Storage Adapters
//!
//! Implementations of the storage ports.
//!
//! ## Available Adapters
//!
//! - **JsonFileStore** - Transcripts, datasets and reports as files on disk

mod json_file_store;

pub use json_file_store::JsonFileStore;
