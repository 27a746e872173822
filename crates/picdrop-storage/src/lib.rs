//! Picdrop Storage Library
//!
//! Upload intake storage: the `UploadStore` trait and its local filesystem implementation.
//!
//! # Layout
//!
//! The upload root is a single flat directory. Stored files are named
//! `<token><extension>` where the token is a time-ordered UUIDv7 in simple (hex) form and
//! the extension is taken from the client-supplied filename. In-flight uploads live next to
//! them as `.<final name>.part` and are renamed into place once fully written, so a reader
//! of the directory never observes a partially written file under its final name.

pub mod factory;
pub mod local;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use naming::{derive_extension, generate_filename};
pub use traits::{
    IncomingFile, StagedUpload, StorageError, StorageResult, StoredFile, UploadStore,
};
