mod error;
mod hash;
mod traits;

pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use hash::ContentHash;
pub use traits::BlobStore;
