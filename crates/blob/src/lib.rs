pub mod error;
pub mod local;
pub mod memory;
pub mod store;

pub use error::BlobError;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use store::BlobStore;
