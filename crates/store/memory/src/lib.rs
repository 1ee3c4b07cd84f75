mod store;

pub use store::MemoryDropStore;
