mod store;

pub use store::MemoryMessageStore;
