pub mod file_store;
pub mod storage;

pub use file_store::JsonFileStore;
pub use storage::{MemoryStorage, Storage};
