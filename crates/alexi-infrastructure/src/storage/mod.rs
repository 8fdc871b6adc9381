//! Storage layer for the on-device cache.

mod atomic_file;
mod file_cache;
mod memory_cache;

pub use atomic_file::AtomicFile;
pub use file_cache::FileLocalCache;
pub use memory_cache::InMemoryLocalCache;
