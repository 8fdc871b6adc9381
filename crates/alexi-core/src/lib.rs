pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod persona;
pub mod transport;

// Re-export common error type
pub use error::{AlexiError, Result};
