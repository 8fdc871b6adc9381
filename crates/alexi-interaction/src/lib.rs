//! Completion endpoint interaction: the retrying chat-completion client,
//! typed request progress and the model catalogue.

pub mod completion_client;
pub mod progress;
pub mod supported_models;

pub use completion_client::{ChatCompletionClient, ChatMessage, CompletionOutcome, RetryPolicy};
pub use progress::{RequestObserver, RequestProgress};
