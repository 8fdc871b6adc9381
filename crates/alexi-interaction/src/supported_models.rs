//! Model ids served by the completion endpoint.
//!
//! | Model ID | Backing model | Notes |
//! |----------|---------------|-------|
//! | `albert-small` | Llama-3.1-8B-Instruct | Fast |
//! | `albert-large` | Mistral-Small-3.1-24B-Instruct | Default |
//! | `albert-code` | Qwen2.5-Coder-32B-Instruct | Code generation |
//! | `AgentPublic/albert-spp-8b` | Albert SPP 8B | Public-service domain |
//!
//! The live list is available through `ChatCompletionClient::list_models`;
//! these constants only cover the ids the CLI knows how to describe.

pub const ALBERT_SMALL: &str = "albert-small";
pub const ALBERT_LARGE: &str = "albert-large";
pub const ALBERT_CODE: &str = "albert-code";
pub const ALBERT_SPP: &str = "AgentPublic/albert-spp-8b";

pub const DEFAULT_MODEL: &str = ALBERT_LARGE;

/// Known models with a short description.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    (ALBERT_SMALL, "Llama-3.1-8B-Instruct"),
    (ALBERT_LARGE, "Mistral-Small-3.1-24B-Instruct"),
    (ALBERT_CODE, "Qwen2.5-Coder-32B-Instruct"),
    (ALBERT_SPP, "Albert SPP 8B"),
];

/// Description of a known model id.
pub fn describe(model: &str) -> Option<&'static str> {
    KNOWN_MODELS
        .iter()
        .find(|(id, _)| *id == model)
        .map(|(_, description)| *description)
}
