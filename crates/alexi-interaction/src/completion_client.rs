//! ChatCompletionClient - OpenAI-compatible chat completions with bounded retry.
//!
//! Requests go to `{base_url}/v1/chat/completions` through the proxy, which
//! attaches the upstream credential and forwards status and body verbatim.
//!
//! Only HTTP 500 is treated as transient: the request is retried after a
//! fixed backoff until `max_attempts` is reached. Every other non-2xx status
//! fails immediately, and transport failures are never retried.

use crate::progress::{RequestObserver, RequestProgress};
use alexi_core::chat::ChatTurn;
use alexi_core::config::CompletionConfig;
use alexi_core::error::{AlexiError, Result};
use alexi_core::transport::{Header, HttpResponse, HttpTransport, bearer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// The only status treated as transient.
const TRANSIENT_STATUS: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    fn should_retry(&self, status: u16, attempt: u32) -> bool {
        status == TRANSIENT_STATUS && attempt < self.max_attempts
    }
}

/// One message of the completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.as_str(),
            content: turn.text.clone(),
        }
    }
}

/// Assistant text plus the number of attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub text: String,
    pub attempts: u32,
}

#[derive(Clone)]
pub struct ChatCompletionClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
}

impl ChatCompletionClient {
    /// Creates a client with the default model, sampling and retry settings.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let defaults = CompletionConfig::default();
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            retry: RetryPolicy::default(),
        }
    }

    /// Builds a client from the `[completion]` config section.
    ///
    /// Fails with a `Config` error when no API key is configured.
    pub fn from_config(config: &CompletionConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AlexiError::config(
                    "No completion API key. Set ALEXI_API_KEY or [completion].api_key in config.toml",
                )
            })?;

        Ok(Self::new(config.base_url.clone(), api_key, transport)
            .with_model(config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
            .with_retry_policy(RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                backoff: Duration::from_millis(config.retry_delay_ms),
            }))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn headers(&self) -> [Header; 1] {
        [bearer(&self.api_key)]
    }

    /// Sends one completion request, retrying transient failures.
    ///
    /// Cancellation through `observer` is honoured before each attempt, while
    /// a request is in flight and during the backoff; it fails the call with
    /// `Cancelled` and no further attempt is issued.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        observer: &RequestObserver,
    ) -> Result<CompletionOutcome> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::to_value(ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        })?;
        let headers = self.headers();
        let max_attempts = self.retry.max_attempts;
        let mut attempt = 1;

        loop {
            if observer.is_cancelled() {
                return Err(cancelled(attempt));
            }

            observer.emit(RequestProgress::AttemptStarted {
                attempt,
                max_attempts,
            });
            tracing::debug!("[Completion] Attempt {}/{} ({})", attempt, max_attempts, self.model);

            let response = tokio::select! {
                biased;
                _ = observer.cancellation().cancelled() => return Err(cancelled(attempt)),
                result = self.transport.post_json(&url, &headers, &body) => result,
            };

            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("[Completion] Transport failure on attempt {}: {}", attempt, e);
                    observer.emit(RequestProgress::Failed { attempts: attempt });
                    return Err(e);
                }
            };

            if self.retry.should_retry(response.status, attempt) {
                let delay = self.retry.backoff;
                tracing::warn!(
                    "[Completion] HTTP {} on attempt {}/{}, retrying in {}ms",
                    response.status,
                    attempt,
                    max_attempts,
                    delay.as_millis()
                );
                observer.emit(RequestProgress::RetryScheduled {
                    attempt,
                    max_attempts,
                    status: response.status,
                    delay,
                });

                tokio::select! {
                    biased;
                    _ = observer.cancellation().cancelled() => return Err(cancelled(attempt)),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
                continue;
            }

            return match extract_completion(&response, attempt) {
                Ok(text) => {
                    if attempt > 1 {
                        tracing::info!("[Completion] Succeeded after {} attempts", attempt);
                    }
                    observer.emit(RequestProgress::Succeeded { attempts: attempt });
                    Ok(CompletionOutcome {
                        text,
                        attempts: attempt,
                    })
                }
                Err(e) => {
                    tracing::error!("[Completion] Request failed: {}", e);
                    observer.emit(RequestProgress::Failed { attempts: attempt });
                    Err(e)
                }
            };
        }
    }

    /// Sends `user_text` under `system_prompt` after the existing `history`.
    ///
    /// Messages are ordered system, history (in order), then the new user
    /// message. No retries happen beyond those of [`Self::chat_completion`].
    pub async fn send_message(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_text: &str,
        observer: &RequestObserver,
    ) -> Result<CompletionOutcome> {
        let messages: Vec<ChatMessage> = std::iter::once(ChatMessage::system(system_prompt))
            .chain(history.iter().map(ChatMessage::from))
            .chain(std::iter::once(ChatMessage::user(user_text)))
            .collect();

        self.chat_completion(&messages, observer).await
    }

    /// Lists the model ids the endpoint serves. Not retried.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self.transport.get(&url, &self.headers()).await?;
        if !response.is_success() {
            return Err(AlexiError::upstream(
                response.status,
                error_message(&response),
                1,
            ));
        }

        let parsed: ModelList = serde_json::from_str(&response.body)
            .map_err(|e| AlexiError::malformed(format!("Invalid model list: {}", e)))?;
        Ok(parsed.data.into_iter().map(|m| m.id).collect())
    }
}

fn cancelled(attempt: u32) -> AlexiError {
    tracing::info!("[Completion] Request cancelled during attempt {}", attempt);
    AlexiError::Cancelled
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

fn error_message(response: &HttpResponse) -> String {
    if let Ok(wrapper) = serde_json::from_str::<ErrorResponse>(&response.body) {
        return wrapper.error.message;
    }
    let body = response.body.trim();
    if body.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        body.to_string()
    }
}

fn extract_completion(response: &HttpResponse, attempts: u32) -> Result<String> {
    if !response.is_success() {
        return Err(AlexiError::upstream(
            response.status,
            error_message(response),
            attempts,
        ));
    }

    let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)
        .map_err(|e| AlexiError::malformed(format!("Unexpected completion body: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AlexiError::malformed("Completion response has no choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexi_infrastructure::testing::ScriptedTransport;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn completion(text: &str) -> serde_json::Value {
        json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
        })
    }

    fn client(transport: &ScriptedTransport) -> ChatCompletionClient {
        ChatCompletionClient::new("http://proxy.test/api/albert", "key", Arc::new(transport.clone()))
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(1),
            })
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<RequestProgress>) -> Vec<RequestProgress> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_two_500s() {
        let transport = ScriptedTransport::new()
            .respond(500, "boom")
            .respond(500, "boom")
            .respond_json(200, completion("Bonjour"));

        let outcome = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &RequestObserver::new())
            .await
            .unwrap();

        assert_eq!(outcome.text, "Bonjour");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_three_500s_fail_without_fourth_request() {
        let transport = ScriptedTransport::new()
            .respond(500, "boom")
            .respond(500, "boom")
            .respond_json(500, json!({"error": {"message": "model overloaded"}}))
            .respond_json(200, completion("never"));

        let err = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &RequestObserver::new())
            .await
            .unwrap_err();

        match err {
            AlexiError::Upstream {
                status,
                ref message,
                attempts,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model overloaded");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Upstream, got {:?}", other),
        }
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_404_fails_after_one_attempt() {
        let transport = ScriptedTransport::new()
            .respond_json(404, json!({"error": {"message": "Model not found"}}))
            .respond_json(200, completion("never"));

        let err = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &RequestObserver::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, AlexiError::Upstream { attempts: 1, .. }));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let transport = ScriptedTransport::new().respond_json(200, json!({"choices": []}));
        let err = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &RequestObserver::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AlexiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_network_error_is_not_retried() {
        let transport = ScriptedTransport::new()
            .fail("connection refused")
            .respond_json(200, completion("never"));
        let err = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &RequestObserver::new())
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_progress_events_follow_retries() {
        let transport = ScriptedTransport::new()
            .respond(500, "boom")
            .respond_json(200, completion("ok"));
        let (observer, mut rx) = RequestObserver::channel();

        client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &observer)
            .await
            .unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                RequestProgress::AttemptStarted { attempt: 1, max_attempts: 3 },
                RequestProgress::RetryScheduled {
                    attempt: 1,
                    max_attempts: 3,
                    status: 500,
                    delay: Duration::from_millis(1),
                },
                RequestProgress::AttemptStarted { attempt: 2, max_attempts: 3 },
                RequestProgress::Succeeded { attempts: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let transport = ScriptedTransport::new().respond_json(200, completion("never"));
        let token = CancellationToken::new();
        token.cancel();
        let observer = RequestObserver::new().with_cancellation(token);

        let err = client(&transport)
            .chat_completion(&[ChatMessage::user("hi")], &observer)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_retry_loop() {
        let transport = ScriptedTransport::new()
            .respond(500, "boom")
            .respond_json(200, completion("never"));
        let client = client(&transport).with_retry_policy(RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(30),
        });
        let token = CancellationToken::new();
        let observer = RequestObserver::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = client
            .chat_completion(&[ChatMessage::user("hi")], &observer)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_send_message_orders_system_history_user() {
        let transport = ScriptedTransport::new().respond_json(200, completion("ok"));
        let history = vec![ChatTurn::user("first"), ChatTurn::assistant("reply")];

        client(&transport)
            .send_message("Be a pirate.", &history, "second", &RequestObserver::new())
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://proxy.test/api/albert/v1/chat/completions");
        assert_eq!(request.header("Authorization"), Some("Bearer key"));

        let body = request.body.as_ref().unwrap();
        assert_eq!(body["model"], "albert-large");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["stream"], false);
        let roles: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(body["messages"][0]["content"], "Be a pirate.");
        assert_eq!(body["messages"][3]["content"], "second");
    }

    #[tokio::test]
    async fn test_list_models() {
        let transport = ScriptedTransport::new().respond_json(
            200,
            json!({"object": "list", "data": [{"id": "albert-small"}, {"id": "albert-large"}]}),
        );
        let models = client(&transport).list_models().await.unwrap();
        assert_eq!(models, vec!["albert-small", "albert-large"]);
        assert_eq!(transport.requests()[0].method, "GET");
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let transport: Arc<dyn HttpTransport> = Arc::new(ScriptedTransport::new());
        let err = ChatCompletionClient::from_config(&CompletionConfig::default(), transport.clone())
            .err()
            .unwrap();
        assert!(matches!(err, AlexiError::Config(_)));

        let config = CompletionConfig {
            api_key: Some("k".into()),
            max_attempts: 5,
            retry_delay_ms: 10,
            ..CompletionConfig::default()
        };
        let client = ChatCompletionClient::from_config(&config, transport).unwrap();
        assert_eq!(client.retry_policy().max_attempts, 5);
        assert_eq!(client.retry_policy().backoff, Duration::from_millis(10));
    }
}
