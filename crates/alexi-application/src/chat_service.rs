//! Chat Service
//!
//! Runs the active conversation: it tracks which persona the user is talking
//! to, keeps the turns of the current conversation in memory and sends each
//! new user turn through the completion client.

use crate::persona_sync::PersonaSyncCoordinator;
use alexi_core::chat::{ChatTurn, Conversation};
use alexi_core::error::{AlexiError, Result};
use alexi_core::persona::Persona;
use alexi_interaction::{ChatCompletionClient, CompletionOutcome, RequestObserver};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ChatService {
    personas: Arc<PersonaSyncCoordinator>,
    client: ChatCompletionClient,
    conversation: Mutex<Conversation>,
}

impl ChatService {
    pub fn new(personas: Arc<PersonaSyncCoordinator>, client: ChatCompletionClient) -> Self {
        Self {
            personas,
            client,
            conversation: Mutex::new(Conversation::new()),
        }
    }

    /// Starts a conversation with `persona_id`, or with the default persona.
    pub async fn start(&self, persona_id: Option<&str>) -> Result<Persona> {
        match persona_id {
            Some(id) => self.switch_persona(id).await,
            None => {
                let persona = self
                    .personas
                    .default_persona()
                    .await
                    .ok_or_else(|| AlexiError::not_found("persona", "default"))?;
                self.conversation.lock().await.switch_persona(&persona.id);
                Ok(persona)
            }
        }
    }

    /// Switches to another persona, clearing the conversation.
    pub async fn switch_persona(&self, persona_id: &str) -> Result<Persona> {
        let persona = self
            .personas
            .get(persona_id)
            .await
            .ok_or_else(|| AlexiError::not_found("persona", persona_id))?;
        self.conversation.lock().await.switch_persona(&persona.id);
        tracing::debug!("[Chat] Switched to persona {}", persona.name);
        Ok(persona)
    }

    /// Clears the turns and keeps the active persona.
    pub async fn new_conversation(&self) {
        self.conversation.lock().await.reset();
    }

    pub async fn active_persona(&self) -> Option<Persona> {
        let id = self.conversation.lock().await.persona_id()?.to_string();
        self.personas.get(&id).await
    }

    pub async fn turns(&self) -> Vec<ChatTurn> {
        self.conversation.lock().await.turns().to_vec()
    }

    /// Sends `text` to the active persona and appends the reply.
    ///
    /// The user turn is recorded before the request and kept when it fails.
    /// A reply that arrives after the persona was switched is discarded.
    pub async fn send(&self, text: &str, observer: &RequestObserver) -> Result<CompletionOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AlexiError::validation("Message cannot be empty"));
        }

        let (persona_id, history) = {
            let conversation = self.conversation.lock().await;
            let persona_id = conversation
                .persona_id()
                .ok_or_else(|| AlexiError::validation("No active persona; start a conversation first"))?
                .to_string();
            (persona_id, conversation.turns().to_vec())
        };

        let persona = self
            .personas
            .get(&persona_id)
            .await
            .ok_or_else(|| AlexiError::not_found("persona", &persona_id))?;

        self.conversation.lock().await.push(ChatTurn::user(text));

        let outcome = self
            .client
            .send_message(&persona.prompt, &history, text, observer)
            .await?;

        let mut conversation = self.conversation.lock().await;
        if conversation.persona_id() == Some(persona_id.as_str()) {
            conversation.push(ChatTurn::assistant(outcome.text.clone()));
        } else {
            tracing::debug!("[Chat] Dropping reply for inactive persona {}", persona_id);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexi_core::chat::TurnRole;
    use alexi_core::persona::{PersonaCollection, RemotePersonaStore, SEED_DEFAULT_PERSONA_ID};
    use alexi_infrastructure::InMemoryLocalCache;
    use alexi_infrastructure::testing::ScriptedTransport;
    use alexi_interaction::RetryPolicy;
    use serde_json::json;
    use std::time::Duration;

    struct OfflineRemote;

    #[async_trait::async_trait]
    impl RemotePersonaStore for OfflineRemote {
        async fn fetch(&self) -> Result<PersonaCollection> {
            Err(AlexiError::network("offline"))
        }

        async fn push(&self, _collection: &PersonaCollection) -> Result<()> {
            Err(AlexiError::network("offline"))
        }
    }

    async fn service(transport: &ScriptedTransport) -> ChatService {
        let personas = Arc::new(PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(OfflineRemote),
        ));
        personas.load().await;
        let client = ChatCompletionClient::new("http://proxy.test", "key", Arc::new(transport.clone()))
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(1),
            });
        ChatService::new(personas, client)
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
    }

    #[tokio::test]
    async fn test_send_requires_active_persona() {
        let transport = ScriptedTransport::new();
        let service = service(&transport).await;
        let err = service.send("hi", &RequestObserver::new()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_send_appends_both_turns_and_sends_history() {
        let transport = ScriptedTransport::new()
            .respond_json(200, reply("one"))
            .respond_json(200, reply("two"));
        let service = service(&transport).await;

        let persona = service.start(None).await.unwrap();
        assert_eq!(persona.id, SEED_DEFAULT_PERSONA_ID);

        service.send("first", &RequestObserver::new()).await.unwrap();
        let outcome = service.send("second", &RequestObserver::new()).await.unwrap();
        assert_eq!(outcome.text, "two");

        let turns = service.turns().await;
        let roles: Vec<TurnRole> = turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![TurnRole::User, TurnRole::Assistant, TurnRole::User, TurnRole::Assistant]
        );

        let second_request = &transport.requests()[1];
        let messages = second_request.body.as_ref().unwrap()["messages"].as_array().unwrap().clone();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["content"], persona.prompt.as_str());
        assert_eq!(messages[2]["content"], "one");
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn() {
        let transport = ScriptedTransport::new().respond(404, "not found");
        let service = service(&transport).await;
        service.start(Some("pirate-captain")).await.unwrap();

        let err = service.send("ahoy", &RequestObserver::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let turns = service.turns().await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn test_switching_persona_clears_conversation() {
        let transport = ScriptedTransport::new().respond_json(200, reply("ok"));
        let service = service(&transport).await;
        service.start(None).await.unwrap();
        service.send("hello", &RequestObserver::new()).await.unwrap();

        service.switch_persona("stoic-philosopher").await.unwrap();
        assert!(service.turns().await.is_empty());
        assert_eq!(
            service.active_persona().await.map(|p| p.id).as_deref(),
            Some("stoic-philosopher")
        );
        assert!(service.switch_persona("missing").await.unwrap_err().is_not_found());
    }
}
