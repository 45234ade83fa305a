//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message};
use rust_decimal::Decimal;

use crate::error::LlmError;
use crate::llm::costs::model_cost;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Adapter wrapping any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    provider: String,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, provider: &str, model_name: &str) -> Self {
        Self {
            model,
            provider: provider.to_string(),
            model_name: model_name.to_string(),
        }
    }
}

/// Split our message list into rig's (preamble, history, prompt) triple.
///
/// System messages are joined into the preamble. The last non-system
/// message becomes the prompt; everything before it is chat history.
fn split_messages(
    messages: Vec<ChatMessage>,
) -> (Option<String>, Vec<Message>, Option<Message>) {
    let mut system_parts = Vec::new();
    let mut history = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(msg.content),
            Role::User => history.push(Message::user(msg.content)),
            Role::Assistant => history.push(Message::assistant(msg.content)),
        }
    }

    let preamble = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };
    let prompt = history.pop();
    (preamble, history, prompt)
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        model_cost(&self.model_name)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_messages(request.messages);
        let prompt = prompt.ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.clone(),
            reason: "completion request has no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| {
            let reason = e.to_string();
            if reason.contains("401") || reason.to_ascii_lowercase().contains("api key") {
                LlmError::AuthFailed {
                    provider: self.provider.clone(),
                }
            } else {
                LlmError::RequestFailed {
                    provider: self.provider.clone(),
                    reason,
                }
            }
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let input_tokens = u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX);
        let output_tokens = u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX);

        tracing::debug!(
            provider = %self.provider,
            model = %self.model_name,
            input_tokens,
            output_tokens,
            "Completion received"
        );

        Ok(CompletionResponse {
            content,
            input_tokens,
            output_tokens,
            // rig does not surface a normalized stop reason
            finish_reason: FinishReason::Unknown,
            response_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_joins_system_messages_into_preamble() {
        let (preamble, history, prompt) = split_messages(vec![
            ChatMessage::system("You are an analyst."),
            ChatMessage::system("Be concise."),
            ChatMessage::user("Estimate my footprint."),
        ]);
        assert_eq!(preamble.as_deref(), Some("You are an analyst.\n\nBe concise."));
        assert!(history.is_empty());
        assert_eq!(prompt, Some(Message::user("Estimate my footprint.")));
    }

    #[test]
    fn split_keeps_earlier_turns_as_history() {
        let (preamble, history, prompt) = split_messages(vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ]);
        assert!(preamble.is_none());
        assert_eq!(history, vec![Message::user("first"), Message::assistant("reply")]);
        assert_eq!(prompt, Some(Message::user("second")));
    }

    #[test]
    fn split_without_messages_has_no_prompt() {
        let (_, _, prompt) = split_messages(vec![ChatMessage::system("only system")]);
        assert!(prompt.is_none());
    }
}
