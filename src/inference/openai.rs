//! OpenAI chat-completions handler. The request types are shared with the
//! Meta route, which speaks the same wire format.

use reqwest::Client;
use serde::Serialize;

use super::{post_json, ChatCompletionResponse, ChatMessage, ProviderError};
use crate::projects::Project;

pub const PROVIDER_LABEL: &str = "OpenAI";

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Project settings plus history. The system instructions lead as a
    /// system turn only when non-empty; history follows verbatim.
    pub fn for_project(project: &Project, history: &[ChatMessage]) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !project.system_instructions.is_empty() {
            messages.push(ChatMessage::system(project.system_instructions.clone()));
        }
        messages.extend_from_slice(history);
        Self {
            model: project.model.id.clone(),
            messages,
            max_tokens: project.output_tokens,
            temperature: project.temperature,
            stream: None,
        }
    }
}

/// POST a chat-completions request and return the first choice's content.
pub async fn complete(
    client: &Client,
    base_url: &str,
    api_key: &str,
    request: &ChatCompletionRequest,
    provider: &'static str,
) -> Result<String, ProviderError> {
    let url = format!("{base_url}/chat/completions");
    let builder = client.post(url).bearer_auth(api_key);
    let response: ChatCompletionResponse = post_json(builder, request, provider).await?;
    Ok(response.into_text())
}

pub async fn chat(
    client: &Client,
    base_url: &str,
    api_key: &str,
    project: &Project,
    history: &[ChatMessage],
) -> Result<String, ProviderError> {
    let request = ChatCompletionRequest::for_project(project, history);
    complete(client, base_url, api_key, &request, PROVIDER_LABEL).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_instructions_skip_system_turn() {
        let project = Project::new_default("Bare");
        let request = ChatCompletionRequest::for_project(&project, &[ChatMessage::user("hi")]);
        assert_eq!(request.messages, vec![ChatMessage::user("hi")]);

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stream").is_none());
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn instructions_lead_history() {
        let mut project = Project::new_default("Tutor");
        project.system_instructions = "Be brief.".into();
        let history = [ChatMessage::user("a"), ChatMessage::assistant("b")];
        let request = ChatCompletionRequest::for_project(&project, &history);
        assert_eq!(request.messages[0], ChatMessage::system("Be brief."));
        assert_eq!(&request.messages[1..], &history);
    }
}
