//! Meta Llama API handler: OpenAI-compatible, non-streaming.

use reqwest::Client;

use super::openai::{complete, ChatCompletionRequest};
use super::{ChatMessage, ProviderError};
use crate::projects::Project;

pub const PROVIDER_LABEL: &str = "Llama API";

pub fn build_request(project: &Project, history: &[ChatMessage]) -> ChatCompletionRequest {
    ChatCompletionRequest {
        stream: Some(false),
        ..ChatCompletionRequest::for_project(project, history)
    }
}

/// Every failure, HTTP or transport, comes back as one `Call` error whose
/// message keeps the inner error's text.
pub async fn chat(
    client: &Client,
    base_url: &str,
    api_key: &str,
    project: &Project,
    history: &[ChatMessage],
) -> Result<String, ProviderError> {
    let request = build_request(project, history);
    complete(client, base_url, api_key, &request, PROVIDER_LABEL)
        .await
        .map_err(|inner| {
            tracing::warn!(error = %inner, "Llama API call failed");
            let message = match inner {
                // Transport errors are already labelled; keep just the cause.
                ProviderError::Call { message, .. } => message,
                http => http.to_string(),
            };
            ProviderError::Call {
                provider: PROVIDER_LABEL,
                message,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_flag_is_always_false() {
        let request = build_request(&Project::new_default("Llama"), &[ChatMessage::user("hi")]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
    }
}
