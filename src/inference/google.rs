//! Gemini generate-content handler.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{post_json, ChatMessage, ProviderError};
use crate::projects::Project;

pub const PROVIDER_LABEL: &str = "Gemini";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// System instructions (when present) become their own leading block; the
    /// whole history is flattened into one `role: content` text block.
    pub fn for_project(project: &Project, history: &[ChatMessage]) -> Self {
        let mut contents = Vec::with_capacity(2);
        if !project.system_instructions.is_empty() {
            contents.push(Content::user_text(project.system_instructions.clone()));
        }
        let transcript = history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        contents.push(Content::user_text(transcript));
        Self {
            contents,
            generation_config: GenerationConfig {
                temperature: project.temperature,
                max_output_tokens: project.output_tokens,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

/// POST to `{base}/models/{model}:generateContent?key=...` and return the
/// first candidate's first part.
pub async fn generate(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    request: &GenerateContentRequest,
) -> Result<String, ProviderError> {
    let endpoint = format!("{base_url}/models/{model}:generateContent");
    let url = Url::parse_with_params(&endpoint, &[("key", api_key)])
        .map_err(|e| ProviderError::call(PROVIDER_LABEL, e))?;
    let response: GenerateContentResponse =
        post_json(client.post(url), request, PROVIDER_LABEL).await?;
    Ok(response.into_text())
}

pub async fn chat(
    client: &Client,
    base_url: &str,
    api_key: &str,
    project: &Project,
    history: &[ChatMessage],
) -> Result<String, ProviderError> {
    let request = GenerateContentRequest::for_project(project, history);
    generate(client, base_url, &project.model.id, api_key, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_flattens_to_role_lines() {
        let mut project = Project::new_default("Gem");
        project.system_instructions = "Sys".into();
        project.temperature = 0.4;
        let history = [ChatMessage::user("hello"), ChatMessage::assistant("hi there")];

        let json = serde_json::to_value(GenerateContentRequest::for_project(&project, &history)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Sys");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "user: hello\nassistant: hi there");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(json["generationConfig"]["temperature"], 0.4);
    }

    #[test]
    fn no_instructions_means_single_block() {
        let project = Project::new_default("Gem");
        let request = GenerateContentRequest::for_project(&project, &[ChatMessage::user("q")]);
        assert_eq!(request.contents, vec![Content::user_text("user: q")]);
    }
}
