//! Chat dispatch across model providers.
//!
//! [`InferenceDispatcher::chat_once`] picks a [`Route`] from the project's
//! provider and the stored credentials, then hands off to that route's handler.
//! With no credentials at all the reply is a deterministic mock; providers that
//! have a credential slot but no live integration answer with a stub.

pub mod credentials;
pub mod google;
pub mod meta;
pub mod mock;
pub mod openai;
pub mod session;

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProvidersConfig;
use crate::projects::{Project, Provider};
use credentials::{CredentialSlot, Credentials};

pub use session::{Attachment, ChatSession, SendOutcome, ViewerOverrides};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Failures from a live provider call. Callers show these to the user as-is.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint answered with a non-2xx status.
    #[error("{provider} error: {status} {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Transport failure, unreadable response, or a wrapped inner error.
    #[error("{provider} call failed: {message}")]
    Call {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub(crate) fn call(provider: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Call {
            provider,
            message: err.to_string(),
        }
    }
}

/// Base URLs of the live provider families.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub google_base_url: String,
    pub meta_base_url: String,
}

impl From<&ProvidersConfig> for ProviderEndpoints {
    fn from(config: &ProvidersConfig) -> Self {
        Self {
            openai_base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            google_base_url: config.google_base_url.trim_end_matches('/').to_string(),
            meta_base_url: config.meta_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self::from(&ProvidersConfig::default())
    }
}

/// Where a chat request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No credential for any provider.
    Mock,
    OpenAi { key: String },
    Google { key: String },
    Meta { key: String },
    /// Credential present for a family without a live integration.
    Stub { provider: Provider },
    /// Credentials exist, but none for this project's provider.
    Unmatched,
}

impl Route {
    /// Route name for logs. Never includes the key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::OpenAi { .. } => "openai",
            Self::Google { .. } => "google",
            Self::Meta { .. } => "meta",
            Self::Stub { .. } => "stub",
            Self::Unmatched => "unmatched",
        }
    }
}

fn credential_slot(provider: Provider) -> Option<CredentialSlot> {
    match provider {
        Provider::OpenAI => Some(CredentialSlot::OpenAi),
        Provider::Google => Some(CredentialSlot::Gemini),
        Provider::Meta => Some(CredentialSlot::Meta),
        Provider::Nova => Some(CredentialSlot::Nova),
        Provider::O1 => Some(CredentialSlot::O1),
        Provider::Titan => Some(CredentialSlot::Titan),
        Provider::Aws => Some(CredentialSlot::Aws),
        Provider::Anthropic | Provider::Mistral => None,
    }
}

pub fn select_route(provider: Provider, credentials: &Credentials) -> Route {
    if credentials.is_empty() {
        return Route::Mock;
    }
    let Some(key) = credential_slot(provider).and_then(|slot| credentials.get(slot)) else {
        return Route::Unmatched;
    };
    let key = key.to_string();
    match provider {
        Provider::OpenAI => Route::OpenAi { key },
        Provider::Google => Route::Google { key },
        Provider::Meta => Route::Meta { key },
        other => Route::Stub { provider: other },
    }
}

/// Send `body` as JSON and decode the reply. Non-2xx statuses become
/// [`ProviderError::Http`] carrying the raw body.
pub(crate) async fn post_json<B, R>(
    request: RequestBuilder,
    body: &B,
    provider: &'static str,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::call(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider, status = status.as_u16(), "provider returned an error status");
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ProviderError::call(provider, e))
}

#[derive(Clone)]
pub struct InferenceDispatcher {
    client: Client,
    endpoints: ProviderEndpoints,
}

impl InferenceDispatcher {
    pub fn new(client: Client, endpoints: ProviderEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn from_config(config: &ProvidersConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self::new(client, ProviderEndpoints::from(config)))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// One assistant reply for `history` under `project`'s settings.
    ///
    /// At most one outbound request is made, and only on a live route. Errors
    /// from that request are returned unchanged; nothing is retried.
    pub async fn chat_once(
        &self,
        project: &Project,
        history: &[ChatMessage],
        credentials: &Credentials,
    ) -> Result<String, ProviderError> {
        let route = select_route(project.model.provider, credentials);
        tracing::debug!(
            provider = %project.model.provider,
            model = %project.model.id,
            route = route.name(),
            turns = history.len(),
            "dispatching chat"
        );
        let last = mock::last_user_turn(history);
        match route {
            Route::Mock => Ok(mock::mock_reply(project, history)),
            Route::OpenAi { key } => {
                openai::chat(&self.client, &self.endpoints.openai_base_url, &key, project, history)
                    .await
            }
            Route::Google { key } => {
                google::chat(&self.client, &self.endpoints.google_base_url, &key, project, history)
                    .await
            }
            Route::Meta { key } => {
                meta::chat(&self.client, &self.endpoints.meta_base_url, &key, project, history)
                    .await
            }
            Route::Stub { provider } => Ok(mock::stub_reply(provider, &project.model.id, last)),
            Route::Unmatched => Ok(mock::unmatched_reply(project.model.provider, last)),
        }
    }

    /// The editor's preview run: a single user turn.
    pub async fn preview(
        &self,
        project: &Project,
        input: &str,
        credentials: &Credentials,
    ) -> Result<String, ProviderError> {
        self.chat_once(project, &[ChatMessage::user(input)], credentials)
            .await
    }
}

/// First choice's message content from a chat-completions reply.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    pub(crate) fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}
