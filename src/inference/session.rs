//! Viewer-side chat: viewer overrides, attachment context, the memory window,
//! and supersession of in-flight requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::task::AbortHandle;

use super::credentials::Credentials;
use super::{ChatMessage, ChatRole, InferenceDispatcher, ProviderError};
use crate::projects::knowledge::{extract_text, guess_mime};
use crate::projects::types::MemorySettings;
use crate::projects::{catalog, Project, ProjectStore, TEMPERATURE_RANGE};

/// Characters of attachment text forwarded to the model.
pub const ATTACHMENT_TEXT_LIMIT: usize = 2000;

/// A file attached to a single chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub text: Option<String>,
}

impl Attachment {
    pub fn from_bytes(name: &str, mime: Option<&str>, bytes: &[u8]) -> Self {
        let mime = mime
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(name));
        Self {
            name: name.to_string(),
            text: extract_text(&mime, bytes),
            mime_type: mime,
        }
    }
}

/// Model and temperature picked in the viewer. They only take effect when the
/// project exposes the matching control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerOverrides {
    pub model_id: Option<String>,
    pub temperature: Option<f64>,
}

pub fn effective_project(project: &Project, overrides: &ViewerOverrides) -> Project {
    let mut effective = project.clone();
    if project.viewer_config.expose_model_picker {
        if let Some(model) = overrides.model_id.as_deref().and_then(catalog::find_model) {
            effective.model = model;
        }
    }
    if project.viewer_config.expose_temperature {
        match overrides.temperature {
            Some(t) if TEMPERATURE_RANGE.contains(&t) => effective.temperature = t,
            Some(t) => tracing::warn!(temperature = t, "ignoring out-of-range viewer temperature"),
            None => {}
        }
    }
    effective
}

/// Write exposed viewer overrides back to the stored project, so the editor
/// sees them. Returns the updated project when anything changed.
pub fn persist_overrides(
    store: &ProjectStore,
    project: &Project,
    overrides: &ViewerOverrides,
) -> Option<Project> {
    let effective = effective_project(project, overrides);
    if effective.model == project.model && effective.temperature == project.temperature {
        return None;
    }
    store.update(&effective)
}

/// The `[Attachments for context]` block appended to a user turn, or `""`.
pub fn attachment_note(attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return String::new();
    }
    let mut note = String::from("\n\n[Attachments for context]");
    for a in attachments {
        let body = match a.text.as_deref() {
            Some(text) if !text.is_empty() => {
                if text.chars().count() > ATTACHMENT_TEXT_LIMIT {
                    let head: String = text.chars().take(ATTACHMENT_TEXT_LIMIT).collect();
                    format!("{head}\n[truncated]")
                } else {
                    text.to_string()
                }
            }
            _ => "(no text extracted)".to_string(),
        };
        note.push_str(&format!("\n---\nFile: {} ({})\n{body}", a.name, a.mime_type));
    }
    note
}

/// History to send for a new user turn.
///
/// With memory on, the last `max(1, min(window, len))` turns are kept;
/// with memory off, only the new turn.
pub fn compose_history(
    prior: &[ChatMessage],
    input: &str,
    attachments: &[Attachment],
    memory: &MemorySettings,
) -> Vec<ChatMessage> {
    let mut history = prior.to_vec();
    history.push(ChatMessage::user(format!("{input}{}", attachment_note(attachments))));
    let keep = if memory.enabled {
        (memory.window as usize).min(history.len()).max(1)
    } else {
        1
    };
    history.split_off(history.len() - keep)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Reply(String),
    /// A newer send started before this one finished; its result was dropped.
    Superseded,
}

/// One viewer conversation with a project.
///
/// Each [`send`](Self::send) takes the next sequence number and aborts the
/// previous in-flight request. Only the newest request's reply is recorded.
pub struct ChatSession {
    dispatcher: InferenceDispatcher,
    project: Project,
    overrides: ViewerOverrides,
    transcript: Mutex<Vec<ChatMessage>>,
    latest: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl ChatSession {
    pub fn new(dispatcher: InferenceDispatcher, project: Project) -> Self {
        Self {
            dispatcher,
            project,
            overrides: ViewerOverrides::default(),
            transcript: Mutex::new(Vec::new()),
            latest: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_overrides(mut self, overrides: ViewerOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Visible turns so far (user and assistant).
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub async fn send(
        &self,
        input: &str,
        attachments: &[Attachment],
        credentials: &Credentials,
    ) -> Result<SendOutcome, ProviderError> {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let effective = effective_project(&self.project, &self.overrides);

        let history = {
            let mut transcript = self.transcript.lock().unwrap_or_else(|p| p.into_inner());
            let history = compose_history(&transcript, input, attachments, &effective.memory);
            transcript.push(ChatMessage::user(input));
            history
        };

        let dispatcher = self.dispatcher.clone();
        let credentials = credentials.clone();
        let task = tokio::spawn(async move {
            dispatcher
                .chat_once(&effective, &history, &credentials)
                .await
        });
        if let Some(previous) = self
            .in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .replace(task.abort_handle())
        {
            previous.abort();
        }

        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                tracing::debug!(seq, "chat request aborted by a newer send");
                return Ok(SendOutcome::Superseded);
            }
            Err(e) => return Err(ProviderError::call("chat", e)),
        };
        if self.latest.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "discarding superseded chat reply");
            return Ok(SendOutcome::Superseded);
        }

        let reply = result?;
        self.transcript
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(ChatMessage::new(ChatRole::Assistant, reply.clone()));
        Ok(SendOutcome::Reply(reply))
    }
}
