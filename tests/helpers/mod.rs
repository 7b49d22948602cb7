#![allow(dead_code)]

use aiforge::db;
use aiforge::inference::credentials::{CredentialSlot, Credentials};
use aiforge::inference::{InferenceDispatcher, ProviderEndpoints};
use aiforge::projects::{GeneralAccess, InviteRole, Project, ProjectStore};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// A project store over a throwaway in-memory database.
pub fn test_store() -> ProjectStore {
    ProjectStore::in_memory().unwrap()
}

/// An unsaved project with the given link access and invites.
pub fn shared_project(access: GeneralAccess, invites: &[(&str, InviteRole)]) -> Project {
    let mut project = Project::new_default("Shared");
    project.general_access = access;
    for (email, role) in invites {
        project.add_invite(email, *role);
    }
    project
}

/// Credentials holding a single key.
pub fn single_key(slot: CredentialSlot, key: &str) -> Credentials {
    Credentials::default().with(slot, key)
}

/// A dispatcher whose every provider family points at `base_url`
/// (typically a `wiremock::MockServer::uri()`).
pub fn dispatcher_for(base_url: &str) -> InferenceDispatcher {
    let endpoints = ProviderEndpoints {
        openai_base_url: base_url.to_string(),
        google_base_url: base_url.to_string(),
        meta_base_url: base_url.to_string(),
    };
    InferenceDispatcher::new(reqwest::Client::new(), endpoints)
}

/// A chat-completions reply body with one choice.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// A generateContent reply body with one candidate.
pub fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}
