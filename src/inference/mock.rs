//! Offline replies: the no-credential mock, stub-provider placeholders, and the
//! unmatched-credential notice. All deterministic.

use super::{ChatMessage, ChatRole};
use crate::projects::{Project, Provider};

/// Content of the most recent user turn, or `""`.
pub fn last_user_turn(history: &[ChatMessage]) -> &str {
    history
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .map_or("", |m| m.content.as_str())
}

pub fn mock_reply(project: &Project, history: &[ChatMessage]) -> String {
    let rag = if project.rag.enabled {
        format!("RAG(topK={})", project.rag.top_k)
    } else {
        "RAG(disabled)".to_string()
    };
    let memory = if project.memory.enabled {
        format!("memory(window={})", project.memory.window)
    } else {
        "memory(disabled)".to_string()
    };
    let system = if project.system_instructions.is_empty() {
        "(none)"
    } else {
        project.system_instructions.as_str()
    };
    format!(
        "Mocked {}/{} (temp={}, tokens={}) with {rag}, {memory}.\n\
         System: {system}\n\
         Input: {}\n\
         — This is a simulated response. Set a provider key in Provider Keys to call real models.",
        project.model.provider,
        project.model.label,
        project.temperature,
        project.output_tokens,
        last_user_turn(history),
    )
}

/// Placeholder for a family that has a credential slot but no live endpoint.
pub fn stub_reply(provider: Provider, model_id: &str, last_user: &str) -> String {
    let article = match provider {
        Provider::O1 | Provider::Aws => "an",
        _ => "a",
    };
    format!(
        "{provider} API call placeholder for model {model_id}. Your prompt: {last_user}. \
         Configure {article} {provider} endpoint to enable real calls."
    )
}

pub fn unmatched_reply(provider: Provider, last_user: &str) -> String {
    format!("No matching provider key for {provider}. Prompt: {last_user}")
}
