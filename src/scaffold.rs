//! Turn a one-line idea into a project skeleton.
//!
//! OpenAI is asked first, then Gemini, each for a compact JSON object. Any
//! failure (missing key, transport error, non-JSON reply) falls through to the
//! next attempt, and the heuristic at the end always answers.

use serde_json::Value;

use crate::inference::credentials::{CredentialSlot, Credentials};
use crate::inference::google::{self, GenerateContentRequest, GenerationConfig};
use crate::inference::openai::{self, ChatCompletionRequest};
use crate::inference::{ChatMessage, InferenceDispatcher};
use crate::projects::{Project, ProjectStore};

pub const SYSTEM_PROMPT: &str = "You are an AI app scaffold generator. Given a user idea, output a compact JSON with keys: projectName, description, category(one of: Teaching, Assessment, Student, Assistant), systemInstructions, suggestedModel(one of: 'gpt-4.1','gpt-4o','gemini-1.5-pro','claude-3-sonnet','llama-3.1-70b-instruct'). Keep it minimal.";

const OPENAI_MODEL: &str = "gpt-4o";
const GEMINI_MODEL: &str = "gemini-1.5-pro";
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 300;
const UNTITLED: &str = "Untitled Project";
const NAME_LIMIT: usize = 60;

/// Partial project produced from an idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    pub project_name: String,
    pub description: String,
    pub category: Option<String>,
    pub system_instructions: String,
}

/// Pull a JSON object out of free-form model output: the span from the first
/// `{` to the last `}` first, then the whole text.
pub fn extract_json(text: &str) -> Option<serde_json::Map<String, Value>> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&text[start..=end]),
        _ => None,
    };
    span.into_iter()
        .chain(std::iter::once(text))
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(obj)) => Some(obj),
            _ => None,
        })
}

fn truthy_text(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// Map a model's JSON answer onto a scaffold, defaulting missing fields.
pub fn scaffold_from_json(obj: &serde_json::Map<String, Value>) -> Scaffold {
    Scaffold {
        project_name: truthy_text(obj, "projectName").unwrap_or_else(|| UNTITLED.into()),
        description: truthy_text(obj, "description").unwrap_or_default(),
        category: obj
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string),
        system_instructions: truthy_text(obj, "systemInstructions").unwrap_or_default(),
    }
}

/// Deterministic local fallback.
pub fn heuristic_scaffold(input: &str) -> Scaffold {
    let lowered = input.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lowered.contains(n));
    let category = if has(&["quiz", "grade"]) {
        "Assessment"
    } else if has(&["study", "student"]) {
        "Student"
    } else if has(&["faq", "assistant"]) {
        "Assistant"
    } else {
        "Teaching"
    };

    let project_name = if input.chars().count() > 3 {
        let head: String = input.chars().take(NAME_LIMIT).collect();
        let mut chars = head.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        UNTITLED.to_string()
    };

    Scaffold {
        system_instructions: format!(
            "You are {project_name}, an AI assistant for {category}. Be helpful and concise."
        ),
        description: input.to_string(),
        category: Some(category.to_string()),
        project_name,
    }
}

pub struct ScaffoldGenerator {
    dispatcher: InferenceDispatcher,
}

impl ScaffoldGenerator {
    pub fn new(dispatcher: InferenceDispatcher) -> Self {
        Self { dispatcher }
    }

    async fn ask_openai(&self, key: &str, idea: &str) -> Option<Scaffold> {
        let request = ChatCompletionRequest {
            model: OPENAI_MODEL.into(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(idea)],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: None,
        };
        let text = openai::complete(
            self.dispatcher.client(),
            &self.dispatcher.endpoints().openai_base_url,
            key,
            &request,
            openai::PROVIDER_LABEL,
        )
        .await
        .map_err(|e| tracing::debug!(error = %e, "OpenAI scaffold attempt failed"))
        .ok()?;
        parse_reply(&text, "OpenAI")
    }

    async fn ask_gemini(&self, key: &str, idea: &str) -> Option<Scaffold> {
        let request = GenerateContentRequest {
            contents: vec![
                google::Content::user_text(SYSTEM_PROMPT),
                google::Content::user_text(idea),
            ],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_TOKENS,
            },
        };
        let text = google::generate(
            self.dispatcher.client(),
            &self.dispatcher.endpoints().google_base_url,
            GEMINI_MODEL,
            key,
            &request,
        )
        .await
        .map_err(|e| tracing::debug!(error = %e, "Gemini scaffold attempt failed"))
        .ok()?;
        parse_reply(&text, "Gemini")
    }

    /// Never fails: the heuristic answers when no model does.
    pub async fn generate(&self, idea: &str, credentials: &Credentials) -> Scaffold {
        let idea = idea.trim();
        if let Some(key) = credentials.get(CredentialSlot::OpenAi) {
            if let Some(scaffold) = self.ask_openai(key, idea).await {
                return scaffold;
            }
        }
        if let Some(key) = credentials.get(CredentialSlot::Gemini) {
            if let Some(scaffold) = self.ask_gemini(key, idea).await {
                return scaffold;
            }
        }
        tracing::debug!("using heuristic scaffold");
        heuristic_scaffold(idea)
    }
}

fn parse_reply(text: &str, source: &str) -> Option<Scaffold> {
    match extract_json(text) {
        Some(obj) => Some(scaffold_from_json(&obj)),
        None => {
            tracing::debug!(source, "scaffold reply was not a JSON object");
            None
        }
    }
}

/// Create a project from a scaffold and persist it.
pub fn apply_scaffold(store: &ProjectStore, scaffold: &Scaffold) -> Project {
    let mut project = store.create(&scaffold.project_name);
    project.description = scaffold.description.clone();
    project.category = scaffold.category.clone();
    project.system_instructions = scaffold.system_instructions.clone();
    store.update(&project).unwrap_or(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_prose() {
        let text = "Sure! Here you go:\n{\"projectName\": \"Quiz Bot\", \"category\": \"Assessment\"}\nEnjoy.";
        let obj = extract_json(text).unwrap();
        let scaffold = scaffold_from_json(&obj);
        assert_eq!(scaffold.project_name, "Quiz Bot");
        assert_eq!(scaffold.category.as_deref(), Some("Assessment"));
        assert_eq!(scaffold.description, "");
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(extract_json("[1, 2]").is_none());
        assert!(extract_json("no braces here").is_none());
        assert!(extract_json("{broken").is_none());
    }

    #[test]
    fn heuristic_categories() {
        assert_eq!(
            heuristic_scaffold("Create a quiz for BIO 101").category.as_deref(),
            Some("Assessment")
        );
        assert_eq!(heuristic_scaffold("help students study").category.as_deref(), Some("Student"));
        assert_eq!(heuristic_scaffold("course FAQ bot").category.as_deref(), Some("Assistant"));
        assert_eq!(heuristic_scaffold("lecture notes").category.as_deref(), Some("Teaching"));
    }

    #[test]
    fn heuristic_name_rules() {
        assert_eq!(heuristic_scaffold("ab").project_name, "Untitled Project");
        assert_eq!(heuristic_scaffold("abc").project_name, "Untitled Project");
        assert_eq!(heuristic_scaffold("abcd").project_name, "Abcd");

        let long = "x".repeat(80);
        assert_eq!(heuristic_scaffold(&long).project_name.chars().count(), 60);

        let s = heuristic_scaffold("grade essays");
        assert_eq!(
            s.system_instructions,
            "You are Grade essays, an AI assistant for Assessment. Be helpful and concise."
        );
        assert_eq!(s.description, "grade essays");
    }
}
