//! Field mapping from unwrapped tagged records to [`Template`]s.
//!
//! Every function here is total: malformed input produces fewer (or emptier)
//! templates, never an error.

use std::path::Path;

use serde_json::Value;

use super::tagged::{join_list, unwrap_json, Native};
use super::{ImportError, Template};

/// Known provider spellings, checked in order against the lower-cased input.
const PROVIDER_ALIASES: &[(&[&str], &str)] = &[
    (&["openai"], "OpenAI"),
    (&["anthropic", "claude"], "Anthropic"),
    (&["google", "gemini"], "Google"),
    (&["mistral"], "Mistral"),
    (&["groq"], "Groq"),
    (&["cohere"], "Cohere"),
    (&["meta", "llama"], "Meta"),
    (&["aws", "bedrock", "nova"], "AWS"),
];

/// Canonical provider label for a free-form provider name.
///
/// Unknown names are returned with the first letter upper-cased and the rest
/// lower-cased. Empty input has no provider.
pub fn canonicalize_provider(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    if let Some((_, label)) = PROVIDER_ALIASES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
    {
        return Some((*label).to_string());
    }
    let mut chars = lower.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
}

/// Truthy field as a string, the way the dashboard reads optional text.
fn truthy_string(value: Option<&Native>) -> Option<String> {
    value.filter(|v| v.truthy()).map(Native::to_js_string)
}

/// First truthy value of a fallback chain.
fn first_truthy<'a>(candidates: impl IntoIterator<Item = Option<&'a Native>>) -> Option<&'a Native> {
    candidates.into_iter().flatten().find(|v| v.truthy())
}

fn composed_instructions(
    title: &str,
    description: Option<&str>,
    use_cases: Option<&[Native]>,
    starters: &str,
    retrieval_prompt: Option<&str>,
) -> Option<String> {
    let mut out = format!("You are an assistant for \"{title}\".");
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        out.push_str("\n\nPurpose:\n");
        out.push_str(description);
    }
    if let Some(cases) = use_cases.filter(|c| !c.is_empty()) {
        out.push_str("\n\nUse cases:\n- ");
        out.push_str(&join_list(cases, "\n- "));
    }
    if !starters.is_empty() {
        out.push_str("\n\nExample prompts:\n- ");
        out.push_str(starters);
    }
    if let Some(prompt) = retrieval_prompt {
        out.push_str("\n\nWhen retrieval is enabled, follow this retrieval guidance:\n");
        out.push_str(prompt);
    }
    let out = out.trim();
    (!out.is_empty()).then(|| out.to_string())
}

/// Starter prompts across every starter group, flattened into one bullet run.
fn flatten_starters(iface: Option<&Native>) -> String {
    let Some(groups) = iface
        .and_then(|i| i.get("starter_groups"))
        .and_then(Native::as_list)
    else {
        return String::new();
    };
    groups
        .iter()
        .filter_map(|g| g.get("starters").and_then(Native::as_list))
        .map(|starters| join_list(starters, "\n- "))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n- ")
}

fn parse_temperature(value: Option<&Native>) -> Option<f64> {
    let n = match value? {
        Native::Number(n) => *n,
        Native::String(s) => super::tagged::parse_number(s),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn record_to_template(id: &str, record: &Value) -> Template {
    let empty = serde_json::Map::new();
    let fields = record.as_object().unwrap_or(&empty);
    let field = |name: &str| fields.get(name).and_then(unwrap_json);

    let iface = field("interface");
    let iface_field = |name: &str| iface.as_ref().and_then(|i| i.get(name));
    let project_name = field("project_name");
    let description = field("description");
    let model_name = field("model_name");
    let provider = field("model_provider");
    let params = field("model_params");
    let search_params = field("search_params");
    let enable_search = field("enable_search");
    let use_cases = field("use_cases");

    let title = first_truthy([project_name.as_ref(), iface_field("title")])
        .map(Native::to_js_string)
        .unwrap_or_else(|| "Untitled".into());
    let description = truthy_string(first_truthy([description.as_ref(), iface_field("description")]));

    let provider_raw = truthy_string(provider.as_ref());
    let provider_normalized = canonicalize_provider(provider_raw.as_deref().unwrap_or_default());

    let param = |name: &str| params.as_ref().and_then(|p| p.get(name));
    let first_prompt = param("system_prompt")
        .and_then(Native::as_list)
        .and_then(|l| l.first())
        .filter(|p| p.truthy())
        .map(Native::to_js_string);

    let rag_enabled = enable_search.as_ref().is_some_and(Native::truthy);
    let search_param = |name: &str| search_params.as_ref().and_then(|s| s.get(name));
    let rag_top_k = search_param("top_k")
        .and_then(Native::as_number)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32);
    let retrieval_prompt = truthy_string(search_param("search_prompt")).filter(|_| rag_enabled);

    let use_case_list = use_cases.as_ref().and_then(Native::as_list);
    let system_instructions = first_prompt.or_else(|| {
        composed_instructions(
            &title,
            description.as_deref(),
            use_case_list,
            &flatten_starters(iface.as_ref()),
            retrieval_prompt.as_deref(),
        )
    });

    let flag = |name: &str| matches!(iface_field(name), Some(Native::Bool(true)));

    Template {
        id: id.to_string(),
        description,
        system_instructions,
        provider: provider_raw,
        provider_normalized,
        model_name: truthy_string(model_name.as_ref()),
        temperature: parse_temperature(param("temperature")),
        rag_enabled,
        rag_top_k,
        category: use_case_list
            .and_then(|l| l.first())
            .map(Native::to_js_string),
        tags: use_case_list
            .map(|l| l.iter().map(Native::to_js_string).collect())
            .unwrap_or_default(),
        audience: None,
        viewer_allow_upload: flag("enable_upload"),
        viewer_allow_dictation: flag("enable_voice"),
        title,
    }
}

/// Map a tagged-record document to templates, one per top-level key, in
/// document order. Anything but a JSON object yields no templates.
pub fn normalize(document: &Value) -> Vec<Template> {
    let Some(records) = document.as_object() else {
        return Vec::new();
    };
    records
        .iter()
        .map(|(id, record)| record_to_template(id, record))
        .collect()
}

/// Parse a manually uploaded template document.
pub fn import_templates(text: &str) -> Result<Vec<Template>, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    let templates = normalize(&document);
    if templates.is_empty() {
        return Err(ImportError::Empty);
    }
    tracing::info!(count = templates.len(), "templates imported");
    Ok(templates)
}

/// Read the static template resource. Any failure yields no templates.
pub fn load_templates_resource(path: &Path) -> Vec<Template> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "template resource unavailable");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(document) => normalize(&document),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "template resource is not valid JSON");
            Vec::new()
        }
    }
}
