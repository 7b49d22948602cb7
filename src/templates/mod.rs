//! Project templates: the tagged-record import pipeline, the built-in set, and
//! applying a template to seed a new project.

pub mod library;
pub mod normalize;
pub mod tagged;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use library::{apply_template, builtin_templates, TemplateFacets, TemplateFilter, TemplateLibrary};
pub use normalize::{canonicalize_provider, import_templates, load_templates_resource, normalize};

/// A reusable project skeleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instructions: Option<String>,
    /// Provider name as written in the source record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_normalized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub rag_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default)]
    pub viewer_allow_upload: bool,
    #[serde(default)]
    pub viewer_allow_dictation: bool,
}

/// Manual template upload failures. These are shown to the user.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to import JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No templates found in the selected JSON.")]
    Empty,
}
