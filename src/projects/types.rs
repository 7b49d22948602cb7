//! Project record definitions.
//!
//! [`Project`] is stored as camelCase JSON inside the projects collection, so
//! field names here are part of the on-disk format.

use serde::{Deserialize, Serialize};

/// Model vendor families known to the catalog and the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Google,
    Mistral,
    Meta,
    Nova,
    O1,
    Titan,
    #[serde(rename = "AWS")]
    Aws,
}

impl Provider {
    pub const ALL: [Provider; 9] = [
        Self::OpenAI,
        Self::Anthropic,
        Self::Google,
        Self::Mistral,
        Self::Meta,
        Self::Nova,
        Self::O1,
        Self::Titan,
        Self::Aws,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Google => "Google",
            Self::Mistral => "Mistral",
            Self::Meta => "Meta",
            Self::Nova => "Nova",
            Self::O1 => "O1",
            Self::Titan => "Titan",
            Self::Aws => "AWS",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

/// One selectable model. Projects embed a full copy of the catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOption {
    pub provider: Provider,
    pub id: String,
    pub label: String,
    pub context_window: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagSettings {
    pub enabled: bool,
    pub top_k: u32,
    pub chunk_size: u32,
    pub overlap: u32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            top_k: 5,
            chunk_size: 800,
            overlap: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySettings {
    pub enabled: bool,
    /// Number of chat turns kept when composing history.
    pub window: u32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 20,
        }
    }
}

/// A file attached to a project's knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// `data:` URL preview, only for small images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// Extracted text for text-like files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub added_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteRole {
    View,
    Edit,
}

impl InviteRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl std::fmt::Display for InviteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InviteRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            _ => Err(format!("unknown invite role: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub email: String,
    pub role: InviteRole,
}

/// Link-based sharing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneralAccess {
    #[default]
    Private,
    View,
    Edit,
}

impl GeneralAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl std::fmt::Display for GeneralAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeneralAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            _ => Err(format!("unknown general access level: {s}")),
        }
    }
}

/// What a viewer (non-editor) sees and may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    pub enable_chat: bool,
    pub show_description: bool,
    pub allow_file_upload: bool,
    pub allow_dictation: bool,
    #[serde(default)]
    pub expose_model_picker: bool,
    #[serde(default)]
    pub expose_temperature: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enable_chat: true,
            show_description: true,
            allow_file_upload: false,
            allow_dictation: false,
            expose_model_picker: false,
            expose_temperature: false,
        }
    }
}

/// A saved AI-assistant configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub project_name: String,
    pub display_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_data_url: Option<String>,
    #[serde(default)]
    pub enable_dictation: bool,
    pub system_instructions: String,
    pub model: ModelOption,
    /// Sampling temperature, 0..2.
    pub temperature: f64,
    /// Maximum output tokens.
    pub output_tokens: u32,
    #[serde(default)]
    pub rag: RagSettings,
    #[serde(default)]
    pub memory: MemorySettings,
    #[serde(default)]
    pub knowledge_base: Vec<KnowledgeFile>,
    #[serde(default)]
    pub general_access: GeneralAccess,
    #[serde(default)]
    pub invites: Vec<Invite>,
    #[serde(default)]
    pub viewer_config: ViewerConfig,
    pub created_at: String,
    pub updated_at: String,
}

/// Accepted sampling temperatures.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

impl Project {
    /// A fresh project with every default applied and a new UUID v7 id.
    pub fn new_default(project_name: &str) -> Self {
        let now = super::now_timestamp();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            project_name: project_name.to_string(),
            display_name: "My AI".into(),
            description: String::new(),
            category: None,
            owner_email: None,
            profile_image_data_url: None,
            enable_dictation: false,
            system_instructions: String::new(),
            model: super::catalog::default_model(),
            temperature: 0.7,
            output_tokens: 1024,
            rag: RagSettings::default(),
            memory: MemorySettings::default(),
            knowledge_base: Vec::new(),
            general_access: GeneralAccess::Private,
            invites: Vec::new(),
            viewer_config: ViewerConfig::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = super::now_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_serializes_in_camel_case() {
        let project = Project::new_default("Biology Helper");
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["projectName"], "Biology Helper");
        assert_eq!(json["generalAccess"], "private");
        assert_eq!(json["model"]["provider"], "AWS");
        assert_eq!(json["viewerConfig"]["enableChat"], true);
        assert!(json.get("category").is_none());
    }

    #[test]
    fn missing_sharing_fields_default_on_read() {
        let mut json = serde_json::to_value(Project::new_default("Old")).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("invites");
        obj.remove("generalAccess");

        let project: Project = serde_json::from_value(json).unwrap();
        assert!(project.invites.is_empty());
        assert_eq!(project.general_access, GeneralAccess::Private);
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("aws".parse::<Provider>().unwrap(), Provider::Aws);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("Groq".parse::<Provider>().is_err());
    }

    #[test]
    fn knowledge_file_uses_type_key() {
        let file = KnowledgeFile {
            id: "f1".into(),
            name: "notes.txt".into(),
            size: 5,
            mime_type: "text/plain".into(),
            data_url: None,
            text: Some("hello".into()),
            added_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "text/plain");
        assert!(json.get("dataUrl").is_none());
    }
}
