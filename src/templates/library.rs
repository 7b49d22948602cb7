//! Built-in and imported templates, filtering, and applying a template to a
//! new project.

use std::path::PathBuf;

use crate::db::LocalStorage;
use crate::projects::{catalog, Project, ProjectStore, TEMPERATURE_RANGE};

use super::normalize::{import_templates, load_templates_resource};
use super::{ImportError, Template};

/// Storage key for the imported template list.
pub const TEMPLATES_KEY: &str = "templates-v1";

fn builtin(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    audience: &str,
    tags: &[&str],
) -> Template {
    Template {
        id: id.into(),
        title: title.into(),
        description: Some(description.into()),
        category: Some(category.into()),
        audience: Some(audience.into()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

/// Templates that ship with the crate, listed before any imported ones.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        builtin(
            "builtin-lesson-planner",
            "Lesson Planner",
            "Generate lesson outlines and activities aligned to outcomes.",
            "Teaching",
            "Instructor",
            &["Teaching", "Planning"],
        ),
        builtin(
            "builtin-rubric-builder",
            "Rubric Builder",
            "Create grading rubrics and performance descriptors.",
            "Assessment",
            "Instructor",
            &["Assessment", "Rubrics"],
        ),
        builtin(
            "builtin-study-guide",
            "Study Guide",
            "Summarize materials into student-ready study guides.",
            "Student",
            "Student",
            &["Student", "Study"],
        ),
        builtin(
            "builtin-qa-assistant",
            "Q&A Assistant",
            "Create a course-specific chatbot for FAQs and resources.",
            "Assistant",
            "Instructor",
            &["Assistant", "FAQ"],
        ),
        builtin(
            "builtin-blank",
            "Blank AI project",
            "Begin from scratch with full control.",
            "General",
            "Builder",
            &["Starter"],
        ),
        builtin(
            "builtin-study-guide-assistant",
            "Study guide assistant",
            "Generate student study guides.",
            "Student",
            "Student",
            &["Starter", "Study"],
        ),
        builtin(
            "builtin-course-faq",
            "Course FAQ chatbot",
            "Answer common course questions.",
            "Assistant",
            "Instructor",
            &["Starter", "FAQ"],
        ),
    ]
}

/// True when every template lacks all substantive content, which is what a
/// stale parse leaves behind. An empty list does not look empty.
pub fn looks_empty(templates: &[Template]) -> bool {
    !templates.is_empty()
        && templates.iter().all(|t| {
            t.system_instructions.is_none()
                && t.description.is_none()
                && t.model_name.is_none()
                && t.provider_normalized.is_none()
        })
}

/// Persisted imported templates plus the static resource they reload from.
#[derive(Clone)]
pub struct TemplateLibrary {
    storage: LocalStorage,
    resource_path: PathBuf,
}

impl TemplateLibrary {
    pub fn new(storage: LocalStorage, resource_path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            resource_path: resource_path.into(),
        }
    }

    pub fn imported(&self) -> Vec<Template> {
        self.storage.read_json(TEMPLATES_KEY)
    }

    pub fn replace(&self, templates: &[Template]) {
        self.storage.write_json(TEMPLATES_KEY, templates);
    }

    /// Built-ins first, then imported templates.
    pub fn all(&self) -> Vec<Template> {
        let mut all = builtin_templates();
        all.extend(self.imported());
        all
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.all().into_iter().find(|t| t.id == id)
    }

    /// Reload from the static resource. Stored templates are replaced only if
    /// the resource produced at least one template.
    pub fn load_resource(&self) -> bool {
        let templates = load_templates_resource(&self.resource_path);
        if templates.is_empty() {
            return false;
        }
        self.replace(&templates);
        tracing::info!(
            count = templates.len(),
            path = %self.resource_path.display(),
            "templates loaded from resource"
        );
        true
    }

    /// Load the resource when nothing is stored yet, or when what is stored
    /// looks like an empty parse.
    pub fn ensure_loaded(&self) -> Vec<Template> {
        let stored = self.imported();
        if stored.is_empty() || looks_empty(&stored) {
            self.load_resource();
            return self.imported();
        }
        stored
    }

    /// Replace the imported templates with a manual upload.
    pub fn import_upload(&self, text: &str) -> Result<usize, ImportError> {
        let templates = import_templates(text)?;
        self.replace(&templates);
        Ok(templates.len())
    }
}

/// Template search: free text over title, description and instructions, plus
/// exact facet matches. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub query: String,
    pub provider: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub audience: Option<String>,
}

fn facet_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    wanted.as_ref().map_or(true, |w| actual.as_ref() == Some(w))
}

impl TemplateFilter {
    pub fn matches(&self, t: &Template) -> bool {
        let q = self.query.trim().to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&q))
        };
        let match_query = q.is_empty()
            || t.title.to_lowercase().contains(&q)
            || contains(&t.description)
            || contains(&t.system_instructions);
        let match_tag = self.tag.as_ref().map_or(true, |tag| t.tags.contains(tag));

        match_query
            && facet_matches(&self.provider, &t.provider_normalized)
            && match_tag
            && facet_matches(&self.category, &t.category)
            && facet_matches(&self.audience, &t.audience)
    }

    pub fn apply<'a>(&self, templates: &'a [Template]) -> Vec<&'a Template> {
        templates.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Distinct filter values across a template set, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFacets {
    pub providers: Vec<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub audiences: Vec<String>,
}

impl TemplateFacets {
    pub fn collect(templates: &[Template]) -> Self {
        fn push_unique(list: &mut Vec<String>, value: &str) {
            if !list.iter().any(|v| v == value) {
                list.push(value.to_string());
            }
        }
        let mut facets = Self::default();
        for t in templates {
            if let Some(p) = t.provider_normalized.as_deref() {
                push_unique(&mut facets.providers, p);
            }
            for tag in &t.tags {
                push_unique(&mut facets.tags, tag);
            }
            if let Some(c) = t.category.as_deref().filter(|c| !c.is_empty()) {
                push_unique(&mut facets.categories, c);
            }
            if let Some(a) = t.audience.as_deref().filter(|a| !a.is_empty()) {
                push_unique(&mut facets.audiences, a);
            }
        }
        facets
    }
}

/// Create a project seeded from `template` and persist it.
///
/// The model is the best catalog match for the template's provider and model
/// name, or the default model when nothing matches.
pub fn apply_template(store: &ProjectStore, template: &Template) -> Project {
    let mut project = store.create(&template.title);
    project.project_name = template.title.clone();
    project.display_name = template.title.clone();
    project.description = template.description.clone().unwrap_or_default();
    project.system_instructions = template.system_instructions.clone().unwrap_or_default();
    if let Some(model) =
        catalog::pick_model(template.provider.as_deref(), template.model_name.as_deref())
    {
        project.model = model;
    }
    if let Some(temperature) = template.temperature.filter(|t| TEMPERATURE_RANGE.contains(t)) {
        project.temperature = temperature;
    }
    project.rag.enabled = template.rag_enabled;
    if let Some(top_k) = template.rag_top_k {
        project.rag.top_k = top_k;
    }
    project.viewer_config.allow_file_upload = template.viewer_allow_upload;
    project.viewer_config.allow_dictation = template.viewer_allow_dictation;

    tracing::info!(template = %template.id, project = %project.id, "template applied");
    store.update(&project).unwrap_or(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_stable() {
        let builtins = builtin_templates();
        assert_eq!(builtins.len(), 7);
        assert_eq!(builtins[0].id, "builtin-lesson-planner");
        assert_eq!(builtins[6].tags, vec!["Starter", "FAQ"]);
    }

    #[test]
    fn builtins_do_not_look_empty() {
        assert!(!looks_empty(&builtin_templates()));
        assert!(!looks_empty(&[]));
        let bare = Template {
            id: "x".into(),
            title: "X".into(),
            ..Default::default()
        };
        assert!(looks_empty(&[bare]));
    }

    #[test]
    fn filter_by_tag_and_query() {
        let builtins = builtin_templates();
        let filter = TemplateFilter {
            tag: Some("Starter".into()),
            query: "faq".into(),
            ..Default::default()
        };
        let hits = filter.apply(&builtins);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "builtin-course-faq");
    }

    #[test]
    fn facets_are_first_seen_unique() {
        let facets = TemplateFacets::collect(&builtin_templates());
        assert_eq!(
            facets.categories,
            vec!["Teaching", "Assessment", "Student", "Assistant", "General"]
        );
        assert_eq!(facets.audiences, vec!["Instructor", "Student", "Builder"]);
        assert!(facets.providers.is_empty());
    }
}
