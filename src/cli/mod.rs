pub mod chat;
pub mod doctor;
pub mod keys;
pub mod knowledge;
pub mod projects;
pub mod scaffold;
pub mod share;
pub mod templates;

use anyhow::{anyhow, Result};

use aiforge::config::AppConfig;
use aiforge::inference::InferenceDispatcher;
use aiforge::projects::{Project, ProjectStore};
use aiforge::templates::TemplateLibrary;

/// Everything a command needs, opened once per invocation.
pub struct Context {
    pub config: AppConfig,
    pub store: ProjectStore,
    pub identity: String,
}

impl Context {
    pub fn open(config: AppConfig, identity: Option<String>) -> Result<Self> {
        let store = ProjectStore::open(config.resolved_db_path())?
            .with_email_matching(config.access.email_matching);
        let identity = identity.unwrap_or_else(|| store.profile().email);
        Ok(Self {
            config,
            store,
            identity,
        })
    }

    pub fn project(&self, id: &str) -> Result<Project> {
        self.store
            .get(id)
            .ok_or_else(|| anyhow!("no project with id {id}"))
    }

    pub fn dispatcher(&self) -> Result<InferenceDispatcher> {
        InferenceDispatcher::from_config(&self.config.providers)
    }

    pub fn templates(&self) -> TemplateLibrary {
        TemplateLibrary::new(
            self.store.storage().clone(),
            self.config.resolved_templates_path(),
        )
    }
}

/// One summary line per project.
pub fn print_project_rows(projects: &[Project]) {
    if projects.is_empty() {
        println!("(no projects)");
        return;
    }
    for p in projects {
        println!(
            "{}  {:<32}  {:<8}  {}/{}  {}",
            p.id,
            p.project_name,
            p.general_access.as_str(),
            p.model.provider,
            p.model.id,
            p.updated_at
        );
    }
}
