//! CLI project commands: create, list, edit, delete, favorites, export.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use aiforge::projects::{catalog, Project, ProjectFilter, Provider, TEMPERATURE_RANGE};

use super::{print_project_rows, Context};

pub fn new(ctx: &Context, name: &str) -> Result<()> {
    let project = ctx.store.create(name);
    println!("Created project {} ({})", project.id, project.project_name);
    Ok(())
}

pub fn list(
    ctx: &Context,
    query: String,
    category: Option<String>,
    provider: Option<Provider>,
) -> Result<()> {
    let filter = ProjectFilter {
        query,
        category,
        provider,
    };
    print_project_rows(&ctx.store.filter(&filter));
    Ok(())
}

pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let project = ctx.project(id)?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// Editable project fields. Unset flags leave the field alone.
#[derive(Args, Debug, Default)]
pub struct ProjectEdit {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub instructions: Option<String>,
    /// Catalog model id (see `aiforge models`)
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub output_tokens: Option<u32>,
    #[arg(long)]
    pub rag: Option<bool>,
    #[arg(long)]
    pub top_k: Option<u32>,
    #[arg(long)]
    pub memory: Option<bool>,
    #[arg(long)]
    pub memory_window: Option<u32>,
    #[arg(long)]
    pub viewer_chat: Option<bool>,
    #[arg(long)]
    pub viewer_upload: Option<bool>,
    #[arg(long)]
    pub viewer_dictation: Option<bool>,
    #[arg(long)]
    pub expose_model_picker: Option<bool>,
    #[arg(long)]
    pub expose_temperature: Option<bool>,
}

impl ProjectEdit {
    fn apply(self, project: &mut Project) -> Result<()> {
        if let Some(v) = self.name {
            project.project_name = v;
        }
        if let Some(v) = self.display_name {
            project.display_name = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if let Some(v) = self.category {
            project.category = Some(v).filter(|c| !c.is_empty());
        }
        if let Some(v) = self.instructions {
            project.system_instructions = v;
        }
        if let Some(id) = self.model {
            project.model =
                catalog::find_model(&id).ok_or_else(|| anyhow!("unknown model id {id}"))?;
        }
        if let Some(v) = self.temperature {
            anyhow::ensure!(TEMPERATURE_RANGE.contains(&v), "temperature must be between 0 and 2");
            project.temperature = v;
        }
        if let Some(v) = self.output_tokens {
            project.output_tokens = v;
        }
        if let Some(v) = self.rag {
            project.rag.enabled = v;
        }
        if let Some(v) = self.top_k {
            project.rag.top_k = v;
        }
        if let Some(v) = self.memory {
            project.memory.enabled = v;
        }
        if let Some(v) = self.memory_window {
            project.memory.window = v;
        }
        if let Some(v) = self.viewer_chat {
            project.viewer_config.enable_chat = v;
        }
        if let Some(v) = self.viewer_upload {
            project.viewer_config.allow_file_upload = v;
        }
        if let Some(v) = self.viewer_dictation {
            project.viewer_config.allow_dictation = v;
        }
        if let Some(v) = self.expose_model_picker {
            project.viewer_config.expose_model_picker = v;
        }
        if let Some(v) = self.expose_temperature {
            project.viewer_config.expose_temperature = v;
        }
        Ok(())
    }
}

pub fn set(ctx: &Context, id: &str, edit: ProjectEdit) -> Result<()> {
    let mut project = ctx.project(id)?;
    edit.apply(&mut project)?;
    ctx.store.update(&project);
    println!("Updated project {id}");
    Ok(())
}

pub fn delete(ctx: &Context, ids: &[String]) -> Result<()> {
    let removed = ctx.store.remove_many(ids);
    println!("Removed {removed} project(s)");
    Ok(())
}

pub fn recent(ctx: &Context, limit: usize) -> Result<()> {
    print_project_rows(&ctx.store.recent(limit));
    Ok(())
}

pub fn favorite(ctx: &Context, id: &str) -> Result<()> {
    ctx.project(id)?;
    if ctx.store.toggle_favorite(&ctx.identity, id) {
        println!("Added {id} to favorites");
    } else {
        println!("Removed {id} from favorites");
    }
    Ok(())
}

pub fn favorites(ctx: &Context) -> Result<()> {
    print_project_rows(&ctx.store.favorites(&ctx.identity));
    Ok(())
}

pub fn models() -> Result<()> {
    for m in catalog::model_catalog() {
        println!(
            "{:<40}  {:<8}  {:>9}  {}",
            m.id, m.provider.as_str(), m.context_window, m.description
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportData {
    projects: Vec<Project>,
    favorites: Vec<String>,
}

/// All projects plus the current identity's favorites, as JSON on stdout.
pub fn export(ctx: &Context) -> Result<()> {
    let data = ExportData {
        projects: ctx.store.list(),
        favorites: ctx.store.favorite_ids(&ctx.identity),
    };
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
