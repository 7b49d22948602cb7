//! CLI template commands.

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;

use aiforge::templates::{apply_template, TemplateFacets, TemplateFilter};

use super::Context;

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Match title, description, or instructions
    #[arg(long, default_value = "")]
    pub query: String,
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub audience: Option<String>,
}

pub fn list(ctx: &Context, args: FilterArgs) -> Result<()> {
    let library = ctx.templates();
    library.ensure_loaded();
    let all = library.all();
    let filter = TemplateFilter {
        query: args.query,
        provider: args.provider,
        tag: args.tag,
        category: args.category,
        audience: args.audience,
    };
    let hits = filter.apply(&all);
    if hits.is_empty() {
        println!("(no templates)");
    }
    for t in hits {
        println!(
            "{:<36}  {:<40}  {:<10}  {}",
            t.id,
            t.title,
            t.category.as_deref().unwrap_or("-"),
            t.provider_normalized.as_deref().unwrap_or("-"),
        );
    }

    let facets = TemplateFacets::collect(&all);
    println!();
    println!("Providers:   {}", facets.providers.join(", "));
    println!("Tags:        {}", facets.tags.join(", "));
    println!("Categories:  {}", facets.categories.join(", "));
    println!("Audiences:   {}", facets.audiences.join(", "));
    Ok(())
}

pub fn import(ctx: &Context, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let count = ctx.templates().import_upload(&text)?;
    println!("Imported {count} template(s)");
    Ok(())
}

pub fn reload(ctx: &Context) -> Result<()> {
    let library = ctx.templates();
    if library.load_resource() {
        println!("Loaded {} template(s)", library.imported().len());
    } else {
        println!(
            "No templates loaded from {}",
            ctx.config.resolved_templates_path().display()
        );
    }
    Ok(())
}

pub fn apply(ctx: &Context, id: &str) -> Result<()> {
    let library = ctx.templates();
    library.ensure_loaded();
    let template = library
        .get(id)
        .ok_or_else(|| anyhow!("no template with id {id}"))?;
    let project = apply_template(&ctx.store, &template);
    println!(
        "Created project {} from template {} (model {})",
        project.id, template.title, project.model.id
    );
    Ok(())
}
