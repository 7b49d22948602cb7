use std::path::PathBuf;

use anyhow::Result;

use aiforge::projects::KnowledgeFile;

use super::Context;

pub fn add(ctx: &Context, id: &str, files: &[PathBuf]) -> Result<()> {
    let mut project = ctx.project(id)?;
    let added = files
        .iter()
        .map(|path| KnowledgeFile::from_path(path))
        .collect::<Result<Vec<_>>>()?;
    for f in &added {
        println!("Added {} ({}, {} bytes) as {}", f.name, f.mime_type, f.size, f.id);
    }
    project.add_knowledge_files(added);
    ctx.store.update(&project);
    Ok(())
}

pub fn remove(ctx: &Context, id: &str, file_id: &str) -> Result<()> {
    let mut project = ctx.project(id)?;
    if project.remove_knowledge_file(file_id) {
        ctx.store.update(&project);
        println!("Removed {file_id}");
    } else {
        println!("No file {file_id} in {id}");
    }
    Ok(())
}

pub fn list(ctx: &Context, id: &str) -> Result<()> {
    let project = ctx.project(id)?;
    if project.knowledge_base.is_empty() {
        println!("(no files)");
    }
    for f in &project.knowledge_base {
        let extra = match (&f.text, &f.data_url) {
            (Some(_), _) => "text",
            (None, Some(_)) => "preview",
            (None, None) => "",
        };
        println!("{}  {:<32}  {:<24}  {:>9}  {extra}", f.id, f.name, f.mime_type, f.size);
    }
    Ok(())
}
