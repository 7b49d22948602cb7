use anyhow::Result;

use aiforge::scaffold::{apply_scaffold, ScaffoldGenerator};

use super::Context;

pub async fn scaffold(ctx: &Context, idea: &str) -> Result<()> {
    let generator = ScaffoldGenerator::new(ctx.dispatcher()?);
    let scaffold = generator.generate(idea, &ctx.store.credentials()).await;
    let project = apply_scaffold(&ctx.store, &scaffold);
    println!("Created project {} ({})", project.id, project.project_name);
    if let Some(category) = &project.category {
        println!("  Category:      {category}");
    }
    println!("  Instructions:  {}", project.system_instructions);
    Ok(())
}
