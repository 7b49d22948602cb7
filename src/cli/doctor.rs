//! CLI `doctor` command: store diagnostics.

use anyhow::{Context as _, Result};

use aiforge::db;

use super::Context;

pub fn doctor(ctx: &Context) -> Result<()> {
    let db_path = ctx.config.resolved_db_path();
    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let shared = ctx.store.storage().connection();
    let report = {
        let conn = shared.lock().unwrap_or_else(|p| p.into_inner());
        db::check_database_health(&conn).context("failed to run health check")?
    };

    let credentials = ctx.store.credentials();
    let templates_path = ctx.config.resolved_templates_path();

    println!("aiforge Health Report");
    println!("=====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Stored keys:       {}", report.key_count);
    println!();
    println!("Projects:          {}", ctx.store.list().len());
    println!("Identity:          {}", if ctx.identity.is_empty() { "(anonymous)" } else { &ctx.identity });
    println!("Email matching:    {}", ctx.config.access.email_matching);
    println!(
        "Provider keys:     {}",
        if credentials.is_empty() {
            "none (mock mode)".to_string()
        } else {
            credentials
                .configured()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    println!(
        "Template resource: {} ({})",
        templates_path.display(),
        if templates_path.exists() { "found" } else { "missing" }
    );
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Export what is still readable: aiforge export > backup.json");
        println!("  2. Move the damaged file aside and let aiforge create a fresh one.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
