//! CLI `preview` and `chat` commands.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use aiforge::access::{resolve_access, AccessRole};
use aiforge::inference::session::persist_overrides;
use aiforge::inference::{Attachment, ChatSession, SendOutcome, ViewerOverrides};

use super::Context;

/// Editor preview: a single prompt, with provider errors printed as the output.
pub async fn preview(ctx: &Context, id: &str, prompt: &str) -> Result<()> {
    let project = ctx.project(id)?;
    let dispatcher = ctx.dispatcher()?;
    match dispatcher
        .preview(&project, prompt, &ctx.store.credentials())
        .await
    {
        Ok(reply) => println!("{reply}"),
        Err(e) => println!("Error: {e}"),
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    Ok(Attachment::from_bytes(name, None, &bytes))
}

/// Viewer chat over stdin. Attachments ride along with the first turn.
pub async fn chat(
    ctx: &Context,
    id: &str,
    attachment_paths: &[PathBuf],
    model: Option<String>,
    temperature: Option<f64>,
) -> Result<()> {
    let project = ctx.project(id)?;
    let role = resolve_access(&project, &ctx.identity, ctx.config.access.email_matching);
    anyhow::ensure!(role != AccessRole::None, "Not found");
    anyhow::ensure!(project.viewer_config.enable_chat, "chat is disabled for this project");
    anyhow::ensure!(
        attachment_paths.is_empty() || project.viewer_config.allow_file_upload,
        "file upload is disabled for this project"
    );

    let overrides = ViewerOverrides {
        model_id: model,
        temperature,
    };
    persist_overrides(&ctx.store, &project, &overrides);

    let mut attachments = attachment_paths
        .iter()
        .map(|path| read_attachment(path))
        .collect::<Result<Vec<_>>>()?;

    println!("{} (ctrl-d to quit)", project.display_name);
    let session = ChatSession::new(ctx.dispatcher()?, project).with_overrides(overrides);
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        if input.trim().is_empty() {
            continue;
        }
        match session
            .send(input, &attachments, &ctx.store.credentials())
            .await
        {
            Ok(SendOutcome::Reply(reply)) => println!("{reply}"),
            Ok(SendOutcome::Superseded) => {}
            Err(e) => println!("Error: {e}"),
        }
        attachments.clear();
    }
    Ok(())
}
