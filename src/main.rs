mod cli;

use std::path::PathBuf;

use aiforge::config::AppConfig;
use aiforge::inference::credentials::CredentialSlot;
use aiforge::projects::{GeneralAccess, InviteRole, Provider};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aiforge", version, about = "Build, share, and preview AI assistant projects")]
struct Cli {
    /// Config file (defaults to ~/.aiforge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this identity instead of the stored profile email
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    identity: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a project with default settings
    New {
        /// Project name
        #[arg(default_value = "Untitled Project")]
        name: String,
    },
    /// List projects
    List {
        /// Match name or description
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Show one project as JSON
    Show { id: String },
    /// Edit project settings
    Set {
        id: String,
        #[command(flatten)]
        edit: cli::projects::ProjectEdit,
    },
    /// Delete one or more projects
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Most recently updated projects
    Recent {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Toggle a project in the current identity's favorites
    Favorite { id: String },
    /// List the current identity's favorite projects
    Favorites,
    /// Change who can open a project
    Share {
        id: String,
        #[command(subcommand)]
        action: ShareAction,
    },
    /// Projects shared with the current identity
    Shared,
    /// Which surface the current identity gets for a project
    Open { id: String },
    /// Manage a project's knowledge base
    Kb {
        id: String,
        #[command(subcommand)]
        action: KbAction,
    },
    /// Run one preview prompt against a project (editor view)
    Preview { id: String, prompt: String },
    /// Chat with a project as a viewer, one line per turn
    Chat {
        id: String,
        /// Files attached to the first turn
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
        /// Viewer model pick (needs the model picker exposed)
        #[arg(long)]
        model: Option<String>,
        /// Viewer temperature (needs the temperature control exposed)
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Create a project from a one-line idea
    Scaffold { idea: String },
    /// Browse, import, and apply templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Manage provider API keys
    Keys {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Show or set the local profile
    Profile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List the model catalog
    Models,
    /// Export all projects as JSON to stdout
    Export,
    /// Check the store database
    Doctor,
}

#[derive(Subcommand)]
enum ShareAction {
    /// Set link access
    Link { access: GeneralAccess },
    /// Invite an email with a role
    Invite { email: String, role: InviteRole },
    /// Remove an invite
    Revoke { email: String },
}

#[derive(Subcommand)]
enum KbAction {
    /// Add files
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a file by id
    Remove { file_id: String },
    /// List files
    List,
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List built-in and imported templates
    List {
        #[command(flatten)]
        filter: cli::templates::FilterArgs,
    },
    /// Replace imported templates with a JSON upload
    Import { file: PathBuf },
    /// Reload imported templates from the configured resource
    Reload,
    /// Create a project from a template
    Apply { id: String },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Show which keys are configured
    List,
    /// Store a key (trimmed)
    Set { slot: CredentialSlot, value: String },
    /// Remove a key
    Clear { slot: CredentialSlot },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // stderr keeps stdout clean for JSON output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = cli::Context::open(config, cli.identity)?;

    match cli.command {
        Command::New { name } => cli::projects::new(&ctx, &name),
        Command::List {
            query,
            category,
            provider,
        } => cli::projects::list(&ctx, query, category, provider),
        Command::Show { id } => cli::projects::show(&ctx, &id),
        Command::Set { id, edit } => cli::projects::set(&ctx, &id, edit),
        Command::Delete { ids } => cli::projects::delete(&ctx, &ids),
        Command::Recent { limit } => cli::projects::recent(&ctx, limit),
        Command::Favorite { id } => cli::projects::favorite(&ctx, &id),
        Command::Favorites => cli::projects::favorites(&ctx),
        Command::Share { id, action } => match action {
            ShareAction::Link { access } => cli::share::link(&ctx, &id, access),
            ShareAction::Invite { email, role } => cli::share::invite(&ctx, &id, &email, role),
            ShareAction::Revoke { email } => cli::share::revoke(&ctx, &id, &email),
        },
        Command::Shared => cli::share::shared(&ctx),
        Command::Open { id } => cli::share::open(&ctx, &id),
        Command::Kb { id, action } => match action {
            KbAction::Add { files } => cli::knowledge::add(&ctx, &id, &files),
            KbAction::Remove { file_id } => cli::knowledge::remove(&ctx, &id, &file_id),
            KbAction::List => cli::knowledge::list(&ctx, &id),
        },
        Command::Preview { id, prompt } => cli::chat::preview(&ctx, &id, &prompt).await,
        Command::Chat {
            id,
            attachments,
            model,
            temperature,
        } => cli::chat::chat(&ctx, &id, &attachments, model, temperature).await,
        Command::Scaffold { idea } => cli::scaffold::scaffold(&ctx, &idea).await,
        Command::Templates { action } => match action {
            TemplateAction::List { filter } => cli::templates::list(&ctx, filter),
            TemplateAction::Import { file } => cli::templates::import(&ctx, &file),
            TemplateAction::Reload => cli::templates::reload(&ctx),
            TemplateAction::Apply { id } => cli::templates::apply(&ctx, &id),
        },
        Command::Keys { action } => match action {
            KeyAction::List => cli::keys::list(&ctx),
            KeyAction::Set { slot, value } => cli::keys::set(&ctx, slot, &value),
            KeyAction::Clear { slot } => cli::keys::set(&ctx, slot, ""),
        },
        Command::Profile { email, name } => cli::keys::profile(&ctx, email, name),
        Command::Models => cli::projects::models(),
        Command::Export => cli::projects::export(&ctx),
        Command::Doctor => cli::doctor::doctor(&ctx),
    }
}
