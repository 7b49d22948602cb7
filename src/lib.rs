//! Build, share, and preview AI assistant projects.
//!
//! A *project* is a saved assistant configuration: system instructions, a model
//! from the fixed catalog, retrieval and memory settings, a knowledge base, and
//! sharing rules. Projects live in a local SQLite-backed key-value store and can
//! be chatted with through several model providers, or through a deterministic
//! mock when no provider key is configured.
//!
//! | Provider family | With a key | Without any key |
//! |-----------------|------------|-----------------|
//! | OpenAI, Google, Meta | Live HTTP call | Mock reply |
//! | Nova, O1, Titan, AWS | Placeholder stub | Mock reply |
//! | Anthropic, Mistral | "No matching provider key" | Mock reply |
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite open, schema, migrations, health checks, and the key-value store
//! - [`projects`] — Project records, the model catalog, the store, sharing, knowledge files
//! - [`access`] — Editor / viewer / no-access resolution
//! - [`templates`] — Tagged-record import, built-in templates, applying templates
//! - [`inference`] — Provider routing, live handlers, mock replies, viewer chat sessions
//! - [`scaffold`] — Idea-to-project generation with a heuristic fallback

pub mod access;
pub mod config;
pub mod db;
pub mod inference;
pub mod projects;
pub mod scaffold;
pub mod templates;
