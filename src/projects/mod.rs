pub mod catalog;
pub mod knowledge;
pub mod sharing;
pub mod store;
pub mod types;

pub use store::{Profile, ProjectFilter, ProjectStore, StoreEvent, PROJECTS_KEY, UNREADABLE_KEY};
pub use types::{
    GeneralAccess, Invite, InviteRole, KnowledgeFile, ModelOption, Project, Provider,
    TEMPERATURE_RANGE,
};

/// RFC 3339 UTC timestamp with millisecond precision, the format every
/// `createdAt` / `updatedAt` / `addedAt` field uses.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
