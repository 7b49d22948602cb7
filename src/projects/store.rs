//! Project record store.
//!
//! The whole collection lives as one JSON array under [`PROJECTS_KEY`]. Every
//! mutation is a read-modify-write of that array, so two writers racing on
//! separate handles can lose an update (last write wins). After each mutation a
//! [`StoreEvent`] is broadcast; subscribers are expected to re-read what they
//! display.
//!
//! Records are decoded one at a time. A record that no longer decodes is
//! hidden from reads but written back untouched, and a collection that is not
//! JSON at all is copied to [`UNREADABLE_KEY`] before it is replaced.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use super::types::{GeneralAccess, Project, Provider};
use crate::access::{identity_matches, EmailMatching};
use crate::db::LocalStorage;
use crate::inference::credentials::{CredentialSlot, Credentials};

pub const PROJECTS_KEY: &str = "projects-v1";
/// Last collection text that could not be parsed, kept for manual recovery.
pub const UNREADABLE_KEY: &str = "projects-v1:unreadable";
const EMAIL_KEY: &str = "current-user-email";
const NAME_KEY: &str = "current-user-name";

/// Buffered notifications per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

fn favorites_key(identity: &str) -> String {
    let owner = if identity.is_empty() { "anon" } else { identity };
    format!("favorites:{owner}")
}

/// Change notification sent after every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ProjectsChanged,
    FavoritesChanged { identity: String },
    ProfileChanged,
    CredentialsChanged,
}

/// The current user's locally stored profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
}

/// Project list filter: free-text query over name and description, plus
/// exact category and provider matches. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub query: String,
    pub category: Option<String>,
    pub provider: Option<Provider>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        let q = self.query.trim().to_lowercase();
        let match_query = q.is_empty()
            || project.project_name.to_lowercase().contains(&q)
            || project.description.to_lowercase().contains(&q);
        let match_category = self
            .category
            .as_deref()
            .map_or(true, |c| project.category.as_deref() == Some(c));
        let match_provider = self
            .provider
            .map_or(true, |p| project.model.provider == p);
        match_query && match_category && match_provider
    }
}

/// The stored array split into records that decode and records that don't.
#[derive(Default)]
struct Collection {
    projects: Vec<Project>,
    undecodable: Vec<Value>,
    unreadable: Option<String>,
}

impl Collection {
    fn parse(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key = PROJECTS_KEY, error = %e, "project collection is unreadable");
                return Self {
                    unreadable: Some(raw),
                    ..Self::default()
                };
            }
        };
        let mut collection = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            match Project::deserialize(&record) {
                Ok(project) => collection.projects.push(project),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping undecodable project record");
                    collection.undecodable.push(record);
                }
            }
        }
        collection
    }

    fn records(&self) -> Vec<Value> {
        let mut records = Vec::with_capacity(self.projects.len() + self.undecodable.len());
        for project in &self.projects {
            match serde_json::to_value(project) {
                Ok(value) => records.push(value),
                Err(e) => tracing::warn!(id = %project.id, error = %e, "failed to encode project"),
            }
        }
        records.extend(self.undecodable.iter().cloned());
        records
    }
}

#[derive(Clone)]
pub struct ProjectStore {
    storage: LocalStorage,
    events: broadcast::Sender<StoreEvent>,
    email_matching: EmailMatching,
}

impl ProjectStore {
    pub fn new(storage: LocalStorage) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            events,
            email_matching: EmailMatching::default(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LocalStorage::open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(LocalStorage::in_memory()?))
    }

    /// Use `matching` when comparing identities against invites.
    pub fn with_email_matching(mut self, matching: EmailMatching) -> Self {
        self.email_matching = matching;
        self
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No receivers is fine: nobody else is watching.
        let _ = self.events.send(event);
    }

    fn read_collection(&self) -> Collection {
        Collection::parse(self.storage.get_item(PROJECTS_KEY))
    }

    fn read_all(&self) -> Vec<Project> {
        self.read_collection().projects
    }

    fn write_collection(&self, collection: &Collection) {
        if let Some(raw) = &collection.unreadable {
            self.storage.set_item(UNREADABLE_KEY, raw);
        }
        self.storage.write_json(PROJECTS_KEY, &collection.records());
        self.notify(StoreEvent::ProjectsChanged);
    }

    /// Create a project with defaults, persist it at the front of the
    /// collection, and return it.
    pub fn create(&self, name: &str) -> Project {
        let project = Project::new_default(name);
        let mut collection = self.read_collection();
        collection.projects.insert(0, project.clone());
        self.write_collection(&collection);
        tracing::info!(id = %project.id, name, "project created");
        project
    }

    /// Replace the stored project with the same id, refreshing `updatedAt`.
    ///
    /// Returns the stored version, or `None` (and writes nothing) if no project
    /// with that id exists.
    pub fn update(&self, project: &Project) -> Option<Project> {
        let mut collection = self.read_collection();
        let slot = collection.projects.iter_mut().find(|p| p.id == project.id)?;
        let mut next = project.clone();
        next.touch();
        *slot = next.clone();
        self.write_collection(&collection);
        tracing::debug!(id = %next.id, "project updated");
        Some(next)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.remove_many(&[id.to_string()]) > 0
    }

    /// Remove every listed project. Returns how many were removed.
    pub fn remove_many(&self, ids: &[String]) -> usize {
        let mut collection = self.read_collection();
        let before = collection.projects.len();
        collection.projects.retain(|p| !ids.contains(&p.id));
        let removed = before - collection.projects.len();
        self.write_collection(&collection);
        tracing::info!(removed, "projects removed");
        removed
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.read_all().into_iter().find(|p| p.id == id)
    }

    pub fn list(&self) -> Vec<Project> {
        self.read_all()
    }

    pub fn filter(&self, filter: &ProjectFilter) -> Vec<Project> {
        self.read_all()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect()
    }

    /// Projects reachable by `identity`: anything link-shared, plus anything
    /// that names the identity in an invite.
    pub fn list_shared_with(&self, identity: &str) -> Vec<Project> {
        self.read_all()
            .into_iter()
            .filter(|p| {
                p.general_access != GeneralAccess::Private
                    || p
                        .invites
                        .iter()
                        .any(|i| identity_matches(&i.email, identity, self.email_matching))
            })
            .collect()
    }

    /// Most recently updated first.
    pub fn recent(&self, limit: usize) -> Vec<Project> {
        let mut projects = self.read_all();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects.truncate(limit);
        projects
    }

    pub fn favorite_ids(&self, identity: &str) -> Vec<String> {
        self.storage.read_json(&favorites_key(identity))
    }

    pub fn is_favorite(&self, identity: &str, id: &str) -> bool {
        self.favorite_ids(identity).iter().any(|f| f == id)
    }

    /// Flip the favorite flag; newly favorited ids go to the front. Returns the
    /// new state.
    pub fn toggle_favorite(&self, identity: &str, id: &str) -> bool {
        let mut ids = self.favorite_ids(identity);
        let now_favorite = if let Some(pos) = ids.iter().position(|f| f == id) {
            ids.remove(pos);
            false
        } else {
            ids.insert(0, id.to_string());
            true
        };
        self.storage.write_json(&favorites_key(identity), &ids);
        self.notify(StoreEvent::FavoritesChanged {
            identity: identity.to_string(),
        });
        now_favorite
    }

    /// Favorited projects that still exist, in favorite order.
    pub fn favorites(&self, identity: &str) -> Vec<Project> {
        let projects = self.read_all();
        self.favorite_ids(identity)
            .iter()
            .filter_map(|id| projects.iter().find(|p| &p.id == id).cloned())
            .collect()
    }

    pub fn profile(&self) -> Profile {
        Profile {
            email: self.storage.get_item(EMAIL_KEY).unwrap_or_default(),
            name: self.storage.get_item(NAME_KEY).unwrap_or_default(),
        }
    }

    pub fn set_profile(&self, profile: &Profile) {
        self.storage.set_item(EMAIL_KEY, &profile.email);
        self.storage.set_item(NAME_KEY, &profile.name);
        self.notify(StoreEvent::ProfileChanged);
    }

    pub fn credential(&self, slot: CredentialSlot) -> Option<String> {
        self.storage
            .get_item(slot.storage_key())
            .filter(|v| !v.trim().is_empty())
    }

    /// Snapshot of every stored provider credential.
    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::default();
        for slot in CredentialSlot::ALL {
            if let Some(value) = self.storage.get_item(slot.storage_key()) {
                credentials.set(slot, value);
            }
        }
        credentials
    }

    /// Store a credential (trimmed). An empty value clears the slot.
    pub fn set_credential(&self, slot: CredentialSlot, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.storage.remove_item(slot.storage_key());
        } else {
            self.storage.set_item(slot.storage_key(), value);
        }
        tracing::info!(slot = %slot, cleared = value.is_empty(), "credential updated");
        self.notify(StoreEvent::CredentialsChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_prepends() {
        let store = ProjectStore::in_memory().unwrap();
        let first = store.create("First");
        let second = store.create("Second");
        let ids: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn update_unknown_id_writes_nothing() {
        let store = ProjectStore::in_memory().unwrap();
        store.create("Kept");
        let stranger = Project::new_default("Stranger");
        assert!(store.update(&stranger).is_none());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn undecodable_records_are_hidden_but_kept() {
        let raw = serde_json::json!([{ "id": "broken" }, 42]).to_string();
        let collection = Collection::parse(Some(raw));
        assert!(collection.projects.is_empty());
        assert_eq!(collection.undecodable.len(), 2);
        assert_eq!(collection.records()[0]["id"], "broken");
    }

    #[test]
    fn favorites_key_defaults_to_anon() {
        assert_eq!(favorites_key(""), "favorites:anon");
        assert_eq!(favorites_key("a@b.edu"), "favorites:a@b.edu");
    }

    #[test]
    fn filter_by_query_and_provider() {
        let store = ProjectStore::in_memory().unwrap();
        let mut bio = store.create("Biology Helper");
        bio.model = crate::projects::catalog::find_model("gpt4o").unwrap();
        store.update(&bio);
        store.create("Chemistry Tutor");

        let filter = ProjectFilter {
            query: "bio".into(),
            ..Default::default()
        };
        assert_eq!(store.filter(&filter).len(), 1);

        let filter = ProjectFilter {
            provider: Some(Provider::OpenAI),
            ..Default::default()
        };
        let hits = store.filter(&filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].project_name, "Biology Helper");
    }

    #[test]
    fn empty_credential_clears_slot() {
        let store = ProjectStore::in_memory().unwrap();
        store.set_credential(CredentialSlot::OpenAi, "  sk-test  ");
        assert_eq!(
            store.credentials().get(CredentialSlot::OpenAi),
            Some("sk-test")
        );
        store.set_credential(CredentialSlot::OpenAi, "   ");
        assert!(store.credentials().is_empty());
    }
}
