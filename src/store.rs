//! Host list state.
//!
//! [`HostStore`] is an immutable snapshot. Every command returns a new
//! snapshot together with the [`Effect`]s the caller must carry out; the store
//! itself never talks to the network or the editor. Entries are shared through
//! `Arc`, so an entry a command did not touch is the same allocation in the old
//! and the new snapshot.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{HostEntry, MAX_NAME_LEN, SYSTEM_HOST_ID};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at most {} characters", MAX_NAME_LEN)]
    NameTooLong,
    #[error("The system entry cannot be edited")]
    ReadOnly,
    #[error("No host with id {0}")]
    UnknownHost(u64),
}

/// Name rule of the edit form: non-blank and at most [`MAX_NAME_LEN`] chars.
pub fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistRequest {
    Add(HostEntry),
    Update(HostEntry),
}

impl PersistRequest {
    pub fn entry(&self) -> &HostEntry {
        match self {
            Self::Add(entry) | Self::Update(entry) => entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the entry to the server. The local change is already applied.
    Persist(PersistRequest),
    /// Overwrite the text shown by the mounted editor.
    ReplaceDocument(String),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub store: HostStore,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(store: HostStore) -> Self {
        Self {
            store,
            effects: Vec::new(),
        }
    }

    fn with(store: HostStore, effect: Effect) -> Self {
        Self {
            store,
            effects: vec![effect],
        }
    }

    #[cfg(test)]
    pub fn persist_requests(&self) -> impl Iterator<Item = &PersistRequest> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Persist(request) => Some(request),
            Effect::ReplaceDocument(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HostStore {
    hosts: Vec<Arc<HostEntry>>,
    selection: u64,
    id_counter: u64,
}

impl Default for HostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStore {
    /// A store holding only the placeholder system entry, which is selected.
    pub fn new() -> Self {
        Self {
            hosts: vec![Arc::new(HostEntry::system())],
            selection: SYSTEM_HOST_ID,
            id_counter: 0,
        }
    }

    pub fn hosts(&self) -> &[Arc<HostEntry>] {
        &self.hosts
    }

    pub fn selection(&self) -> u64 {
        self.selection
    }

    pub fn get(&self, id: u64) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.id == id).map(Arc::as_ref)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.hosts.iter().position(|h| h.id == id)
    }

    /// The selected entry, or the system entry if the selection is stale.
    pub fn current(&self) -> &HostEntry {
        self.get(self.selection).unwrap_or(&self.hosts[0])
    }

    pub fn is_system_selected(&self) -> bool {
        self.selection == SYSTEM_HOST_ID
    }

    pub fn select(&self, id: u64) -> Transition {
        if self.position(id).is_none() {
            tracing::warn!("Ignoring selection of unknown host {}", id);
            return Transition::quiet(self.clone());
        }
        let mut next = self.clone();
        next.selection = id;
        Transition::quiet(next)
    }

    /// Append the server's user-defined entries after the system entry.
    pub fn load(&self, hosts: Vec<HostEntry>) -> Transition {
        let mut next = self.clone();
        for host in hosts {
            if host.is_system() || next.position(host.id).is_some() {
                tracing::warn!("Skipping loaded host {} ({}): id already taken", host.id, host.name);
                continue;
            }
            next.hosts.push(Arc::new(host));
        }
        tracing::info!("Loaded {} hosts", next.hosts.len() - 1);
        Transition::quiet(next)
    }

    /// Replace the system entry in place with the server's live copy.
    pub fn refresh_system(&self, mut entry: HostEntry) -> Transition {
        entry.id = SYSTEM_HOST_ID;
        let content = entry.content.clone();
        let mut next = self.clone();
        next.hosts[0] = Arc::new(entry);
        if next.is_system_selected() {
            Transition::with(next, Effect::ReplaceDocument(content))
        } else {
            Transition::quiet(next)
        }
    }

    /// Append a new entry with a fresh id and ask for it to be persisted.
    pub fn add(&self, name: &str, content: &str, now_millis: u64) -> Transition {
        let mut next = self.clone();
        let id = next.next_id(now_millis);
        let entry = HostEntry::new(id, name, content);
        next.hosts.push(Arc::new(entry.clone()));
        tracing::info!("Added host {}", id);
        Transition::with(next, Effect::Persist(PersistRequest::Add(entry)))
    }

    /// Set `open` on the selected entry. Other entries are left alone even if
    /// they are open too; exclusivity is the server's business.
    pub fn toggle_open(&self, checked: bool) -> Transition {
        if self.is_system_selected() {
            return Transition::quiet(self.clone());
        }
        self.update_entry(self.selection, |entry| entry.open = checked)
    }

    /// Replace the selected entry's content. Does nothing for the system entry.
    pub fn edit_content(&self, text: &str) -> Transition {
        if self.is_system_selected() || self.current().content == text {
            return Transition::quiet(self.clone());
        }
        self.update_entry(self.selection, |entry| entry.content = text.to_string())
    }

    pub fn rename(&self, id: u64, name: &str) -> Result<Transition, ValidationError> {
        if id == SYSTEM_HOST_ID {
            return Err(ValidationError::ReadOnly);
        }
        if self.position(id).is_none() {
            return Err(ValidationError::UnknownHost(id));
        }
        let name = validate_name(name)?.to_string();
        Ok(self.update_entry(id, |entry| entry.name = name))
    }

    fn update_entry(&self, id: u64, change: impl FnOnce(&mut HostEntry)) -> Transition {
        let Some(index) = self.position(id) else {
            return Transition::quiet(self.clone());
        };
        let mut entry = HostEntry::clone(&self.hosts[index]);
        change(&mut entry);

        let mut next = self.clone();
        next.hosts[index] = Arc::new(entry.clone());
        Transition::with(next, Effect::Persist(PersistRequest::Update(entry)))
    }

    /// Timestamp plus a counter, re-rolled until it collides with nothing.
    fn next_id(&mut self, now_millis: u64) -> u64 {
        loop {
            let candidate = now_millis.saturating_add(self.id_counter);
            self.id_counter += 1;
            if candidate != SYSTEM_HOST_ID && self.position(candidate).is_none() {
                return candidate;
            }
        }
    }
}
