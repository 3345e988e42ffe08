use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::{self as queue, UnboundedSender};

use crate::api::ApiClient;
use crate::app::types::{App, InputMode};
use crate::app_event::{AppEvent, Notice};
use crate::config::AppConfig;
use crate::editor::EditorAdapter;
use crate::store::{Effect, HostStore, PersistRequest, Transition};

impl App {
    /// Must run inside the tokio runtime, which hosts the persist worker.
    pub fn new(config: AppConfig, config_path: PathBuf) -> Result<Self> {
        let (event_sender, event_receiver) = mpsc::channel::<AppEvent>();
        let api = ApiClient::new(&config.server_url, event_sender.clone())
            .context("Failed to build HTTP client")?;

        tracing::info!("Using zhost server at {}", api.base_url());
        let persist_queue = spawn_persist_worker(api.clone());

        let store = HostStore::new();
        let editor = EditorAdapter::mount(store.current());
        let mut host_list_state = ListState::default();
        host_list_state.select(Some(0));

        Ok(Self {
            should_quit: false,
            store,
            editor,
            input_mode: InputMode::Normal,
            rename_form: None,
            status_message: None,
            show_help: false,
            help_scroll_position: 0,
            config,
            config_path,
            host_list_state,
            api,
            persist_queue,
            event_sender,
            event_receiver,
        })
    }

    /// Kick off the initial fetches. Must run inside the tokio runtime.
    pub fn start(&mut self) {
        self.spawn_load_hosts();
        if self.store.is_system_selected() {
            self.spawn_refresh_system();
        }
    }

    /// Adopt a transition: swap in the new snapshot, then carry out its effects.
    pub fn apply(&mut self, transition: Transition) {
        let Transition { store, effects } = transition;
        self.store = store;
        self.sync_editor();

        for effect in effects {
            match effect {
                Effect::Persist(request) => self.queue_persist(request),
                Effect::ReplaceDocument(text) => {
                    if self.editor.key() == self.store.current().id {
                        self.editor.replace_document(&text);
                    }
                }
            }
        }
    }

    /// Remount the editor when the selection moved to another entry.
    fn sync_editor(&mut self) {
        let current = self.store.current();
        if self.editor.key() != current.id {
            self.editor = EditorAdapter::mount(current);
        }
        self.host_list_state
            .select(self.store.position(self.store.selection()));
    }

    pub fn select_host(&mut self, id: u64) {
        let was = self.store.selection();
        let transition = self.store.select(id);
        self.apply(transition);
        if self.store.selection() != was && self.store.is_system_selected() {
            self.spawn_refresh_system();
        }
    }

    pub fn select_next(&mut self) {
        let hosts = self.store.hosts();
        let Some(index) = self.store.position(self.store.selection()) else {
            return;
        };
        let next = hosts[(index + 1) % hosts.len()].id;
        self.select_host(next);
    }

    pub fn select_previous(&mut self) {
        let hosts = self.store.hosts();
        let Some(index) = self.store.position(self.store.selection()) else {
            return;
        };
        let total = hosts.len();
        let previous = hosts[(index + total - 1) % total].id;
        self.select_host(previous);
    }

    pub fn add_host(&mut self) {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let transition =
            self.store
                .add(&self.config.new_host_name, &self.config.new_host_content, now);
        self.apply(transition);
        self.set_status(Notice::info(format!("Added '{}'", self.config.new_host_name)));
    }

    pub fn toggle_current_open(&mut self) {
        if self.store.is_system_selected() {
            self.set_status(Notice::info("The system hosts entry is read-only"));
            return;
        }
        let checked = !self.store.current().open;
        let transition = self.store.toggle_open(checked);
        self.apply(transition);
    }

    /// Forward a full document from the editor into the store.
    pub fn edit_current_content(&mut self, text: &str) {
        let transition = self.store.edit_content(text);
        self.apply(transition);
    }

    pub fn set_status(&mut self, notice: Notice) {
        self.status_message = Some((notice, Instant::now()));
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Drain finished background requests.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.event_receiver.try_recv() {
            changed = true;
            match event {
                AppEvent::HostListLoaded(hosts) => {
                    let transition = self.store.load(hosts);
                    self.apply(transition);
                }
                AppEvent::SystemHostLoaded(entry) => {
                    let transition = self.store.refresh_system(entry);
                    self.apply(transition);
                }
                AppEvent::Notice(notice) => self.set_status(notice),
            }
        }
        changed
    }

    pub fn spawn_refresh_system(&self) {
        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            if let Ok(entry) = api.fetch_system_host().await {
                let _ = events.send(AppEvent::SystemHostLoaded(entry));
            }
        });
    }

    fn spawn_load_hosts(&self) {
        let api = self.api.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            if let Ok(list) = api.fetch_host_list().await {
                let _ = events.send(AppEvent::HostListLoaded(list.hosts));
            }
        });
    }

    /// Queue a write for the persist worker. A failure there has already
    /// produced a notice; the local state is left as it is.
    fn queue_persist(&self, request: PersistRequest) {
        if let Err(e) = self.persist_queue.send(request) {
            tracing::error!("Persist worker is gone, host {} not saved", e.0.entry().id);
        }
    }
}

/// Sends queued writes one at a time so the server sees them in edit order.
fn spawn_persist_worker(api: ApiClient) -> UnboundedSender<PersistRequest> {
    let (sender, mut receiver) = queue::unbounded_channel::<PersistRequest>();
    tokio::spawn(async move {
        while let Some(request) = receiver.recv().await {
            let result = match &request {
                PersistRequest::Add(entry) => api.add_host(entry).await,
                PersistRequest::Update(entry) => api.update_host(entry).await,
            };
            match result {
                Ok(()) => tracing::debug!("Persisted host {}", request.entry().id),
                Err(e) => tracing::warn!("Host {} not persisted: {}", request.entry().id, e),
            }
        }
        tracing::debug!("Persist queue closed");
    });
    sender
}
