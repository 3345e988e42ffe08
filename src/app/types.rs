use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ApiClient;
use crate::app_event::{AppEvent, Notice};
use crate::config::AppConfig;
use crate::editor::EditorAdapter;
use crate::store::{HostStore, PersistRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Rename,
}

/// State of the rename modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameForm {
    pub host_id: u64,
    pub input: String,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub store: HostStore,
    pub editor: EditorAdapter,
    pub input_mode: InputMode,
    pub rename_form: Option<RenameForm>,

    pub status_message: Option<(Notice, Instant)>,
    pub show_help: bool,
    pub help_scroll_position: u16,

    pub config: AppConfig,
    pub config_path: PathBuf,

    pub host_list_state: ListState,

    pub(super) api: ApiClient,
    pub(super) persist_queue: UnboundedSender<PersistRequest>,
    pub(super) event_sender: Sender<AppEvent>,
    pub(super) event_receiver: Receiver<AppEvent>,
}
