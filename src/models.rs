use serde::{Deserialize, Serialize};

/// Id of the read-only entry mirroring the live system hosts file.
pub const SYSTEM_HOST_ID: u64 = 0;

pub const SYSTEM_HOST_NAME: &str = "System hosts";

/// Longest name accepted by the rename form, in characters.
pub const MAX_NAME_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub content: String,
}

impl HostEntry {
    pub fn new(id: u64, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            open: false,
            content: content.into(),
        }
    }

    /// Placeholder for the system entry until the server's copy arrives.
    pub fn system() -> Self {
        Self::new(SYSTEM_HOST_ID, SYSTEM_HOST_NAME, "")
    }

    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_HOST_ID
    }
}

/// Body of `GET /api/getHostList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostList {
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}
