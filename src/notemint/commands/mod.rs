use crate::config::MintConfig;
use std::path::PathBuf;

pub mod archive;
pub mod backlinks;
pub mod config;
pub mod create;
pub mod delete;
pub mod fix;
pub mod helpers;
pub mod overview;
pub mod reload;
pub mod summary;

/// Where persistent state lives: registry data under `data`, user config
/// under `config`.
#[derive(Debug, Clone)]
pub struct MintPaths {
    pub data: PathBuf,
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One row of the index listing.
#[derive(Debug, Clone)]
pub struct IndexOverview {
    pub name: String,
    pub path: PathBuf,
    pub notes: usize,
    pub exceptions: usize,
    /// Most recent modification time across the indexed files, epoch seconds.
    pub last_modified: Option<i64>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub indices: Vec<IndexOverview>,
    pub archives: Vec<PathBuf>,
    pub config: Option<MintConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_indices(mut self, indices: Vec<IndexOverview>) -> Self {
        self.indices = indices;
        self
    }

    pub fn with_config(mut self, config: MintConfig) -> Self {
        self.config = Some(config);
        self
    }
}
