use crate::error::{MintError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// User configuration, stored as config.json in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintConfig {
    /// Default author, used by the author fixer when none is given explicitly.
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    String::new()
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
        }
    }
}

impl MintConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(MintError::Io)?;
        let config: MintConfig =
            serde_json::from_str(&content).map_err(MintError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(MintError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(MintError::Serialization)?;
        fs::write(config_path, content).map_err(MintError::Io)?;
        Ok(())
    }

    pub fn has_author(&self) -> bool {
        !self.author.is_empty()
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = author.trim().to_string();
    }
}
