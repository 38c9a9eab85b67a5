use crate::commands::{CmdMessage, CmdResult};
use crate::config::MintConfig;
use crate::error::Result;
use std::path::Path;

/// Show the configuration, or set the default author when one is given.
pub fn run(config_dir: &Path, author: Option<&str>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut config = MintConfig::load(config_dir)?;

    if let Some(author) = author {
        config.set_author(author);
        config.save(config_dir)?;
        result.add_message(CmdMessage::success(format!(
            "Author set to '{}'",
            config.author
        )));
    } else if config.has_author() {
        result.add_message(CmdMessage::info(format!("author: {}", config.author)));
    } else {
        result.add_message(CmdMessage::info(
            "author: (not set, use 'nm config --author <name>')",
        ));
    }

    Ok(result.with_config(config))
}
