use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "ctledit.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Character that opens a block.
    pub marker: char,

    /// Directory that `edit` and `replay --name` write into.
    pub output_dir: PathBuf,

    /// Indentation of saved change logs.
    pub log_indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            marker: ctl::DEFAULT_MARKER,
            output_dir: PathBuf::from("."),
            log_indent: ctl::changelog::DEFAULT_INDENT,
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, String> {
        toml::from_str(source).map_err(|e| format!("TOML parse error: {}", e))
    }

    /// Load `explicit` if given, else `ctledit.toml` if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };

        let source = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        let config = Self::from_toml(&source)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
