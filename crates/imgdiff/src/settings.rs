//! Settings file for the command-line front end.

use std::path::Path;

use imgdiff_engine::{Anchor, DiffOptions};
use imgdiff_link::LinkerConfig;
use serde::{Deserialize, Serialize};

use crate::CliError;

/// Contents of the `--config` JSON file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Anchor used when `--anchor` is not given.
    pub default_alignment: Anchor,
    pub diff: DiffOptions,
    pub linker: LinkerConfig,
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
