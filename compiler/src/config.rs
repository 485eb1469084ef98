//! Engine configuration, loaded from a JSON file.
//!
//! Every section and field is optional; missing values take the defaults
//! below.
//!
//! ```json
//! {
//!   "lower": { "on_name_collision": "reject" },
//!   "interpreter": { "trigger_delay_ms": 500, "step_delay_ms": 600, "finish_delay_ms": 500 },
//!   "limits": { "max_depth": 16, "max_steps": 500 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interpret::InterpreterConfig;
use crate::lower::LowerOptions;
use crate::validate::Limits;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub lower: LowerOptions,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub limits: Limits,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded engine config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// `path` if given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
