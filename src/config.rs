//! User configuration, read once at startup.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PlannerError, Result};
use crate::task::Priority;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event poll interval; also how often the header clock redraws.
    pub tick_rate_ms: u64,
    /// chrono format string for the header clock
    pub clock_format: String,
    /// chrono format string for each card's creation time
    pub created_at_format: String,
    /// Ask before deleting a task or clearing the board.
    pub confirm_deletes: bool,
    /// Preselected priority in the new-task form.
    pub default_priority: Option<Priority>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 1000,
            clock_format: "%I:%M:%S %p".to_string(),
            created_at_format: "%d %b %Y %I:%M %p".to_string(),
            confirm_deletes: true,
            default_priority: None,
        }
    }
}

impl Config {
    /// `<config_dir>/planner/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planner")
            .join("config.json")
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects time formats chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        check_time_format("clock_format", &self.clock_format)?;
        check_time_format("created_at_format", &self.created_at_format)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(50))
    }
}

fn check_time_format(field: &'static str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(PlannerError::InvalidFormat {
            field,
            format: format.to_string(),
        });
    }
    Ok(())
}
