use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use luckyplus_db::db::db_path;
use luckyplus_engine::matcher::MatchPolicy;
use luckyplus_engine::source::{DEFAULT_DRAW_API, DEFAULT_FETCH_TIMEOUT};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user: String,
    pub db_path: Option<PathBuf>,
    pub draw_api_url: String,
    pub fetch_timeout_secs: u64,
    pub match_policy: MatchPolicy,
    pub recency_decay: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            db_path: None,
            draw_api_url: DEFAULT_DRAW_API.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            match_policy: MatchPolicy::LastMatch,
            recency_decay: 1.0,
        }
    }
}

impl AppConfig {
    /// Missing file means defaults; a file that exists must parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in {:?}", path))?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(db_path)
    }
}
