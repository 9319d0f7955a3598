//! Loading dashboard configuration from TOML.
//!
//! Schema:
//! ```toml
//! seed_demo = true
//!
//! [defaults]
//! pass_score = 70
//! reward_coins = 10
//! reward_xp = 20
//!
//! [notifications]
//! webhook_url = "https://hooks.example.org/quest-admin"
//! timeout_secs = 5
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::runner::DEFAULT_PASS_SCORE;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub defaults: Defaults,
  pub notifications: NotificationsCfg,
  /// Insert the demo village on startup.
  pub seed_demo: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self { defaults: Defaults::default(), notifications: NotificationsCfg::default(), seed_demo: true }
  }
}

/// Values applied to new nodes when the request leaves them out.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Defaults {
  pub pass_score: u8,
  pub reward_coins: u32,
  pub reward_xp: u32,
}

impl Default for Defaults {
  fn default() -> Self {
    Self { pass_score: DEFAULT_PASS_SCORE, reward_coins: 10, reward_xp: 20 }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsCfg {
  pub webhook_url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for NotificationsCfg {
  fn default() -> Self {
    Self { webhook_url: None, timeout_secs: 5 }
  }
}

/// Parse a TOML document; a bad pass score is clamped rather than rejected.
pub fn parse(s: &str) -> Result<AppConfig, toml::de::Error> {
  let mut cfg = toml::from_str::<AppConfig>(s)?;
  cfg.defaults.pass_score = cfg.defaults.pass_score.min(100);
  Ok(cfg)
}

/// Attempt to load `AppConfig` from QUEST_ADMIN_CONFIG. On any parsing/IO error, returns None.
pub fn load_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUEST_ADMIN_CONFIG").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse(&s) {
      Ok(cfg) => {
        info!(target: "quest_admin", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quest_admin", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quest_admin", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
