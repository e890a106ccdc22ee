//! Loading game configuration (calendar, keyboard policy, hint texts,
//! player defaults) from TOML, with a few environment overrides.
//!
//! See `GameConfig` for the expected schema. Every field is optional.

use serde::Deserialize;
use time::{Date, UtcOffset};
use tracing::{error, info, warn};

use crate::calendar::{offset_from_hours, parse_date, DEFAULT_EPOCH};
use crate::hint::HintTemplates;
use crate::keyboard::KeyboardPolicy;
use crate::pool::DEFAULT_POOL_SEED;
use crate::session::DEFAULT_ROWS;
use crate::store::Settings;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
  /// Day index 0, `YYYY-MM-DD`.
  pub epoch: String,
  /// Fixed offset that defines "today" for every player.
  pub utc_offset_hours: i8,
  /// Board height.
  pub rows: usize,
  /// Seed of the canonical pool orderings. Changing it changes every future target.
  pub pool_seed: i64,
  pub keyboard: KeyboardPolicy,
  pub hints: HintTemplates,
  /// Settings for players that have not saved their own.
  pub defaults: Settings,
  /// CSV idiom source; built-in idioms when unset.
  pub idioms_path: Option<String>,
  /// One JSON file per player; memory only when unset.
  pub data_dir: Option<String>,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      epoch: "2026-01-01".into(),
      utc_offset_hours: 8,
      rows: DEFAULT_ROWS,
      pool_seed: DEFAULT_POOL_SEED,
      keyboard: KeyboardPolicy::default(),
      hints: HintTemplates::default(),
      defaults: Settings::default(),
      idioms_path: None,
      data_dir: None,
    }
  }
}

impl GameConfig {
  pub fn epoch_date(&self) -> Date {
    parse_date(&self.epoch).unwrap_or(DEFAULT_EPOCH)
  }

  pub fn utc_offset(&self) -> UtcOffset {
    offset_from_hours(self.utc_offset_hours)
  }

  /// Apply IDIOMS_PATH / DATA_DIR overrides.
  pub fn with_env_overrides(mut self) -> Self {
    if let Ok(p) = std::env::var("IDIOMS_PATH") {
      if !p.trim().is_empty() {
        self.idioms_path = Some(p);
      }
    }
    if let Ok(d) = std::env::var("DATA_DIR") {
      if !d.trim().is_empty() {
        self.data_dir = Some(d);
      }
    }
    self
  }

  fn sanity_check(&self) {
    if parse_date(&self.epoch).is_none() {
      warn!(target: "idiom_wordle", epoch = %self.epoch, "Unparseable epoch; using 2026-01-01");
    }
    if self.keyboard.size < crate::domain::IDIOM_LEN {
      warn!(target: "idiom_wordle", size = self.keyboard.size, "Keyboard smaller than an idiom; clamping");
    }
  }
}

/// Parse a config document.
pub fn parse_game_config(s: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str::<GameConfig>(s)
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_game_config(&s) {
      Ok(cfg) => {
        info!(target: "idiom_wordle", %path, "Loaded game config (TOML)");
        cfg.sanity_check();
        Some(cfg)
      }
      Err(e) => {
        error!(target: "idiom_wordle", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "idiom_wordle", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use time::macros::{date, offset};

  #[test]
  fn empty_document_gives_defaults() {
    let cfg = parse_game_config("").unwrap();
    assert_eq!(cfg.epoch_date(), date!(2026 - 01 - 01));
    assert_eq!(cfg.utc_offset(), offset!(+8));
    assert_eq!(cfg.rows, 5);
    assert_eq!(cfg.pool_seed, 20260101);
    assert_eq!(cfg.keyboard.size, 24);
    assert_eq!(cfg.keyboard.bucket_caps, [2, 3, 4]);
    assert_eq!(cfg.keyboard.layout_seed_offset, 999);
    assert!(cfg.defaults.common_idiom_only);
    assert!(!cfg.defaults.validate_idiom);
  }

  #[test]
  fn partial_tables_merge_with_defaults() {
    let cfg = parse_game_config(
      r#"
        epoch = "2025-06-01"
        utc_offset_hours = 0
        idioms_path = "data/idiom.csv"

        [keyboard]
        bucket_caps = [1, 1, 1]

        [hints]
        duplicate = "有重复"

        [defaults]
        validate_idiom = true
      "#,
    )
    .unwrap();
    assert_eq!(cfg.epoch_date(), date!(2025 - 06 - 01));
    assert_eq!(cfg.utc_offset(), UtcOffset::UTC);
    assert_eq!(cfg.keyboard.size, 24);
    assert_eq!(cfg.keyboard.bucket_caps, [1, 1, 1]);
    assert_eq!(cfg.hints.duplicate, "有重复");
    assert_eq!(cfg.hints.exclude, HintTemplates::default().exclude);
    assert!(cfg.defaults.validate_idiom);
    assert!(cfg.defaults.keyboard_highlight);
    assert_eq!(cfg.idioms_path.as_deref(), Some("data/idiom.csv"));
  }

  #[test]
  fn bad_epoch_falls_back() {
    let cfg = parse_game_config(r#"epoch = "soon""#).unwrap();
    assert_eq!(cfg.epoch_date(), DEFAULT_EPOCH);
  }

  #[test]
  fn wrong_types_are_errors() {
    assert!(parse_game_config("rows = \"five\"").is_err());
  }
}
