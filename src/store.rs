//! Player persistence: settings, stats and one session branch per mode,
//! keyed by player id.
//!
//! Records live in memory and, when a data directory is configured, as one
//! JSON file per player. Storage failures are logged and read back as
//! "nothing saved"; they never reach game logic.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex as SyncMutex},
  time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::Difficulty;
use crate::session::SessionSnapshot;
use crate::stats::Stats;

/// Per-player switches. JSON uses camelCase; the config file's snake_case
/// keys are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
  /// Reject guesses that are not in the idiom pool.
  #[serde(alias = "validate_idiom")]
  pub validate_idiom: bool,
  /// Client-side key colouring; stored, not interpreted here.
  #[serde(alias = "keyboard_highlight")]
  pub keyboard_highlight: bool,
  /// Simple pool when true, full pool otherwise.
  #[serde(alias = "common_idiom_only")]
  pub common_idiom_only: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self { validate_idiom: false, keyboard_highlight: true, common_idiom_only: true }
  }
}

impl Settings {
  pub fn difficulty(&self) -> Difficulty {
    Difficulty::from_common_only(self.common_idiom_only)
  }
}

/// One session branch per difficulty; the modes never share a target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateBranches {
  pub common: Option<SessionSnapshot>,
  pub all: Option<SessionSnapshot>,
}

impl StateBranches {
  pub fn get(&self, mode: Difficulty) -> Option<&SessionSnapshot> {
    match mode {
      Difficulty::Simple => self.common.as_ref(),
      Difficulty::Full => self.all.as_ref(),
    }
  }

  pub fn set(&mut self, mode: Difficulty, snapshot: SessionSnapshot) {
    match mode {
      Difficulty::Simple => self.common = Some(snapshot),
      Difficulty::Full => self.all = Some(snapshot),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
  #[serde(alias = "setting")]
  pub settings: Settings,
  pub stats: Stats,
  pub state: StateBranches,
  /// Milliseconds since the Unix epoch of the last write.
  pub updated: i64,
}

impl Default for PlayerRecord {
  fn default() -> Self {
    Self { settings: Settings::default(), stats: Stats::default(), state: StateBranches::default(), updated: 0 }
  }
}

impl PlayerRecord {
  pub fn with_settings(settings: Settings) -> Self {
    Self { settings, ..Self::default() }
  }

  pub fn touch(&mut self) {
    self.updated = now_millis();
  }
}

pub fn now_millis() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as i64)
    .unwrap_or(0)
}

/// Ids double as file names, so only canonical UUIDs are accepted.
pub fn valid_player_id(id: &str) -> bool {
  Uuid::parse_str(id).is_ok()
}

pub fn new_player_id() -> String {
  Uuid::new_v4().to_string()
}

type LockMap = SyncMutex<HashMap<String, Arc<Mutex<()>>>>;

/// Held while one player's record is read, modified and written back.
/// Dropping the last holder of a player's slot removes it from the map.
pub struct PlayerGuard<'a> {
  locks: &'a LockMap,
  id: String,
  guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PlayerGuard<'_> {
  fn drop(&mut self) {
    self.guard.take();
    let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
    // the map's own Arc is the only one left: nobody holds or awaits the slot
    if locks.get(&self.id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
      locks.remove(&self.id);
    }
  }
}

pub struct PlayerStore {
  dir: Option<PathBuf>,
  cache: RwLock<HashMap<String, PlayerRecord>>,
  locks: LockMap,
}

impl PlayerStore {
  pub fn in_memory() -> Self {
    Self { dir: None, cache: RwLock::new(HashMap::new()), locks: SyncMutex::new(HashMap::new()) }
  }

  pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
    Self { dir: Some(dir.into()), cache: RwLock::new(HashMap::new()), locks: SyncMutex::new(HashMap::new()) }
  }

  /// Serializes load-modify-save sequences for one player.
  pub async fn lock(&self, id: &str) -> PlayerGuard<'_> {
    let slot = {
      let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
      locks.entry(id.to_string()).or_default().clone()
    };
    let guard = slot.lock_owned().await;
    PlayerGuard { locks: &self.locks, id: id.to_string(), guard: Some(guard) }
  }

  fn path_for(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
  }

  /// Saved record for `id`, or None when nothing usable is stored.
  #[instrument(level = "debug", skip(self))]
  pub async fn load(&self, id: &str) -> Option<PlayerRecord> {
    if !valid_player_id(id) {
      return None;
    }
    if let Some(rec) = self.cache.read().await.get(id).cloned() {
      return Some(rec);
    }
    let dir = self.dir.as_ref()?;
    let path = Self::path_for(dir, id);
    let raw = match tokio::fs::read_to_string(&path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
      Err(e) => {
        warn!(target: "idiom_wordle", path = %path.display(), error = %e, "Failed to read player record");
        return None;
      }
    };
    match serde_json::from_str::<PlayerRecord>(&raw) {
      Ok(rec) => {
        self.cache.write().await.insert(id.to_string(), rec.clone());
        Some(rec)
      }
      Err(e) => {
        warn!(target: "idiom_wordle", path = %path.display(), error = %e, "Corrupt player record; ignoring");
        None
      }
    }
  }

  /// Store `record` as-is (callers stamp `updated`).
  #[instrument(level = "debug", skip(self, record))]
  pub async fn save(&self, id: &str, record: &PlayerRecord) {
    if !valid_player_id(id) {
      warn!(target: "idiom_wordle", %id, "Refusing to save record for malformed player id");
      return;
    }
    self.cache.write().await.insert(id.to_string(), record.clone());
    let Some(dir) = self.dir.as_ref() else { return };
    if let Err(e) = write_json(dir, &Self::path_for(dir, id), record).await {
      warn!(target: "idiom_wordle", %id, error = %e, "Failed to persist player record; kept in memory");
    } else {
      debug!(target: "idiom_wordle", %id, "Player record persisted");
    }
  }

  /// Last write wins by `updated`: the newer of the stored and the incoming
  /// record is kept and returned. Ties keep the stored record.
  #[instrument(level = "debug", skip(self, incoming), fields(incoming_updated = incoming.updated))]
  pub async fn sync(&self, id: &str, incoming: PlayerRecord) -> PlayerRecord {
    match self.load(id).await {
      Some(stored) if stored.updated >= incoming.updated => stored,
      _ => {
        self.save(id, &incoming).await;
        incoming
      }
    }
  }
}

async fn write_json(dir: &Path, path: &Path, record: &PlayerRecord) -> std::io::Result<()> {
  tokio::fs::create_dir_all(dir).await?;
  let body = serde_json::to_vec_pretty(record).map_err(std::io::Error::other)?;
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, body).await?;
  tokio::fs::rename(&tmp, path).await
}
