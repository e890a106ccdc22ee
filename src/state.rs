//! Application state: configuration, the idiom pool, the player store and
//! a cache of derived daily puzzles.
//!
//! The pool is loaded once before the server binds and never changes
//! afterwards, so puzzles derived from it can be cached per (date, mode).

use std::{collections::HashMap, sync::Arc};
use time::Date;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::calendar::today;
use crate::config::{load_game_config_from_env, GameConfig};
use crate::domain::{DailyPuzzle, Difficulty};
use crate::error::{GameError, LoadError};
use crate::pool::IdiomPool;
use crate::puzzle;
use crate::store::PlayerStore;

// Old days are evicted once the cache grows past this many entries.
const PUZZLE_CACHE_LIMIT: usize = 16;

pub struct AppState {
    pub config: GameConfig,
    pub pool: Arc<IdiomPool>,
    pub store: PlayerStore,
    puzzles: RwLock<HashMap<(Date, Difficulty), Arc<DailyPuzzle>>>,
}

impl AppState {
    /// Build state from env: load config, load the idiom pool, open the store.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, LoadError> {
        let config = load_game_config_from_env()
            .unwrap_or_default()
            .with_env_overrides();

        let pool = IdiomPool::load(config.idioms_path.as_deref(), config.pool_seed).await?;
        info!(
            target: "idiom_wordle",
            idioms = pool.len(),
            simple = pool.ordering(Difficulty::Simple).len(),
            epoch = %config.epoch,
            utc_offset_hours = config.utc_offset_hours,
            "Idiom pool ready"
        );

        let store = match &config.data_dir {
            Some(dir) => {
                info!(target: "idiom_wordle", %dir, "Player records persisted to disk");
                PlayerStore::with_dir(dir)
            }
            None => {
                warn!(target: "idiom_wordle", "DATA_DIR not set; player records kept in memory only");
                PlayerStore::in_memory()
            }
        };

        Ok(Self::from_parts(config, pool, store))
    }

    pub fn from_parts(config: GameConfig, pool: IdiomPool, store: PlayerStore) -> Self {
        Self {
            config,
            pool: Arc::new(pool),
            store,
            puzzles: RwLock::new(HashMap::new()),
        }
    }

    /// The service's current date at the configured offset.
    pub fn today(&self) -> Date {
        today(self.config.utc_offset())
    }

    /// Derived puzzle for `date` under `mode`, cached.
    #[instrument(level = "debug", skip(self))]
    pub async fn puzzle(&self, date: Date, mode: Difficulty) -> Result<Arc<DailyPuzzle>, GameError> {
        if let Some(p) = self.puzzles.read().await.get(&(date, mode)).cloned() {
            return Ok(p);
        }

        let derived = Arc::new(puzzle::derive(&self.pool, date, mode, &self.config)?);
        debug!(target: "puzzle", %date, ?mode, day_index = derived.day_index, "Derived daily puzzle");

        let mut cache = self.puzzles.write().await;
        if cache.len() >= PUZZLE_CACHE_LIMIT {
            if let Some(oldest) = cache.keys().map(|(d, _)| *d).min() {
                cache.retain(|(d, _), _| *d != oldest);
            }
        }
        Ok(cache.entry((date, mode)).or_insert(derived).clone())
    }
}
