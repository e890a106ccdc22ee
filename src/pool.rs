//! The idiom corpus: loading and validation at the boundary, the two
//! canonical shuffled orderings, and daily target selection.
//!
//! Both orderings are computed once with a constant seed, so every build
//! that loads the same corpus agrees on them regardless of the date.

use std::collections::HashMap;

use time::Date;
use tracing::{info, instrument, warn};

use crate::calendar::day_index;
use crate::domain::{Difficulty, Idiom, IdiomMetadata};
use crate::error::{GameError, LoadError};
use crate::pinyin::to_pinyin_diacritics;
use crate::util::is_cjk;
use crate::rng::shuffle;
use crate::seeds::seed_idioms;

/// Hard-coded ordering seed shared by every client.
pub const DEFAULT_POOL_SEED: i64 = 20260101;

#[derive(Clone, Debug)]
pub struct IdiomPool {
  by_word: HashMap<String, Idiom>,
  shuffled_all: Vec<String>,
  shuffled_simple: Vec<String>,
}

/// Outcome of parsing a CSV source.
#[derive(Debug, Default)]
pub struct ParsedIdioms {
  pub idioms: Vec<Idiom>,
  pub skipped: usize,
}

impl IdiomPool {
  /// Build from validated records in corpus order; duplicates keep the
  /// first occurrence.
  pub fn new(records: Vec<Idiom>, pool_seed: i64) -> Self {
    let mut by_word = HashMap::with_capacity(records.len());
    let mut order: Vec<String> = Vec::with_capacity(records.len());
    for mut idiom in records {
      if by_word.contains_key(&idiom.word) {
        continue;
      }
      if idiom.meta.pinyin.trim().is_empty() {
        idiom.meta.pinyin = to_pinyin_diacritics(&idiom.word);
      }
      order.push(idiom.word.clone());
      by_word.insert(idiom.word.clone(), idiom);
    }

    let simple: Vec<String> = order
      .iter()
      .filter(|w| by_word.get(*w).map(|i| i.meta.is_simple).unwrap_or(false))
      .cloned()
      .collect();

    Self {
      shuffled_all: shuffle(&order, pool_seed),
      shuffled_simple: shuffle(&simple, pool_seed),
      by_word,
    }
  }

  /// Built-in seed corpus.
  pub fn seeded(pool_seed: i64) -> Self {
    Self::new(seed_idioms(), pool_seed)
  }

  /// Read the CSV at `path`, or fall back to the built-in seeds when no
  /// path is configured.
  #[instrument(level = "info", skip_all, fields(path = ?path))]
  pub async fn load(path: Option<&str>, pool_seed: i64) -> Result<Self, LoadError> {
    let Some(path) = path else {
      let pool = Self::seeded(pool_seed);
      info!(target: "idiom_wordle", idioms = pool.len(), "No IDIOMS_PATH; using built-in idioms");
      return Ok(pool);
    };

    let text = tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
      path: path.to_string(),
      source,
    })?;
    let parsed = parse_csv(&text);
    if parsed.idioms.is_empty() {
      return Err(LoadError::NoIdioms { path: path.to_string() });
    }
    if parsed.skipped > 0 {
      warn!(target: "idiom_wordle", %path, skipped = parsed.skipped, "Skipped malformed idiom rows");
    }
    let pool = Self::new(parsed.idioms, pool_seed);
    info!(
      target: "idiom_wordle",
      %path,
      idioms = pool.len(),
      simple = pool.shuffled_simple.len(),
      "Loaded idiom pool"
    );
    Ok(pool)
  }

  pub fn len(&self) -> usize {
    self.shuffled_all.len()
  }

  pub fn is_empty(&self) -> bool {
    self.shuffled_all.is_empty()
  }

  pub fn contains(&self, word: &str) -> bool {
    self.get(word).is_some()
  }

  pub fn get(&self, word: &str) -> Option<&Idiom> {
    self.by_word.get(word)
  }

  /// Canonical ordering for a mode. Simple mode falls back to the full
  /// ordering when nothing is flagged simple.
  pub fn ordering(&self, mode: Difficulty) -> &[String] {
    match mode {
      Difficulty::Simple if !self.shuffled_simple.is_empty() => &self.shuffled_simple,
      _ => &self.shuffled_all,
    }
  }

  /// `ordering(mode)[day_index mod len]`.
  pub fn pick_target(&self, date: Date, epoch: Date, mode: Difficulty) -> Result<&Idiom, GameError> {
    let pool = self.ordering(mode);
    if pool.is_empty() {
      return Err(GameError::PoolEmpty);
    }
    let idx = day_index(date, epoch).rem_euclid(pool.len() as i64) as usize;
    self.by_word.get(&pool[idx]).ok_or(GameError::PoolEmpty)
  }
}

/// Parse `word,pinyin,derivation[,mark]` lines after a header line.
/// Rows with fewer than three fields, or a word that is not four Han
/// characters, are counted as skipped.
pub fn parse_csv(text: &str) -> ParsedIdioms {
  let mut out = ParsedIdioms::default();
  for line in text.lines().skip(1) {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
      out.skipped += 1;
      continue;
    }
    let mark = parts.get(3).map(|m| m.trim()).filter(|m| !m.is_empty()).unwrap_or("0");
    let meta = IdiomMetadata {
      pinyin: parts[1].trim().to_string(),
      derivation: parts[2].trim().to_string(),
      is_common: mark == "1" || mark == "2",
      is_simple: mark == "2",
    };
    let word = parts[0].trim();
    if !word.chars().all(is_cjk) {
      out.skipped += 1;
      continue;
    }
    match Idiom::new(word, meta) {
      Some(idiom) => out.idioms.push(idiom),
      None => out.skipped += 1,
    }
  }
  out
}
