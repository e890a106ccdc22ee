//! Derivation of a day's puzzle: target, keyboard and hint all follow from
//! the date, the mode and the pool ordering.

use time::Date;

use crate::calendar::{day_index, seed_for};
use crate::config::GameConfig;
use crate::domain::{DailyPuzzle, Difficulty};
use crate::error::GameError;
use crate::hint::{hint_for, Hint};
use crate::keyboard::compose;
use crate::pool::IdiomPool;

/// The keyboard candidates are the same mode ordering the target came from.
pub fn derive(pool: &IdiomPool, date: Date, mode: Difficulty, cfg: &GameConfig) -> Result<DailyPuzzle, GameError> {
  let epoch = cfg.epoch_date();
  let target = pool.pick_target(date, epoch, mode)?.clone();
  let seed = seed_for(date, epoch);
  let keyboard = compose(&target.word, pool.ordering(mode), seed, &cfg.keyboard);
  Ok(DailyPuzzle {
    date,
    day_index: day_index(date, epoch),
    seed,
    mode,
    target,
    keyboard,
  })
}

pub fn daily_hint(puzzle: &DailyPuzzle) -> Hint {
  hint_for(puzzle.seed, &puzzle.target.chars(), &puzzle.keyboard)
}
