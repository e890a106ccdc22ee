//! One player's game for one day under one difficulty.
//!
//! The session owns the attempt history, the row/column cursor, the
//! terminal state, and the aggregated per-key status. Every failed action
//! leaves it exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::format_date;
use crate::domain::{to_chars, DailyPuzzle, Status, IDIOM_LEN};
use crate::error::GameError;
use crate::evaluate::{evaluate, tally};
use crate::pool::IdiomPool;

/// Canonical board height.
pub const DEFAULT_ROWS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  InProgress,
  Won,
  Lost,
}

/// Emitted once, on the transition into `Won` or `Lost`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GameOutcome {
  pub won: bool,
  pub attempts: usize,
  /// (correct, present, absent) of the final guess.
  pub last_tally: (usize, usize, usize),
}

/// Result of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
  pub guess: String,
  pub row: usize,
  pub verdict: [Status; IDIOM_LEN],
  pub key_status: BTreeMap<char, Status>,
  pub outcome: Option<GameOutcome>,
}

/// Persisted shape of a session branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub date: String,
  #[serde(default)]
  pub guessed_idioms: Vec<String>,
  #[serde(default)]
  pub current_row: usize,
  #[serde(default)]
  pub game_over: bool,
  #[serde(default)]
  pub keyboard_state: BTreeMap<String, Status>,
}

#[derive(Clone, Debug)]
pub struct GameSession {
  puzzle: DailyPuzzle,
  rows: usize,
  guesses: Vec<String>,
  row: usize,
  buffer: Vec<char>,
  phase: Phase,
  key_status: BTreeMap<char, Status>,
}

impl GameSession {
  pub fn new(puzzle: DailyPuzzle, rows: usize) -> Self {
    Self {
      puzzle,
      rows: rows.max(1),
      guesses: Vec::new(),
      row: 0,
      buffer: Vec::with_capacity(IDIOM_LEN),
      phase: Phase::InProgress,
      key_status: BTreeMap::new(),
    }
  }

  /// Rebuild from a persisted branch by replaying its guesses. A snapshot
  /// for another date yields a fresh session.
  pub fn restore(puzzle: DailyPuzzle, rows: usize, snapshot: &SessionSnapshot) -> Self {
    let mut session = Self::new(puzzle, rows);
    if snapshot.date != format_date(session.puzzle.date) {
      return session;
    }
    for word in &snapshot.guessed_idioms {
      if session.is_over() {
        break;
      }
      if let Some(chars) = to_chars(word) {
        session.apply(chars);
      }
    }
    session
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      date: format_date(self.puzzle.date),
      guessed_idioms: self.guesses.clone(),
      current_row: self.row,
      game_over: self.is_over(),
      keyboard_state: self.key_status.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
  }

  pub fn puzzle(&self) -> &DailyPuzzle {
    &self.puzzle
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn is_over(&self) -> bool {
    self.phase != Phase::InProgress
  }

  pub fn guesses(&self) -> &[String] {
    &self.guesses
  }

  pub fn cursor(&self) -> (usize, usize) {
    (self.row, self.buffer.len())
  }

  pub fn current_input(&self) -> &[char] {
    &self.buffer
  }

  pub fn key_status(&self) -> &BTreeMap<char, Status> {
    &self.key_status
  }

  /// Every submitted guess with its verdict, in order.
  pub fn board(&self) -> Vec<(String, [Status; IDIOM_LEN])> {
    let target = self.puzzle.target.chars();
    self
      .guesses
      .iter()
      .filter_map(|g| to_chars(g).map(|c| (g.clone(), evaluate(&c, &target))))
      .collect()
  }

  /// Append to the current row. Past the last column this is a no-op.
  pub fn type_char(&mut self, ch: char) -> Result<(), GameError> {
    self.ensure_in_progress()?;
    if self.buffer.len() < IDIOM_LEN {
      self.buffer.push(ch);
    }
    Ok(())
  }

  /// Clear the last typed cell. At column 0 this is a no-op.
  pub fn delete_char(&mut self) -> Result<(), GameError> {
    self.ensure_in_progress()?;
    self.buffer.pop();
    Ok(())
  }

  /// Submit the typed row. `dictionary` is consulted only when idiom
  /// validation is on.
  pub fn submit(&mut self, dictionary: Option<&IdiomPool>) -> Result<Submission, GameError> {
    self.ensure_in_progress()?;
    let chars: [char; IDIOM_LEN] = self
      .buffer
      .as_slice()
      .try_into()
      .map_err(|_| GameError::IncompleteGuess)?;
    let out = self.check_and_apply(chars, dictionary)?;
    self.buffer.clear();
    Ok(out)
  }

  /// Submit a whole word at once, bypassing the row buffer.
  pub fn submit_word(&mut self, word: &str, dictionary: Option<&IdiomPool>) -> Result<Submission, GameError> {
    self.ensure_in_progress()?;
    let chars = to_chars(word.trim()).ok_or(GameError::IncompleteGuess)?;
    let out = self.check_and_apply(chars, dictionary)?;
    self.buffer.clear();
    Ok(out)
  }

  fn ensure_in_progress(&self) -> Result<(), GameError> {
    if self.is_over() { Err(GameError::GameAlreadyOver) } else { Ok(()) }
  }

  fn check_and_apply(
    &mut self,
    chars: [char; IDIOM_LEN],
    dictionary: Option<&IdiomPool>,
  ) -> Result<Submission, GameError> {
    if let Some(&bad) = chars.iter().find(|c| !self.puzzle.on_keyboard(**c)) {
      return Err(GameError::CharacterNotOnKeyboard(bad));
    }
    let word: String = chars.iter().collect();
    if let Some(pool) = dictionary {
      if !pool.contains(&word) {
        return Err(GameError::NotAValidIdiom(word));
      }
    }
    if self.guesses.contains(&word) {
      return Err(GameError::AlreadyGuessed(word));
    }
    Ok(self.apply(chars))
  }

  fn apply(&mut self, chars: [char; IDIOM_LEN]) -> Submission {
    let word: String = chars.iter().collect();
    let verdict = evaluate(&chars, &self.puzzle.target.chars());
    for (ch, status) in chars.iter().zip(verdict) {
      let next = Status::strengthen(self.key_status.get(ch).copied(), status);
      self.key_status.insert(*ch, next);
    }
    self.guesses.push(word.clone());
    let row = self.row;

    let outcome = if word == self.puzzle.target.word {
      self.phase = Phase::Won;
      Some(GameOutcome { won: true, attempts: self.guesses.len(), last_tally: tally(&verdict) })
    } else if self.row + 1 >= self.rows {
      self.phase = Phase::Lost;
      Some(GameOutcome { won: false, attempts: self.guesses.len(), last_tally: tally(&verdict) })
    } else {
      self.row += 1;
      None
    };

    Submission { guess: word, row, verdict, key_status: self.key_status.clone(), outcome }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Idiom, IdiomMetadata};
  use crate::pool::DEFAULT_POOL_SEED;
  use time::macros::date;

  fn puzzle(target: &str, keys: &str) -> DailyPuzzle {
    DailyPuzzle {
      date: date!(2026 - 03 - 04),
      day_index: 62,
      seed: 62,
      mode: Difficulty::Simple,
      target: Idiom::new(target, IdiomMetadata::default()).unwrap(),
      keyboard: keys.chars().collect(),
    }
  }

  fn session() -> GameSession {
    GameSession::new(puzzle("测三划四", "测三划四一二五六七八九十心意"), DEFAULT_ROWS)
  }

  fn type_word(s: &mut GameSession, word: &str) {
    for ch in word.chars() {
      s.type_char(ch).unwrap();
    }
  }

  #[test]
  fn typing_and_deleting_move_the_cursor() {
    let mut s = session();
    type_word(&mut s, "一二");
    assert_eq!(s.cursor(), (0, 2));
    s.delete_char().unwrap();
    assert_eq!(s.cursor(), (0, 1));
    assert_eq!(s.current_input(), &['一']);
    s.delete_char().unwrap();
    s.delete_char().unwrap();
    assert_eq!(s.cursor(), (0, 0));
  }

  #[test]
  fn typing_past_last_column_is_ignored() {
    let mut s = session();
    type_word(&mut s, "一二五六七");
    assert_eq!(s.cursor(), (0, 4));
    assert_eq!(s.current_input(), &['一', '二', '五', '六']);
  }

  #[test]
  fn short_row_cannot_submit() {
    let mut s = session();
    type_word(&mut s, "一二五");
    assert_eq!(s.submit(None).unwrap_err(), GameError::IncompleteGuess);
    assert_eq!(s.cursor(), (0, 3));
  }

  #[test]
  fn off_keyboard_guess_changes_nothing() {
    let mut s = session();
    type_word(&mut s, "一二龙六");
    let err = s.submit(None).unwrap_err();
    assert_eq!(err, GameError::CharacterNotOnKeyboard('龙'));
    assert_eq!(s.cursor(), (0, 4));
    assert!(s.guesses().is_empty());
    assert!(s.key_status().is_empty());
    assert_eq!(s.phase(), Phase::InProgress);
  }

  #[test]
  fn validation_mode_checks_dictionary_after_keyboard() {
    let pool = IdiomPool::new(
      vec![Idiom::new("一心一意", IdiomMetadata::default()).unwrap()],
      DEFAULT_POOL_SEED,
    );
    let mut s = GameSession::new(puzzle("一心一意", "一心意二三四"), DEFAULT_ROWS);
    // keyboard check wins over the dictionary check
    assert_eq!(
      s.submit_word("一心一龙", Some(&pool)).unwrap_err(),
      GameError::CharacterNotOnKeyboard('龙')
    );
    assert_eq!(
      s.submit_word("一二三四", Some(&pool)).unwrap_err(),
      GameError::NotAValidIdiom("一二三四".into())
    );
    // validation off accepts anything typed from the keyboard
    assert!(s.submit_word("一二三四", None).is_ok());
  }

  #[test]
  fn repeated_guess_is_rejected() {
    let mut s = session();
    s.submit_word("一二五六", None).unwrap();
    type_word(&mut s, "一二五六");
    assert_eq!(s.submit(None).unwrap_err(), GameError::AlreadyGuessed("一二五六".into()));
    assert_eq!(s.guesses().len(), 1);
    assert_eq!(s.cursor(), (1, 4));
  }

  #[test]
  fn five_wrong_guesses_lose_on_the_fifth() {
    let mut s = session();
    let words = ["一二五六", "七八九十", "一心二意", "五六七八", "九十一二"];
    for (i, w) in words.iter().enumerate() {
      let sub = s.submit_word(w, None).unwrap();
      assert_eq!(sub.row, i);
      if i < 4 {
        assert_eq!(s.phase(), Phase::InProgress, "lost early after {}", i + 1);
        assert!(sub.outcome.is_none());
      } else {
        assert_eq!(s.phase(), Phase::Lost);
        assert_eq!(sub.outcome.unwrap().won, false);
        assert_eq!(sub.outcome.unwrap().attempts, 5);
      }
    }
    assert_eq!(s.type_char('一').unwrap_err(), GameError::GameAlreadyOver);
    assert_eq!(s.delete_char().unwrap_err(), GameError::GameAlreadyOver);
    assert_eq!(s.submit_word("测三划四", None).unwrap_err(), GameError::GameAlreadyOver);
  }

  #[test]
  fn correct_guess_wins() {
    let mut s = session();
    s.submit_word("一二五六", None).unwrap();
    let sub = s.submit_word("测三划四", None).unwrap();
    assert_eq!(sub.verdict, [Status::Correct; 4]);
    assert_eq!(s.phase(), Phase::Won);
    assert_eq!(
      sub.outcome,
      Some(GameOutcome { won: true, attempts: 2, last_tally: (4, 0, 0) })
    );
    assert_eq!(s.cursor(), (1, 0));
  }

  #[test]
  fn key_status_never_downgrades() {
    let mut s = session();
    // '三' correct at position 1
    s.submit_word("一三五六", None).unwrap();
    assert_eq!(s.key_status()[&'三'], Status::Correct);
    // '三' again, now the duplicate is absent
    s.submit_word("三三七八", None).unwrap();
    assert_eq!(s.key_status()[&'三'], Status::Correct);
    // '四' present first, then absent in a guess that already uses it exactly
    s.submit_word("四九十一", None).unwrap();
    assert_eq!(s.key_status()[&'四'], Status::Present);
    s.submit_word("五六四四", None).unwrap();
    assert_eq!(s.key_status()[&'四'], Status::Correct);
    assert_eq!(s.key_status()[&'一'], Status::Absent);
  }

  #[test]
  fn snapshot_round_trips_through_restore() {
    let mut s = session();
    s.submit_word("一三五六", None).unwrap();
    s.submit_word("测三划四", None).unwrap();
    let snap = s.snapshot();
    assert_eq!(snap.date, "2026-03-04");
    assert!(snap.game_over);
    assert_eq!(snap.current_row, 1);
    assert_eq!(snap.keyboard_state["三"], Status::Correct);

    let restored = GameSession::restore(s.puzzle().clone(), DEFAULT_ROWS, &snap);
    assert_eq!(restored.phase(), Phase::Won);
    assert_eq!(restored.guesses(), s.guesses());
    assert_eq!(restored.key_status(), s.key_status());
    assert_eq!(restored.cursor(), s.cursor());
  }

  #[test]
  fn stale_snapshot_starts_fresh() {
    let snap = SessionSnapshot {
      date: "2026-03-03".into(),
      guessed_idioms: vec!["一二五六".into()],
      current_row: 1,
      ..Default::default()
    };
    let s = GameSession::restore(puzzle("测三划四", "测三划四一二五六"), DEFAULT_ROWS, &snap);
    assert!(s.guesses().is_empty());
    assert_eq!(s.cursor(), (0, 0));
  }

  #[test]
  fn snapshot_json_uses_client_field_names() {
    let mut s = session();
    s.submit_word("一三五六", None).unwrap();
    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["guessedIdioms"][0], "一三五六");
    assert_eq!(json["currentRow"], 1);
    assert_eq!(json["gameOver"], false);
    assert_eq!(json["keyboardState"]["三"], "correct");
  }

  #[test]
  fn board_replays_verdicts() {
    let mut s = session();
    s.submit_word("四三五测", None).unwrap();
    let board = s.board();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].1, [Status::Present, Status::Correct, Status::Absent, Status::Present]);
  }
}
