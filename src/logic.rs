//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Opening (or restoring) a player's session for today
//!   - Submitting guesses and persisting progress, stats and achievements
//!   - The daily hint
//!   - Settings updates and record sync
//!
//! Every load-modify-save of a player record runs under that player's store lock.

use tracing::{debug, info, instrument, warn};

use crate::calendar::{format_date, parse_date};
use crate::domain::Difficulty;
use crate::error::ServiceError;
use crate::pool::IdiomPool;
use crate::protocol::{
  AchievementOut, AnswerOut, BoardOut, GuessOut, GuessResultOut, HintOut, OutcomeOut, PlayerOut, PuzzleOut,
  PuzzleView, StatsOut,
};
use crate::puzzle::daily_hint;
use crate::session::{GameOutcome, GameSession, Submission};
use crate::state::AppState;
use crate::stats::Achievement;
use crate::store::{new_player_id, valid_player_id, PlayerRecord, Settings};

/// A player's live session plus the settings it was opened with.
#[derive(Debug)]
pub struct OpenSession {
  pub player: String,
  pub settings: Settings,
  pub session: GameSession,
}

impl OpenSession {
  /// Dictionary used for guess validation, if the player enabled it.
  pub fn dictionary<'a>(&self, state: &'a AppState) -> Option<&'a IdiomPool> {
    self.settings.validate_idiom.then(|| state.pool.as_ref())
  }
}

pub fn check_player(player: &str) -> Result<(), ServiceError> {
  if valid_player_id(player) { Ok(()) } else { Err(ServiceError::InvalidPlayer(player.to_string())) }
}

/// Stored record, or a fresh one carrying the configured default settings.
/// Stats are sized to the configured board height.
async fn load_or_default(state: &AppState, player: &str) -> PlayerRecord {
  let mut rec = match state.store.load(player).await {
    Some(rec) => rec,
    None => PlayerRecord::with_settings(state.config.defaults.clone()),
  };
  rec.stats.normalize(state.config.rows);
  rec
}

#[instrument(level = "info", skip(state))]
pub async fn register_player(state: &AppState) -> PlayerOut {
  let player = new_player_id();
  let mut rec = PlayerRecord::with_settings(state.config.defaults.clone());
  rec.touch();
  state.store.save(&player, &rec).await;
  info!(target: "idiom_wordle", %player, "Registered new player");
  PlayerOut { player, settings: rec.settings }
}

/// Today's session for `player` in the mode their settings select, restored
/// from the saved branch when it belongs to today.
#[instrument(level = "debug", skip(state))]
pub async fn open_session(state: &AppState, player: &str) -> Result<OpenSession, ServiceError> {
  check_player(player)?;
  let rec = load_or_default(state, player).await;
  let mode = rec.settings.difficulty();
  let puzzle = state.puzzle(state.today(), mode).await?;
  let rows = state.config.rows;
  let session = match rec.state.get(mode) {
    Some(snap) => GameSession::restore(puzzle.as_ref().clone(), rows, snap),
    None => GameSession::new(puzzle.as_ref().clone(), rows),
  };
  debug!(
    target: "puzzle",
    %player,
    mode = mode.branch_key(),
    restored_guesses = session.guesses().len(),
    over = session.is_over(),
    "Session opened"
  );
  Ok(OpenSession { player: player.to_string(), settings: rec.settings, session })
}

/// Replace `open` with today's session when its day has passed.
/// Returns true when a rollover happened.
pub async fn roll_over_if_stale(state: &AppState, open: &mut OpenSession) -> Result<bool, ServiceError> {
  let today = state.today();
  if open.session.puzzle().date == today {
    return Ok(false);
  }
  info!(target: "puzzle", player = %open.player, from = %open.session.puzzle().date, to = %today, "Day rolled over");
  let player = open.player.clone();
  *open = open_session(state, &player).await?;
  Ok(true)
}

/// Puzzle for a date (today by default); the board is attached only for a
/// player's session of today.
#[instrument(level = "info", skip(state))]
pub async fn puzzle_view(
  state: &AppState,
  player: Option<&str>,
  date: Option<&str>,
  mode: Option<Difficulty>,
) -> Result<PuzzleView, ServiceError> {
  let today = state.today();
  let date = match date {
    Some(raw) => parse_date(raw).ok_or_else(|| ServiceError::InvalidDate(raw.to_string()))?,
    None => today,
  };

  if let (Some(player), true) = (player, date == today) {
    let open = open_session(state, player).await?;
    return Ok(PuzzleView {
      puzzle: PuzzleOut::new(open.session.puzzle(), open.session.rows()),
      board: Some(BoardOut::new(&open.session)),
    });
  }

  let mode = match (player, mode) {
    (Some(p), _) => {
      check_player(p)?;
      load_or_default(state, p).await.settings.difficulty()
    }
    (None, Some(m)) => m,
    (None, None) => state.config.defaults.difficulty(),
  };
  let puzzle = state.puzzle(date, mode).await?;
  Ok(PuzzleView { puzzle: PuzzleOut::new(&puzzle, state.config.rows), board: None })
}

/// Write the session branch and, on a finished game, fold the outcome into
/// stats. A day already stored as finished is never counted twice. Caller
/// holds the player's store lock.
async fn save_progress(
  state: &AppState,
  player: &str,
  session: &GameSession,
  outcome: Option<&GameOutcome>,
) -> Vec<&'static Achievement> {
  let mut rec = load_or_default(state, player).await;
  let snapshot = session.snapshot();
  let mode = session.puzzle().mode;
  let already_counted = rec
    .state
    .get(mode)
    .is_some_and(|b| b.game_over && b.date == snapshot.date);
  let unlocked = match outcome {
    Some(o) if !already_counted => rec.stats.record(o.won, o.attempts, state.config.rows),
    Some(_) => {
      warn!(target: "puzzle", %player, date = %snapshot.date, "Day already finished in store; stats left alone");
      Vec::new()
    }
    None => Vec::new(),
  };
  rec.state.set(mode, snapshot);
  rec.touch();
  state.store.save(player, &rec).await;
  unlocked
}

fn outcome_out(session: &GameSession, outcome: &GameOutcome, unlocked: &[&'static Achievement]) -> OutcomeOut {
  let (correct, present, absent) = outcome.last_tally;
  OutcomeOut {
    won: outcome.won,
    attempts: outcome.attempts,
    correct,
    present,
    absent,
    answer: AnswerOut::new(&session.puzzle().target),
    unlocked: unlocked.iter().map(|a| AchievementOut::from(*a)).collect(),
  }
}

fn log_submission(player: &str, s: &Submission, unlocked: &[&'static Achievement]) {
  match &s.outcome {
    Some(o) => info!(
      target: "puzzle",
      %player,
      guess = %s.guess,
      won = o.won,
      attempts = o.attempts,
      unlocked = unlocked.len(),
      "Game finished"
    ),
    None => debug!(target: "puzzle", %player, guess = %s.guess, row = s.row, "Guess evaluated"),
  }
}

/// A guess applied to the stored session and persisted.
#[derive(Debug)]
pub struct CommittedGuess {
  /// The session as stored after this guess.
  pub open: OpenSession,
  pub submission: Submission,
  pub outcome: Option<OutcomeOut>,
}

/// Apply `word` to the player's stored session of today, under the player
/// lock: the session is rebuilt from the store, validated and persisted in
/// one step, so guesses from other connections are neither lost nor counted
/// twice.
#[instrument(level = "info", skip(state))]
pub async fn commit_guess(state: &AppState, player: &str, word: &str) -> Result<CommittedGuess, ServiceError> {
  check_player(player)?;
  let _guard = state.store.lock(player).await;
  let mut open = open_session(state, player).await?;
  let dictionary = open.dictionary(state);
  let submission = match open.session.submit_word(word.trim(), dictionary) {
    Ok(s) => s,
    Err(e) => {
      if e.is_recoverable() {
        debug!(target: "puzzle", %player, %word, code = e.code(), "Guess rejected");
      } else {
        warn!(target: "puzzle", %player, error = %e, "Guess failed");
      }
      return Err(e.into());
    }
  };
  let unlocked = save_progress(state, player, &open.session, submission.outcome.as_ref()).await;
  log_submission(player, &submission, &unlocked);
  let outcome = submission.outcome.as_ref().map(|o| outcome_out(&open.session, o, &unlocked));
  Ok(CommittedGuess { open, submission, outcome })
}

/// Whole-word submission (HTTP).
pub async fn submit_guess(state: &AppState, player: &str, guess: &str) -> Result<GuessResultOut, ServiceError> {
  let c = commit_guess(state, player, guess).await?;
  Ok(GuessResultOut {
    guess: GuessOut::from(&c.submission),
    board: BoardOut::new(&c.open.session),
    outcome: c.outcome,
  })
}

/// Today's hint. Not offered once the game is over.
pub fn hint_for_session(state: &AppState, session: &GameSession) -> Result<HintOut, ServiceError> {
  if session.is_over() {
    return Err(crate::error::GameError::GameAlreadyOver.into());
  }
  let hint = daily_hint(session.puzzle());
  Ok(HintOut { text: hint.render(&state.config.hints), hint })
}

#[instrument(level = "info", skip(state))]
pub async fn hint_for_player(state: &AppState, player: &str) -> Result<HintOut, ServiceError> {
  let open = open_session(state, player).await?;
  let out = hint_for_session(state, &open.session)?;
  info!(target: "puzzle", %player, date = %format_date(open.session.puzzle().date), "Hint served");
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn stats_for_player(state: &AppState, player: &str) -> Result<StatsOut, ServiceError> {
  check_player(player)?;
  Ok(StatsOut::new(&load_or_default(state, player).await.stats))
}

#[instrument(level = "info", skip(state, settings))]
pub async fn update_settings(state: &AppState, player: &str, settings: Settings) -> Result<PlayerOut, ServiceError> {
  check_player(player)?;
  let _guard = state.store.lock(player).await;
  let mut rec = load_or_default(state, player).await;
  if rec.settings.common_idiom_only != settings.common_idiom_only {
    info!(target: "puzzle", %player, mode = settings.difficulty().branch_key(), "Difficulty switched");
  }
  rec.settings = settings;
  rec.touch();
  state.store.save(player, &rec).await;
  Ok(PlayerOut { player: player.to_string(), settings: rec.settings })
}

/// Last write wins by `updated`; returns the record that won.
#[instrument(level = "info", skip(state, record), fields(updated = record.updated))]
pub async fn sync_record(state: &AppState, player: &str, record: PlayerRecord) -> Result<PlayerRecord, ServiceError> {
  check_player(player)?;
  let _guard = state.store.lock(player).await;
  let mut record = record;
  record.stats.normalize(state.config.rows);
  let incoming = record.updated;
  let winner = state.store.sync(player, record).await;
  if winner.updated != incoming {
    warn!(target: "idiom_wordle", %player, incoming, kept = winner.updated, "Sync rejected older record");
  }
  Ok(winner)
}
