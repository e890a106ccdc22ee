//! Error taxonomy for puzzle derivation and play, plus the loader error.

use thiserror::Error;

/// Everything a player action or puzzle derivation can fail with.
/// None of these mutate session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
  /// Fatal to puzzle start: there is nothing to pick a target from.
  #[error("idiom pool is empty")]
  PoolEmpty,
  #[error("guess needs four characters")]
  IncompleteGuess,
  #[error("character '{0}' is not on today's keyboard")]
  CharacterNotOnKeyboard(char),
  #[error("'{0}' is not a known idiom")]
  NotAValidIdiom(String),
  #[error("'{0}' was already guessed")]
  AlreadyGuessed(String),
  #[error("today's game is already over")]
  GameAlreadyOver,
}

impl GameError {
  /// Stable wire code.
  pub fn code(&self) -> &'static str {
    match self {
      GameError::PoolEmpty => "pool_empty",
      GameError::IncompleteGuess => "incomplete_guess",
      GameError::CharacterNotOnKeyboard(_) => "character_not_on_keyboard",
      GameError::NotAValidIdiom(_) => "not_a_valid_idiom",
      GameError::AlreadyGuessed(_) => "already_guessed",
      GameError::GameAlreadyOver => "game_already_over",
    }
  }

  /// Short message shown to the player.
  pub fn player_message(&self) -> &'static str {
    match self {
      GameError::PoolEmpty => "成语列表未加载，请稍候重试",
      GameError::IncompleteGuess => "请输入四个字",
      GameError::CharacterNotOnKeyboard(_) => "只能使用键盘上的字",
      GameError::NotAValidIdiom(_) => "不是有效的成语",
      GameError::AlreadyGuessed(_) => "已经猜过这个成语了",
      GameError::GameAlreadyOver => "本局已结束",
    }
  }

  /// Everything except an empty pool leaves the game playable.
  pub fn is_recoverable(&self) -> bool {
    !matches!(self, GameError::PoolEmpty)
  }
}

/// Failure to read the idiom source. Malformed individual records are
/// skipped, not reported here.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read idiom source {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("idiom source {path} contained no valid four-character idioms")]
  NoIdioms { path: String },
}

/// Failures of a player request: a game rule, or a request that never
/// reaches the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
  #[error(transparent)]
  Game(#[from] GameError),
  #[error("malformed player id '{0}'")]
  InvalidPlayer(String),
  #[error("malformed date '{0}', expected YYYY-MM-DD")]
  InvalidDate(String),
  #[error("no session open; send hello first")]
  NoSession,
}

impl ServiceError {
  pub fn code(&self) -> &'static str {
    match self {
      ServiceError::Game(e) => e.code(),
      ServiceError::InvalidPlayer(_) => "invalid_player",
      ServiceError::InvalidDate(_) => "invalid_date",
      ServiceError::NoSession => "no_session",
    }
  }

  pub fn message(&self) -> String {
    match self {
      ServiceError::Game(e) => e.player_message().to_string(),
      other => other.to_string(),
    }
  }
}
