//! Domain models: idioms and their metadata, difficulty modes, per-character
//! verdicts, and the derived daily puzzle.

use serde::{Deserialize, Serialize};
use time::Date;

/// Every idiom is exactly this many characters; the board has this many columns.
pub const IDIOM_LEN: usize = 4;

/// Per-idiom metadata. Absent metadata defaults to empty/false.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomMetadata {
  #[serde(default)] pub pinyin: String,
  #[serde(default)] pub derivation: String,
  #[serde(default)] pub is_common: bool,
  #[serde(default)] pub is_simple: bool,
}

impl IdiomMetadata {
  /// The source data uses "无" for "no recorded derivation".
  pub fn derivation_text(&self) -> Option<&str> {
    let d = self.derivation.trim();
    if d.is_empty() || d == "无" { None } else { Some(d) }
  }
}

/// A validated four-character idiom with its metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idiom {
  pub word: String,
  #[serde(flatten)]
  pub meta: IdiomMetadata,
}

impl Idiom {
  /// Rejects anything that is not exactly four characters.
  pub fn new(word: &str, meta: IdiomMetadata) -> Option<Self> {
    let word = word.trim();
    if word.chars().count() != IDIOM_LEN {
      return None;
    }
    Some(Self { word: word.to_string(), meta })
  }

  pub fn chars(&self) -> [char; IDIOM_LEN] {
    to_chars(&self.word).unwrap_or(['\0'; IDIOM_LEN])
  }
}

/// Split a four-character string into its characters.
pub fn to_chars(word: &str) -> Option<[char; IDIOM_LEN]> {
  let mut out = ['\0'; IDIOM_LEN];
  let mut it = word.chars();
  for slot in out.iter_mut() {
    *slot = it.next()?;
  }
  if it.next().is_some() { None } else { Some(out) }
}

/// Which pool the day's target is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  /// Only idioms flagged simple.
  #[default]
  Simple,
  /// The whole corpus.
  Full,
}

impl Difficulty {
  pub fn from_common_only(common_only: bool) -> Self {
    if common_only { Difficulty::Simple } else { Difficulty::Full }
  }

  /// Key of the persisted session branch for this mode.
  pub fn branch_key(self) -> &'static str {
    match self {
      Difficulty::Simple => "common",
      Difficulty::Full => "all",
    }
  }
}

/// Verdict for one guessed character (or the aggregate for a keyboard key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Correct,
  Present,
  Absent,
}

impl Status {
  fn rank(self) -> u8 {
    match self {
      Status::Absent => 0,
      Status::Present => 1,
      Status::Correct => 2,
    }
  }

  /// Keyboard aggregation: a key only ever moves absent -> present -> correct.
  pub fn strengthen(existing: Option<Status>, incoming: Status) -> Status {
    match existing {
      Some(cur) if cur.rank() >= incoming.rank() => cur,
      _ => incoming,
    }
  }
}

/// One day's puzzle under one difficulty. Never mutated after derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyPuzzle {
  pub date: Date,
  pub day_index: i64,
  /// Seed for everything derived from this day.
  pub seed: i64,
  pub mode: Difficulty,
  pub target: Idiom,
  pub keyboard: Vec<char>,
}

impl DailyPuzzle {
  pub fn on_keyboard(&self, ch: char) -> bool {
    self.keyboard.contains(&ch)
  }
}
