//! One deterministic hint per day.

use serde::{Deserialize, Serialize};

use crate::domain::IDIOM_LEN;
use crate::rng::seeded_index;
use crate::util::fill_template;

const KIND_SEED_OFFSET: i64 = 100;
const REVEAL_SEED_OFFSET: i64 = 101;
const EXCLUDE_SEED_OFFSET: i64 = 102;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Hint {
  /// 1-based position and the character there.
  Reveal { position: usize, ch: char },
  /// The answer repeats some character.
  Duplicate,
  /// A keyboard character that is not in the answer.
  Exclude { ch: char },
}

/// Text templates, overridable from the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HintTemplates {
  pub reveal: String,
  pub duplicate: String,
  pub exclude: String,
}

impl Default for HintTemplates {
  fn default() -> Self {
    Self {
      reveal: "第 {pos} 个字是「{char}」".into(),
      duplicate: "答案中有重复字".into(),
      exclude: "答案中不含「{char}」".into(),
    }
  }
}

impl Hint {
  pub fn render(&self, t: &HintTemplates) -> String {
    match *self {
      Hint::Reveal { position, ch } => {
        fill_template(&t.reveal, &[("pos", &position.to_string()), ("char", &ch.to_string())])
      }
      Hint::Duplicate => t.duplicate.clone(),
      Hint::Exclude { ch } => fill_template(&t.exclude, &[("char", &ch.to_string())]),
    }
  }
}

fn has_repeat(target: &[char; IDIOM_LEN]) -> bool {
  (0..IDIOM_LEN).any(|i| target[i + 1..].contains(&target[i]))
}

fn reveal(seed: i64, target: &[char; IDIOM_LEN]) -> Hint {
  let idx = seeded_index(seed + REVEAL_SEED_OFFSET, IDIOM_LEN);
  Hint::Reveal { position: idx + 1, ch: target[idx] }
}

/// The kind is drawn from {reveal, exclude} plus {duplicate} when the
/// target repeats a character. Exclusion candidates are sorted first so the
/// pick does not depend on keyboard order; with no candidates it falls back
/// to a reveal.
pub fn hint_for(seed: i64, target: &[char; IDIOM_LEN], keyboard: &[char]) -> Hint {
  let kinds = if has_repeat(target) { 3 } else { 2 };
  match seeded_index(seed + KIND_SEED_OFFSET, kinds) {
    0 => reveal(seed, target),
    2 => Hint::Duplicate,
    _ => {
      let mut absent: Vec<char> = keyboard.iter().copied().filter(|c| !target.contains(c)).collect();
      if absent.is_empty() {
        return reveal(seed, target);
      }
      absent.sort_unstable();
      absent.dedup();
      let ch = absent[seeded_index(seed + EXCLUDE_SEED_OFFSET, absent.len())];
      Hint::Exclude { ch }
    }
  }
}
