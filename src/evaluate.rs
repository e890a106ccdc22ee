//! Guess evaluation: per-position correct / present / absent.

use crate::domain::{Status, IDIOM_LEN};

/// Two passes. Exact matches first, each consuming its target slot; then
/// every remaining guess character takes the leftmost unconsumed target
/// slot holding the same character, or is absent.
pub fn evaluate(guess: &[char; IDIOM_LEN], target: &[char; IDIOM_LEN]) -> [Status; IDIOM_LEN] {
  let mut verdict = [Status::Absent; IDIOM_LEN];
  let mut used = [false; IDIOM_LEN];

  for i in 0..IDIOM_LEN {
    if guess[i] == target[i] {
      verdict[i] = Status::Correct;
      used[i] = true;
    }
  }

  for i in 0..IDIOM_LEN {
    if verdict[i] == Status::Correct {
      continue;
    }
    if let Some(j) = (0..IDIOM_LEN).find(|&j| !used[j] && target[j] == guess[i]) {
      verdict[i] = Status::Present;
      used[j] = true;
    }
  }

  verdict
}

/// (correct, present, absent) tallies for one verdict.
pub fn tally(verdict: &[Status; IDIOM_LEN]) -> (usize, usize, usize) {
  verdict.iter().fold((0, 0, 0), |(c, p, a), s| match s {
    Status::Correct => (c + 1, p, a),
    Status::Present => (c, p + 1, a),
    Status::Absent => (c, p, a + 1),
  })
}
