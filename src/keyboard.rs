//! Daily keyboard composition.
//!
//! The keyboard always carries the target's own characters, then fills up
//! from candidate idioms ranked by how many distinct characters they share
//! with the target (3, 2, 1, then 0). Each bucket is shuffled with the
//! day's seed before drawing, and the higher buckets are capped so the
//! board is not swamped by near-copies of the answer. The final layout is
//! shuffled again with an offset seed.

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::{to_chars, IDIOM_LEN};
use crate::rng::shuffle;

/// Tunable composition policy.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KeyboardPolicy {
  /// Number of keys; never below the idiom length.
  pub size: usize,
  /// Max idioms drawn from the 3-, 2- and 1-shared buckets. The 0-shared
  /// bucket is unlimited.
  pub bucket_caps: [usize; 3],
  /// Added to the day's seed for the final layout shuffle.
  pub layout_seed_offset: i64,
}

impl Default for KeyboardPolicy {
  fn default() -> Self {
    Self { size: 24, bucket_caps: [2, 3, 4], layout_seed_offset: 999 }
  }
}

/// Insertion-ordered character set.
#[derive(Default)]
struct CharSet {
  order: Vec<char>,
  seen: HashSet<char>,
}

impl CharSet {
  fn extend_from(&mut self, word: &str) -> bool {
    let before = self.order.len();
    for ch in word.chars() {
      if self.seen.insert(ch) {
        self.order.push(ch);
      }
    }
    self.order.len() > before
  }

  fn len(&self) -> usize {
    self.order.len()
  }
}

/// Distinct characters shared with the target, folded into bucket 0..=3
/// (0 = three or more shared, 3 = nothing shared).
fn bucket_for(target: &HashSet<char>, word: &str) -> usize {
  let mine: HashSet<char> = word.chars().collect();
  let shared = mine.intersection(target).count();
  match shared {
    0 => 3,
    1 => 2,
    2 => 1,
    _ => 0,
  }
}

/// Keys for the day, in on-screen order.
///
/// `candidates` is the mode's canonical idiom ordering; `seed` is the day
/// seed. If the whole pool has fewer distinct characters than
/// `policy.size`, the smaller set is returned.
pub fn compose(target: &str, candidates: &[String], seed: i64, policy: &KeyboardPolicy) -> Vec<char> {
  let size = policy.size.max(IDIOM_LEN);
  let mut keys = CharSet::default();
  keys.extend_from(target);

  let target_set: HashSet<char> = target.chars().collect();
  let mut buckets: [Vec<String>; 4] = Default::default();
  for word in candidates {
    if word == target || to_chars(word).is_none() {
      continue;
    }
    buckets[bucket_for(&target_set, word)].push(word.clone());
  }

  let caps = [
    Some(policy.bucket_caps[0]),
    Some(policy.bucket_caps[1]),
    Some(policy.bucket_caps[2]),
    None,
  ];
  for (bucket, cap) in buckets.iter().zip(caps) {
    if keys.len() >= size {
      break;
    }
    let mut drawn = 0usize;
    for word in shuffle(bucket, seed) {
      if keys.len() >= size || cap.is_some_and(|c| drawn >= c) {
        break;
      }
      // only idioms that contribute a new key count against the cap
      if keys.extend_from(&word) {
        drawn += 1;
      }
    }
  }

  let mut chars = keys.order;
  chars.truncate(size);
  shuffle(&chars, seed + policy.layout_seed_offset)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pool::{IdiomPool, DEFAULT_POOL_SEED};
  use crate::domain::Difficulty;

  fn words(ws: &[&str]) -> Vec<String> {
    ws.iter().map(|w| w.to_string()).collect()
  }

  fn moon_candidates() -> Vec<String> {
    words(&["月落乌啼", "花前月下", "镜花水月", "风花雪月", "一心一意", "三心二意", "花好月圆", "日新月异"])
  }

  #[test]
  fn pinned_small_keyboard() {
    let policy = KeyboardPolicy { size: 12, ..Default::default() };
    let keys: String = compose("花好月圆", &moon_candidates(), 5, &policy).into_iter().collect();
    assert_eq!(keys, "圆好风水下雪月落花乌镜前");
  }

  #[test]
  fn zero_caps_skip_to_unrelated_idioms() {
    let policy = KeyboardPolicy { size: 12, bucket_caps: [0, 0, 0], ..Default::default() };
    let keys = compose("花好月圆", &moon_candidates(), 5, &policy);
    let set: HashSet<char> = keys.iter().copied().collect();
    // only the target and the two idioms sharing nothing can contribute
    let allowed: HashSet<char> = "花好月圆一心意三二".chars().collect();
    assert!(set.is_subset(&allowed), "{keys:?}");
    assert_eq!(keys.len(), 9);
  }

  #[test]
  fn small_pool_yields_smaller_keyboard() {
    let policy = KeyboardPolicy::default();
    let keys = compose("花好月圆", &moon_candidates(), 5, &policy);
    // 4 target keys + 前下镜水风雪落乌啼一心意三二日新异
    assert_eq!(keys.len(), 21);
  }

  #[test]
  fn layout_offset_changes_order_only() {
    let a = compose("花好月圆", &moon_candidates(), 5, &KeyboardPolicy { size: 12, ..Default::default() });
    let b = compose(
      "花好月圆",
      &moon_candidates(),
      5,
      &KeyboardPolicy { size: 12, layout_seed_offset: 0, ..Default::default() },
    );
    assert_ne!(a, b);
    let (mut sa, mut sb) = (a.clone(), b.clone());
    sa.sort_unstable();
    sb.sort_unstable();
    assert_eq!(sa, sb);
  }

  #[test]
  fn full_pool_keyboards_hold_target_and_fit() {
    let pool = IdiomPool::seeded(DEFAULT_POOL_SEED);
    let policy = KeyboardPolicy::default();
    let ordering = pool.ordering(Difficulty::Full);
    for seed in 0..60 {
      let target = &ordering[seed as usize % ordering.len()];
      let keys = compose(target, ordering, seed, &policy);
      assert_eq!(keys.len(), 24, "seed {seed}");
      let unique: HashSet<char> = keys.iter().copied().collect();
      assert_eq!(unique.len(), keys.len());
      for ch in target.chars() {
        assert!(unique.contains(&ch), "seed {seed}: {ch} missing from {keys:?}");
      }
      assert_eq!(keys, compose(target, ordering, seed, &policy));
    }
  }

  #[test]
  fn repeated_target_characters_dedupe() {
    let keys = compose("一心一意", &[], 3, &KeyboardPolicy::default());
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    let mut expected = vec!['一', '心', '意'];
    expected.sort_unstable();
    assert_eq!(sorted, expected);
  }

  #[test]
  fn near_anagrams_count_as_closest() {
    let target: HashSet<char> = "花好月圆".chars().collect();
    assert_eq!(bucket_for(&target, "圆月好花"), 0);
    assert_eq!(bucket_for(&target, "花好月明"), 0);
    assert_eq!(bucket_for(&target, "花前月下"), 1);
    assert_eq!(bucket_for(&target, "月落乌啼"), 2);
    assert_eq!(bucket_for(&target, "一心一意"), 3);
  }

  #[test]
  fn size_never_drops_below_idiom_length() {
    let keys = compose("花好月圆", &moon_candidates(), 5, &KeyboardPolicy { size: 1, ..Default::default() });
    assert_eq!(keys.len(), 4);
  }
}
