//! Date-seeded randomness shared by every client.
//!
//! The generator is a pure function of its seed (no internal cursor). `sin`
//! comes from `libm` rather than the platform math library, so the same seed
//! gives the same bits on every target. Everything that must look identical for all players
//! (pool ordering, keyboard draw, keyboard layout, hint choice) goes through
//! here.

/// `fract(sin(seed) * 10000)`, always in `[0, 1)`.
pub fn seeded_random(seed: i64) -> f64 {
  let x = libm::sin(seed as f64) * 10000.0;
  x - x.floor()
}

/// Uniform index in `0..len` for the given seed. `len` must be non-zero.
pub fn seeded_index(seed: i64, len: usize) -> usize {
  let idx = (seeded_random(seed) * len as f64).floor() as usize;
  // fract() can round up to exactly 1.0 for huge magnitudes
  idx.min(len - 1)
}

/// Fisher-Yates from the last index down to 1, swapping index `i` with
/// `seeded_index(seed + i, i + 1)`. The input is left untouched.
pub fn shuffle<T: Clone>(items: &[T], seed: i64) -> Vec<T> {
  let mut out = items.to_vec();
  for i in (1..out.len()).rev() {
    let j = seeded_index(seed + i as i64, i + 1);
    out.swap(i, j);
  }
  out
}
