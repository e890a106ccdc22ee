//! Player statistics and achievements, updated once per finished game.

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_ROWS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Achievement {
  pub id: &'static str,
  pub name: &'static str,
  pub desc: &'static str,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
  Achievement { id: "firstTry", name: "一击即中", desc: "第一次就猜对" },
  Achievement { id: "fifthTry", name: "险中求胜", desc: "第5次才猜对" },
  Achievement { id: "streak3", name: "连对3天", desc: "连续猜对3天" },
  Achievement { id: "streak7", name: "连对7天", desc: "连续猜对7天" },
  Achievement { id: "streak30", name: "连对30天", desc: "连续猜对30天" },
];

pub fn achievement(id: &str) -> Option<&'static Achievement> {
  ACHIEVEMENTS.iter().find(|a| a.id == id)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
  pub total_games: u32,
  pub games_won: u32,
  pub current_streak: u32,
  pub max_streak: u32,
  pub guess_distribution: Vec<u32>,
  pub achievements: Vec<String>,
}

impl Default for Stats {
  fn default() -> Self {
    Self {
      total_games: 0,
      games_won: 0,
      current_streak: 0,
      max_streak: 0,
      guess_distribution: vec![0; DEFAULT_ROWS],
      achievements: Vec::new(),
    }
  }
}

impl Stats {
  /// Repair aggregates whose distribution does not have one slot per board
  /// row; such a distribution is reset.
  pub fn normalize(&mut self, rows: usize) {
    if self.guess_distribution.len() != rows {
      self.guess_distribution = vec![0; rows];
    }
  }

  /// Fold in one finished game on a board of `rows` rows and return the
  /// achievements it unlocked.
  pub fn record(&mut self, won: bool, attempts: usize, rows: usize) -> Vec<&'static Achievement> {
    self.normalize(rows);
    self.total_games += 1;
    if won {
      self.games_won += 1;
      self.current_streak += 1;
      self.max_streak = self.max_streak.max(self.current_streak);
      if (1..=rows).contains(&attempts) {
        self.guess_distribution[attempts - 1] += 1;
      }
    } else {
      self.current_streak = 0;
    }
    self.unlock(won, attempts)
  }

  fn unlock(&mut self, won: bool, attempts: usize) -> Vec<&'static Achievement> {
    let earned = |id: &str| match id {
      "firstTry" => won && attempts == 1,
      "fifthTry" => won && attempts == 5,
      "streak3" => self.current_streak >= 3,
      "streak7" => self.current_streak >= 7,
      "streak30" => self.current_streak >= 30,
      _ => false,
    };
    let fresh: Vec<&'static Achievement> = ACHIEVEMENTS
      .iter()
      .filter(|a| earned(a.id) && !self.achievements.iter().any(|have| have == a.id))
      .collect();
    self.achievements.extend(fresh.iter().map(|a| a.id.to_string()));
    fresh
  }

  /// Percentage of games won, rounded.
  pub fn win_rate(&self) -> u32 {
    if self.total_games == 0 {
      return 0;
    }
    ((self.games_won as f64 / self.total_games as f64) * 100.0).round() as u32
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(list: &[&Achievement]) -> Vec<&'static str> {
    list.iter().map(|a| a.id).collect()
  }

  #[test]
  fn win_updates_streak_and_distribution() {
    let mut s = Stats::default();
    s.record(true, 3, DEFAULT_ROWS);
    assert_eq!(s.total_games, 1);
    assert_eq!(s.games_won, 1);
    assert_eq!(s.current_streak, 1);
    assert_eq!(s.max_streak, 1);
    assert_eq!(s.guess_distribution, vec![0, 0, 1, 0, 0]);
  }

  #[test]
  fn loss_resets_streak_but_keeps_max() {
    let mut s = Stats::default();
    s.record(true, 2, DEFAULT_ROWS);
    s.record(true, 2, DEFAULT_ROWS);
    s.record(false, 5, DEFAULT_ROWS);
    assert_eq!(s.current_streak, 0);
    assert_eq!(s.max_streak, 2);
    assert_eq!(s.total_games, 3);
    assert_eq!(s.guess_distribution, vec![0, 2, 0, 0, 0]);
  }

  #[test]
  fn first_and_fifth_try_unlock_once() {
    let mut s = Stats::default();
    assert_eq!(ids(&s.record(true, 1, DEFAULT_ROWS)), vec!["firstTry"]);
    assert!(s.record(true, 1, DEFAULT_ROWS).is_empty());
    let mut s = Stats::default();
    assert_eq!(ids(&s.record(true, 5, DEFAULT_ROWS)), vec!["fifthTry"]);
    assert!(s.record(true, 5, DEFAULT_ROWS).is_empty());
  }

  #[test]
  fn streak_achievements() {
    let mut s = Stats::default();
    s.record(true, 2, DEFAULT_ROWS);
    s.record(true, 2, DEFAULT_ROWS);
    assert_eq!(ids(&s.record(true, 2, DEFAULT_ROWS)), vec!["streak3"]);
    for _ in 0..3 {
      assert!(s.record(true, 2, DEFAULT_ROWS).is_empty());
    }
    assert_eq!(ids(&s.record(true, 2, DEFAULT_ROWS)), vec!["streak7"]);
    assert_eq!(s.achievements, vec!["streak3", "streak7"]);
  }

  #[test]
  fn losing_unlocks_nothing() {
    let mut s = Stats::default();
    assert!(s.record(false, 0, DEFAULT_ROWS).is_empty());
  }

  #[test]
  fn normalize_repairs_distribution() {
    let mut s: Stats = serde_json::from_str(r#"{"totalGames":4,"guessDistribution":[1,2]}"#).unwrap();
    assert_eq!(s.total_games, 4);
    s.normalize(DEFAULT_ROWS);
    assert_eq!(s.guess_distribution, vec![0; 5]);
  }

  #[test]
  fn distribution_follows_board_height() {
    let mut s = Stats::default();
    s.record(true, 6, 6);
    assert_eq!(s.guess_distribution, vec![0, 0, 0, 0, 0, 1]);
    s.record(true, 2, 6);
    assert_eq!(s.guess_distribution, vec![0, 1, 0, 0, 0, 1]);
  }

  #[test]
  fn win_rate_rounds() {
    let mut s = Stats::default();
    assert_eq!(s.win_rate(), 0);
    s.record(true, 1, DEFAULT_ROWS);
    s.record(true, 1, DEFAULT_ROWS);
    s.record(false, 0, DEFAULT_ROWS);
    assert_eq!(s.win_rate(), 67);
  }

  #[test]
  fn achievement_lookup() {
    assert_eq!(achievement("streak30").map(|a| a.name), Some("连对30天"));
    assert!(achievement("nope").is_none());
  }
}
