//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{display_date, format_date};
use crate::domain::{DailyPuzzle, Difficulty, Idiom, Status, IDIOM_LEN};
use crate::hint::Hint;
use crate::session::{GameSession, Phase, Submission};
use crate::stats::{achievement, Achievement, Stats};
use crate::store::{PlayerRecord, Settings};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Open (or resume) today's session. Without a player id a new one is issued.
    Hello {
        #[serde(default)]
        player: Option<String>,
    },
    TypeChar {
        ch: char,
    },
    DeleteChar,
    Submit,
    Hint,
    Stats,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Puzzle {
        player: String,
        puzzle: PuzzleOut,
        board: BoardOut,
    },
    Board {
        board: BoardOut,
    },
    Verdict {
        guess: GuessOut,
    },
    GameOver {
        outcome: OutcomeOut,
    },
    Hint {
        hint: HintOut,
    },
    Stats {
        stats: StatsOut,
    },
    Error {
        code: String,
        message: String,
    },
}

/// The day's puzzle as the client sees it. The target stays hidden.
#[derive(Debug, Serialize)]
pub struct PuzzleOut {
    pub date: String,
    pub display_date: String,
    pub day_index: i64,
    pub mode: Difficulty,
    pub rows: usize,
    pub keyboard: Vec<char>,
}

impl PuzzleOut {
    pub fn new(p: &DailyPuzzle, rows: usize) -> Self {
        Self {
            date: format_date(p.date),
            display_date: display_date(p.date),
            day_index: p.day_index,
            mode: p.mode,
            rows,
            keyboard: p.keyboard.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RowOut {
    pub word: String,
    pub verdict: [Status; IDIOM_LEN],
}

#[derive(Debug, Serialize)]
pub struct BoardOut {
    pub phase: Phase,
    pub rows: Vec<RowOut>,
    pub current_row: usize,
    pub current_col: usize,
    pub input: String,
    pub key_status: BTreeMap<char, Status>,
    /// Revealed once the game is over.
    pub answer: Option<AnswerOut>,
}

impl BoardOut {
    pub fn new(s: &GameSession) -> Self {
        let (current_row, current_col) = s.cursor();
        Self {
            phase: s.phase(),
            rows: s
                .board()
                .into_iter()
                .map(|(word, verdict)| RowOut { word, verdict })
                .collect(),
            current_row,
            current_col,
            input: s.current_input().iter().collect(),
            key_status: s.key_status().clone(),
            answer: s.is_over().then(|| AnswerOut::new(&s.puzzle().target)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub word: String,
    pub pinyin: String,
    pub derivation: Option<String>,
}

impl AnswerOut {
    pub fn new(idiom: &Idiom) -> Self {
        Self {
            word: idiom.word.clone(),
            pinyin: idiom.meta.pinyin.clone(),
            derivation: idiom.meta.derivation_text().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementOut {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
}

impl From<&Achievement> for AchievementOut {
    fn from(a: &Achievement) -> Self {
        Self { id: a.id, name: a.name, desc: a.desc }
    }
}

#[derive(Debug, Serialize)]
pub struct OutcomeOut {
    pub won: bool,
    pub attempts: usize,
    pub correct: usize,
    pub present: usize,
    pub absent: usize,
    pub answer: AnswerOut,
    pub unlocked: Vec<AchievementOut>,
}

#[derive(Debug, Serialize)]
pub struct GuessOut {
    pub guess: String,
    pub row: usize,
    pub verdict: [Status; IDIOM_LEN],
    pub key_status: BTreeMap<char, Status>,
    pub game_over: bool,
}

impl From<&Submission> for GuessOut {
    fn from(s: &Submission) -> Self {
        Self {
            guess: s.guess.clone(),
            row: s.row,
            verdict: s.verdict,
            key_status: s.key_status.clone(),
            game_over: s.outcome.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub text: String,
    pub hint: Hint,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
    #[serde(flatten)]
    pub stats: Stats,
    pub win_rate: u32,
    pub unlocked: Vec<AchievementOut>,
}

impl StatsOut {
    pub fn new(stats: &Stats) -> Self {
        Self {
            stats: stats.clone(),
            win_rate: stats.win_rate(),
            unlocked: stats
                .achievements
                .iter()
                .filter_map(|id| achievement(id))
                .map(AchievementOut::from)
                .collect(),
        }
    }
}

// ---- HTTP bodies ----

#[derive(Debug, Deserialize)]
pub struct PuzzleQuery {
    pub player: Option<String>,
    pub date: Option<String>,
    pub mode: Option<Difficulty>,
}

#[derive(Debug, Serialize)]
pub struct PuzzleView {
    pub puzzle: PuzzleOut,
    /// Only for the player's session of today.
    pub board: Option<BoardOut>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub player: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerOut {
    pub player: String,
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct GuessIn {
    pub player: String,
    pub guess: String,
}

#[derive(Debug, Serialize)]
pub struct GuessResultOut {
    #[serde(flatten)]
    pub guess: GuessOut,
    pub board: BoardOut,
    pub outcome: Option<OutcomeOut>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsIn {
    pub player: String,
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct SyncIn {
    pub player: String,
    pub record: PlayerRecord,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub idioms: usize,
    pub today: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}
