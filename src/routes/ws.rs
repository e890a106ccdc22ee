//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. A connection owns one live session; the typed row
//! lives only here, submitted rows are persisted through the store.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::{GameError, ServiceError};
use crate::logic::*;
use crate::protocol::{BoardOut, ClientWsMessage, GuessOut, PuzzleOut, ServerWsMessage};
use crate::state::AppState;
use crate::store::new_player_id;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "idiom_wordle", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "idiom_wordle", "WebSocket connected");
  let mut open: Option<OpenSession> = None;
  'conn: while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize responses.
        let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "idiom_wordle", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut open).await
          }
          Err(e) => vec![ServerWsMessage::Error { code: "invalid_json".into(), message: format!("Invalid JSON: {}", e) }],
        };

        for reply in replies {
          let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "code": "internal", "message": format!("Serialization error: {}", e) }).to_string()
          });
          if let Err(e) = socket.send(Message::Text(out)).await {
            error!(target: "idiom_wordle", error = %e, "WS send error");
            break 'conn;
          }
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "idiom_wordle", player = ?open.as_ref().map(|o| &o.player), "WebSocket disconnected");
}

fn error_msg(e: &ServiceError) -> ServerWsMessage {
  ServerWsMessage::Error { code: e.code().to_string(), message: e.message() }
}

fn puzzle_msg(open: &OpenSession) -> ServerWsMessage {
  ServerWsMessage::Puzzle {
    player: open.player.clone(),
    puzzle: PuzzleOut::new(open.session.puzzle(), open.session.rows()),
    board: BoardOut::new(&open.session),
  }
}

/// Replies for one client message, in send order.
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, slot: &mut Option<OpenSession>) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::Hello { player } => {
      let player = player.unwrap_or_else(new_player_id);
      match open_session(state, &player).await {
        Ok(o) => {
          info!(target: "puzzle", %player, date = %o.session.puzzle().date, "WS session opened");
          let reply = puzzle_msg(&o);
          *slot = Some(o);
          vec![reply]
        }
        Err(e) => vec![error_msg(&e)],
      }
    }

    other => {
      let Some(open) = slot.as_mut() else {
        return vec![error_msg(&ServiceError::NoSession)];
      };
      let mut replies = Vec::new();
      match roll_over_if_stale(state, open).await {
        Ok(true) => replies.push(puzzle_msg(open)),
        Ok(false) => {}
        Err(e) => return vec![error_msg(&e)],
      }
      replies.extend(handle_session_msg(other, state, open).await);
      replies
    }
  }
}

async fn handle_session_msg(msg: ClientWsMessage, state: &AppState, open: &mut OpenSession) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::TypeChar { ch } => match open.session.type_char(ch) {
      Ok(()) => vec![ServerWsMessage::Board { board: BoardOut::new(&open.session) }],
      Err(e) => vec![error_msg(&e.into())],
    },

    ClientWsMessage::DeleteChar => match open.session.delete_char() {
      Ok(()) => vec![ServerWsMessage::Board { board: BoardOut::new(&open.session) }],
      Err(e) => vec![error_msg(&e.into())],
    },

    ClientWsMessage::Submit => {
      let word: String = open.session.current_input().iter().collect();
      match commit_guess(state, &open.player, &word).await {
        Ok(commit) => {
          *open = commit.open;
          let mut replies = vec![ServerWsMessage::Verdict { guess: GuessOut::from(&commit.submission) }];
          if let Some(outcome) = commit.outcome {
            replies.push(ServerWsMessage::GameOver { outcome });
          }
          replies
        }
        Err(e @ ServiceError::Game(GameError::GameAlreadyOver)) => {
          // Finished elsewhere; show the stored board.
          let mut replies = vec![error_msg(&e)];
          if let Ok(stored) = open_session(state, &open.player).await {
            *open = stored;
            replies.push(ServerWsMessage::Board { board: BoardOut::new(&open.session) });
          }
          replies
        }
        Err(e) => {
          debug!(target: "puzzle", player = %open.player, code = e.code(), "WS submit rejected");
          vec![error_msg(&e)]
        }
      }
    }

    ClientWsMessage::Hint => match hint_for_session(state, &open.session) {
      Ok(hint) => {
        info!(target: "puzzle", player = %open.player, "WS hint served");
        vec![ServerWsMessage::Hint { hint }]
      }
      Err(e) => vec![error_msg(&e)],
    },

    ClientWsMessage::Stats => match stats_for_player(state, &open.player).await {
      Ok(stats) => vec![ServerWsMessage::Stats { stats }],
      Err(e) => vec![error_msg(&e)],
    },

    ClientWsMessage::Ping | ClientWsMessage::Hello { .. } => Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::GameConfig;
  use crate::pool::IdiomPool;
  use crate::store::PlayerStore;

  fn state() -> AppState {
    let cfg = GameConfig::default();
    let pool = IdiomPool::seeded(cfg.pool_seed);
    AppState::from_parts(cfg, pool, PlayerStore::in_memory())
  }

  fn kind(m: &ServerWsMessage) -> String {
    serde_json::to_value(m).unwrap()["type"].as_str().unwrap().to_string()
  }

  #[tokio::test]
  async fn actions_before_hello_are_refused() {
    let s = state();
    let mut slot = None;
    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut slot).await;
    assert!(matches!(&out[..], [ServerWsMessage::Error { code, .. }] if code == "no_session"));
    let out = handle_client_ws(ClientWsMessage::Ping, &s, &mut slot).await;
    assert_eq!(kind(&out[0]), "pong");
  }

  #[tokio::test]
  async fn typing_and_winning_over_ws() {
    let s = state();
    let mut slot = None;
    let out = handle_client_ws(ClientWsMessage::Hello { player: None }, &s, &mut slot).await;
    assert_eq!(kind(&out[0]), "puzzle");
    let target = slot.as_ref().unwrap().session.puzzle().target.chars();

    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut slot).await;
    assert!(matches!(&out[..], [ServerWsMessage::Error { code, .. }] if code == "incomplete_guess"));

    for ch in target {
      handle_client_ws(ClientWsMessage::TypeChar { ch }, &s, &mut slot).await;
    }
    handle_client_ws(ClientWsMessage::DeleteChar, &s, &mut slot).await;
    let out = handle_client_ws(ClientWsMessage::TypeChar { ch: target[3] }, &s, &mut slot).await;
    match &out[..] {
      [ServerWsMessage::Board { board }] => assert_eq!(board.current_col, 4),
      other => panic!("unexpected {other:?}"),
    }

    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut slot).await;
    let kinds: Vec<String> = out.iter().map(kind).collect();
    assert_eq!(kinds, ["verdict", "game_over"]);

    let out = handle_client_ws(ClientWsMessage::Hint, &s, &mut slot).await;
    assert!(matches!(&out[..], [ServerWsMessage::Error { code, .. }] if code == "game_already_over"));

    let out = handle_client_ws(ClientWsMessage::Stats, &s, &mut slot).await;
    match &out[..] {
      [ServerWsMessage::Stats { stats }] => assert_eq!(stats.stats.games_won, 1),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn hello_resumes_saved_progress() {
    let s = state();
    let mut first = None;
    handle_client_ws(ClientWsMessage::Hello { player: None }, &s, &mut first).await;
    let player = first.as_ref().unwrap().player.clone();
    let p = first.as_ref().unwrap().session.puzzle().clone();
    let miss: Vec<char> = p.keyboard.iter().copied().filter(|c| !p.target.word.contains(*c)).take(4).collect();
    for ch in miss {
      handle_client_ws(ClientWsMessage::TypeChar { ch }, &s, &mut first).await;
    }
    handle_client_ws(ClientWsMessage::Submit, &s, &mut first).await;

    let mut second = None;
    handle_client_ws(ClientWsMessage::Hello { player: Some(player) }, &s, &mut second).await;
    assert_eq!(second.unwrap().session.cursor(), (1, 0));
  }

  async fn hello_as(s: &AppState, player: &str) -> Option<OpenSession> {
    let mut slot = None;
    handle_client_ws(ClientWsMessage::Hello { player: Some(player.to_string()) }, s, &mut slot).await;
    slot
  }

  async fn type_word(s: &AppState, slot: &mut Option<OpenSession>, word: &str) {
    for ch in word.chars() {
      handle_client_ws(ClientWsMessage::TypeChar { ch }, s, slot).await;
    }
  }

  #[tokio::test]
  async fn two_connections_finish_the_day_once() {
    let s = state();
    let player = new_player_id();
    let mut a = hello_as(&s, &player).await;
    let mut b = hello_as(&s, &player).await;
    let target = a.as_ref().unwrap().session.puzzle().target.word.clone();

    type_word(&s, &mut a, &target).await;
    type_word(&s, &mut b, &target).await;

    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut a).await;
    let kinds: Vec<String> = out.iter().map(kind).collect();
    assert_eq!(kinds, ["verdict", "game_over"]);

    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut b).await;
    assert!(matches!(&out[0], ServerWsMessage::Error { code, .. } if code == "game_already_over"));
    assert!(b.as_ref().unwrap().session.is_over());

    let stats = stats_for_player(&s, &player).await.unwrap().stats;
    assert_eq!(stats.total_games, 1);
    assert_eq!(stats.games_won, 1);
    let rec = s.store.load(&player).await.unwrap();
    let branch = rec.state.get(s.config.defaults.difficulty()).unwrap();
    assert_eq!(branch.guessed_idioms, vec![target]);
  }

  #[tokio::test]
  async fn ws_guess_keeps_guesses_made_elsewhere() {
    let s = state();
    let player = new_player_id();
    let mut ws = hello_as(&s, &player).await;
    let p = ws.as_ref().unwrap().session.puzzle().clone();
    let misses: Vec<char> = p.keyboard.iter().copied().filter(|c| !p.target.word.contains(*c)).take(8).collect();
    let first: String = misses[..4].iter().collect();
    let second: String = misses[4..].iter().collect();

    submit_guess(&s, &player, &first).await.unwrap();
    type_word(&s, &mut ws, &second).await;
    let out = handle_client_ws(ClientWsMessage::Submit, &s, &mut ws).await;
    assert_eq!(kind(&out[0]), "verdict");
    assert_eq!(ws.as_ref().unwrap().session.cursor(), (2, 0));

    let rec = s.store.load(&player).await.unwrap();
    let branch = rec.state.get(s.config.defaults.difficulty()).unwrap();
    assert_eq!(branch.guessed_idioms, vec![first, second]);
  }
}
