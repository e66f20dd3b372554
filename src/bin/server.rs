use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use pellet_chase_server::constants::TICK_MS;
use pellet_chase_server::engine::{GameSession, GameSessionOptions};
use pellet_chase_server::highscore_store::HighScoreStore;
use pellet_chase_server::server_protocol::{parse_client_message, ParsedClientMessage};
use pellet_chase_server::server_utils::{sanitize_name, session_seed};
use pellet_chase_server::types::{Difficulty, RuntimeEvent};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ClientContext {
    tx: mpsc::Sender<OutboundMessage>,
    name: String,
    difficulty: Difficulty,
    session: Option<GameSession>,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    highscore_store: HighScoreStore,
}

impl ServerState {
    fn new(highscore_store: HighScoreStore) -> Self {
        Self {
            clients: HashMap::new(),
            highscore_store,
        }
    }
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let highscore_path = std::env::var("HIGHSCORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/highscores.txt"));

    let state = Arc::new(Mutex::new(ServerState::new(HighScoreStore::new(
        highscore_path,
    ))));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/highscores", get(highscores_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found; serving API and websocket only.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist/client"), PathBuf::from("../client")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn highscores_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(guard.highscore_store.build_response())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(
            client_id.clone(),
            ClientContext {
                tx: tx.clone(),
                name: "Player".to_string(),
                difficulty: Difficulty::Medium,
                session: None,
            },
        );
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(state.clone(), &client_id, raw.to_string()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(state.clone(), &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        guard.clients.remove(&client_id);
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: SharedState, client_id: &str, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        send_error_to_client(&state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    match message {
        ParsedClientMessage::Hello { name } => {
            let name = sanitize_name(&name);
            if let Some(client) = guard.clients.get_mut(client_id) {
                client.name = name.clone();
            }
            let highscores = serde_json::to_value(guard.highscore_store.build_response())
                .unwrap_or(Value::Null);
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "welcome",
                    "name": name,
                    "highScores": highscores,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
        ParsedClientMessage::Input { dir } => {
            let Some(client) = guard.clients.get_mut(client_id) else {
                return;
            };
            if let Some(session) = client.session.as_mut() {
                session.set_next_direction(dir);
            }
        }
        ParsedClientMessage::Pause => {
            let Some(client) = guard.clients.get_mut(client_id) else {
                return;
            };
            if let Some(session) = client.session.as_mut() {
                session.toggle_pause();
            }
        }
        ParsedClientMessage::SelectDifficulty { difficulty } => {
            start_session(&mut guard, client_id, difficulty);
        }
        ParsedClientMessage::Restart => {
            let difficulty = guard
                .clients
                .get(client_id)
                .map(|client| client.difficulty);
            if let Some(difficulty) = difficulty {
                start_session(&mut guard, client_id, difficulty);
            }
        }
        ParsedClientMessage::Menu => {
            if let Some(client) = guard.clients.get_mut(client_id) {
                client.session = None;
            }
            let highscores = serde_json::to_value(guard.highscore_store.build_response())
                .unwrap_or(Value::Null);
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "menu",
                    "highScores": highscores,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
    }
}

fn start_session(state: &mut ServerState, client_id: &str, difficulty: Difficulty) {
    let Some(client) = state.clients.get_mut(client_id) else {
        return;
    };
    client.difficulty = difficulty;
    let session = GameSession::new(difficulty, session_seed(), GameSessionOptions::default());
    let maze = session.maze_init();
    let config = json!({
        "tickMs": session.config.tick_ms,
        "ghostSpeed": session.config.ghost_speed,
        "powerDurationTicks": session.config.power_duration_ticks,
    });
    client.session = Some(session);
    println!("[server] {client_id} started a {} game", difficulty.label());

    send_to_client(
        state,
        client_id,
        &json!({
            "type": "game_init",
            "difficulty": difficulty,
            "maze": maze,
            "config": config,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_sessions(&mut guard);
        }
    });
}

fn tick_sessions(state: &mut ServerState) {
    let client_ids: Vec<String> = state.clients.keys().cloned().collect();
    for client_id in client_ids {
        let snapshot = {
            let Some(client) = state.clients.get_mut(&client_id) else {
                continue;
            };
            let Some(session) = client.session.as_mut() else {
                continue;
            };
            if session.is_terminal() {
                continue;
            }
            session.advance();
            session.build_snapshot(true)
        };

        let won_score = snapshot.events.iter().find_map(|event| match event {
            RuntimeEvent::GameWon { score } => Some(*score),
            _ => None,
        });

        send_to_client(
            state,
            &client_id,
            &json!({
                "type": "state",
                "snapshot": snapshot,
            }),
            QueuePolicy::DropOnFull,
        );

        // The win event fires exactly once per session, so the table is
        // updated at most once per game.
        if let Some(score) = won_score {
            let entered = state.highscore_store.add_score(score);
            let name = state
                .clients
                .get(&client_id)
                .map(|client| client.name.clone())
                .unwrap_or_default();
            println!("[server] {client_id} ({name}) won with score {score}");
            let highscores = serde_json::to_value(state.highscore_store.build_response())
                .unwrap_or(Value::Null);
            send_to_client(
                state,
                &client_id,
                &json!({
                    "type": "high_scores",
                    "entered": entered,
                    "highScores": highscores,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
    }
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(client) = state.clients.get(client_id) {
        client
            .tx
            .try_send(OutboundMessage::Text(message.to_string()))
            .is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        if let Some(client) = state.clients.remove(client_id) {
            let _ = client.tx.try_send(OutboundMessage::Close {
                code: 1013,
                reason: "outbound queue overflow".to_string(),
            });
        }
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
