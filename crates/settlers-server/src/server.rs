//! WebSocket server and connection handling.

use crate::protocol::{LobbyMessage, ServerMessage};
use crate::room::{Delivery, GameRoom};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use settlers_core::{Event, GameError, PLAYER_COUNT};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// Connections waiting for a match, in arrival order
    pub lobby: Mutex<Vec<Uuid>>,
    /// All running matches
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from connection ID to its match ID
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from connection ID to its message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            lobby: Mutex::new(Vec::new()),
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    pub fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, message } in deliveries {
            self.send_to_player(to, message);
        }
    }

    /// Queue a connection; the fourth arrival starts a match.
    pub async fn join_lobby(&self, player_id: Uuid) {
        let mut lobby = self.lobby.lock().await;
        lobby.push(player_id);

        if lobby.len() < PLAYER_COUNT {
            let waiting = lobby.len();
            for id in lobby.iter() {
                self.send_to_player(*id, LobbyMessage::Waiting { players: waiting }.into());
            }
            return;
        }

        let seated: Vec<Uuid> = lobby.drain(..PLAYER_COUNT).collect();
        drop(lobby);
        self.create_room(seated);
    }

    fn create_room(&self, seated: Vec<Uuid>) {
        let room_id = Uuid::new_v4();
        let room = match GameRoom::new(room_id, seated.clone()) {
            Ok(room) => room,
            Err(e) => {
                error!("Could not create match: {}", e);
                return;
            }
        };
        info!(
            "Lobby filled, match {} created, seat {} opens",
            room_id,
            room.session().first()
        );

        let start = room.start();
        for id in seated {
            self.player_rooms.insert(id, room_id);
        }
        self.rooms.insert(room_id, room);
        self.deliver(start);
    }

    /// Route one text frame from a connection.
    pub fn handle_text(&self, player_id: Uuid, text: &str) {
        let Some(room_id) = self.player_rooms.get(&player_id).map(|r| *r) else {
            // Still in the lobby
            let reason = Event::error(&GameError::UnknownCommand);
            self.send_to_player(player_id, reason.into());
            return;
        };

        let (deliveries, finished) = {
            let Some(mut room) = self.rooms.get_mut(&room_id) else {
                return;
            };
            match room.handle_text(player_id, text) {
                Ok(deliveries) => (deliveries, room.is_finished()),
                Err(e) => {
                    warn!("Dropped command from {}: {}", player_id, e);
                    return;
                }
            }
        };

        self.deliver(deliveries);
        if finished {
            info!("Match {} finished", room_id);
            self.close_room(room_id);
        }
    }

    /// Remove a connection from the lobby or mark its seat disconnected.
    pub async fn handle_disconnect(&self, player_id: Uuid) {
        if let Some((_, room_id)) = self.player_rooms.remove(&player_id) {
            let (notices, abandoned) = {
                let Some(mut room) = self.rooms.get_mut(&room_id) else {
                    return;
                };
                let notices = room.disconnect(player_id).unwrap_or_default();
                (notices, room.is_abandoned())
            };
            self.deliver(notices);
            if abandoned {
                info!("Match {} abandoned", room_id);
                self.close_room(room_id);
            }
            return;
        }

        let mut lobby = self.lobby.lock().await;
        lobby.retain(|id| *id != player_id);
        let waiting = lobby.len();
        for id in lobby.iter() {
            self.send_to_player(*id, LobbyMessage::Waiting { players: waiting }.into());
        }
    }

    fn close_room(&self, room_id: Uuid) {
        if let Some((_, room)) = self.rooms.remove(&room_id) {
            for id in room.connections() {
                self.player_rooms.remove(&id);
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Settlers server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let player_id = Uuid::new_v4();

    // Outgoing messages go through a channel so room handling never awaits
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.to_json() {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Could not encode message: {}", e),
            }
        }
    });

    state.join_lobby(player_id).await;

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => state.handle_text(player_id, &text),
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    state.handle_disconnect(player_id).await;
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}
