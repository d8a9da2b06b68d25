//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, RoomStatus, ServerMessage};
use crate::room::{GameRoom, RoomError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from player ID to their room ID
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Send an error message to a specific player.
    pub fn send_error(&self, player_id: Uuid, message: impl Into<String>) {
        self.send_to_player(
            player_id,
            ServerMessage::Error {
                message: message.into(),
            },
        );
    }

    /// Broadcast a message to all players in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Broadcast a message to all players in a room except one.
    pub fn broadcast_to_room_except(&self, room_id: Uuid, except: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                if *player_id != except {
                    self.send_to_player(*player_id, msg.clone());
                }
            }
        }
    }

    /// Get list of waiting rooms.
    pub fn get_waiting_rooms(&self) -> Vec<crate::protocol::RoomInfo> {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Waiting)
            .map(|r| r.to_info())
            .collect()
    }

    /// Room the player is currently in.
    fn room_of(&self, player_id: Uuid) -> Option<Uuid> {
        self.player_rooms.get(&player_id).map(|r| *r)
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
    info!("Draftosaurus server listening on {}", addr);

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

    // Channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    let welcome = ServerMessage::Welcome { player_id };
    ws_sender
        .send(Message::Text(serde_json::to_string(&welcome)?))
        .await?;

    // Forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode {:?}: {}", msg, e),
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {} ({})", player_id, text, e);
                    state.send_error(player_id, format!("Invalid message: {}", e));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    debug!(%player_id, ?msg, "client message");
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            max_players,
        } => {
            leave_current_room(player_id, state);
            let room_id = Uuid::new_v4();
            let room = GameRoom::new(room_id, player_id, player_name, max_players);
            let room_info = room.to_info();

            state.rooms.insert(room_id, room);
            state.player_rooms.insert(player_id, room_id);
            info!(%room_id, host = %player_id, "room created");

            state.send_to_player(player_id, ServerMessage::RoomCreated { room_id });
            state.send_to_player(player_id, ServerMessage::JoinedRoom { room: room_info });
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            if state.room_of(player_id) == Some(room_id) {
                state.send_error(player_id, "Already in this room");
                return;
            }
            let joinable = state.rooms.get(&room_id).map(|room| {
                if room.status != RoomStatus::Waiting {
                    Err(RoomError::GameAlreadyStarted)
                } else if room.is_full() {
                    Err(RoomError::RoomFull)
                } else {
                    Ok(())
                }
            });
            match joinable {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    state.send_error(player_id, e.to_string());
                    return;
                }
                None => {
                    state.send_error(player_id, "Room not found");
                    return;
                }
            }
            // Only one room lock at a time
            leave_current_room(player_id, state);
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                state.send_error(player_id, "Room not found");
                return;
            };
            match room.add_player(player_id, player_name) {
                Ok(()) => {
                    let room_info = room.to_info();
                    drop(room); // Release lock before broadcasting
                    state.player_rooms.insert(player_id, room_id);

                    state.send_to_player(
                        player_id,
                        ServerMessage::JoinedRoom {
                            room: room_info.clone(),
                        },
                    );
                    state.broadcast_to_room_except(
                        room_id,
                        player_id,
                        ServerMessage::RoomUpdated { room: room_info },
                    );
                }
                Err(e) => state.send_error(player_id, e.to_string()),
            }
        }

        ClientMessage::LeaveRoom => {
            if leave_current_room(player_id, state) {
                state.send_to_player(player_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::StartGame => {
            with_room(player_id, state, |room| {
                room.start_game(player_id)?;
                let session = room.session.clone().ok_or(RoomError::GameNotStarted)?;
                Ok(vec![ServerMessage::GameStarted { session }])
            });
        }

        ClientMessage::RollDice => {
            with_room(player_id, state, |room| {
                let face = room.roll_dice(player_id, &mut rand::thread_rng())?;
                Ok(vec![ServerMessage::DiceRolled { face }])
            });
        }

        ClientMessage::CheckPlacement { zone, species } => {
            let Some(room_id) = state.room_of(player_id) else {
                state.send_error(player_id, "Not in a room");
                return;
            };
            let verdict = match state.rooms.get(&room_id) {
                Some(room) => room.check_placement(player_id, &zone, &species),
                None => {
                    state.send_error(player_id, "Room not found");
                    return;
                }
            };
            match verdict {
                Ok(verdict) => {
                    state.send_to_player(player_id, ServerMessage::PlacementChecked { verdict })
                }
                Err(e) => state.send_error(player_id, e.to_string()),
            }
        }

        ClientMessage::PlaceDinosaur { zone, species } => {
            with_room(player_id, state, |room| {
                let (zone, species, board) = room.place(player_id, &zone, &species)?;
                Ok(vec![
                    ServerMessage::DinosaurPlaced {
                        player_id,
                        zone,
                        species,
                    },
                    ServerMessage::BoardUpdated { player_id, board },
                ])
            });
        }

        ClientMessage::RequestScores => {
            let Some(room_id) = state.room_of(player_id) else {
                state.send_error(player_id, "Not in a room");
                return;
            };
            let scores = match state.rooms.get(&room_id) {
                Some(room) => room.scores(),
                None => {
                    state.send_error(player_id, "Room not found");
                    return;
                }
            };
            match scores {
                Ok(scores) => state.send_to_player(
                    player_id,
                    ServerMessage::Scores {
                        scores,
                        is_final: false,
                    },
                ),
                Err(e) => state.send_error(player_id, e.to_string()),
            }
        }

        ClientMessage::FinishGame => {
            with_room(player_id, state, |room| {
                let scores = room.finish(player_id)?;
                Ok(vec![ServerMessage::Scores {
                    scores,
                    is_final: true,
                }])
            });
        }

        ClientMessage::ListRooms => {
            let rooms = state.get_waiting_rooms();
            state.send_to_player(player_id, ServerMessage::RoomList { rooms });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Run a mutation against the player's room and broadcast the resulting
/// messages to everyone in it, or report the error to the player alone.
fn with_room<F>(player_id: Uuid, state: &Arc<ServerState>, f: F)
where
    F: FnOnce(&mut GameRoom) -> Result<Vec<ServerMessage>, RoomError>,
{
    let Some(room_id) = state.room_of(player_id) else {
        state.send_error(player_id, "Not in a room");
        return;
    };
    let result = match state.rooms.get_mut(&room_id) {
        Some(mut room) => f(room.value_mut()),
        None => {
            state.send_error(player_id, "Room not found");
            return;
        }
    };
    // Room lock is released here, before broadcasting

    match result {
        Ok(messages) => {
            for msg in messages {
                state.broadcast_to_room(room_id, msg);
            }
        }
        Err(e) => {
            debug!(%player_id, %room_id, error = %e, "request rejected");
            state.send_error(player_id, e.to_string());
        }
    }
}

/// Take the player out of whatever room they are in. Returns false if they
/// were not in one.
fn leave_current_room(player_id: Uuid, state: &Arc<ServerState>) -> bool {
    match state.player_rooms.remove(&player_id) {
        Some((_, room_id)) => {
            leave_room(player_id, room_id, state);
            true
        }
        None => false,
    }
}

/// Remove a player from a room, dropping the room once it is empty.
fn leave_room(player_id: Uuid, room_id: Uuid, state: &Arc<ServerState>) {
    let remaining = state
        .rooms
        .get_mut(&room_id)
        .map(|mut room| room.remove_player(player_id).map(|empty| (empty, room.to_info())));

    match remaining {
        Some(Ok((true, _))) => {
            state.rooms.remove(&room_id);
            info!(%room_id, "room closed");
        }
        Some(Ok((false, room_info))) => {
            state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
        }
        Some(Err(e)) => warn!(%player_id, %room_id, "leave failed: {}", e),
        None => {}
    }
}

/// Handle player disconnect.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    let Some((_, room_id)) = state.player_rooms.remove(&player_id) else {
        return;
    };

    let in_game = state
        .rooms
        .get(&room_id)
        .map(|room| room.status == RoomStatus::InGame)
        .unwrap_or(false);

    if in_game {
        // Keep the seat and board; just mark the player as away
        let room_info = state.rooms.get_mut(&room_id).map(|mut room| {
            room.set_player_connected(player_id, false);
            room.to_info()
        });
        if let Some(room) = room_info {
            state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room });
        }
    } else {
        leave_room(player_id, room_id, state);
    }
}
