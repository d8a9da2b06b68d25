//! WebSocket protocol messages for multiplayer Draftosaurus.

use draft_core::{BoardContents, DiceFace, ScoreBreakdown, Session, Species, Verdict, Zone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
///
/// Zone and species arrive as raw ids and are parsed by the rules engine, so
/// a bad id is reported back as `UnknownZone`/`UnknownSpecies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new game room
    CreateRoom { player_name: String, max_players: u8 },

    /// Join an existing room
    JoinRoom { room_id: Uuid, player_name: String },

    /// Leave current room
    LeaveRoom,

    /// Start the game (host only)
    StartGame,

    /// Roll the placement die for the room (host only)
    RollDice,

    /// Ask whether a placement would be legal, without applying it
    CheckPlacement { zone: String, species: String },

    /// Place a dinosaur on your own board
    PlaceDinosaur { zone: String, species: String },

    /// Recompute scores for every board in the room
    RequestScores,

    /// End the game and publish final scores (host only)
    FinishGame,

    /// Request room list
    ListRooms,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Room created successfully
    RoomCreated { room_id: Uuid },

    /// Joined room successfully
    JoinedRoom { room: RoomInfo },

    /// Left room successfully
    LeftRoom,

    /// Room state updated (player joined/left)
    RoomUpdated { room: RoomInfo },

    /// Game started with one empty board per player
    GameStarted { session: Session },

    /// New active die face
    DiceRolled { face: DiceFace },

    /// Answer to `CheckPlacement`
    PlacementChecked { verdict: Verdict },

    /// A placement was accepted
    DinosaurPlaced {
        player_id: Uuid,
        zone: Zone,
        species: Species,
    },

    /// A player's board after a change
    BoardUpdated { player_id: Uuid, board: BoardContents },

    /// Score breakdown for every player
    Scores {
        scores: Vec<PlayerScore>,
        #[serde(rename = "final")]
        is_final: bool,
    },

    /// List of available rooms
    RoomList { rooms: Vec<RoomInfo> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// One player's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: Uuid,
    pub name: String,
    pub breakdown: ScoreBreakdown,
}

/// Room information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
}

/// Player information in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
}

/// Room status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    InGame,
    Finished,
}
