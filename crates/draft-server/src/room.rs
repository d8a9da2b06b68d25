//! Game room management.
//!
//! A room owns the authoritative [`Session`] for its game. Every placement
//! goes through the rules engine before any board changes; scores are always
//! recomputed from the current boards, never cached.

use draft_core::{
    validate, BoardContents, DiceFace, PlacementError, PlayerId, Session, SessionError, Species,
    Verdict, Zone, MAX_PLAYERS,
};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{PlayerInfo, PlayerScore, RoomInfo, RoomStatus};

/// Fewest players needed to start
const MIN_PLAYERS: u8 = 2;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Game is over")]
    GameOver,

    #[error("Illegal placement: {0}")]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Seat in the session, assigned when the game starts
    pub seat: Option<PlayerId>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            seat: None,
        }
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            connected: self.connected,
        }
    }
}

/// A game room that can hold multiple players.
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Join order; seats are handed out in this order when the game starts
    pub player_order: Vec<Uuid>,
    /// The session (once started)
    pub session: Option<Session>,
}

impl GameRoom {
    pub fn new(id: Uuid, host_id: Uuid, host_name: String, max_players: u8) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s Park", host_name),
            max_players: max_players.clamp(MIN_PLAYERS, MAX_PLAYERS as u8),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            session: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players.insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if self.players.remove(&player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom);
        }
        self.player_order.retain(|&id| id != player_id);

        // If host left, assign new host
        if player_id == self.host_id {
            if let Some(&next) = self.player_order.first() {
                self.host_id = next;
            }
        }

        // Return true if room is now empty
        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    fn require_host(&self, requester_id: Uuid) -> Result<(), RoomError> {
        if requester_id == self.host_id {
            Ok(())
        } else {
            Err(RoomError::NotHost)
        }
    }

    pub fn start_game(&mut self, requester_id: Uuid) -> Result<(), RoomError> {
        self.require_host(requester_id)?;
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS as usize {
            return Err(RoomError::NotEnoughPlayers);
        }

        let mut session = Session::new(self.player_order.len());
        for (seat, player_id) in self.player_order.iter().enumerate() {
            let seat = seat as PlayerId;
            session.join(seat)?;
            if let Some(player) = self.players.get_mut(player_id) {
                player.seat = Some(seat);
            }
        }

        self.session = Some(session);
        self.status = RoomStatus::InGame;
        info!(room = %self.id, players = self.player_order.len(), "game started");
        Ok(())
    }

    fn seat_of(&self, player_id: Uuid) -> Result<PlayerId, RoomError> {
        self.players
            .get(&player_id)
            .and_then(|p| p.seat)
            .ok_or(RoomError::PlayerNotInRoom)
    }

    fn active_session(&self) -> Result<&Session, RoomError> {
        match self.status {
            RoomStatus::Finished => Err(RoomError::GameOver),
            _ => self.session.as_ref().ok_or(RoomError::GameNotStarted),
        }
    }

    fn active_session_mut(&mut self) -> Result<&mut Session, RoomError> {
        match self.status {
            RoomStatus::Finished => Err(RoomError::GameOver),
            _ => self.session.as_mut().ok_or(RoomError::GameNotStarted),
        }
    }

    pub fn roll_dice<R: Rng + ?Sized>(
        &mut self,
        requester_id: Uuid,
        rng: &mut R,
    ) -> Result<DiceFace, RoomError> {
        self.require_host(requester_id)?;
        let face = self.active_session_mut()?.roll_dice(rng);
        debug!(room = %self.id, %face, "dice rolled");
        Ok(face)
    }

    /// Would this placement be legal on the player's board right now?
    pub fn check_placement(
        &self,
        player_id: Uuid,
        zone: &str,
        species: &str,
    ) -> Result<Verdict, RoomError> {
        let session = self.active_session()?;
        let seat = self.seat_of(player_id)?;
        let board = session.board(seat).ok_or(RoomError::PlayerNotInRoom)?;

        let result = parse_piece(zone, species).and_then(|(zone, species)| {
            validate(zone, species, board.zone(zone), Some(board), session.dice())
        });
        Ok(Verdict::from(result))
    }

    /// Place a piece on the player's own board, returning the updated board
    pub fn place(
        &mut self,
        player_id: Uuid,
        zone: &str,
        species: &str,
    ) -> Result<(Zone, Species, BoardContents), RoomError> {
        let seat = self.seat_of(player_id)?;
        let (zone, species) = parse_piece(zone, species)?;
        let session = self.active_session_mut()?;
        session.place(seat, zone, species)?;
        let board = session
            .board(seat)
            .cloned()
            .ok_or(RoomError::PlayerNotInRoom)?;
        Ok((zone, species, board))
    }

    /// Score every seated player from the current boards.
    ///
    /// A player who left mid-game keeps their board in the session, so it
    /// still counts towards majorities, but gets no entry here.
    pub fn scores(&self) -> Result<Vec<PlayerScore>, RoomError> {
        let session = self.session.as_ref().ok_or(RoomError::GameNotStarted)?;
        let scores = session.scores().map_err(SessionError::from)?;

        Ok(scores
            .into_iter()
            .filter_map(|(seat, breakdown)| {
                let player = self.players.values().find(|p| p.seat == Some(seat))?;
                Some(PlayerScore {
                    player_id: player.id,
                    name: player.name.clone(),
                    breakdown,
                })
            })
            .collect())
    }

    /// End the game (host only) and return the final scores
    pub fn finish(&mut self, requester_id: Uuid) -> Result<Vec<PlayerScore>, RoomError> {
        self.require_host(requester_id)?;
        self.active_session()?;
        let scores = self.scores()?;
        self.status = RoomStatus::Finished;
        info!(room = %self.id, "game finished");
        Ok(scores)
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            max_players: self.max_players,
            host_id: self.host_id,
            status: self.status,
        }
    }
}

fn parse_piece(zone: &str, species: &str) -> Result<(Zone, Species), PlacementError> {
    Ok((zone.parse()?, species.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started_room() -> (GameRoom, Uuid, Uuid) {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), 4);
        let guest_id = Uuid::new_v4();
        room.add_player(guest_id, "Guest".to_string()).unwrap();
        room.start_game(host_id).unwrap();
        (room, host_id, guest_id)
    }

    #[test]
    fn test_create_room() {
        let host_id = Uuid::new_v4();
        let room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), 4);

        assert_eq!(room.player_count(), 1);
        assert!(!room.is_full());
        assert_eq!(room.host_id, host_id);
        assert_eq!(room.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_room_size_clamped() {
        let room = GameRoom::new(Uuid::new_v4(), Uuid::new_v4(), "Host".to_string(), 9);
        assert_eq!(room.max_players, 5);
        let room = GameRoom::new(Uuid::new_v4(), Uuid::new_v4(), "Host".to_string(), 0);
        assert_eq!(room.max_players, 2);
    }

    #[test]
    fn test_add_remove_players() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), 2);

        let player2 = Uuid::new_v4();
        room.add_player(player2, "Player 2".to_string()).unwrap();
        assert!(room.is_full());
        assert!(matches!(
            room.add_player(Uuid::new_v4(), "Player 3".to_string()),
            Err(RoomError::RoomFull)
        ));

        // Host leaves, next in line takes over
        let empty = room.remove_player(host_id).unwrap();
        assert!(!empty);
        assert_eq!(room.host_id, player2);
    }

    #[test]
    fn test_start_game_seats_players() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), 4);
        assert!(matches!(room.start_game(host_id), Err(RoomError::NotEnoughPlayers)));

        let player2 = Uuid::new_v4();
        room.add_player(player2, "Player 2".to_string()).unwrap();
        assert!(matches!(room.start_game(player2), Err(RoomError::NotHost)));

        room.start_game(host_id).unwrap();
        assert_eq!(room.status, RoomStatus::InGame);
        assert_eq!(room.players[&host_id].seat, Some(0));
        assert_eq!(room.players[&player2].seat, Some(1));
    }

    #[test]
    fn test_place_and_check() {
        let (mut room, host_id, guest_id) = started_room();

        let verdict = room.check_placement(guest_id, "king_of_jungle", "trex").unwrap();
        assert!(verdict.legal);

        let (zone, species, board) = room.place(guest_id, "king_of_jungle", "trex").unwrap();
        assert_eq!(zone, Zone::KingOfJungle);
        assert_eq!(species, Species::TRex);
        assert_eq!(board.zone(Zone::KingOfJungle), &[Species::TRex]);

        let verdict = room.check_placement(guest_id, "king_of_jungle", "trex").unwrap();
        assert_eq!(verdict.reason, Some(PlacementError::ZoneFull));

        // Host's board is untouched
        let verdict = room.check_placement(host_id, "king_of_jungle", "trex").unwrap();
        assert!(verdict.legal);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let (mut room, _, guest_id) = started_room();
        let verdict = room.check_placement(guest_id, "volcano", "trex").unwrap();
        assert_eq!(
            verdict.reason,
            Some(PlacementError::UnknownZone("volcano".into()))
        );
        assert!(matches!(
            room.place(guest_id, "river", "mammoth"),
            Err(RoomError::Placement(PlacementError::UnknownSpecies(_)))
        ));
    }

    #[test]
    fn test_dice_restricts_placement() {
        let (mut room, host_id, guest_id) = started_room();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(room.roll_dice(guest_id, &mut rng), Err(RoomError::NotHost)));

        let face = room.roll_dice(host_id, &mut rng).unwrap();
        for zone in Zone::ALL {
            let verdict = room.check_placement(guest_id, zone.as_str(), "stegosaurus").unwrap();
            assert_eq!(verdict.legal, face.allows(zone), "{zone} under {face}");
        }
    }

    #[test]
    fn test_scores_and_finish() {
        let (mut room, host_id, guest_id) = started_room();
        room.place(host_id, "king_of_jungle", "velociraptor").unwrap();
        room.place(guest_id, "river", "velociraptor").unwrap();

        let scores = room.scores().unwrap();
        assert_eq!(scores.len(), 2);
        let host = scores.iter().find(|s| s.player_id == host_id).unwrap();
        assert_eq!(host.breakdown.zone(Zone::KingOfJungle), 7);

        assert!(matches!(room.finish(guest_id), Err(RoomError::NotHost)));
        let final_scores = room.finish(host_id).unwrap();
        assert_eq!(final_scores, scores);
        assert_eq!(room.status, RoomStatus::Finished);
        assert!(matches!(
            room.place(guest_id, "river", "trex"),
            Err(RoomError::GameOver)
        ));
    }

    #[test]
    fn test_scores_follow_seats_after_player_leaves() {
        let host_id = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host_id, "Host".to_string(), 3);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        room.add_player(alice, "Alice".to_string()).unwrap();
        room.add_player(bob, "Bob".to_string()).unwrap();
        room.start_game(host_id).unwrap();

        for _ in 0..3 {
            room.place(host_id, "river", "trex").unwrap();
        }
        room.place(alice, "river", "stegosaurus").unwrap();
        room.place(bob, "river", "stegosaurus").unwrap();
        room.place(bob, "river", "stegosaurus").unwrap();

        assert!(!room.remove_player(host_id).unwrap());
        assert_eq!(room.host_id, alice);

        let scores = room.scores().unwrap();
        assert_eq!(scores.len(), 2);
        let total_of = |id: Uuid| {
            scores
                .iter()
                .find(|s| s.player_id == id)
                .map(|s| s.breakdown.total)
        };
        assert_eq!(total_of(alice), Some(1));
        assert_eq!(total_of(bob), Some(2));
        assert_eq!(total_of(host_id), None);

        let final_scores = room.finish(alice).unwrap();
        assert_eq!(final_scores, scores);
    }
}
