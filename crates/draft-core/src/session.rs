//! In-memory game session: one board per participant, the active die face,
//! and the log of accepted placements.
//!
//! The session does not decide whose turn it is. It only guarantees that
//! every piece on every board got there through a legal placement, and that
//! replaying the move log rebuilds exactly the same boards.

use crate::board::{BoardContents, PlayerId, SessionBoards};
use crate::dice::DiceFace;
use crate::score::{score_session, ScoreBreakdown, ScoreError};
use crate::species::Species;
use crate::validate::PlacementError;
use crate::zone::Zone;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Most participants a session can seat
pub const MAX_PLAYERS: usize = 5;

/// Errors from session bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SessionError {
    #[error("Player {0} is not in this session")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} has already joined")]
    AlreadyJoined(PlayerId),

    #[error("Session is full")]
    SessionFull,

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Scoring(#[from] ScoreError),
}

/// One accepted placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub player: PlayerId,
    pub zone: Zone,
    pub species: Species,
    /// Die face active when the piece was placed
    pub dice: Option<DiceFace>,
}

/// A game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    boards: SessionBoards,
    dice: Option<DiceFace>,
    moves: Vec<PlacementRecord>,
    max_players: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MAX_PLAYERS)
    }
}

impl Session {
    /// An empty session seating up to `max_players` (clamped to 1..=5)
    pub fn new(max_players: usize) -> Self {
        Self {
            boards: SessionBoards::new(),
            dice: None,
            moves: Vec::new(),
            max_players: max_players.clamp(1, MAX_PLAYERS),
        }
    }

    /// Seat a participant with an empty board
    pub fn join(&mut self, player: PlayerId) -> Result<(), SessionError> {
        if self.boards.contains_key(&player) {
            return Err(SessionError::AlreadyJoined(player));
        }
        if self.boards.len() >= self.max_players {
            return Err(SessionError::SessionFull);
        }
        self.boards.insert(player, BoardContents::new());
        debug!(player, "joined session");
        Ok(())
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.boards.keys().copied()
    }

    pub fn board(&self, player: PlayerId) -> Option<&BoardContents> {
        self.boards.get(&player)
    }

    pub fn boards(&self) -> &SessionBoards {
        &self.boards
    }

    pub fn dice(&self) -> Option<DiceFace> {
        self.dice
    }

    pub fn set_dice(&mut self, face: Option<DiceFace>) {
        self.dice = face;
    }

    /// Roll the die and make the result the active constraint
    pub fn roll_dice<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DiceFace {
        let face = DiceFace::roll(rng);
        self.dice = Some(face);
        debug!(%face, "rolled");
        face
    }

    pub fn moves(&self) -> &[PlacementRecord] {
        &self.moves
    }

    /// Place a piece on `player`'s board under the active die face
    pub fn place(
        &mut self,
        player: PlayerId,
        zone: Zone,
        species: Species,
    ) -> Result<(), SessionError> {
        let dice = self.dice;
        let board = self
            .boards
            .get_mut(&player)
            .ok_or(SessionError::UnknownPlayer(player))?;
        board.place(zone, species, dice)?;
        self.moves.push(PlacementRecord {
            player,
            zone,
            species,
            dice,
        });
        Ok(())
    }

    /// Rebuild a session from its participants, move log and active die face.
    ///
    /// Every move is validated again under the die face it records; `dice`
    /// becomes the active face once the log is exhausted.
    pub fn replay<P, M>(
        max_players: usize,
        players: P,
        moves: M,
        dice: Option<DiceFace>,
    ) -> Result<Self, SessionError>
    where
        P: IntoIterator<Item = PlayerId>,
        M: IntoIterator<Item = PlacementRecord>,
    {
        let mut session = Self::new(max_players);
        for player in players {
            session.join(player)?;
        }
        for record in moves {
            session.dice = record.dice;
            session.place(record.player, record.zone, record.species)?;
        }
        session.dice = dice;
        Ok(session)
    }

    /// Score every board against the current snapshot
    pub fn scores(&self) -> Result<BTreeMap<PlayerId, ScoreBreakdown>, ScoreError> {
        score_session(&self.boards)
    }
}
