//! Draftosaurus rules engine
//!
//! This crate provides the pure core of a dinosaur-drafting park game:
//! - Species, zones, and the fixed rule table for each zone
//! - The placement die and the zones each face allows
//! - A placement validator that decides whether a piece may go into a zone
//! - A scoring engine, including the session-wide majority rule
//! - An in-memory session helper with a replayable move log
//!
//! # Architecture
//!
//! Validation and scoring are stateless functions of a caller-supplied
//! snapshot. They perform no I/O and can be called from any thread. Storage,
//! networking, and turn order belong to the host (see `draft-server`).
//!
//! # Modules
//!
//! - [`species`]: The six dinosaur species
//! - [`zone`]: The seven zones and their rule descriptors
//! - [`dice`]: Placement die faces
//! - [`board`]: Zone contents for one board
//! - [`validate`]: Placement validator
//! - [`score`]: Scoring engine
//! - [`session`]: Session bookkeeping

pub mod board;
pub mod dice;
pub mod score;
pub mod session;
pub mod species;
pub mod validate;
#[cfg(feature = "wasm")]
pub mod wasm;
pub mod zone;

// Re-export commonly used types
pub use board::{BoardContents, PlayerId, RawBoard, SessionBoards};
pub use dice::DiceFace;
pub use score::{max_zone_score, score_board, score_session, ScoreBreakdown, ScoreError};
pub use session::{PlacementRecord, Session, SessionError, MAX_PLAYERS};
pub use species::Species;
pub use validate::{legal_zones, validate, validate_raw, PlacementError, Verdict};
pub use zone::{PlacementRule, ScoringFormula, Zone, ZoneRules};
