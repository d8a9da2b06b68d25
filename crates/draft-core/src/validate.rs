//! Placement validation.
//!
//! [`validate`] answers one question: may this species go into this zone
//! right now? It never mutates anything; callers append the piece themselves
//! after a legal verdict (or use [`BoardContents::place`], which does both).
//!
//! Checks run in a fixed order: die constraint, capacity, then the zone's own
//! placement rule. The first failure wins.

use crate::board::{BoardContents, RawBoard};
use crate::dice::DiceFace;
use crate::species::Species;
use crate::zone::{PlacementRule, Zone};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why a placement was refused
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlacementError {
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown die face: {0}")]
    UnknownConstraint(String),

    #[error("The die does not allow placement in this zone")]
    ConstraintViolation,

    #[error("Zone is full")]
    ZoneFull,

    #[error("This zone only takes the species already in it")]
    SpeciesMismatch,

    #[error("This species is already in this zone")]
    DuplicateSpecies,

    #[error("This species already appears elsewhere on the board")]
    NotUnique,
}

/// Serializable verdict: `{ "legal": bool, "reason": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub legal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<PlacementError>,
}

impl From<Result<(), PlacementError>> for Verdict {
    fn from(result: Result<(), PlacementError>) -> Self {
        match result {
            Ok(()) => Verdict {
                legal: true,
                reason: None,
            },
            Err(reason) => Verdict {
                legal: false,
                reason: Some(reason),
            },
        }
    }
}

/// Check whether `species` may be placed into `zone`.
///
/// `board` is only consulted by the single-unique rule. When it is `None`
/// that rule checks emptiness alone and skips the board-wide uniqueness test;
/// the caller is then responsible for it. `constraint` of `None` or
/// [`DiceFace::FreeChoice`] leaves every zone eligible.
pub fn validate(
    zone: Zone,
    species: Species,
    contents: &[Species],
    board: Option<&BoardContents>,
    constraint: Option<DiceFace>,
) -> Result<(), PlacementError> {
    let result = check(zone, species, contents, board, constraint);
    if let Err(e) = &result {
        debug!(%zone, %species, error = %e, "placement rejected");
    }
    result
}

fn check(
    zone: Zone,
    species: Species,
    contents: &[Species],
    board: Option<&BoardContents>,
    constraint: Option<DiceFace>,
) -> Result<(), PlacementError> {
    if let Some(face) = constraint {
        if !face.allows(zone) {
            return Err(PlacementError::ConstraintViolation);
        }
    }

    let rules = zone.rules();
    if contents.len() >= rules.capacity {
        return Err(PlacementError::ZoneFull);
    }

    match rules.placement {
        PlacementRule::SameSpeciesOnly => match contents.first() {
            Some(&first) if first != species => Err(PlacementError::SpeciesMismatch),
            _ => Ok(()),
        },
        PlacementRule::DifferentSpeciesOnly => {
            if contents.contains(&species) {
                Err(PlacementError::DuplicateSpecies)
            } else {
                Ok(())
            }
        }
        PlacementRule::SingleSlot => {
            if contents.is_empty() {
                Ok(())
            } else {
                Err(PlacementError::ZoneFull)
            }
        }
        PlacementRule::SingleUnique => {
            if !contents.is_empty() {
                return Err(PlacementError::ZoneFull);
            }
            let Some(board) = board else {
                return Ok(());
            };
            let elsewhere = board
                .iter()
                .filter(|(other, _)| *other != zone)
                .any(|(_, pieces)| pieces.contains(&species));
            if elsewhere {
                Err(PlacementError::NotUnique)
            } else {
                Ok(())
            }
        }
        PlacementRule::Unrestricted => Ok(()),
    }
}

/// [`validate`] over raw identifiers.
///
/// Unknown zone, species, or die ids fail before any rule is consulted.
pub fn validate_raw(
    zone: &str,
    species: &str,
    contents: &[String],
    board: Option<&RawBoard>,
    constraint: Option<&str>,
) -> Result<(), PlacementError> {
    let zone: Zone = zone.parse()?;
    let species: Species = species.parse()?;
    let constraint = constraint.map(str::parse::<DiceFace>).transpose()?;
    let contents = contents
        .iter()
        .map(|s| s.parse::<Species>())
        .collect::<Result<Vec<_>, _>>()?;
    let board = board.map(BoardContents::from_raw).transpose()?;
    validate(zone, species, &contents, board.as_ref(), constraint)
}

/// Every zone `species` could legally be placed in on `board` right now
pub fn legal_zones(
    board: &BoardContents,
    species: Species,
    constraint: Option<DiceFace>,
) -> Vec<Zone> {
    Zone::ALL
        .into_iter()
        .filter(|&zone| check(zone, species, board.zone(zone), Some(board), constraint).is_ok())
        .collect()
}
