//! Scoring engine.
//!
//! Scores are a pure function of zone contents. Nothing here is cached or
//! stored, so recomputing after every move and once at game end give the same
//! answer. The engine never assumes the validator ran: a zone that breaks its
//! own placement rule scores 0 instead of failing the whole board.

use crate::board::{BoardContents, PlayerId, SessionBoards};
use crate::species::Species;
use crate::zone::{ScoringFormula, Zone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Points for a monospecies zone, indexed by piece count
pub const SAME_SPECIES_POINTS: [u32; 7] = [0, 2, 4, 8, 12, 18, 24];

/// Points for an all-distinct zone, indexed by piece count
pub const DIFFERENT_SPECIES_POINTS: [u32; 7] = [0, 1, 3, 6, 10, 15, 21];

/// Points per pair in a pairwise zone
const PAIR_POINTS: u32 = 5;

/// Points for the trio, majority, and uniqueness zones when they pay out
const FLAT_POINTS: u32 = 7;

/// Pieces the trio zone must hold exactly
const TRIO_SIZE: usize = 3;

/// Errors from the scoring engine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScoreError {
    #[error("Majority scoring needs every board in the session")]
    MissingSessionContext,
}

/// Per-zone scores for one board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub per_zone: BTreeMap<Zone, u32>,
    pub bonus: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn zone(&self, zone: Zone) -> u32 {
        self.per_zone.get(&zone).copied().unwrap_or(0)
    }
}

fn lookup(table: &[u32], count: usize) -> u32 {
    table.get(count).copied().unwrap_or(0)
}

/// Score one board.
///
/// `session` must be supplied whenever the majority zone holds its piece;
/// otherwise [`ScoreError::MissingSessionContext`] is returned. It may or may
/// not include `board` itself.
pub fn score_board(
    board: &BoardContents,
    session: Option<&SessionBoards>,
) -> Result<ScoreBreakdown, ScoreError> {
    let mut per_zone = BTreeMap::new();
    for (zone, pieces) in board.iter() {
        per_zone.insert(zone, zone_score(zone, pieces, board, session)?);
    }
    let bonus = presence_bonus(board);
    let total = per_zone.values().sum::<u32>() + bonus;

    Ok(ScoreBreakdown {
        per_zone,
        bonus,
        total,
    })
}

/// Score every board in a session against the same snapshot
pub fn score_session(
    session: &SessionBoards,
) -> Result<BTreeMap<PlayerId, ScoreBreakdown>, ScoreError> {
    session
        .iter()
        .map(|(&player, board)| Ok((player, score_board(board, Some(session))?)))
        .collect()
}

/// +1 for each zone holding at least one [`Species::BONUS`]
pub fn presence_bonus(board: &BoardContents) -> u32 {
    board.zones_containing(Species::BONUS).count() as u32
}

/// Score a single zone of `board`
pub fn zone_score(
    zone: Zone,
    pieces: &[Species],
    board: &BoardContents,
    session: Option<&SessionBoards>,
) -> Result<u32, ScoreError> {
    let score = match zone.rules().scoring {
        ScoringFormula::SameSpeciesTable => same_species(pieces),
        ScoringFormula::DifferentSpeciesTable => different_species(pieces),
        ScoringFormula::Pairwise => pairwise(pieces),
        ScoringFormula::ExactTrio => exact_trio(pieces),
        ScoringFormula::Majority => majority(pieces, board, session)?,
        ScoringFormula::Uniqueness => uniqueness(pieces, board),
        ScoringFormula::Unbounded => pieces.len() as u32,
    };
    Ok(score)
}

fn same_species(pieces: &[Species]) -> u32 {
    match pieces.first() {
        None => 0,
        Some(first) if pieces.iter().all(|s| s == first) => {
            lookup(&SAME_SPECIES_POINTS, pieces.len())
        }
        Some(_) => 0,
    }
}

fn different_species(pieces: &[Species]) -> u32 {
    let distinct: BTreeSet<_> = pieces.iter().collect();
    if distinct.len() != pieces.len() {
        return 0;
    }
    lookup(&DIFFERENT_SPECIES_POINTS, pieces.len())
}

fn pairwise(pieces: &[Species]) -> u32 {
    Species::ALL
        .iter()
        .map(|species| {
            let count = pieces.iter().filter(|&s| s == species).count() as u32;
            count / 2 * PAIR_POINTS
        })
        .sum()
}

fn exact_trio(pieces: &[Species]) -> u32 {
    trio_points(pieces.len())
}

fn trio_points(count: usize) -> u32 {
    if count == TRIO_SIZE {
        FLAT_POINTS
    } else {
        0
    }
}

fn majority(
    pieces: &[Species],
    board: &BoardContents,
    session: Option<&SessionBoards>,
) -> Result<u32, ScoreError> {
    let [species] = pieces else {
        return Ok(0);
    };
    let session = session.ok_or(ScoreError::MissingSessionContext)?;

    let own = board.count_of(*species);
    let best = session
        .values()
        .map(|other| other.count_of(*species))
        .max()
        .unwrap_or(0);

    // Every board tied at the top scores
    Ok(if own > 0 && own >= best { FLAT_POINTS } else { 0 })
}

fn uniqueness(pieces: &[Species], board: &BoardContents) -> u32 {
    let [species] = pieces else {
        return 0;
    };
    if board.count_of(*species) == 1 {
        FLAT_POINTS
    } else {
        0
    }
}

/// Best score a zone could reach holding `count` pieces
pub fn max_zone_score(zone: Zone, count: usize) -> u32 {
    match zone.rules().scoring {
        ScoringFormula::SameSpeciesTable => lookup(&SAME_SPECIES_POINTS, count),
        ScoringFormula::DifferentSpeciesTable => lookup(&DIFFERENT_SPECIES_POINTS, count),
        ScoringFormula::Pairwise => (count / 2) as u32 * PAIR_POINTS,
        ScoringFormula::ExactTrio => trio_points(count),
        ScoringFormula::Majority | ScoringFormula::Uniqueness => {
            if count == 1 {
                FLAT_POINTS
            } else {
                0
            }
        }
        ScoringFormula::Unbounded => count as u32,
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::sample::select;

    fn species() -> impl Strategy<Value = Species> {
        select(Species::ALL.to_vec())
    }

    fn zone_contents(zone: Zone) -> impl Strategy<Value = (Zone, Vec<Species>)> {
        vec(species(), 0..=zone.capacity()).prop_map(move |pieces| (zone, pieces))
    }

    fn any_board() -> impl Strategy<Value = BoardContents> {
        let zones: Vec<_> = Zone::ALL.into_iter().map(zone_contents).collect();
        zones.prop_map(BoardContents::from_zones)
    }

    proptest! {
        #[test]
        fn mixed_forest_scores_zero(
            mut pieces in vec(species(), 2..=6),
            a in species(),
            b in species(),
        ) {
            prop_assume!(a != b);
            pieces[0] = a;
            pieces[1] = b;
            prop_assert_eq!(same_species(&pieces), 0);
        }

        #[test]
        fn repeated_meadow_scores_zero(mut pieces in vec(species(), 2..=6), dup in species()) {
            pieces[0] = dup;
            let last = pieces.len() - 1;
            pieces[last] = dup;
            prop_assert_eq!(different_species(&pieces), 0);
        }

        #[test]
        fn scoring_is_idempotent(boards in vec(any_board(), 1..=5)) {
            let session: SessionBoards = boards
                .into_iter()
                .enumerate()
                .map(|(i, b)| (i as PlayerId, b))
                .collect();
            let first = score_session(&session).unwrap();
            let second = score_session(&session).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn zone_order_does_not_change_scores(b in any_board()) {
            let reversed = BoardContents::from_zones(
                b.iter().map(|(zone, pieces)| (zone, pieces.iter().rev().copied().collect())),
            );
            let session: SessionBoards = [(0, b.clone())].into_iter().collect();
            let reversed_session: SessionBoards = [(0, reversed.clone())].into_iter().collect();
            prop_assert_eq!(
                score_board(&b, Some(&session)).unwrap(),
                score_board(&reversed, Some(&reversed_session)).unwrap()
            );
        }

        #[test]
        fn total_is_sum_of_parts(b in any_board()) {
            let session: SessionBoards = [(0, b.clone())].into_iter().collect();
            let breakdown = score_board(&b, Some(&session)).unwrap();
            let zones: u32 = breakdown.per_zone.values().sum();
            prop_assert_eq!(breakdown.total, zones + breakdown.bonus);
            prop_assert!(breakdown.bonus <= 7);
        }
    }
}
