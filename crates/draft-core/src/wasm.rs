//! WebAssembly bindings for the rules engine.
//!
//! Boards cross the boundary as JSON objects keyed by zone id, e.g.
//! `{"river": ["trex"], "woody_trio": []}`.

use wasm_bindgen::prelude::*;

use crate::board::{BoardContents, RawBoard, SessionBoards};
use crate::dice::DiceFace;
use crate::score::{max_zone_score, score_board};
use crate::session::Session;
use crate::validate::{validate_raw, Verdict};
use crate::zone::Zone;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_err("Serialization failed", e))
}

/// Validate a placement, returning a `{legal, reason}` verdict as JSON
#[wasm_bindgen(js_name = validatePlacement)]
pub fn validate_placement(
    zone: &str,
    species: &str,
    contents_json: &str,
    board_json: Option<String>,
    dice: Option<String>,
) -> Result<String, JsValue> {
    let contents: Vec<String> =
        serde_json::from_str(contents_json).map_err(|e| js_err("Invalid zone contents", e))?;
    let board: Option<RawBoard> = board_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| js_err("Invalid board", e))?;

    let verdict = Verdict::from(validate_raw(
        zone,
        species,
        &contents,
        board.as_ref(),
        dice.as_deref(),
    ));
    to_json(&verdict)
}

/// Score a board; `session_json` maps player ids to boards
#[wasm_bindgen(js_name = scoreBoard)]
pub fn score_board_json(board_json: &str, session_json: Option<String>) -> Result<String, JsValue> {
    let board: BoardContents =
        serde_json::from_str(board_json).map_err(|e| js_err("Invalid board", e))?;
    let session: Option<SessionBoards> = session_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| js_err("Invalid session", e))?;

    let breakdown =
        score_board(&board, session.as_ref()).map_err(|e| js_err("Scoring failed", e))?;
    to_json(&breakdown)
}

/// Zones eligible under a die face, as a JSON array of zone ids
#[wasm_bindgen(js_name = validZones)]
pub fn valid_zones(dice: &str) -> Result<String, JsValue> {
    let face: DiceFace = dice.parse().map_err(|e| js_err("Invalid die face", e))?;
    to_json(&face.eligible_zones())
}

/// Best score a zone can reach with `count` pieces
#[wasm_bindgen(js_name = maxZoneScore)]
pub fn max_zone_score_js(zone: &str, count: usize) -> Result<u32, JsValue> {
    let zone: Zone = zone.parse().map_err(|e| js_err("Invalid zone", e))?;
    Ok(max_zone_score(zone, count))
}

/// A local session for hot-seat play in the browser
#[wasm_bindgen]
pub struct WasmSession {
    session: Session,
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new(player_count: u8) -> Result<WasmSession, JsValue> {
        let mut session = Session::new(player_count as usize);
        for player in 0..player_count {
            session.join(player).map_err(|e| js_err("Join failed", e))?;
        }
        Ok(WasmSession { session })
    }

    /// Roll the die, returning the face id
    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self) -> String {
        self.session.roll_dice(&mut rand::thread_rng()).to_string()
    }

    /// Place a piece under the active die face
    #[wasm_bindgen(js_name = place)]
    pub fn place(&mut self, player: u8, zone: &str, species: &str) -> Result<(), JsValue> {
        let zone = zone.parse().map_err(|e| js_err("Invalid zone", e))?;
        let species = species.parse().map_err(|e| js_err("Invalid species", e))?;
        self.session
            .place(player, zone, species)
            .map_err(|e| js_err("Placement failed", e))
    }

    /// Whole session state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<String, JsValue> {
        to_json(&self.session)
    }

    /// Score breakdown for every player as JSON
    #[wasm_bindgen(js_name = getScores)]
    pub fn get_scores(&self) -> Result<String, JsValue> {
        let scores = self
            .session
            .scores()
            .map_err(|e| js_err("Scoring failed", e))?;
        to_json(&scores)
    }
}
