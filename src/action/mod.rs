use either::{Either, Left, Right};
use rocket::response::status::{BadRequest, NotFound};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::engine::action_log::ActionEntry;
use crate::engine::types::{BattleSnapshot, EngineError, IntentResult};
use crate::engine::SharedEngine;
use crate::status_messages::{new_status, Status};

/// Player intents
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "action_type")]
pub enum PlayerActions {
    StartBattle {
        opponent_id: String,
    },
    SelectMove {
        move_id: String,
    },
    /// Grade the current stage at the live marker position.
    SubmitTiming,
    PassTurn,
    AdvanceAi,
    Rematch,
    ReturnToMenu,
    SetSeed {
        seed: u64,
    },
}

/// Logged entry for the accepted intent and the snapshot it produced.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ActionOutcome {
    pub entry: Option<ActionEntry>,
    pub snapshot: BattleSnapshot,
}

type ActionError = Either<NotFound<Json<Status>>, BadRequest<Json<Status>>>;

fn accepted(
    entry: Option<ActionEntry>,
    snapshot: BattleSnapshot,
) -> (rocket::http::Status, Json<ActionOutcome>) {
    (
        rocket::http::Status::Created,
        Json(ActionOutcome { entry, snapshot }),
    )
}

fn from_intent(result: IntentResult) -> Result<BattleSnapshot, ActionError> {
    result.map_err(|rejected| Right(BadRequest(new_status(rejected.reason.to_string()))))
}

#[openapi]
#[post("/action", format = "json", data = "<player_action>")]
pub async fn play(
    engine: &State<SharedEngine>,
    player_action: Json<PlayerActions>,
) -> Result<(rocket::http::Status, Json<ActionOutcome>), ActionError> {
    let mut engine = engine.lock().await;

    let snapshot = match player_action.0 {
        PlayerActions::StartBattle { opponent_id } => match engine.start_battle(&opponent_id) {
            Ok(snapshot) => snapshot,
            Err(e @ EngineError::UnknownOpponent(_)) => {
                return Err(Left(NotFound(new_status(e.to_string()))))
            }
            Err(e) => return Err(Right(BadRequest(new_status(e.to_string())))),
        },
        PlayerActions::SelectMove { move_id } => from_intent(engine.select_player_move(&move_id))?,
        PlayerActions::SubmitTiming => from_intent(engine.submit_timing_input())?,
        PlayerActions::PassTurn => from_intent(engine.pass_turn())?,
        PlayerActions::AdvanceAi => from_intent(engine.advance_ai_turn())?,
        PlayerActions::Rematch => from_intent(engine.rematch())?,
        PlayerActions::ReturnToMenu => engine.return_to_menu(),
        PlayerActions::SetSeed { seed } => from_intent(engine.set_seed(seed))?,
    };
    Ok(accepted(engine.action_log().last(), snapshot))
}
