use super::types::{Move, OpponentProfile};
use crate::engine::SharedEngine;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// All moves the player can select.
#[openapi]
#[get("/catalog/moves")]
pub async fn list_moves(engine: &State<SharedEngine>) -> Json<Vec<Move>> {
    let engine = engine.lock().await;
    Json(engine.catalog().moves.clone())
}

/// All opponents a battle can be started against.
#[openapi]
#[get("/catalog/opponents")]
pub async fn list_opponents(engine: &State<SharedEngine>) -> Json<Vec<OpponentProfile>> {
    let engine = engine.lock().await;
    Json(engine.roster().opponents.clone())
}
