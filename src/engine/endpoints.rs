use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::types::{BattleResult, BattleSnapshot};
use super::SharedEngine;

/// Current battle snapshot; the menu snapshot when no battle is running.
#[openapi]
#[get("/battle")]
pub async fn get_battle(engine: &State<SharedEngine>) -> Json<BattleSnapshot> {
    Json(engine.lock().await.snapshot())
}

/// Final result of the last battle; `null` unless it ended in victory or defeat.
#[openapi]
#[get("/battle/result")]
pub async fn get_battle_result(engine: &State<SharedEngine>) -> Json<Option<BattleResult>> {
    Json(engine.lock().await.result())
}

/// Advance the timing marker by `dt` seconds. Ticks outside a timing challenge are ignored.
#[openapi]
#[post("/battle/tick?<dt>")]
pub async fn tick_battle(dt: f32, engine: &State<SharedEngine>) -> Json<BattleSnapshot> {
    Json(engine.lock().await.tick(dt))
}
