use rocket::serde::json::Json;
use rocket_okapi::openapi;

use crate::engine::action_log::{ActionEntry, DEFAULT_PAGE_LIMIT};
use crate::engine::SharedEngine;

#[derive(rocket::serde::Serialize, rocket::serde::Deserialize, rocket_okapi::JsonSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ActionLogResponse {
    pub entries: Vec<ActionEntry>,
    pub next_seq: Option<u64>,
    pub limit: usize,
}

/// Page through accepted intents, oldest first. Pass `next_seq` back as
/// `from_seq` to continue.
#[openapi]
#[get("/actions/log?<from_seq>&<limit>&<action_type>")]
pub async fn list_actions_log(
    from_seq: Option<u64>,
    limit: Option<usize>,
    action_type: Option<String>,
    engine: &rocket::State<SharedEngine>,
) -> Json<ActionLogResponse> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let page = engine
        .lock()
        .await
        .action_log()
        .page(from_seq, limit, action_type.as_deref());
    Json(ActionLogResponse {
        entries: page.entries,
        next_seq: page.next_seq,
        limit,
    })
}
