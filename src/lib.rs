//! # Algo Duel
//!
//! Turn-based battle engine for an algorithm-themed dueling game, with a thin
//! JSON API in front of it.
//!
//! ## Overview
//!
//! A player fights an AI opponent by picking moves from a catalog. Timed moves
//! open a reaction challenge whose grade (PERFECT, GREAT, GOOD, MISS) scales
//! the move's effect, and consecutive PERFECT hits build a combo. The engine
//! lives in [`engine`]; the move catalog and opponent roster in [`catalog`].
//!
//! ## Architecture
//!
//! [`engine::DuelEngine`] is a synchronous state machine: every intent returns
//! a fresh [`engine::types::BattleSnapshot`] or a typed rejection. The Rocket
//! host keeps one engine behind an `Arc<Mutex<T>>` and forwards requests to
//! it; the oscillating timing marker is driven by `POST /battle/tick`.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod action;
pub mod actions_log;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod status_messages;

use crate::config::EngineConfig;
use crate::engine::DuelEngine;

/// Initializes and configures the Rocket web server with all routes and OpenAPI documentation.
///
/// The engine is built on ignite from the `duel` section of the Rocket
/// configuration; an invalid configuration aborts ignition.
///
/// # Example
///
/// ```no_run
/// use algo_duel::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     rocket_initialize().launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> Rocket<Build> {
    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    mount_routes(rocket::build()).attach(AdHoc::try_on_ignite("duel engine", |rocket| {
        Box::pin(async move {
            let config = EngineConfig::from_figment(rocket.figment());
            match DuelEngine::with_defaults(config) {
                Ok(engine) => Ok(rocket.manage(engine::shared(engine))),
                Err(e) => {
                    log::error!("cannot start duel engine: {e}");
                    Err(rocket)
                }
            }
        })
    }))
}

/// Same routes as [`rocket_initialize`], serving an engine built by the caller.
pub fn rocket_with_engine(engine: DuelEngine) -> Rocket<Build> {
    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    mount_routes(rocket::build()).manage(engine::shared(engine))
}

fn mount_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    use crate::action::okapi_add_operation_for_play_;
    use crate::action::play;
    use crate::actions_log::list_actions_log;
    use crate::actions_log::okapi_add_operation_for_list_actions_log_;
    use crate::catalog::{
        list_moves, list_opponents, okapi_add_operation_for_list_moves_,
        okapi_add_operation_for_list_opponents_,
    };
    use crate::engine::{
        get_battle, get_battle_result, okapi_add_operation_for_get_battle_,
        okapi_add_operation_for_get_battle_result_, okapi_add_operation_for_tick_battle_,
        tick_battle,
    };

    rocket
        .mount(
            "/",
            openapi_get_routes![
                get_battle,
                get_battle_result,
                tick_battle,
                play,
                list_actions_log,
                list_moves,
                list_opponents
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
