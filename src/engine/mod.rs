//! Turn-based battle simulation engine.
//!
//! Leaf first: [`ledger`] keeps one combatant's resources, [`timing`] runs the
//! reaction minigame, [`damage`] turns a graded move into an amount, [`ai`]
//! plays the opponent, and [`DuelEngine`] ties them together as the one state
//! machine the host drives.

pub mod action_log;
pub mod ai;
pub mod damage;
mod duel;
mod endpoints;
pub mod event_log;
pub mod ledger;
pub mod session;
pub mod timing;
pub mod types;

pub use duel::DuelEngine;
pub use endpoints::{
    get_battle, get_battle_result, okapi_add_operation_for_get_battle_,
    okapi_add_operation_for_get_battle_result_, okapi_add_operation_for_tick_battle_,
    tick_battle,
};

/// The engine as managed by the host: one instance behind an async mutex.
pub type SharedEngine = std::sync::Arc<rocket::futures::lock::Mutex<DuelEngine>>;

pub fn shared(engine: DuelEngine) -> SharedEngine {
    std::sync::Arc::new(rocket::futures::lock::Mutex::new(engine))
}
