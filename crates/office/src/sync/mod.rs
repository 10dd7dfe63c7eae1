mod config;
mod controller;
mod input;

pub use config::{generate_participant_id, SessionInfo, SyncConfig, DEFAULT_WALK_SPEED};
pub use controller::{Effect, SyncController, SyncStats, TickReport, ZEN_TINT};
pub use input::MoveInput;
