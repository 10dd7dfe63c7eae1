use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::Duration;

use crate::presence::{
    Character, DEFAULT_INTERACTION_RADIUS, DEFAULT_INTERPOLATION_MS, DEFAULT_SKIN,
};

pub const DEFAULT_WALK_SPEED: f32 = 125.0;
pub const MAX_GENERATED_ID: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interaction_radius: f32,
    pub interpolation_window: Duration,
    pub move_send_interval: Duration,
    pub heartbeat_interval: Duration,
    pub walk_speed: f32,
    pub stale_timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            interpolation_window: Duration::from_millis(DEFAULT_INTERPOLATION_MS),
            move_send_interval: Duration::from_millis(50),
            heartbeat_interval: Duration::from_millis(1000),
            walk_speed: DEFAULT_WALK_SPEED,
            stale_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Who the local participant is and which room it joined.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: u32,
    pub name: String,
    pub skin: u32,
    pub character: Character,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub room_code: Option<String>,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            id: generate_participant_id(),
            name: String::from("Player"),
            skin: DEFAULT_SKIN,
            character: Character::default(),
            room_id: None,
            room_name: None,
            room_code: None,
        }
    }
}

impl SessionInfo {
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }
}

pub fn generate_participant_id() -> u32 {
    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
    );
    (hasher.finish() % MAX_GENERATED_ID as u64) as u32
}
