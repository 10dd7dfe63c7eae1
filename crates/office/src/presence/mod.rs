mod participant;
mod proximity;
mod registry;

pub use participant::{Character, LocalParticipant, MotionState, DEFAULT_SKIN, SPAWN_POSITION};
pub use proximity::{
    find_nearest, Nearby, ProximityDetector, DEFAULT_INTERACTION_RADIUS, INTERACTION_PROMPT,
};
pub use registry::{ApplyOutcome, RemoteEntity, RemoteRegistry, DEFAULT_INTERPOLATION_MS};
