pub mod net;
pub mod presence;
pub mod sync;
pub mod zone;

pub use net::{
    Broadcast, FramingError, LineFramer, NetworkMessage, OutboundThrottler, ParseError,
};
pub use presence::{
    Character, LocalParticipant, MotionState, Nearby, ProximityDetector, RemoteEntity,
    RemoteRegistry,
};
pub use sync::{
    Effect, MoveInput, SessionInfo, SyncConfig, SyncController, SyncStats, TickReport,
};
pub use zone::{
    MapError, Region, Zone, ZoneAction, ZoneEvent, ZoneGeometry, ZoneMap, ZoneState,
    ZoneStateMachine, ZoneTable,
};
