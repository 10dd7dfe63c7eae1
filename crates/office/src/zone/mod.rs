mod machine;
mod map;
mod table;

pub use machine::{ZoneEvent, ZoneState, ZoneStateMachine};
pub use map::{MapError, Region, Zone, ZoneGeometry, ZoneMap, UNNAMED_ZONE, ZONE_LAYER};
pub use table::{ZoneAction, ZoneBinding, ZoneTable, GENERIC_PROMPT};
