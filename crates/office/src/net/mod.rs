mod framing;
mod protocol;
mod throttle;

pub use framing::{FramingError, LineFramer, DEFAULT_MAX_LINE_LEN};
pub use protocol::{
    encode_departure, sanitize_field, Broadcast, NetworkMessage, ParseError, BROADCAST_MARKER,
    DEFAULT_NAME, DELIMITER, DEPARTURE_MARKER, MAX_SKIN,
};
pub use throttle::OutboundThrottler;
