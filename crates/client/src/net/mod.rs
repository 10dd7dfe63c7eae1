pub mod config;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_SERVER_ADDR};
pub use transport::{LineTransport, TransportEvent, TransportStats};
