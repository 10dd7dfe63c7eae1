use std::time::Duration;

use officeverse::net::DEFAULT_MAX_LINE_LEN;

pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:7878";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    pub tick_rate: u32,
    pub connect_timeout_secs: u64,
    pub max_alerts: usize,
    pub max_line_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: String::from(DEFAULT_SERVER_ADDR),
            tick_rate: 60,
            connect_timeout_secs: 10,
            max_alerts: 64,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl ClientConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
