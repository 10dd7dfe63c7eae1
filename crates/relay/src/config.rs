pub const DEFAULT_PORT: u16 = 7878;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub max_clients: usize,
    pub channel_capacity: usize,
    pub max_line_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_clients: 64,
            channel_capacity: 1024,
            max_line_len: 4096,
        }
    }
}
