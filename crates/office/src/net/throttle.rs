use std::time::Duration;

use crate::presence::LocalParticipant;
use crate::sync::SyncConfig;

use super::protocol::Broadcast;

/// Rate limits outbound presence reports: prompt while moving, a slow heartbeat otherwise.
#[derive(Debug, Clone)]
pub struct OutboundThrottler {
    move_interval: Duration,
    heartbeat_interval: Duration,
    last_sent_at: Option<Duration>,
}

impl OutboundThrottler {
    pub fn new(move_interval: Duration, heartbeat_interval: Duration) -> Self {
        Self {
            move_interval,
            heartbeat_interval,
            last_sent_at: None,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.move_send_interval, config.heartbeat_interval)
    }

    pub fn should_send(&self, now: Duration, moving: bool) -> bool {
        let Some(last) = self.last_sent_at else {
            return true;
        };
        let interval = if moving {
            self.move_interval
        } else {
            self.heartbeat_interval
        };
        now.saturating_sub(last) >= interval
    }

    pub fn mark_sent(&mut self, now: Duration) {
        self.last_sent_at = Some(now);
    }

    /// Returns the encoded presence line when one is due and records the send.
    pub fn poll(
        &mut self,
        now: Duration,
        local: &LocalParticipant,
        room_id: Option<&str>,
    ) -> Option<String> {
        if !self.should_send(now, local.is_moving()) {
            return None;
        }
        self.mark_sent(now);
        Some(Broadcast::from_local(local, room_id).encode())
    }

    pub fn last_sent_at(&self) -> Option<Duration> {
        self.last_sent_at
    }

    pub fn reset(&mut self) {
        self.last_sent_at = None;
    }
}
