use std::collections::VecDeque;
use std::time::Duration;

use crate::net::{NetworkMessage, OutboundThrottler};
use crate::presence::{
    ApplyOutcome, LocalParticipant, Nearby, ProximityDetector, RemoteRegistry,
};
use crate::zone::{ZoneAction, ZoneEvent, ZoneMap, ZoneStateMachine, ZoneTable};

use super::config::{SessionInfo, SyncConfig};
use super::input::MoveInput;

pub const ZEN_TINT: u32 = 0x88_CC_FF;
const ZEN_START_ALERT: &str = "\u{1F9D8} You started meditating. Real-time stressors fading...";
const ZEN_END_ALERT: &str = "\u{1F6B6} Meditation ended. Ready to work!";

/// Something the presentation layer has to show or do after a zone interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Alert(String),
    OpenUrl(String),
    ConfirmLeave(String),
}

#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub messages_received: u64,
    pub messages_dropped: u64,
    pub room_mismatches: u64,
    pub messages_sent: u64,
    pub departures: u64,
    pub stale_pruned: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outbound: Option<String>,
    pub nearby: Option<u32>,
    pub zone_events: Vec<ZoneEvent>,
    pub joined: Vec<u32>,
    pub departed: Vec<u32>,
}

/// Drives one session: inbound lines, local motion, remote smoothing, proximity, zones and
/// outbound reports, all from a single tick.
pub struct SyncController {
    config: SyncConfig,
    room_id: Option<String>,
    local: LocalParticipant,
    registry: RemoteRegistry,
    proximity: ProximityDetector,
    zones: ZoneStateMachine,
    map: ZoneMap,
    throttler: OutboundThrottler,
    inbox: VecDeque<String>,
    zen_active: bool,
    stats: SyncStats,
}

impl SyncController {
    pub fn new(session: SessionInfo, config: SyncConfig, map: ZoneMap) -> Self {
        let local = LocalParticipant::from_session(&session);

        log::info!(
            "Session started for {} (id {}, room {:?})",
            local.name,
            local.id,
            session.room_id
        );

        Self {
            registry: RemoteRegistry::new(local.id, config.interpolation_window),
            proximity: ProximityDetector::new(config.interaction_radius),
            zones: ZoneStateMachine::new(ZoneTable::office()),
            throttler: OutboundThrottler::from_config(&config),
            inbox: VecDeque::new(),
            zen_active: false,
            stats: SyncStats::default(),
            room_id: session.room_id,
            local,
            map,
            config,
        }
    }

    pub fn with_zone_table(mut self, table: ZoneTable) -> Self {
        self.zones = ZoneStateMachine::new(table);
        self
    }

    /// Queues a raw inbound line. Lines are applied at the start of the next tick.
    pub fn enqueue(&mut self, line: impl Into<String>) {
        self.inbox.push_back(line.into());
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbox.len()
    }

    pub fn tick(&mut self, now: Duration, dt: Duration, input: MoveInput) -> TickReport {
        let mut report = TickReport::default();

        self.process_inbound(now, &mut report);

        input.apply(&mut self.local, dt, self.config.walk_speed);
        self.local.position = self.map.clamp(self.local.position);

        self.registry.advance(dt);

        if let Some(timeout) = self.config.stale_timeout {
            for id in self.registry.prune_stale(now, timeout) {
                log::info!("Player {} timed out", id);
                self.stats.stale_pruned += 1;
                report.departed.push(id);
            }
        }

        report.outbound = self
            .throttler
            .poll(now, &self.local, self.room_id.as_deref());
        if let Some(line) = &report.outbound {
            self.stats.messages_sent += 1;
            log::trace!("Sending {}", line);
        }

        report.nearby = self.nearest().map(|n| n.entity.id);

        if let Some(event) = self.zones.update(&self.map, self.local.position) {
            report.zone_events.push(event);
        }

        report
    }

    fn process_inbound(&mut self, now: Duration, report: &mut TickReport) {
        while let Some(line) = self.inbox.pop_front() {
            self.handle_line(&line, now, report);
        }
    }

    fn handle_line(&mut self, line: &str, now: Duration, report: &mut TickReport) {
        self.stats.messages_received += 1;

        let message = match NetworkMessage::decode(line) {
            Ok(message) => message,
            Err(err) => {
                self.stats.messages_dropped += 1;
                log::debug!("Dropping message {:?}: {}", line, err);
                return;
            }
        };

        match message {
            NetworkMessage::Broadcast(broadcast) => {
                if !self.accepts_room(broadcast.room_id.as_deref()) {
                    self.stats.room_mismatches += 1;
                    log::trace!(
                        "Room mismatch: message room {:?}, local room {:?}",
                        broadcast.room_id,
                        self.room_id
                    );
                    return;
                }

                if self.registry.apply_broadcast(&broadcast, now) == ApplyOutcome::Spawned {
                    log::info!("Player {} ({}) joined", broadcast.id, broadcast.name);
                    report.joined.push(broadcast.id);
                }
            }
            NetworkMessage::Departure { id } => match self.registry.apply_departure(id) {
                Some(entity) => {
                    log::info!("Player {} ({}) left the game", id, entity.name);
                    self.stats.departures += 1;
                    report.departed.push(id);
                }
                None => log::debug!("Departure for unknown player {}", id),
            },
        }
    }

    /// Legacy broadcasts carry no room and are always accepted.
    pub fn accepts_room(&self, message_room: Option<&str>) -> bool {
        match message_room {
            None => true,
            Some(room) => self.room_id.as_deref() == Some(room),
        }
    }

    pub fn nearest(&self) -> Option<Nearby<'_>> {
        self.proximity
            .find_nearest(&self.registry, self.local.position)
    }

    /// Target for a proximity chat with whoever is closest.
    pub fn interact_nearby(&self) -> Option<u32> {
        let id = self.nearest()?.entity.id;
        log::info!("Initiated proximity chat with player {}", id);
        Some(id)
    }

    pub fn interact_zone(&mut self) -> Option<Effect> {
        let zone = self.zones.current()?;
        log::info!("Interacting with zone: {}", zone);

        let effect = match self.zones.interact()? {
            ZoneAction::Alert(message) => Effect::Alert(message.clone()),
            ZoneAction::OpenUrl(url) => Effect::OpenUrl(url.clone()),
            ZoneAction::ConfirmLeave(message) => Effect::ConfirmLeave(message.clone()),
            ZoneAction::ToggleZen => {
                self.zen_active = !self.zen_active;
                log::debug!("Zen mode: {}", self.zen_active);
                let message = if self.zen_active {
                    ZEN_START_ALERT
                } else {
                    ZEN_END_ALERT
                };
                Effect::Alert(message.to_string())
            }
        };
        Some(effect)
    }

    pub fn zen_active(&self) -> bool {
        self.zen_active
    }

    /// Tint the renderer should apply to the local avatar.
    pub fn tint(&self) -> u32 {
        if self.zen_active {
            ZEN_TINT
        } else {
            self.local.skin
        }
    }

    pub fn local(&self) -> &LocalParticipant {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut LocalParticipant {
        &mut self.local
    }

    pub fn registry(&self) -> &RemoteRegistry {
        &self.registry
    }

    pub fn zones(&self) -> &ZoneStateMachine {
        &self.zones
    }

    pub fn map(&self) -> &ZoneMap {
        &self.map
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }
}
