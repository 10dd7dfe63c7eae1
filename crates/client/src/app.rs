use std::collections::VecDeque;
use std::time::{Duration, Instant};

use officeverse::{Effect, MoveInput, SyncController, TickReport, ZoneEvent};

use crate::net::{ClientConfig, LineTransport, TransportEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Alert,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// One participant's view of the office: the sync controller plus the transport feeding it
/// and whatever the user has to be shown.
pub struct App {
    sync: SyncController,
    transport: Option<LineTransport>,
    started: Instant,
    last_tick: Instant,
    notices: VecDeque<Notice>,
    max_notices: usize,
    zone_prompt: Option<String>,
    nearby: Option<u32>,
    pending_confirm: Option<String>,
    chat_target: Option<u32>,
    should_quit: bool,
}

impl App {
    pub fn new(
        sync: SyncController,
        transport: Option<LineTransport>,
        config: &ClientConfig,
    ) -> Self {
        let now = Instant::now();
        Self {
            sync,
            transport,
            started: now,
            last_tick: now,
            notices: VecDeque::new(),
            max_notices: config.max_alerts.max(1),
            zone_prompt: None,
            nearby: None,
            pending_confirm: None,
            chat_target: None,
            should_quit: false,
        }
    }

    pub fn tick(&mut self, input: MoveInput) -> TickReport {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.step(now.duration_since(self.started), dt, input)
    }

    /// Runs one tick at an explicit session time.
    pub fn step(&mut self, elapsed: Duration, dt: Duration, input: MoveInput) -> TickReport {
        self.pump_transport();

        let report = self.sync.tick(elapsed, dt, input);

        if let (Some(line), Some(transport)) = (&report.outbound, &mut self.transport) {
            transport.send(line.clone());
        }

        self.nearby = report.nearby;

        for event in &report.zone_events {
            match event {
                ZoneEvent::Entered { prompt, .. } => self.zone_prompt = Some(prompt.clone()),
                ZoneEvent::Left { .. } => self.zone_prompt = None,
            }
        }
        for id in &report.joined {
            let name = self
                .sync
                .registry()
                .get(*id)
                .map(|e| e.name.clone())
                .unwrap_or_default();
            self.notify(NoticeKind::Info, format!("{} joined", name));
        }
        for id in &report.departed {
            self.notify(NoticeKind::Info, format!("Player {} left", id));
            if self.chat_target == Some(*id) {
                self.chat_target = None;
            }
        }

        report
    }

    fn pump_transport(&mut self) {
        let Some(transport) = &mut self.transport else {
            return;
        };
        let was_closed = transport.is_closed();

        for event in transport.drain() {
            match event {
                TransportEvent::Line(line) => self.sync.enqueue(line),
                TransportEvent::Closed => {}
            }
        }

        if !was_closed && transport.is_closed() {
            log::warn!("Connection to {} lost", transport.peer());
            self.notify(NoticeKind::Warn, "Disconnected from server".to_string());
        }
    }

    pub fn interact_zone(&mut self) {
        if self.pending_confirm.is_some() {
            return;
        }
        match self.sync.interact_zone() {
            Some(Effect::Alert(message)) => self.notify(NoticeKind::Alert, message),
            Some(Effect::OpenUrl(url)) => {
                log::info!("Opening {}", url);
                self.notify(NoticeKind::Alert, format!("Open {} to join the meeting", url));
            }
            Some(Effect::ConfirmLeave(message)) => self.pending_confirm = Some(message),
            None => {}
        }
    }

    pub fn interact_nearby(&mut self) {
        if let Some(id) = self.sync.interact_nearby() {
            self.chat_target = Some(id);
            let name = self
                .sync
                .registry()
                .get(id)
                .map(|e| e.name.clone())
                .unwrap_or_default();
            self.notify(NoticeKind::Info, format!("Chatting with {}", name));
        }
    }

    /// Answers the pending leave confirmation. Accepting leaves the office.
    pub fn confirm(&mut self, accept: bool) {
        if self.pending_confirm.take().is_some() && accept {
            log::info!("Leaving the office");
            self.should_quit = true;
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn notify(&mut self, kind: NoticeKind, text: String) {
        if self.notices.len() == self.max_notices {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { kind, text });
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn zone_prompt(&self) -> Option<&str> {
        self.zone_prompt.as_deref()
    }

    pub fn nearby(&self) -> Option<u32> {
        self.nearby
    }

    pub fn pending_confirm(&self) -> Option<&str> {
        self.pending_confirm.as_deref()
    }

    pub fn chat_target(&self) -> Option<u32> {
        self.chat_target
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| !t.is_closed())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Stationary participant: heartbeats and logs presence changes until the connection drops.
pub fn run_headless(app: &mut App, tick_interval: Duration) {
    log::info!(
        "Running headless as {} (id {})",
        app.sync().local().name,
        app.sync().local().id
    );

    loop {
        let report = app.tick(MoveInput::empty());
        for id in report.joined {
            if let Some(entity) = app.sync().registry().get(id) {
                log::info!("{} is here at {:?}", entity.name, entity.target());
            }
        }
        if !app.is_connected() {
            log::info!("Server connection closed");
            break;
        }
        std::thread::sleep(tick_interval);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use officeverse::{SessionInfo, SyncConfig, ZoneMap};

    use super::*;

    const TICK: Duration = Duration::from_millis(16);

    fn offline_app() -> App {
        let session = SessionInfo {
            id: 1,
            name: "Me".to_string(),
            ..SessionInfo::default()
        }
        .with_room("1001");
        let sync = SyncController::new(session, SyncConfig::default(), ZoneMap::default_office());
        App::new(sync, None, &ClientConfig::default())
    }

    fn move_to_zone(app: &mut App, zone: &str) {
        let center = app.sync().map().zone(zone).unwrap().region.center();
        app.sync.local_mut().position = center;
        app.step(Duration::ZERO, TICK, MoveInput::empty());
    }

    #[test]
    fn zone_prompt_follows_zone_events() {
        let mut app = offline_app();
        move_to_zone(&mut app, "gaming");
        assert_eq!(app.zone_prompt(), Some("[F] Play Mini-Game"));

        app.sync.local_mut().position = Vec2::new(10.0, 10.0);
        app.step(TICK, TICK, MoveInput::empty());
        assert_eq!(app.zone_prompt(), None);
    }

    #[test]
    fn exit_needs_confirmation() {
        let mut app = offline_app();
        move_to_zone(&mut app, "exit");

        app.interact_zone();
        assert_eq!(
            app.pending_confirm(),
            Some("Are you sure you want to leave the office?")
        );
        app.confirm(false);
        assert!(!app.should_quit());
        assert!(app.pending_confirm().is_none());

        app.interact_zone();
        app.confirm(true);
        assert!(app.should_quit());
    }

    #[test]
    fn alerts_are_bounded() {
        let mut app = offline_app();
        app.max_notices = 2;
        move_to_zone(&mut app, "coffeeCorner");

        for _ in 0..5 {
            app.interact_zone();
        }
        assert_eq!(app.notices().count(), 2);
        assert!(app.notices().all(|n| n.kind == NoticeKind::Alert));
    }

    #[test]
    fn nearby_participant_becomes_chat_target() {
        let mut app = offline_app();
        app.sync.local_mut().position = Vec2::new(200.0, 200.0);
        app.sync.enqueue("Broadcast:1001:9:230:200:Bo:0:dude:idle:0");
        app.step(Duration::ZERO, TICK, MoveInput::empty());
        assert_eq!(app.nearby(), Some(9));

        app.interact_nearby();
        assert_eq!(app.chat_target(), Some(9));

        app.sync.enqueue("PlayerLeft:9");
        app.step(TICK, TICK, MoveInput::empty());
        assert_eq!(app.chat_target(), None);
        assert_eq!(app.nearby(), None);
    }
}
