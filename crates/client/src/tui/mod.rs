mod render;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use officeverse::MoveInput;

use crate::app::App;

/// Terminals rarely report key releases, so a direction counts as held for this long after
/// its last press or repeat.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    InteractZone,
    InteractNearby,
    Confirm(bool),
}

#[derive(Debug, Default)]
pub struct HeldKeys {
    left: Option<Instant>,
    right: Option<Instant>,
    up: Option<Instant>,
    down: Option<Instant>,
}

impl HeldKeys {
    fn slot(&mut self, code: KeyCode) -> Option<&mut Option<Instant>> {
        match code {
            KeyCode::Left => Some(&mut self.left),
            KeyCode::Right => Some(&mut self.right),
            KeyCode::Up => Some(&mut self.up),
            KeyCode::Down => Some(&mut self.down),
            _ => None,
        }
    }

    /// Returns false when the key is not a direction.
    pub fn record(&mut self, code: KeyCode, kind: KeyEventKind, now: Instant) -> bool {
        let Some(slot) = self.slot(code) else {
            return false;
        };
        *slot = match kind {
            KeyEventKind::Release => None,
            _ => Some(now),
        };
        true
    }

    pub fn input(&self, now: Instant) -> MoveInput {
        let held = |at: Option<Instant>| at.is_some_and(|t| now.duration_since(t) <= HOLD_WINDOW);

        let mut input = MoveInput::empty();
        input.set(MoveInput::LEFT, held(self.left));
        input.set(MoveInput::RIGHT, held(self.right));
        input.set(MoveInput::UP, held(self.up));
        input.set(MoveInput::DOWN, held(self.down));
        input
    }
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    held: HeldKeys,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            held: HeldKeys::default(),
        })
    }

    pub fn run(&mut self, app: &mut App, tick_interval: Duration) -> io::Result<()> {
        let mut next_tick = Instant::now();

        while !app.should_quit() {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    let action = self.handle_key(key, app.pending_confirm().is_some());
                    apply_action(app, action);
                }
            }

            let now = Instant::now();
            if now < next_tick {
                continue;
            }
            app.tick(self.held.input(now));
            next_tick = now + tick_interval;

            self.terminal.draw(|frame| render::render(frame, app))?;
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, confirming: bool) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if self.held.record(key.code, key.kind, Instant::now()) {
            return Action::None;
        }
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }

        if confirming {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::Confirm(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::Confirm(false),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('f') | KeyCode::Char('F') => Action::InteractZone,
            KeyCode::Char('e') | KeyCode::Char('E') => Action::InteractNearby,
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

fn apply_action(app: &mut App, action: Action) {
    match action {
        Action::None => {}
        Action::Quit => app.quit(),
        Action::InteractZone => app.interact_zone(),
        Action::InteractNearby => app.interact_nearby(),
        Action::Confirm(accept) => app.confirm(accept),
    }
}

pub fn run(app: &mut App, tick_interval: Duration) -> io::Result<()> {
    let mut tui = Tui::new()?;
    let result = tui.run(app, tick_interval);
    tui.restore_terminal()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_expire_after_hold_window() {
        let mut held = HeldKeys::default();
        let start = Instant::now();

        assert!(held.record(KeyCode::Left, KeyEventKind::Press, start));
        assert!(held.record(KeyCode::Up, KeyEventKind::Repeat, start));
        assert_eq!(held.input(start), MoveInput::LEFT | MoveInput::UP);

        assert_eq!(held.input(start + HOLD_WINDOW * 2), MoveInput::empty());
    }

    #[test]
    fn release_clears_immediately() {
        let mut held = HeldKeys::default();
        let start = Instant::now();

        held.record(KeyCode::Right, KeyEventKind::Press, start);
        held.record(KeyCode::Right, KeyEventKind::Release, start);
        assert_eq!(held.input(start), MoveInput::empty());
    }

    #[test]
    fn other_keys_are_not_directions() {
        let mut held = HeldKeys::default();
        assert!(!held.record(KeyCode::Char('f'), KeyEventKind::Press, Instant::now()));
    }
}
