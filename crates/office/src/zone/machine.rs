use glam::Vec2;

use super::map::ZoneGeometry;
use super::table::{ZoneAction, ZoneTable};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ZoneState {
    #[default]
    Idle,
    InZone(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneEvent {
    Entered { name: String, prompt: String },
    Left { name: String },
}

/// Tracks the zone the local participant stands in and resolves its prompt and action.
#[derive(Debug, Clone, Default)]
pub struct ZoneStateMachine {
    table: ZoneTable,
    state: ZoneState,
}

impl ZoneStateMachine {
    pub fn new(table: ZoneTable) -> Self {
        Self {
            table,
            state: ZoneState::Idle,
        }
    }

    pub fn state(&self) -> &ZoneState {
        &self.state
    }

    pub fn current(&self) -> Option<&str> {
        match &self.state {
            ZoneState::Idle => None,
            ZoneState::InZone(name) => Some(name),
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        self.current().map(|name| self.table.prompt(name))
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Overlap check for one tick. When several zones overlap the point, the last one in map
    /// order wins.
    pub fn update<G>(&mut self, geometry: &G, position: Vec2) -> Option<ZoneEvent>
    where
        G: ZoneGeometry + ?Sized,
    {
        let overlapping = geometry
            .zones()
            .iter()
            .rev()
            .find(|zone| geometry.overlaps(zone, position))
            .map(|zone| zone.name.as_str());
        self.observe(overlapping)
    }

    pub fn observe(&mut self, overlapping: Option<&str>) -> Option<ZoneEvent> {
        match overlapping {
            Some(name) if self.current() == Some(name) => None,
            Some(name) => {
                let prompt = self.table.prompt(name).to_string();
                log::info!("Entered zone: {}", name);
                self.state = ZoneState::InZone(name.to_string());
                Some(ZoneEvent::Entered {
                    name: name.to_string(),
                    prompt,
                })
            }
            None => match std::mem::take(&mut self.state) {
                ZoneState::Idle => None,
                ZoneState::InZone(name) => {
                    log::debug!("Left zone: {}", name);
                    Some(ZoneEvent::Left { name })
                }
            },
        }
    }

    /// Action bound to the current zone, if any. Does nothing while idle.
    pub fn interact(&self) -> Option<&ZoneAction> {
        let name = self.current()?;
        let action = self.table.action(name);
        if action.is_none() {
            log::debug!("No interaction bound to zone {}", name);
        }
        action
    }

    pub fn reset(&mut self) {
        self.state = ZoneState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::map::{Region, Zone};

    fn zones() -> Vec<Zone> {
        vec![
            Zone::new("coffeeCorner", Region::rect(0.0, 0.0, 100.0, 100.0)),
            Zone::new("zenZone", Region::rect(100.0, 0.0, 100.0, 100.0)),
            Zone::new("broomCloset", Region::rect(300.0, 0.0, 50.0, 50.0)),
        ]
    }

    #[test]
    fn entering_fires_once() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();

        assert_eq!(machine.update(&zones, Vec2::new(-10.0, 50.0)), None);

        let entered = machine.update(&zones, Vec2::new(50.0, 50.0));
        assert_eq!(
            entered,
            Some(ZoneEvent::Entered {
                name: "coffeeCorner".to_string(),
                prompt: "[F] Grab Coffee".to_string(),
            })
        );

        for step in 0..10 {
            let position = Vec2::new(50.0 + step as f32, 50.0);
            assert_eq!(machine.update(&zones, position), None);
        }
        assert_eq!(machine.current(), Some("coffeeCorner"));
    }

    #[test]
    fn shifting_between_zones_skips_idle() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();
        machine.update(&zones, Vec2::new(50.0, 50.0));

        let event = machine.update(&zones, Vec2::new(150.0, 50.0));
        assert!(matches!(event, Some(ZoneEvent::Entered { ref name, .. }) if name == "zenZone"));
        assert_eq!(machine.state(), &ZoneState::InZone("zenZone".to_string()));
    }

    #[test]
    fn overlapping_zones_pick_the_last() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();
        machine.update(&zones, Vec2::new(100.0, 50.0));
        assert_eq!(machine.current(), Some("zenZone"));
    }

    #[test]
    fn leaving_returns_to_idle() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();
        machine.update(&zones, Vec2::new(50.0, 50.0));

        assert_eq!(
            machine.update(&zones, Vec2::new(50.0, 500.0)),
            Some(ZoneEvent::Left {
                name: "coffeeCorner".to_string()
            })
        );
        assert_eq!(machine.state(), &ZoneState::Idle);
        assert_eq!(machine.update(&zones, Vec2::new(50.0, 500.0)), None);

        // Re-entering fires again.
        assert!(machine.update(&zones, Vec2::new(50.0, 50.0)).is_some());
    }

    #[test]
    fn interact_dispatches_current_zone_only() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();
        assert_eq!(machine.interact(), None);

        machine.update(&zones, Vec2::new(50.0, 50.0));
        assert_eq!(
            machine.interact(),
            Some(&ZoneAction::Alert(
                "\u{2615} You grabbed a fresh cup of coffee! Energy +100%".to_string()
            ))
        );

        machine.update(&zones, Vec2::new(150.0, 50.0));
        assert_eq!(machine.interact(), Some(&ZoneAction::ToggleZen));
    }

    #[test]
    fn unknown_zone_has_generic_prompt_and_no_action() {
        let zones = zones();
        let mut machine = ZoneStateMachine::default();
        let event = machine.update(&zones, Vec2::new(310.0, 10.0));
        assert_eq!(
            event,
            Some(ZoneEvent::Entered {
                name: "broomCloset".to_string(),
                prompt: "[F] Interact".to_string(),
            })
        );
        assert_eq!(machine.interact(), None);
    }
}
