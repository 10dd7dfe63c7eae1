use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;

use crate::net::Broadcast;

use super::participant::{Character, MotionState};

pub const DEFAULT_INTERPOLATION_MS: u64 = 100;

/// Linear move of the rendered position towards the last reported one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Interpolation {
    from: Vec2,
    to: Vec2,
    elapsed: Duration,
    duration: Duration,
}

impl Interpolation {
    fn new(from: Vec2, to: Vec2, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn sample(&self) -> Vec2 {
        if self.is_complete() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, t)
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEntity {
    pub id: u32,
    pub name: String,
    pub skin: u32,
    pub character: Character,
    pub motion: MotionState,
    pub flip_x: bool,
    position: Vec2,
    target: Vec2,
    interpolation: Option<Interpolation>,
    last_update: Duration,
}

impl RemoteEntity {
    fn spawn(broadcast: &Broadcast, now: Duration) -> Self {
        Self {
            id: broadcast.id,
            name: broadcast.name.clone(),
            skin: broadcast.skin,
            character: broadcast.character,
            motion: broadcast.motion,
            flip_x: broadcast.flip_x,
            position: broadcast.position,
            target: broadcast.position,
            interpolation: None,
            last_update: now,
        }
    }

    /// Rendered position, which trails `target` while an interpolation is running.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Last position reported by the peer.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_interpolating(&self) -> bool {
        self.interpolation.is_some()
    }

    pub fn last_update(&self) -> Duration {
        self.last_update
    }

    pub fn animation_key(&self) -> String {
        self.character.animation_key(self.motion)
    }

    fn advance(&mut self, dt: Duration) {
        let Some(interpolation) = &mut self.interpolation else {
            return;
        };
        interpolation.elapsed += dt;
        self.position = interpolation.sample();
        if interpolation.is_complete() {
            self.interpolation = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Spawned,
    Updated,
    IgnoredLocal,
}

/// Every other participant in the session, keyed by id.
///
/// Iteration is in ascending id order, so any scan over the registry is deterministic.
#[derive(Debug)]
pub struct RemoteRegistry {
    local_id: u32,
    interpolation_window: Duration,
    entities: BTreeMap<u32, RemoteEntity>,
}

impl RemoteRegistry {
    pub fn new(local_id: u32, interpolation_window: Duration) -> Self {
        Self {
            local_id,
            interpolation_window,
            entities: BTreeMap::new(),
        }
    }

    pub fn with_defaults(local_id: u32) -> Self {
        Self::new(local_id, Duration::from_millis(DEFAULT_INTERPOLATION_MS))
    }

    pub fn local_id(&self) -> u32 {
        self.local_id
    }

    pub fn apply_broadcast(&mut self, broadcast: &Broadcast, now: Duration) -> ApplyOutcome {
        if broadcast.id == self.local_id {
            return ApplyOutcome::IgnoredLocal;
        }

        let Some(entity) = self.entities.get_mut(&broadcast.id) else {
            self.entities
                .insert(broadcast.id, RemoteEntity::spawn(broadcast, now));
            return ApplyOutcome::Spawned;
        };

        entity.name.clone_from(&broadcast.name);
        entity.skin = broadcast.skin;
        entity.character = broadcast.character;
        entity.motion = broadcast.motion;
        entity.flip_x = broadcast.flip_x;
        entity.last_update = now;

        entity.target = broadcast.position;
        entity.interpolation = Some(Interpolation::new(
            entity.position,
            broadcast.position,
            self.interpolation_window,
        ));

        ApplyOutcome::Updated
    }

    /// Removes the entity along with any running interpolation. Unknown ids are ignored.
    pub fn apply_departure(&mut self, id: u32) -> Option<RemoteEntity> {
        self.entities.remove(&id)
    }

    pub fn advance(&mut self, dt: Duration) {
        for entity in self.entities.values_mut() {
            entity.advance(dt);
        }
    }

    pub fn prune_stale(&mut self, now: Duration, timeout: Duration) -> Vec<u32> {
        let stale: Vec<u32> = self
            .entities
            .values()
            .filter(|e| now.saturating_sub(e.last_update) > timeout)
            .map(|e| e.id)
            .collect();
        for id in &stale {
            self.entities.remove(id);
        }
        stale
    }

    pub fn get(&self, id: u32) -> Option<&RemoteEntity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &RemoteEntity> + Clone {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL_ID: u32 = 1;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn broadcast(id: u32, x: f32, y: f32) -> Broadcast {
        Broadcast {
            room_id: None,
            id,
            position: Vec2::new(x, y),
            name: format!("p{id}"),
            skin: 0x00FF00,
            character: Character::Dude,
            motion: MotionState::Walk,
            flip_x: false,
        }
    }

    #[test]
    fn first_sight_spawns_without_interpolation() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        let mut msg = broadcast(17, 320.0, 480.0);
        msg.flip_x = true;

        assert_eq!(registry.apply_broadcast(&msg, ms(0)), ApplyOutcome::Spawned);

        let entity = registry.get(17).unwrap();
        assert_eq!(entity.position(), Vec2::new(320.0, 480.0));
        assert!(!entity.is_interpolating());
        assert!(entity.flip_x);
        assert_eq!(entity.motion, MotionState::Walk);
    }

    #[test]
    fn local_id_is_never_stored() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        assert_eq!(
            registry.apply_broadcast(&broadcast(LOCAL_ID, 0.0, 0.0), ms(0)),
            ApplyOutcome::IgnoredLocal
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn update_applies_visuals_immediately_and_smooths_position() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        registry.apply_broadcast(&broadcast(5, 0.0, 0.0), ms(0));

        let mut msg = broadcast(5, 100.0, 50.0);
        msg.motion = MotionState::Idle;
        msg.flip_x = true;
        msg.character = Character::Pink;
        assert_eq!(registry.apply_broadcast(&msg, ms(10)), ApplyOutcome::Updated);

        let entity = registry.get(5).unwrap();
        assert_eq!(entity.motion, MotionState::Idle);
        assert!(entity.flip_x);
        assert_eq!(entity.character, Character::Pink);
        assert_eq!(entity.position(), Vec2::ZERO);
        assert_eq!(entity.target(), Vec2::new(100.0, 50.0));

        registry.advance(ms(50));
        let halfway = registry.get(5).unwrap().position();
        assert!((halfway.x - 50.0).abs() < 0.001);
        assert!((halfway.y - 25.0).abs() < 0.001);
    }

    #[test]
    fn interpolation_converges_exactly() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        registry.apply_broadcast(&broadcast(5, 0.0, 0.0), ms(0));
        registry.apply_broadcast(&broadcast(5, 33.3, 71.7), ms(16));

        registry.advance(ms(DEFAULT_INTERPOLATION_MS));

        let entity = registry.get(5).unwrap();
        assert_eq!(entity.position(), Vec2::new(33.3, 71.7));
        assert!(!entity.is_interpolating());

        registry.advance(ms(500));
        assert_eq!(registry.get(5).unwrap().position(), Vec2::new(33.3, 71.7));
    }

    #[test]
    fn newer_update_replaces_running_interpolation() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        registry.apply_broadcast(&broadcast(5, 0.0, 0.0), ms(0));
        registry.apply_broadcast(&broadcast(5, 100.0, 0.0), ms(0));
        registry.advance(ms(50));

        // Starts from the rendered midpoint, not the old target.
        registry.apply_broadcast(&broadcast(5, 50.0, 100.0), ms(50));
        registry.advance(ms(50));
        let position = registry.get(5).unwrap().position();
        assert!((position.x - 50.0).abs() < 0.001);
        assert!((position.y - 50.0).abs() < 0.001);

        registry.advance(ms(50));
        assert_eq!(registry.get(5).unwrap().position(), Vec2::new(50.0, 100.0));
    }

    #[test]
    fn departure_is_idempotent() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        registry.apply_broadcast(&broadcast(42, 0.0, 0.0), ms(0));
        registry.apply_broadcast(&broadcast(42, 10.0, 0.0), ms(5));
        registry.apply_broadcast(&broadcast(43, 0.0, 0.0), ms(5));

        assert!(registry.apply_departure(42).is_some());
        let after_once: Vec<u32> = registry.entities().map(|e| e.id).collect();

        assert!(registry.apply_departure(42).is_none());
        let after_twice: Vec<u32> = registry.entities().map(|e| e.id).collect();

        assert_eq!(after_once, vec![43]);
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn entities_iterate_in_id_order_and_restart() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        for id in [30, 10, 20] {
            registry.apply_broadcast(&broadcast(id, 0.0, 0.0), ms(0));
        }

        let iter = registry.entities();
        let first: Vec<u32> = iter.clone().map(|e| e.id).collect();
        let second: Vec<u32> = iter.map(|e| e.id).collect();
        assert_eq!(first, vec![10, 20, 30]);
        assert_eq!(first, second);
    }

    #[test]
    fn stale_entities_are_pruned() {
        let mut registry = RemoteRegistry::with_defaults(LOCAL_ID);
        registry.apply_broadcast(&broadcast(2, 0.0, 0.0), ms(0));
        registry.apply_broadcast(&broadcast(3, 0.0, 0.0), ms(4000));

        assert!(registry.prune_stale(ms(5000), ms(5000)).is_empty());
        assert_eq!(registry.prune_stale(ms(5001), ms(5000)), vec![2]);
        assert!(registry.contains(3));
    }
}
