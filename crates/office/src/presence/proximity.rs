use glam::Vec2;

use super::registry::{RemoteEntity, RemoteRegistry};

pub const DEFAULT_INTERACTION_RADIUS: f32 = 100.0;
pub const INTERACTION_PROMPT: &str = "[E] Interact";

#[derive(Debug, Clone, Copy)]
pub struct Nearby<'a> {
    pub entity: &'a RemoteEntity,
    pub distance: f32,
}

/// Closest entity strictly inside `radius`. Ties keep the first one in iteration order.
pub fn find_nearest<'a, I>(entities: I, origin: Vec2, radius: f32) -> Option<Nearby<'a>>
where
    I: IntoIterator<Item = &'a RemoteEntity>,
{
    let mut nearest: Option<Nearby<'a>> = None;
    let mut closest = radius;

    for entity in entities {
        let distance = origin.distance(entity.position());
        if distance < closest {
            closest = distance;
            nearest = Some(Nearby { entity, distance });
        }
    }

    nearest
}

#[derive(Debug, Clone, Copy)]
pub struct ProximityDetector {
    radius: f32,
}

impl Default for ProximityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_INTERACTION_RADIUS)
    }
}

impl ProximityDetector {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn find_nearest<'a>(&self, registry: &'a RemoteRegistry, origin: Vec2) -> Option<Nearby<'a>> {
        find_nearest(registry.entities(), origin, self.radius)
    }
}
