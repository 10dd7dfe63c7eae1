use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sync::SessionInfo;

pub const DEFAULT_SKIN: u32 = 0xFF_FF_FF;
pub const SPAWN_POSITION: Vec2 = Vec2::new(64.0, 64.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Owlet,
    Dude,
    Pink,
}

impl Character {
    pub const ALL: [Character; 3] = [Self::Owlet, Self::Dude, Self::Pink];

    pub fn key(self) -> &'static str {
        match self {
            Self::Owlet => "owlet",
            Self::Dude => "dude",
            Self::Pink => "pink",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Sprite sheet the renderer plays for this character in the given motion state.
    pub fn sprite_sheet(self, motion: MotionState) -> &'static str {
        match (self, motion) {
            (Self::Owlet, MotionState::Walk) => "Owlet_Monster_Walk",
            (Self::Owlet, MotionState::Idle) => "Owlet_Monster_Idle",
            (Self::Dude, MotionState::Walk) => "Dude_Monster_Walk",
            (Self::Dude, MotionState::Idle) => "Dude_Monster_Idle",
            (Self::Pink, MotionState::Walk) => "Pink_Monster_Walk",
            (Self::Pink, MotionState::Idle) => "Pink_Monster_Idle",
        }
    }

    pub fn animation_key(self, motion: MotionState) -> String {
        format!("{}_{}", self.key(), motion.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    #[default]
    Idle,
    Walk,
}

impl MotionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
        }
    }

    /// Anything other than `walk` is treated as idle.
    pub fn from_token(token: &str) -> Self {
        if token == "walk" { Self::Walk } else { Self::Idle }
    }

    pub fn is_moving(self) -> bool {
        matches!(self, Self::Walk)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalParticipant {
    pub id: u32,
    pub name: String,
    pub skin: u32,
    pub character: Character,
    pub position: Vec2,
    pub flip_x: bool,
    pub motion: MotionState,
}

impl LocalParticipant {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            skin: DEFAULT_SKIN,
            character: Character::default(),
            position: SPAWN_POSITION,
            flip_x: false,
            motion: MotionState::Idle,
        }
    }

    pub fn from_session(session: &SessionInfo) -> Self {
        Self {
            id: session.id,
            name: session.name.clone(),
            skin: session.skin,
            character: session.character,
            position: SPAWN_POSITION,
            flip_x: false,
            motion: MotionState::Idle,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    pub fn animation_key(&self) -> String {
        self.character.animation_key(self.motion)
    }
}
