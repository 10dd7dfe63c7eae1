//! Line-oriented presence protocol.
//!
//! Every message is a single line of `:`-separated fields:
//!
//! ```text
//! PlayerLeft:<id>
//! Broadcast:<id>:<x>:<y>:<name>:<skin>:<character>:<anim>:<flip>
//! Broadcast:<room>:<id>:<x>:<y>:<name>:<skin>:<character>:<anim>:<flip>
//! ```
//!
//! The room-scoped form is recognised purely by field count: a broadcast with ten or more
//! fields is read as carrying a room id. A legacy sender whose name smuggles in an extra
//! delimiter therefore misparses as room-scoped. Peers in this crate strip delimiters from
//! names before encoding, so only foreign senders can produce such lines.

use glam::Vec2;

use crate::presence::{Character, LocalParticipant, MotionState, DEFAULT_SKIN};

pub const DELIMITER: char = ':';
pub const BROADCAST_MARKER: &str = "Broadcast";
pub const DEPARTURE_MARKER: &str = "PlayerLeft";
pub const DEFAULT_NAME: &str = "Player";
pub const MAX_SKIN: u32 = 0xFF_FF_FF;

const ROOM_SCOPED_FIELD_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,
    #[error("unknown message kind {0:?}")]
    UnknownKind(String),
    #[error("malformed departure {0:?}")]
    MalformedDeparture(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}` field {value:?}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub room_id: Option<String>,
    pub id: u32,
    pub position: Vec2,
    pub name: String,
    pub skin: u32,
    pub character: Character,
    pub motion: MotionState,
    pub flip_x: bool,
}

impl Broadcast {
    pub fn from_local(local: &LocalParticipant, room_id: Option<&str>) -> Self {
        Self {
            room_id: room_id.map(str::to_owned),
            id: local.id,
            position: local.position,
            name: local.name.clone(),
            skin: local.skin,
            character: local.character,
            motion: local.motion,
            flip_x: local.flip_x,
        }
    }

    pub fn encode(&self) -> String {
        let mut line = String::from(BROADCAST_MARKER);
        if let Some(room) = &self.room_id {
            line.push(DELIMITER);
            line.push_str(&sanitize_field(room));
        }

        let name = sanitize_field(&self.name);
        let fields = [
            self.id.to_string(),
            format!("{}", self.position.x.round() as i64),
            format!("{}", self.position.y.round() as i64),
            if name.is_empty() { DEFAULT_NAME.to_string() } else { name },
            (self.skin & MAX_SKIN).to_string(),
            self.character.key().to_string(),
            self.motion.as_str().to_string(),
            if self.flip_x { "1" } else { "0" }.to_string(),
        ];
        for field in fields {
            line.push(DELIMITER);
            line.push_str(&field);
        }
        line
    }

    fn decode_fields(fields: &[&str]) -> Result<Self, ParseError> {
        let (room_id, rest) = if fields.len() >= ROOM_SCOPED_FIELD_COUNT {
            (Some(fields[1].to_string()), &fields[2..])
        } else {
            (None, &fields[1..])
        };

        let id = parse_id(rest.first().copied(), "id")?;
        let x = parse_coordinate(rest.get(1).copied(), "x")?;
        let y = parse_coordinate(rest.get(2).copied(), "y")?;

        let name = match rest.get(3) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_NAME.to_string(),
        };
        let skin = rest
            .get(4)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|s| *s <= MAX_SKIN)
            .unwrap_or(DEFAULT_SKIN);
        let character = rest
            .get(5)
            .and_then(|c| Character::from_key(c.trim()))
            .unwrap_or_default();
        let motion = rest
            .get(6)
            .map(|m| MotionState::from_token(m.trim()))
            .unwrap_or_default();
        let flip_x = rest.get(7).is_some_and(|f| f.trim() == "1");

        Ok(Self {
            room_id,
            id,
            position: Vec2::new(x, y),
            name,
            skin,
            character,
            motion,
            flip_x,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkMessage {
    Broadcast(Broadcast),
    Departure { id: u32 },
}

impl NetworkMessage {
    pub fn id(&self) -> u32 {
        match self {
            Self::Broadcast(broadcast) => broadcast.id,
            Self::Departure { id } => *id,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Broadcast(broadcast) => broadcast.encode(),
            Self::Departure { id } => encode_departure(*id),
        }
    }

    pub fn decode(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        match fields[0] {
            DEPARTURE_MARKER => fields
                .get(1)
                .and_then(|id| id.trim().parse::<u32>().ok())
                .map(|id| Self::Departure { id })
                .ok_or_else(|| ParseError::MalformedDeparture(line.to_string())),
            BROADCAST_MARKER => Broadcast::decode_fields(&fields).map(Self::Broadcast),
            other => Err(ParseError::UnknownKind(other.to_string())),
        }
    }
}

pub fn encode_departure(id: u32) -> String {
    format!("{DEPARTURE_MARKER}{DELIMITER}{id}")
}

/// Removes characters that would change the field or line count of an encoded message.
pub fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != DELIMITER && *c != '\n' && *c != '\r')
        .collect()
}

fn parse_id(field: Option<&str>, name: &'static str) -> Result<u32, ParseError> {
    let field = field.ok_or(ParseError::MissingField(name))?;
    field
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidField {
            field: name,
            value: field.to_string(),
        })
}

fn parse_coordinate(field: Option<&str>, name: &'static str) -> Result<f32, ParseError> {
    let field = field.ok_or(ParseError::MissingField(name))?;
    match field.trim().parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::InvalidField {
            field: name,
            value: field.to_string(),
        }),
    }
}
