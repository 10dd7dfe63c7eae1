use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

/// Object layer in a Tiled map that holds the interaction zones.
pub const ZONE_LAYER: &str = "zone";
pub const UNNAMED_ZONE: &str = "Zone";

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse map: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Rect { min: Vec2, max: Vec2 },
    Polygon(Vec<Vec2>),
}

impl Region {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        let a = Vec2::new(x, y);
        let b = Vec2::new(x + width, y + height);
        Self::Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Edges count as inside for rectangles. Polygons use the even-odd rule.
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Rect { min, max } => {
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
            Self::Polygon(vertices) => polygon_contains(vertices, point),
        }
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            Self::Rect { min, max } => (*min, *max),
            Self::Polygon(vertices) => vertices.iter().fold(
                (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
                |(min, max), v| (min.min(*v), max.max(*v)),
            ),
        }
    }

    pub fn center(&self) -> Vec2 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }
}

fn polygon_contains(vertices: &[Vec2], point: Vec2) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let crossing = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub region: Region,
}

impl Zone {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }
}

/// Source of zone regions and the overlap predicate used by the zone state machine.
pub trait ZoneGeometry {
    fn zones(&self) -> &[Zone];

    fn overlaps(&self, zone: &Zone, point: Vec2) -> bool {
        zone.region.contains(point)
    }
}

impl ZoneGeometry for [Zone] {
    fn zones(&self) -> &[Zone] {
        self
    }
}

impl ZoneGeometry for Vec<Zone> {
    fn zones(&self) -> &[Zone] {
        self
    }
}

#[derive(Debug, Clone)]
pub struct ZoneMap {
    size: Vec2,
    zones: Vec<Zone>,
}

impl Default for ZoneMap {
    fn default() -> Self {
        Self::default_office()
    }
}

impl ZoneGeometry for ZoneMap {
    fn zones(&self) -> &[Zone] {
        &self.zones
    }
}

impl ZoneMap {
    pub fn new(size: Vec2, zones: Vec<Zone>) -> Self {
        Self { size, zones }
    }

    /// 40x30 tiles of 32 px with one zone of every office kind.
    pub fn default_office() -> Self {
        let zones = vec![
            Zone::new("genAI", Region::rect(448.0, 64.0, 256.0, 192.0)),
            Zone::new("meetingRoom", Region::rect(832.0, 64.0, 384.0, 256.0)),
            Zone::new("gaming", Region::rect(64.0, 384.0, 320.0, 256.0)),
            Zone::new("coffeeCorner", Region::rect(448.0, 448.0, 224.0, 160.0)),
            Zone::new(
                "zenZone",
                Region::Polygon(vec![
                    Vec2::new(992.0, 448.0),
                    Vec2::new(1152.0, 576.0),
                    Vec2::new(992.0, 704.0),
                    Vec2::new(832.0, 576.0),
                ]),
            ),
            Zone::new("exit", Region::rect(576.0, 832.0, 128.0, 96.0)),
        ];
        Self::new(Vec2::new(1280.0, 960.0), zones)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let json = fs::read_to_string(path)?;
        Self::from_tiled_json(&json)
    }

    /// Reads zones from the `zone` object layer of a Tiled JSON map. A map without that
    /// layer has no zones.
    pub fn from_tiled_json(json: &str) -> Result<Self, MapError> {
        let map: TiledMap = serde_json::from_str(json)?;
        let size = Vec2::new(
            map.width as f32 * map.tilewidth as f32,
            map.height as f32 * map.tileheight as f32,
        );

        let zones = map
            .layers
            .iter()
            .filter(|layer| layer.kind == "objectgroup" && layer.name == ZONE_LAYER)
            .flat_map(|layer| layer.objects.iter())
            .map(TiledObject::to_zone)
            .collect::<Vec<_>>();

        log::debug!("Loaded {} zones from map", zones.len());
        Ok(Self::new(size, zones))
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Keeps a point inside the world bounds. Maps without a size leave points alone.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        if self.size.cmple(Vec2::ZERO).any() {
            return point;
        }
        point.clamp(Vec2::ZERO, self.size)
    }
}

#[derive(Debug, Deserialize)]
struct TiledMap {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize)]
struct TiledObject {
    #[serde(default)]
    name: String,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    polygon: Option<Vec<TiledPoint>>,
}

#[derive(Debug, Deserialize)]
struct TiledPoint {
    x: f32,
    y: f32,
}

impl TiledObject {
    fn to_zone(&self) -> Zone {
        let name = if self.name.is_empty() {
            UNNAMED_ZONE.to_string()
        } else {
            self.name.clone()
        };

        let origin = Vec2::new(self.x, self.y);
        let region = match &self.polygon {
            Some(points) => {
                Region::Polygon(points.iter().map(|p| origin + Vec2::new(p.x, p.y)).collect())
            }
            None => Region::rect(self.x, self.y, self.width, self.height),
        };

        Zone::new(name, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILED_MAP: &str = r#"{
        "width": 10,
        "height": 8,
        "tilewidth": 32,
        "tileheight": 32,
        "layers": [
            { "name": "floor", "type": "tilelayer", "data": [0, 1, 2] },
            {
                "name": "zone",
                "type": "objectgroup",
                "objects": [
                    { "id": 1, "name": "coffeeCorner", "x": 32, "y": 32, "width": 64, "height": 64 },
                    { "id": 2, "name": "", "x": 200, "y": 10, "width": 10, "height": 10 },
                    {
                        "id": 3, "name": "zenZone", "x": 100, "y": 100,
                        "polygon": [ {"x": 0, "y": 0}, {"x": 50, "y": 0}, {"x": 0, "y": 50} ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn rect_edges_are_inside() {
        let region = Region::rect(10.0, 10.0, 20.0, 20.0);
        assert!(region.contains(Vec2::new(10.0, 10.0)));
        assert!(region.contains(Vec2::new(30.0, 30.0)));
        assert!(!region.contains(Vec2::new(30.1, 20.0)));
        assert_eq!(region.center(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn polygon_containment() {
        let triangle = Region::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(triangle.contains(Vec2::new(2.0, 2.0)));
        assert!(!triangle.contains(Vec2::new(8.0, 8.0)));
        assert!(!Region::Polygon(vec![Vec2::ZERO, Vec2::ONE]).contains(Vec2::ZERO));
    }

    #[test]
    fn loads_zone_layer_from_tiled_json() {
        let map = ZoneMap::from_tiled_json(TILED_MAP).unwrap();
        assert_eq!(map.size(), Vec2::new(320.0, 256.0));
        assert_eq!(map.zones().len(), 3);

        let coffee = map.zone("coffeeCorner").unwrap();
        assert!(coffee.region.contains(Vec2::new(64.0, 64.0)));

        assert_eq!(map.zones()[1].name, UNNAMED_ZONE);

        let zen = map.zone("zenZone").unwrap();
        assert!(zen.region.contains(Vec2::new(110.0, 110.0)));
        assert!(!zen.region.contains(Vec2::new(145.0, 145.0)));
    }

    #[test]
    fn clamp_keeps_points_in_world() {
        let map = ZoneMap::default_office();
        assert_eq!(map.clamp(Vec2::new(-5.0, 2000.0)), Vec2::new(0.0, 960.0));
        assert_eq!(map.clamp(Vec2::new(10.0, 20.0)), Vec2::new(10.0, 20.0));

        let no_size = ZoneMap::new(Vec2::ZERO, Vec::new());
        assert_eq!(no_size.clamp(Vec2::new(-5.0, 5.0)), Vec2::new(-5.0, 5.0));
    }

    #[test]
    fn huge_map_dimensions_do_not_overflow() {
        let json = r#"{ "width": 4294967295, "height": 2, "tilewidth": 4294967295, "tileheight": 16, "layers": [] }"#;
        let map = ZoneMap::from_tiled_json(json).unwrap();
        assert!(map.size().x > 1.0e18);
        assert_eq!(map.size().y, 32.0);
    }

    #[test]
    fn map_without_zone_layer_has_no_zones() {
        let map = ZoneMap::from_tiled_json(r#"{ "layers": [] }"#).unwrap();
        assert!(map.zones().is_empty());
        assert!(ZoneMap::from_tiled_json("not json").is_err());
    }

    #[test]
    fn default_office_spawn_is_outside_every_zone() {
        let map = ZoneMap::default_office();
        let spawn = crate::presence::SPAWN_POSITION;
        assert!(map.zones().iter().all(|z| !map.overlaps(z, spawn)));
        assert!(map.zone("zenZone").unwrap().region.contains(Vec2::new(992.0, 576.0)));
    }
}
