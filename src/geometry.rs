use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Parametric slack so segments that meet exactly at an endpoint still register a hit
/// despite f32 rounding.
const PARAM_EPSILON: f32 = 1e-4;

/// Sine of the smallest angle between two segments that still counts as a crossing.
const PARALLEL_EPSILON: f32 = 1e-5;

/// An undirected straight road piece.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl RoadSegment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Solves both segments parametrically and returns the crossing point.
    ///
    /// Parallel and collinear segments never intersect. A hit requires both parameters to
    /// fall inside `[0, 1]`, so segments sharing an endpoint intersect at that endpoint.
    pub fn intersection(&self, other: &RoadSegment) -> Option<Vec2> {
        let d = self.end - self.start;
        let e = other.end - other.start;

        let denom = d.perp_dot(e);
        if denom.abs() <= PARALLEL_EPSILON * d.length() * e.length() {
            return None;
        }

        let w = other.start - self.start;
        let t = w.perp_dot(e) / denom;
        let u = w.perp_dot(d) / denom;

        let range = -PARAM_EPSILON..=1.0 + PARAM_EPSILON;
        if range.contains(&t) && range.contains(&u) {
            Some(self.start + d * t.clamp(0.0, 1.0))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &RoadSegment) -> bool {
        self.intersection(other).is_some()
    }
}

/// One of the four axis-aligned road directions leaving an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    /// Test order used by the intersection pass.
    pub const ALL: [Cardinal; 4] = [
        Cardinal::North,
        Cardinal::East,
        Cardinal::South,
        Cardinal::West,
    ];

    /// Unit vector pointing in this direction.
    pub fn heading(self) -> Vec2 {
        match self {
            Cardinal::North => Vec2::Y,
            Cardinal::East => Vec2::X,
            Cardinal::South => Vec2::NEG_Y,
            Cardinal::West => Vec2::NEG_X,
        }
    }
}

/// A node of the city block grid.
///
/// Flags record which cardinal stubs were found buildable. They only ever flip to `true`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub center: Vec2,
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Intersection {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            north: false,
            south: false,
            east: false,
            west: false,
        }
    }

    pub fn is_open(&self, direction: Cardinal) -> bool {
        match direction {
            Cardinal::North => self.north,
            Cardinal::East => self.east,
            Cardinal::South => self.south,
            Cardinal::West => self.west,
        }
    }

    pub fn open(&mut self, direction: Cardinal) {
        match direction {
            Cardinal::North => self.north = true,
            Cardinal::East => self.east = true,
            Cardinal::South => self.south = true,
            Cardinal::West => self.west = true,
        }
    }

    /// The point `distance` away from the center toward `direction`.
    pub fn neighbor(&self, direction: Cardinal, distance: f32) -> Vec2 {
        self.center + direction.heading() * distance
    }
}
