//! Turtle state and operations for road interpretation.

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance (degrees) used when classifying a heading as axis aligned.
const ANGLE_TOLERANCE: f32 = 1e-3;

/// The class of road a turtle is currently laying down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadType {
    /// Long segments connecting population centers.
    Highway,
    /// Short local streets.
    #[default]
    Road,
}

/// The state of the road-building turtle.
///
/// Tracks a 2-D pose (position, unit heading, scale) plus the road class and the
/// countdown used to space highway exits. Cloning produces a fully independent turtle,
/// which is how branches diverge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turtle {
    /// Current world-space position of the cursor.
    pub position: Vec2,

    /// Current heading. Always unit length.
    pub direction: Vec2,

    /// Scale encoded into emitted transforms. Does not affect movement.
    pub scale: Vec2,

    pub road_type: RoadType,

    /// Steps remaining until the next highway exit.
    pub delay: i32,
}

impl Default for Turtle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::Y,
            scale: Vec2::ONE,
            road_type: RoadType::Road,
            delay: 0,
        }
    }
}

impl Turtle {
    /// Creates a turtle at `position` facing `+Y`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotates the heading counter-clockwise by `degrees`. Position is unchanged.
    pub fn rotate(&mut self, degrees: f32) {
        let rotated = Vec2::from_angle(degrees.to_radians()).rotate(self.direction);
        self.direction = rotated.normalize_or(Vec2::Y);
    }

    /// Advances the position by `distance` along the current heading.
    pub fn translate(&mut self, distance: f32) {
        self.position += self.direction * distance;
    }

    /// Multiplies the scale component-wise by `factor`.
    pub fn scale(&mut self, factor: Vec2) {
        self.scale *= factor;
    }

    /// Rounds the heading to the nearest multiple of 90 degrees.
    ///
    /// The result is an exact cardinal vector so later axis checks are stable.
    pub fn snap_to_grid(&mut self) {
        let quadrant = (self.angle() / 90.0).round() as i32;
        self.direction = match quadrant.rem_euclid(4) {
            0 => Vec2::X,
            1 => Vec2::Y,
            2 => Vec2::NEG_X,
            _ => Vec2::NEG_Y,
        };
    }

    /// Rotates the turtle so it faces along `target`.
    ///
    /// Returns `false` and leaves the turtle untouched when `target` is the zero vector.
    pub fn face(&mut self, target: Vec2) -> bool {
        let Some(target) = target.try_normalize() else {
            return false;
        };
        let signed = self
            .direction
            .perp_dot(target)
            .atan2(self.direction.dot(target));
        self.rotate(signed.to_degrees());
        true
    }

    /// Heading angle in degrees, measured counter-clockwise from `+X`, in `[0, 360)`.
    pub fn angle(&self) -> f32 {
        let degrees = self.direction.y.atan2(self.direction.x).to_degrees();
        let wrapped = degrees.rem_euclid(360.0);
        if wrapped >= 360.0 - ANGLE_TOLERANCE {
            0.0
        } else {
            wrapped
        }
    }

    /// Whether the heading points due north or due south.
    pub fn is_vertical(&self) -> bool {
        let angle = self.angle();
        (angle - 90.0).abs() < ANGLE_TOLERANCE || (angle - 270.0).abs() < ANGLE_TOLERANCE
    }

    /// The pose of this turtle as a 2-D affine transform (scale, then rotate, then translate).
    pub fn transformation(&self) -> Mat3 {
        Mat3::from_scale_angle_translation(
            self.scale,
            self.direction.y.atan2(self.direction.x),
            self.position,
        )
    }
}
