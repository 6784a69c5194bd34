use crate::error::{GeneratorError, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Configuration for road generation.
///
/// Every field has a default, so partial documents deserialize cleanly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Length of one highway step.
    pub highway_length: f32,
    /// Length of one local road step and the spacing of the intersection grid.
    pub road_length: f32,
    /// Elevation at or below which land is water.
    pub sea_level: f32,
    /// Population-center grid spacing and the "close enough" distance for highways.
    pub radius: f32,
    /// The world spans `[-world_extent, world_extent]` on both axes.
    pub world_extent: f32,
    /// Highway rays ending outside `[-ray_bound, ray_bound]` are discarded.
    pub ray_bound: f32,
    /// Centers appended after the grid scan regardless of the fields.
    pub seed_centers: Vec<Vec2>,
    /// Highway steps between exits.
    pub highway_delay: i32,
    /// Half-width of the highway candidate fan, in degrees.
    pub highway_fan: f32,
    /// Angular step between highway candidates, in degrees.
    pub highway_fan_step: f32,
    /// Density samples taken along each highway candidate ray.
    pub ray_samples: u32,
    /// Heading change applied after every drawn highway step, in degrees.
    pub highway_bias: f32,
    /// Turn toward the densest candidate before advancing a drawn highway.
    pub steer_highways: bool,
    /// Scale factor applied by `ExitN` / `ExitS`.
    pub exit_scale: f32,
    /// Scale of intersection stubs and highway exit turtles.
    pub stub_scale: f32,
    /// Spawn exits off highways when the delay countdown expires.
    pub branching_enabled: bool,
    /// Let `build_road` recurse into the left and right branches as well as forward.
    pub side_road_recursion: bool,
    /// Rewrite passes applied to the axiom before drawing.
    pub rewrite_iterations: usize,
    /// Maximum number of saved turtles while drawing.
    pub max_stack_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            highway_length: 0.1,
            road_length: 0.025,
            sea_level: 0.5,
            radius: 0.1,
            world_extent: 1.0,
            ray_bound: 0.9,
            seed_centers: vec![Vec2::new(-0.25, 0.5), Vec2::new(0.5, 0.25)],
            highway_delay: 5,
            highway_fan: 30.0,
            highway_fan_step: 10.0,
            ray_samples: 20,
            highway_bias: -5.0,
            steer_highways: false,
            exit_scale: 0.5,
            stub_scale: 0.5,
            branching_enabled: false,
            side_road_recursion: false,
            rewrite_iterations: 3,
            max_stack_depth: 1024,
        }
    }
}

impl GeneratorConfig {
    /// Rejects values that would stall or degenerate the generation loops.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("highway_length", self.highway_length),
            ("road_length", self.road_length),
            ("radius", self.radius),
            ("world_extent", self.world_extent),
            ("highway_fan_step", self.highway_fan_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeneratorError::InvalidConfiguration(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if !(self.highway_fan.is_finite() && self.highway_fan >= 0.0) {
            return Err(GeneratorError::InvalidConfiguration(format!(
                "highway_fan must be non-negative, got {}",
                self.highway_fan
            )));
        }
        if self.ray_samples == 0 {
            return Err(GeneratorError::InvalidConfiguration(
                "ray_samples must be at least 1".into(),
            ));
        }
        if self.highway_delay < 1 {
            return Err(GeneratorError::InvalidConfiguration(format!(
                "highway_delay must be at least 1, got {}",
                self.highway_delay
            )));
        }
        Ok(())
    }
}
