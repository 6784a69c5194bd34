//! The road network generator.
//!
//! The entry point is [`Generator`]. Build it from an axiom, a [`Grammar`] and a
//! [`GeneratorConfig`], optionally swap in custom fields with
//! [`Generator::with_fields`], then call [`Generator::expand`] to grow highways and
//! intersection stubs and [`Generator::draw`] to interpret the rewritten axiom.

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::field::{
    CENTER_DENSITY, Population, ROAD_DENSITY, STUB_DENSITY, ScalarField, Terrain,
};
use crate::geometry::{Cardinal, Intersection, RoadSegment};
use crate::grammar::{self, Action, Grammar};
use crate::turtle::{RoadType, Turtle};
use glam::{Mat3, Vec2};
use tracing::{debug, trace, warn};

/// Slack added before flooring grid and fan step counts so inclusive end points survive
/// f32 rounding.
const STEP_EPSILON: f32 = 1e-4;

/// A crossing this close to a proposal's start is the road it grows from, not a collision.
const JOIN_TOLERANCE: f32 = 1e-4;

/// Whether the drawing phase is currently emitting geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Branch {
    Active,
    /// A proposal was rejected. `pushes` counts nested `Push`es still awaiting their `Pop`.
    Suppressed { pushes: u32 },
}

/// Inclusive `start..=end` walk with a fixed step.
fn grid_steps(start: f32, end: f32, step: f32) -> impl Iterator<Item = f32> {
    let count = if end >= start {
        ((end - start) / step + STEP_EPSILON).floor() as usize + 1
    } else {
        0
    };
    (0..count).map(move |k| start + k as f32 * step)
}

/// Grows a road network over a terrain and a population field.
///
/// Owns the active turtle and the stack of saved turtles, the committed highway and road
/// segments, the intersection grid, the population centers, and the accumulated pose list
/// handed to rendering.
pub struct Generator<T = Terrain, P = Population> {
    config: GeneratorConfig,
    grammar: Grammar,
    axiom: String,
    terrain: T,
    population: P,
    instance: Turtle,
    stack: Vec<Turtle>,
    highways: Vec<RoadSegment>,
    roads: Vec<RoadSegment>,
    intersections: Vec<Intersection>,
    population_centers: Vec<Vec2>,
    transformations: Vec<Mat3>,
}

impl Generator<Terrain, Population> {
    /// Creates a generator over the default noise fields.
    ///
    /// Fails on an empty axiom or an invalid configuration.
    pub fn new(axiom: &str, grammar: Grammar, config: GeneratorConfig) -> Result<Self> {
        if axiom.is_empty() {
            return Err(GeneratorError::InvalidConfiguration(
                "axiom must not be empty".into(),
            ));
        }
        config.validate()?;

        Ok(Self {
            config,
            grammar,
            axiom: axiom.to_string(),
            terrain: Terrain::default(),
            population: Population::default(),
            instance: Turtle::default(),
            stack: Vec::new(),
            highways: Vec::new(),
            roads: Vec::new(),
            intersections: Vec::new(),
            population_centers: Vec::new(),
            transformations: Vec::new(),
        })
    }
}

impl<T: ScalarField, P: ScalarField> Generator<T, P> {
    /// Replaces both environmental fields (builder pattern).
    pub fn with_fields<T2: ScalarField, P2: ScalarField>(
        self,
        terrain: T2,
        population: P2,
    ) -> Generator<T2, P2> {
        Generator {
            config: self.config,
            grammar: self.grammar,
            axiom: self.axiom,
            terrain,
            population,
            instance: self.instance,
            stack: self.stack,
            highways: self.highways,
            roads: self.roads,
            intersections: self.intersections,
            population_centers: self.population_centers,
            transformations: self.transformations,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    /// The active turtle.
    pub fn turtle(&self) -> &Turtle {
        &self.instance
    }

    pub fn turtle_mut(&mut self) -> &mut Turtle {
        &mut self.instance
    }

    /// Number of saved turtles beneath the active one.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn highways(&self) -> &[RoadSegment] {
        &self.highways
    }

    pub fn roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn population_centers(&self) -> &[Vec2] {
        &self.population_centers
    }

    /// Poses accumulated by [`expand`](Self::expand).
    pub fn transformations(&self) -> &[Mat3] {
        &self.transformations
    }

    /// Resets all generated state, then finds population centers and lays the
    /// intersection grid.
    ///
    /// Centers are grid points (spacing `radius`, inset by one step from the world edge)
    /// that are both dense and above sea level, followed by the configured seed centers.
    /// The turtle starts on the first center as a highway, or at the origin as a road when
    /// there are none.
    pub fn setup(&mut self) {
        self.instance = Turtle::default();
        self.stack.clear();
        self.highways.clear();
        self.roads.clear();
        self.intersections.clear();
        self.population_centers.clear();
        self.transformations.clear();

        let extent = self.config.world_extent;
        let radius = self.config.radius;
        for x in grid_steps(-extent + radius, extent - radius, radius) {
            for y in grid_steps(-extent + radius, extent - radius, radius) {
                let point = Vec2::new(x, y);
                if self.population.sample(point) > CENTER_DENSITY
                    && self.terrain.sample(point) > self.config.sea_level
                {
                    self.population_centers.push(point);
                }
            }
        }
        self.population_centers.extend(self.config.seed_centers.iter().copied());

        match self.population_centers.first() {
            Some(&first) => {
                self.instance.position = first;
                self.instance.road_type = RoadType::Highway;
            }
            None => {
                self.instance.position = Vec2::ZERO;
                self.instance.road_type = RoadType::Road;
            }
        }

        let road_length = self.config.road_length;
        for x in grid_steps(-extent, extent, road_length * 4.0) {
            for y in grid_steps(-extent, extent, road_length) {
                self.intersections.push(Intersection::new(Vec2::new(x, y)));
            }
        }

        debug!(
            centers = self.population_centers.len(),
            intersections = self.intersections.len(),
            "generator set up"
        );
    }

    /// Runs setup, then `iterations` rounds of highway growth and intersection connection.
    ///
    /// Returns every pose emitted so far. A negative iteration count is rejected.
    pub fn expand(&mut self, iterations: i32) -> Result<&[Mat3]> {
        if iterations < 0 {
            return Err(GeneratorError::InvalidConfiguration(format!(
                "iteration count must be non-negative, got {iterations}"
            )));
        }

        self.setup();
        for iteration in 0..iterations {
            if self.instance.road_type == RoadType::Highway {
                self.grow_highways();
            }
            self.connect_intersections();
            debug!(
                iteration,
                highways = self.highways.len(),
                transforms = self.transformations.len(),
                "expansion round finished"
            );
        }
        Ok(&self.transformations)
    }

    /// A center counts as connected when some highway starts within `radius` of it.
    fn is_connected(&self, center: Vec2) -> bool {
        self.highways
            .iter()
            .any(|highway| highway.start.distance(center) < self.config.radius)
    }

    /// Drives the turtle to every unconnected center in turn.
    fn grow_highways(&mut self) {
        let radius = self.config.radius;
        let step = self.config.highway_length;
        let centers = self.population_centers.clone();

        for center in centers {
            if self.is_connected(center) {
                continue;
            }
            if !self.instance.face(center - self.instance.position) {
                // already standing on it
                continue;
            }

            self.transformations.push(self.instance.transformation());
            self.instance.delay = self.config.highway_delay;

            let mut distance = self.instance.position.distance(center);
            // The heading is fixed, so the turtle can only overshoot when radius < step / 2.
            let max_steps = (distance / step).ceil() as usize + 1;
            let mut steps = 0;
            while distance > radius && steps < max_steps {
                let start = self.instance.position;
                self.instance.translate(step);
                self.transformations.push(self.instance.transformation());
                self.highways.push(RoadSegment::new(start, self.instance.position));

                distance = self.instance.position.distance(center);
                steps += 1;
                self.instance.delay -= 1;

                if self.instance.delay == 0 {
                    trace!(position = ?self.instance.position, "highway exit point");
                    if self.config.branching_enabled {
                        self.spawn_exits();
                        self.instance.delay = self.config.highway_delay;
                    }
                }
            }
        }
    }

    /// Clones two exit turtles off the active highway, one to each side, and builds
    /// roads from them.
    fn spawn_exits(&mut self) {
        let road_length = self.config.road_length;
        let mut exits = Vec::with_capacity(2);
        for turn in [90.0, -90.0] {
            let mut exit = self.instance.clone();
            exit.road_type = RoadType::Road;
            exit.scale(Vec2::splat(self.config.stub_scale));
            exit.rotate(turn);
            exit.snap_to_grid();
            self.transformations.push(exit.transformation());
            exit.translate(road_length);
            if exit.is_vertical() {
                self.transformations.push(exit.transformation());
                exit.translate(road_length);
            }
            exits.push(exit);
        }
        for exit in &exits {
            self.build_road(exit);
        }
    }

    /// Lays forward, left and right stubs from `turtle`, then recurses one level.
    ///
    /// The second level always continues forward; it continues left and right only when
    /// `side_road_recursion` is set. Stubs emit poses but no [`RoadSegment`]s.
    pub fn build_road(&mut self, turtle: &Turtle) {
        self.build_road_level(turtle, true);
    }

    fn build_road_level(&mut self, turtle: &Turtle, first: bool) {
        let forward = self.lay_stub(turtle, 0.0);
        let left = self.lay_stub(turtle, 90.0);
        let right = self.lay_stub(turtle, -90.0);

        if first {
            self.build_road_level(&forward, false);
            if self.config.side_road_recursion {
                self.build_road_level(&left, false);
                self.build_road_level(&right, false);
            }
        }
    }

    fn lay_stub(&mut self, turtle: &Turtle, turn: f32) -> Turtle {
        let road_length = self.config.road_length;
        let mut stub = turtle.clone();
        if turn != 0.0 {
            stub.rotate(turn);
        }
        self.transformations.push(stub.transformation());
        stub.translate(road_length);
        // vertical meshes need a second piece to cover the same visual length
        if stub.is_vertical() {
            self.transformations.push(stub.transformation());
            stub.translate(road_length);
        }
        stub
    }

    /// Marks every viable cardinal direction at each intersection open and emits a stub
    /// pose facing it.
    ///
    /// Every pass re-tests all four directions, so a direction that stays viable emits a
    /// stub again each round.
    fn connect_intersections(&mut self) {
        let offset = self.config.road_length;
        let sea_level = self.config.sea_level;
        let scale = Vec2::splat(self.config.stub_scale);

        for intersection in &mut self.intersections {
            for direction in Cardinal::ALL {
                let probe = intersection.neighbor(direction, offset);
                if self.population.sample(probe) > STUB_DENSITY
                    && self.terrain.sample(probe) > sea_level
                {
                    intersection.open(direction);
                    let mut stub = Turtle::at(intersection.center);
                    stub.direction = direction.heading();
                    stub.scale(scale);
                    self.transformations.push(stub.transformation());
                }
            }
        }
    }

    /// The axiom after `rewrite_iterations` grammar passes, spelled out as a string.
    pub fn derive(&self) -> Result<String> {
        let iterations = self.config.rewrite_iterations;
        let derived = self.grammar.derive(&self.axiom, iterations)?;
        Ok(grammar::spell(&derived))
    }

    /// Interprets the derived axiom left to right and returns the poses it emits.
    ///
    /// A rejected road proposal suppresses its branch: every later symbol is skipped
    /// except that nested `Push`/`Pop` pairs are counted, and drawing resumes at the `Pop`
    /// that closes the scope the rejection happened in. Pushes beyond `max_stack_depth` are
    /// silently dropped.
    pub fn draw(&mut self) -> Result<Vec<Mat3>> {
        let iterations = self.config.rewrite_iterations;
        let derived = self.grammar.derive(&self.axiom, iterations)?;
        let state = &derived.state;
        debug!(symbols = state.len(), "drawing derived axiom");

        let mut out = Vec::new();
        let mut branch = Branch::Active;

        for i in 0..state.len() {
            let view = match state.get_view(i) {
                Some(v) => v,
                None => break,
            };
            let Some(action) = self.grammar.action_for_id(view.sym as usize) else {
                continue;
            };

            if let Branch::Suppressed { pushes } = branch {
                match action {
                    Action::Push => {
                        branch = Branch::Suppressed { pushes: pushes + 1 };
                        continue;
                    }
                    Action::Pop if pushes > 0 => {
                        branch = Branch::Suppressed { pushes: pushes - 1 };
                        continue;
                    }
                    Action::Pop => branch = Branch::Active,
                    _ => continue,
                }
            }

            let accepted = match action {
                Action::Push => {
                    if self.stack.len() < self.config.max_stack_depth {
                        self.stack.push(self.instance.clone());
                    }
                    true
                }
                Action::Pop => {
                    self.pop(&mut out);
                    true
                }
                Action::Highway => {
                    self.draw_highway(&mut out);
                    true
                }
                Action::ExitN => {
                    self.draw_exit(Cardinal::North, &mut out);
                    true
                }
                Action::ExitS => {
                    self.draw_exit(Cardinal::South, &mut out);
                    true
                }
                Action::RoadLeft => self.draw_road(90.0, &mut out),
                Action::RoadForward => self.draw_road(0.0, &mut out),
                Action::RoadRight => self.draw_road(-90.0, &mut out),
            };
            if !accepted {
                branch = Branch::Suppressed { pushes: 0 };
            }
        }

        debug!(
            roads = self.roads.len(),
            transforms = out.len(),
            "drawing finished"
        );
        Ok(out)
    }

    fn pop(&mut self, out: &mut Vec<Mat3>) {
        match self.stack.pop() {
            Some(previous) => {
                out.push(self.instance.transformation());
                self.instance = previous;
            }
            None => warn!("unbalanced pop ignored"),
        }
    }

    /// Returns the fan offset (degrees) whose ray collects the most population.
    ///
    /// Water samples count as zero and rays ending outside `ray_bound` are skipped. Ties
    /// keep the earliest offset; if nothing beats zero the result is 0.
    fn densest_offset(&self, origin: Vec2, heading: Vec2) -> f32 {
        let fan = self.config.highway_fan;
        let fan_step = self.config.highway_fan_step;
        let samples = self.config.ray_samples;
        let bound = self.config.ray_bound;

        let mut best_offset = 0.0;
        let mut best_sum = 0.0;
        for offset in grid_steps(-fan, fan, fan_step) {
            let dir = Vec2::from_angle(offset.to_radians())
                .rotate(heading)
                .normalize_or(heading);

            let mut sum = 0.0;
            let mut end = origin;
            for i in 1..=samples {
                let point =
                    origin + dir * (self.config.highway_length * i as f32 / samples as f32);
                if self.terrain.sample(point) >= self.config.sea_level {
                    sum += self.population.sample(point);
                }
                end = point;
            }

            if end.x.abs() > bound || end.y.abs() > bound {
                continue;
            }
            if sum > best_sum {
                best_sum = sum;
                best_offset = offset;
            }
        }
        best_offset
    }

    fn draw_highway(&mut self, out: &mut Vec<Mat3>) {
        let best = self.densest_offset(self.instance.position, self.instance.direction);
        trace!(offset = best, "densest highway heading");
        if self.config.steer_highways {
            self.instance.rotate(best);
        }

        let start = self.instance.position;
        self.instance.translate(self.config.highway_length);
        self.instance.rotate(self.config.highway_bias);
        out.push(self.instance.transformation());
        self.roads.push(RoadSegment::new(start, self.instance.position));
    }

    fn draw_exit(&mut self, direction: Cardinal, out: &mut Vec<Mat3>) {
        self.instance.face(direction.heading());
        self.instance.snap_to_grid();
        self.instance.scale(Vec2::splat(self.config.exit_scale));
        out.push(self.instance.transformation());
    }

    /// Proposes one road step after turning `turn` degrees.
    ///
    /// The active turtle only moves when the step is accepted. Returns `false` when the
    /// endpoint is too sparse or the step crosses an earlier road.
    fn draw_road(&mut self, turn: f32, out: &mut Vec<Mat3>) -> bool {
        let mut proposal = self.instance.clone();
        if turn != 0.0 {
            proposal.rotate(turn);
        }
        let before = proposal.transformation();
        let start = proposal.position;
        proposal.translate(self.config.road_length);
        let segment = RoadSegment::new(start, proposal.position);

        if self.population.sample(proposal.position) < ROAD_DENSITY {
            trace!(at = ?proposal.position, "road rejected: sparse population");
            return false;
        }
        let crossing = self.roads.iter().find_map(|road| {
            segment
                .intersection(road)
                .filter(|hit| hit.distance(start) > JOIN_TOLERANCE)
        });
        if let Some(hit) = crossing {
            trace!(at = ?hit, "road rejected: crosses an existing road");
            return false;
        }

        self.instance = proposal;
        out.push(before);
        out.push(self.instance.transformation());
        self.roads.push(segment);
        true
    }
}
