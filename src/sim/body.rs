//! Rigid body state and the per-body tick protocol
//!
//! Each tick runs three phases over every body, with a barrier between them:
//!
//! 1. `early_simulate`: integrate velocity into position/heading and latch
//!    the change flags into their buffers for other bodies to read.
//! 2. `simulate`: follow the parent (using its buffers), then rebuild
//!    geometry and bounds if anything moved and clear the change flags.
//! 3. `visualize`: push moved poses to the render target.
//!
//! Bodies only ever read each other's buffers, never the primary flags, so a
//! change is observed exactly once, one phase after it happened. A body that
//! doesn't move costs a handful of flag checks.

use serde::{Deserialize, Serialize};

use super::geometry::{BodyBounds, PolygonGeometry, bounding_radius};
use super::hierarchy::{self, ParentFrame};
use super::partition::LocatedPartitions;
use super::shape::{BodyConfig, Shape};
use crate::math::{Fixed, Vec2d};
use crate::render::RenderSync;
use crate::sim::geometry::Aabb;

/// Stable body identifier, also the body's arena index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Change flags and their one-phase-delayed buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyFlags {
    pub position_changed: bool,
    pub rotation_changed: bool,
    pub velocity_changed: bool,
    /// Latched in `early_simulate`, read by children and the partition
    pub position_changed_buffer: bool,
    pub rotation_changed_buffer: bool,
    /// Latched in `simulate`, consumed by `visualize`
    pub set_position_buffer: bool,
    pub set_rotation_buffer: bool,
}

/// Start pose for [`initialize`](crate::sim::SimContext::initialize)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2d,
    /// Unit heading, pre-normalized by the caller
    pub heading: Vec2d,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec2d::ZERO,
            heading: Vec2d::UP,
        }
    }
}

impl Pose {
    pub fn new(position: Vec2d, heading: Vec2d) -> Self {
        Self { position, heading }
    }

    /// Pose at `position` with the default heading
    pub fn at(position: Vec2d) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// A simulated body
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    config: BodyConfig,
    /// Coarse radius from `generate_bounds`
    radius: Fixed,

    position: Vec2d,
    rotation: Vec2d,
    velocity: Vec2d,
    velocity_magnitude: Fixed,
    last_position: Vec2d,
    offset: Vec2d,
    future_position: Vec2d,
    flags: DirtyFlags,

    parent: Option<BodyId>,
    local_position: Vec2d,
    local_rotation: Vec2d,

    geometry: Option<PolygonGeometry>,
    bounds: BodyBounds,
    partitions: LocatedPartitions,
}

impl Body {
    /// Inert body; nothing is built until it is initialized
    pub(crate) fn new(id: BodyId, config: BodyConfig) -> Self {
        Self {
            id,
            config,
            radius: Fixed::ZERO,
            position: Vec2d::ZERO,
            rotation: Vec2d::UP,
            velocity: Vec2d::ZERO,
            velocity_magnitude: Fixed::ZERO,
            last_position: Vec2d::ZERO,
            offset: Vec2d::ZERO,
            future_position: Vec2d::ZERO,
            flags: DirtyFlags::default(),
            parent: None,
            local_position: Vec2d::ZERO,
            local_rotation: Vec2d::RIGHT,
            geometry: None,
            bounds: BodyBounds::default(),
            partitions: LocatedPartitions::default(),
        }
    }

    /// Put the body at `pose`, drop any parent and build its caches.
    /// All change flags are raised so the first tick treats everything as new.
    pub(crate) fn initialize(&mut self, pose: Pose, spread_multiplier: i64) {
        self.parent = None;
        self.flags = DirtyFlags {
            position_changed: true,
            rotation_changed: true,
            velocity_changed: true,
            ..Default::default()
        };
        self.position = pose.position;
        self.rotation = pose.heading;
        self.last_position = pose.position;
        self.offset = Vec2d::ZERO;
        self.future_position = pose.position + self.velocity.scale_int(spread_multiplier);

        if self.config.shape != Shape::None {
            self.generate_points();
            self.generate_bounds();
            self.build_points();
            self.build_bounds(spread_multiplier);
        }
        self.partitions.clear();
    }

    /// Allocate polygon caches with points rotated into the current heading
    pub fn generate_points(&mut self) {
        self.geometry = PolygonGeometry::generate(&self.config.shape, self.rotation);
    }

    /// Recompute the coarse bounding radius
    pub fn generate_bounds(&mut self) {
        self.radius = bounding_radius(&self.config.shape);
    }

    /// Refresh polygon caches for the current pose
    pub fn build_points(&mut self) {
        if let Some(geometry) = &mut self.geometry {
            geometry.build(
                self.config.shape.vertices(),
                self.rotation,
                self.position,
                self.flags.rotation_changed,
            );
        }
    }

    /// Refresh current and swept bounds for the current pose
    pub fn build_bounds(&mut self, spread_multiplier: i64) {
        let real: &[Vec2d] = match &self.geometry {
            Some(geometry) => geometry.real_points(),
            None => &[],
        };
        self.bounds.rebuild(
            &self.config.shape,
            self.position,
            real,
            self.velocity.scale_int(spread_multiplier),
        );
    }

    /// Integration phase. Returns true when an unparented body moved and the
    /// partition must be told. Parented bodies report from `simulate`, once
    /// their parent's movement has been applied.
    pub(crate) fn early_simulate(&mut self) -> bool {
        if self.parent.is_none() {
            if self.flags.velocity_changed {
                self.velocity_magnitude = self.velocity.magnitude();
                self.flags.velocity_changed = false;
                if !self.velocity_magnitude.is_zero() {
                    self.turn_toward_velocity();
                }
            }
            if !self.velocity_magnitude.is_zero() {
                self.position += self.velocity;
                self.flags.position_changed = true;
            }
        }

        let moved = self.flags.position_changed;
        if moved {
            self.offset = self.position - self.last_position;
            self.last_position = self.position;
        }
        self.flags.position_changed_buffer = moved;
        self.flags.rotation_changed_buffer = self.flags.rotation_changed;
        moved && self.parent.is_none()
    }

    /// Blend the heading halfway toward the velocity direction
    fn turn_toward_velocity(&mut self) {
        let direction = self.velocity.div_fixed(self.velocity_magnitude);
        let blended = (self.rotation + direction).half().normalize();
        // Exactly opposite headings cancel out; snap instead
        self.rotation = if blended.is_zero() { direction } else { blended };
        self.flags.rotation_changed = true;
    }

    /// Resolution phase. `parent` is the parent's frame when parented.
    /// Returns true when a parented body moved this tick, by its own
    /// mutators or by following the parent, and needs re-partitioning
    /// against its rebuilt bounds.
    pub(crate) fn simulate(
        &mut self,
        parent: Option<&ParentFrame>,
        spread_multiplier: i64,
    ) -> bool {
        if let Some(frame) = parent {
            self.follow_parent(frame);
        }

        if self.flags.position_changed || self.flags.rotation_changed {
            if self.flags.position_changed {
                self.future_position = self.position + self.velocity.scale_int(spread_multiplier);
                self.flags.set_position_buffer = true;
            }
            if self.flags.rotation_changed {
                self.flags.set_rotation_buffer = true;
            }
            if self.config.shape != Shape::None {
                self.build_points();
                self.build_bounds(spread_multiplier);
            }
            self.flags.position_changed = false;
            self.flags.rotation_changed = false;
        }
        parent.is_some() && self.flags.position_changed_buffer
    }

    /// Apply the parent's movement from its buffers
    fn follow_parent(&mut self, frame: &ParentFrame) {
        let before = self.position;
        if frame.rotation_changed_buffer {
            self.position = hierarchy::world_position(self.local_position, frame);
            self.rotation = hierarchy::world_rotation(self.local_rotation, frame);
            self.flags.position_changed = true;
            self.flags.rotation_changed = true;
            self.flags.rotation_changed_buffer = true;
        } else if frame.position_changed_buffer {
            self.position += frame.offset;
            self.flags.position_changed = true;
        } else {
            return;
        }

        // Latch our own movement so our children, updated after us, see it
        let delta = self.position - before;
        self.offset = if self.flags.position_changed_buffer {
            self.offset + delta
        } else {
            delta
        };
        self.last_position = self.position;
        self.flags.position_changed_buffer = true;
    }

    /// Sync phase: push pending pose changes to the render target
    pub(crate) fn visualize(&mut self, target: &mut dyn RenderSync) {
        if self.flags.set_position_buffer {
            target.sync_position(self.id, self.position.to_vec2());
            self.flags.set_position_buffer = false;
        }
        if self.flags.set_rotation_buffer {
            target.sync_rotation(self.id, self.rotation.to_vec2());
            self.flags.set_rotation_buffer = false;
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2d, parent: Option<&ParentFrame>) {
        self.position = position;
        self.flags.position_changed = true;
        if let Some(frame) = parent {
            self.local_position = hierarchy::local_position(position, frame);
        }
    }

    pub(crate) fn set_rotation(&mut self, heading: Vec2d, parent: Option<&ParentFrame>) {
        self.rotation = heading;
        self.flags.rotation_changed = true;
        if let Some(frame) = parent {
            self.local_rotation = heading.rotate_inverse(frame.rotation);
        }
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2d) {
        self.velocity = velocity;
        self.flags.velocity_changed = true;
    }

    /// Position relative to the parent frame, or plain position when unparented
    pub(crate) fn set_local_position(&mut self, local: Vec2d, parent: Option<&ParentFrame>) {
        self.local_position = local;
        self.position = match parent {
            Some(frame) => hierarchy::world_position(local, frame),
            None => local,
        };
        self.flags.position_changed = true;
    }

    pub(crate) fn attach(&mut self, parent: BodyId, frame: &ParentFrame) {
        let (local_position, local_rotation) =
            hierarchy::local_pose(self.position, self.rotation, frame);
        self.parent = Some(parent);
        self.local_position = local_position;
        self.local_rotation = local_rotation;
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
    }

    /// Store the partition's placement of this body
    pub fn record_partition(&mut self, cells: LocatedPartitions, grid_bounds: Aabb) {
        self.partitions = cells;
        self.bounds.past_grid = grid_bounds;
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    pub fn shape(&self) -> &Shape {
        &self.config.shape
    }

    pub fn is_trigger(&self) -> bool {
        self.config.trigger
    }

    pub fn is_immovable(&self) -> bool {
        self.config.immovable
    }

    pub fn priority(&self) -> i32 {
        self.config.priority
    }

    /// Coarse orientation-independent radius
    pub fn radius(&self) -> Fixed {
        self.radius
    }

    pub fn position(&self) -> Vec2d {
        self.position
    }

    /// Unit heading
    pub fn rotation(&self) -> Vec2d {
        self.rotation
    }

    pub fn velocity(&self) -> Vec2d {
        self.velocity
    }

    pub fn velocity_magnitude(&self) -> Fixed {
        self.velocity_magnitude
    }

    /// Translation latched by the last position change
    pub fn offset(&self) -> Vec2d {
        self.offset
    }

    pub fn last_position(&self) -> Vec2d {
        self.last_position
    }

    /// Position extrapolated along velocity for swept checks
    pub fn future_position(&self) -> Vec2d {
        self.future_position
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    pub fn local_position(&self) -> Vec2d {
        self.local_position
    }

    pub fn local_rotation(&self) -> Vec2d {
        self.local_rotation
    }

    pub fn bounds(&self) -> &BodyBounds {
        &self.bounds
    }

    pub fn geometry(&self) -> Option<&PolygonGeometry> {
        self.geometry.as_ref()
    }

    /// Rotated, unpositioned vertices (empty unless polygon)
    pub fn rotated_points(&self) -> &[Vec2d] {
        match &self.geometry {
            Some(geometry) => geometry.rotated_points(),
            None => &[],
        }
    }

    /// World-space vertices (empty unless polygon)
    pub fn real_points(&self) -> &[Vec2d] {
        match &self.geometry {
            Some(geometry) => geometry.real_points(),
            None => &[],
        }
    }

    /// Outward edge normals (empty unless polygon)
    pub fn edge_normals(&self) -> &[Vec2d] {
        match &self.geometry {
            Some(geometry) => geometry.edge_normals(),
            None => &[],
        }
    }

    pub fn located_partitions(&self) -> &LocatedPartitions {
        &self.partitions
    }
}
