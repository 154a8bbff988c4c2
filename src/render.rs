//! Render/transform sync target
//!
//! The visualize phase is the only place poses leave the simulation, and the
//! only place floats appear. Nothing here is ever read back by the sim.

use glam::Vec2;
use serde::Serialize;

use crate::sim::BodyId;

/// Receives body poses after they changed
pub trait RenderSync {
    fn sync_position(&mut self, id: BodyId, position: Vec2);
    fn sync_rotation(&mut self, id: BodyId, heading: Vec2);
}

/// Headless target
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRender;

impl RenderSync for NoRender {
    fn sync_position(&mut self, _id: BodyId, _position: Vec2) {}
    fn sync_rotation(&mut self, _id: BodyId, _heading: Vec2) {}
}

/// Presentation pose of one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderTransform {
    pub position: Vec2,
    pub heading: Vec2,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            heading: Vec2::Y,
        }
    }
}

impl RenderTransform {
    /// Heading as an angle in radians, for renderers that want one
    pub fn angle(&self) -> f32 {
        self.heading.y.atan2(self.heading.x)
    }
}

/// Latest transform per body, indexed by id
#[derive(Debug, Clone, Default)]
pub struct TransformBuffer {
    transforms: Vec<RenderTransform>,
    position_syncs: u64,
    rotation_syncs: u64,
}

impl TransformBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: BodyId) -> Option<&RenderTransform> {
        self.transforms.get(id.index())
    }

    pub fn transforms(&self) -> &[RenderTransform] {
        &self.transforms
    }

    /// Total position pushes received
    pub fn position_syncs(&self) -> u64 {
        self.position_syncs
    }

    /// Total heading pushes received
    pub fn rotation_syncs(&self) -> u64 {
        self.rotation_syncs
    }

    fn slot(&mut self, id: BodyId) -> &mut RenderTransform {
        let index = id.index();
        if index >= self.transforms.len() {
            self.transforms.resize(index + 1, RenderTransform::default());
        }
        &mut self.transforms[index]
    }
}

impl RenderSync for TransformBuffer {
    fn sync_position(&mut self, id: BodyId, position: Vec2) {
        self.slot(id).position = position;
        self.position_syncs += 1;
    }

    fn sync_rotation(&mut self, id: BodyId, heading: Vec2) {
        self.slot(id).heading = heading;
        self.rotation_syncs += 1;
    }
}
