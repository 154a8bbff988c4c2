//! Simulation context
//!
//! Owns the body arena, the partition and the settings, and drives the
//! three-phase tick. Phases must be entered in order (early simulate,
//! simulate, visualize); each runs over every body before the next starts.
//!
//! Bodies are visited parents-first (by hierarchy depth, then id) so a child
//! always sees its parent's state for the current phase, whatever order the
//! bodies were registered in.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, Pose};
use super::hierarchy::{self, ParentFrame};
use super::partition::{Partition, UniformGrid};
use super::shape::BodyConfig;
use super::snapshot::{BodySnapshot, state_checksum};
use crate::error::BodyError;
use crate::math::Vec2d;
use crate::render::RenderSync;
use crate::settings::SimConfig;

/// Tick phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    EarlySimulate,
    Simulate,
    Visualize,
}

/// Registry and step driver for a set of bodies
#[derive(Debug)]
pub struct SimContext<P: Partition = UniformGrid> {
    config: SimConfig,
    bodies: Vec<Body>,
    /// Update order, parents before children
    order: Vec<BodyId>,
    order_dirty: bool,
    partition: P,
    next_phase: Phase,
    tick: u64,
}

impl SimContext<UniformGrid> {
    /// Context with a uniform grid laid out by `config.grid`
    pub fn new(config: SimConfig) -> Self {
        let grid = UniformGrid::new(config.grid);
        Self::with_partition(config, grid)
    }
}

impl Default for SimContext<UniformGrid> {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl<P: Partition> SimContext<P> {
    pub fn with_partition(config: SimConfig, partition: P) -> Self {
        Self {
            config,
            bodies: Vec::new(),
            order: Vec::new(),
            order_dirty: false,
            partition,
            next_phase: Phase::EarlySimulate,
            tick: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Phase the next phase call must be
    pub fn next_phase(&self) -> Phase {
        self.next_phase
    }

    pub fn partition(&self) -> &P {
        &self.partition
    }

    pub fn partition_mut(&mut self) -> &mut P {
        &mut self.partition
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// All bodies, indexed by id
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, BodyError> {
        self.bodies.get(id.index()).ok_or(BodyError::UnknownBody(id))
    }

    /// Ids in update order
    pub fn update_order(&mut self) -> &[BodyId] {
        self.refresh_order();
        &self.order
    }

    /// Validate `config`, register a new body and build it at `pose`
    pub fn initialize(&mut self, config: BodyConfig, pose: Pose) -> Result<BodyId, BodyError> {
        config.validate()?;
        let id = BodyId(self.bodies.len() as u32);
        let mut body = Body::new(id, config);
        body.initialize(pose, self.config.spread_multiplier);
        self.bodies.push(body);
        self.order.push(id);
        self.order_dirty = true;
        log::debug!("Registered body {:?} ({:?})", id, self.bodies[id.index()].shape().kind());
        Ok(id)
    }

    /// Re-initialize a registered body at `pose`. Its parent link is dropped
    /// and it is removed from the partition until it moves again.
    pub fn reset(&mut self, id: BodyId, pose: Pose) -> Result<(), BodyError> {
        let spread = self.config.spread_multiplier;
        let body = self
            .bodies
            .get_mut(id.index())
            .ok_or(BodyError::UnknownBody(id))?;
        self.partition.forget_object(body);
        body.initialize(pose, spread);
        self.order_dirty = true;
        Ok(())
    }

    pub fn set_position(&mut self, id: BodyId, position: Vec2d) -> Result<(), BodyError> {
        let frame = self.parent_frame(id)?;
        self.bodies[id.index()].set_position(position, frame.as_ref());
        Ok(())
    }

    /// `heading` must already be a unit vector
    pub fn set_rotation(&mut self, id: BodyId, heading: Vec2d) -> Result<(), BodyError> {
        let frame = self.parent_frame(id)?;
        self.bodies[id.index()].set_rotation(heading, frame.as_ref());
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2d) -> Result<(), BodyError> {
        self.body_mut(id)?.set_velocity(velocity);
        Ok(())
    }

    /// Position in the parent's frame (plain world position when unparented)
    pub fn set_local_position(&mut self, id: BodyId, local: Vec2d) -> Result<(), BodyError> {
        let frame = self.parent_frame(id)?;
        self.bodies[id.index()].set_local_position(local, frame.as_ref());
        Ok(())
    }

    /// Make `parent` the parent of `child`, caching the child's pose in the
    /// parent's frame. Re-attaching to the current parent does nothing.
    pub fn set_parent(&mut self, child: BodyId, parent: BodyId) -> Result<(), BodyError> {
        self.body(parent)?;
        if self.body(child)?.parent() == Some(parent) {
            return Ok(());
        }
        if hierarchy::would_create_cycle(&self.bodies, child, parent) {
            log::warn!("Rejected parenting {:?} to {:?}: cycle", child, parent);
            return Err(BodyError::ParentCycle { child, parent });
        }
        let frame = ParentFrame::of(&self.bodies[parent.index()]);
        self.bodies[child.index()].attach(parent, &frame);
        self.order_dirty = true;
        log::debug!("Parented {:?} to {:?}", child, parent);
        Ok(())
    }

    pub fn clear_parent(&mut self, child: BodyId) -> Result<(), BodyError> {
        let body = self.body_mut(child)?;
        if body.parent().is_some() {
            body.detach();
            self.order_dirty = true;
            log::debug!("Unparented {:?}", child);
        }
        Ok(())
    }

    /// Phase 1: integrate and latch change buffers; moved root bodies are
    /// re-partitioned.
    pub fn early_simulate(&mut self) -> Result<(), BodyError> {
        self.enter(Phase::EarlySimulate)?;
        self.refresh_order();
        for &id in &self.order {
            let body = &mut self.bodies[id.index()];
            if body.early_simulate() {
                self.partition.partition_object(body);
            }
        }
        self.next_phase = Phase::Simulate;
        Ok(())
    }

    /// Phase 2: follow parents and rebuild geometry/bounds of moved bodies;
    /// moved children are re-partitioned here, once per tick.
    pub fn simulate(&mut self) -> Result<(), BodyError> {
        self.enter(Phase::Simulate)?;
        self.refresh_order();
        let spread = self.config.spread_multiplier;
        for &id in &self.order {
            let frame = self.bodies[id.index()]
                .parent()
                .map(|parent| ParentFrame::of(&self.bodies[parent.index()]));
            let body = &mut self.bodies[id.index()];
            if body.simulate(frame.as_ref(), spread) {
                self.partition.partition_object(body);
            }
        }
        self.next_phase = Phase::Visualize;
        Ok(())
    }

    /// Phase 3: push changed poses to `target`. Completes the tick.
    pub fn visualize(&mut self, target: &mut dyn RenderSync) -> Result<(), BodyError> {
        self.enter(Phase::Visualize)?;
        self.refresh_order();
        for &id in &self.order {
            self.bodies[id.index()].visualize(target);
        }
        self.next_phase = Phase::EarlySimulate;
        self.tick += 1;
        Ok(())
    }

    /// Run one full tick
    pub fn step(&mut self, target: &mut dyn RenderSync) -> Result<(), BodyError> {
        self.early_simulate()?;
        self.simulate()?;
        self.visualize(target)
    }

    /// Raw state of every body, in id order
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.iter().map(BodySnapshot::from).collect()
    }

    /// Digest of all simulation state; equal across participants in sync
    pub fn checksum(&self) -> u64 {
        state_checksum(&self.bodies)
    }

    fn enter(&self, phase: Phase) -> Result<(), BodyError> {
        if self.next_phase != phase {
            return Err(BodyError::OutOfPhase {
                expected: self.next_phase,
                got: phase,
            });
        }
        Ok(())
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, BodyError> {
        self.bodies
            .get_mut(id.index())
            .ok_or(BodyError::UnknownBody(id))
    }

    /// Frame of `id`'s parent, or `None` when unparented
    fn parent_frame(&self, id: BodyId) -> Result<Option<ParentFrame>, BodyError> {
        Ok(self
            .body(id)?
            .parent()
            .map(|parent| ParentFrame::of(&self.bodies[parent.index()])))
    }

    fn refresh_order(&mut self) {
        if !self.order_dirty {
            return;
        }
        let bodies = &self.bodies;
        self.order.sort_by_key(|&id| (hierarchy::depth(bodies, id), id));
        self.order_dirty = false;
    }
}
