//! Parent/child transform propagation
//!
//! A child stores its pose in the parent's rotated frame. When the parent
//! turns, the child re-derives its world pose from that cached local pose;
//! when the parent only translates, the child just adds the parent's offset.
//! Parent links are arena indices, so an ancestor walk is a few lookups.

use super::body::{Body, BodyId};
use crate::math::Vec2d;

/// What a child needs to know about its parent during a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentFrame {
    pub position: Vec2d,
    pub rotation: Vec2d,
    /// Parent translation since its last recorded position
    pub offset: Vec2d,
    pub position_changed_buffer: bool,
    pub rotation_changed_buffer: bool,
}

impl ParentFrame {
    pub fn of(parent: &Body) -> Self {
        let flags = parent.flags();
        Self {
            position: parent.position(),
            rotation: parent.rotation(),
            offset: parent.offset(),
            position_changed_buffer: flags.position_changed_buffer,
            rotation_changed_buffer: flags.rotation_changed_buffer,
        }
    }
}

/// Express a world pose in the parent's frame
pub fn local_pose(position: Vec2d, rotation: Vec2d, frame: &ParentFrame) -> (Vec2d, Vec2d) {
    (
        local_position(position, frame),
        rotation.rotate_inverse(frame.rotation),
    )
}

pub fn local_position(position: Vec2d, frame: &ParentFrame) -> Vec2d {
    (position - frame.position).rotate_inverse(frame.rotation)
}

pub fn world_position(local_position: Vec2d, frame: &ParentFrame) -> Vec2d {
    frame.position + local_position.rotate(frame.rotation)
}

pub fn world_rotation(local_rotation: Vec2d, frame: &ParentFrame) -> Vec2d {
    local_rotation.rotate(frame.rotation)
}

/// True if making `parent` the parent of `child` would close a loop
pub fn would_create_cycle(bodies: &[Body], child: BodyId, parent: BodyId) -> bool {
    let mut cursor = Some(parent);
    // A valid chain is never longer than the arena
    for _ in 0..=bodies.len() {
        match cursor {
            None => return false,
            Some(id) if id == child => return true,
            Some(id) => cursor = bodies.get(id.index()).and_then(Body::parent),
        }
    }
    true
}

/// Number of ancestors above `id`
pub fn depth(bodies: &[Body], id: BodyId) -> usize {
    let mut depth = 0;
    let mut cursor = bodies.get(id.index()).and_then(Body::parent);
    while let Some(parent) = cursor {
        depth += 1;
        if depth > bodies.len() {
            break;
        }
        cursor = bodies.get(parent.index()).and_then(Body::parent);
    }
    depth
}
