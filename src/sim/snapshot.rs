//! State snapshots and desync checksums
//!
//! Lockstep participants compare [`state_checksum`] each tick; a mismatch
//! means someone diverged. The snapshot is the serializable form to diff
//! when that happens.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use super::geometry::BodyBounds;
use crate::math::{Fixed, Vec2d};

/// Raw fixed-point state of one body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec2d,
    pub rotation: Vec2d,
    pub velocity: Vec2d,
    pub parent: Option<BodyId>,
    pub bounds: BodyBounds,
    pub real_points: Vec<Vec2d>,
}

impl From<&Body> for BodySnapshot {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id(),
            position: body.position(),
            rotation: body.rotation(),
            velocity: body.velocity(),
            parent: body.parent(),
            bounds: *body.bounds(),
            real_points: body.real_points().to_vec(),
        }
    }
}

/// Little-endian raw integers fed to a BLAKE3 hasher
struct StateHasher(blake3::Hasher);

impl StateHasher {
    fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    fn write_i64(&mut self, value: i64) {
        self.0.update(&value.to_le_bytes());
    }

    fn write_fixed(&mut self, value: Fixed) {
        self.write_i64(value.raw());
    }

    fn write_vec(&mut self, v: Vec2d) {
        self.write_fixed(v.x);
        self.write_fixed(v.y);
    }

    /// First eight digest bytes, little-endian
    fn finish(&self) -> u64 {
        digest_prefix(self.0.finalize())
    }
}

fn digest_prefix(hash: blake3::Hash) -> u64 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

/// Digest of every body's pose, velocity, bounds and world-space vertices
pub fn state_checksum(bodies: &[Body]) -> u64 {
    let mut hash = StateHasher::new();
    for body in bodies {
        hash.write_i64(body.id().0 as i64);
        hash.write_vec(body.position());
        hash.write_vec(body.rotation());
        hash.write_vec(body.velocity());
        let bounds = body.bounds();
        for aabb in [bounds.current, bounds.future] {
            hash.write_fixed(aabb.x_min);
            hash.write_fixed(aabb.x_max);
            hash.write_fixed(aabb.y_min);
            hash.write_fixed(aabb.y_max);
        }
        for &p in body.real_points() {
            hash.write_vec(p);
        }
    }
    hash.finish()
}
