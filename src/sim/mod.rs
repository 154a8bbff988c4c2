//! Deterministic body simulation
//!
//! All gameplay-facing physics state lives here. This module must stay pure
//! and deterministic:
//! - Fixed-point arithmetic only
//! - Fixed phase order with a barrier between phases
//! - Stable iteration order (parents first, then by body id)
//! - No rendering or platform dependencies

pub mod body;
pub mod geometry;
pub mod hierarchy;
pub mod partition;
pub mod scenario;
pub mod shape;
pub mod snapshot;
pub mod world;

pub use body::{Body, BodyId, DirtyFlags, Pose};
pub use geometry::{Aabb, BodyBounds, PolygonGeometry, bounding_radius};
pub use hierarchy::ParentFrame;
pub use partition::{
    GridConfig, LocatedPartitions, MAX_LOCATED_PARTITIONS, NullPartition, Partition, UniformGrid,
};
pub use scenario::Scenario;
pub use shape::{BodyConfig, Shape, ShapeKind};
pub use snapshot::{BodySnapshot, state_checksum};
pub use world::{Phase, SimContext};
