//! Lockstep Body - deterministic fixed-point 2D rigid bodies
//!
//! Every participant in a lockstep simulation must compute bit-identical
//! poses and collision geometry from identical inputs, so nothing on the
//! simulation side touches floating point.
//!
//! Core modules:
//! - `math`: Q48.16 fixed-point scalar and 2D vector
//! - `sim`: Body state machine, geometry/bounds caches, hierarchy, partition
//!   boundary and the three-phase tick driver
//! - `render`: Presentation-side sync target (the only float code)
//! - `settings`: Simulation constants, loadable from JSON

pub mod error;
pub mod math;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::BodyError;
pub use math::{Fixed, Vec2d};
pub use render::{NoRender, RenderSync, RenderTransform, TransformBuffer};
pub use settings::SimConfig;
pub use sim::{Body, BodyConfig, BodyId, Pose, Shape, SimContext};

/// Simulation constants
pub mod consts {
    /// Default ticks of velocity the future bounds are swept over
    pub const DEFAULT_SPREAD_MULTIPLIER: i64 = 2;
    /// Default body count for the headless runner
    pub const DEFAULT_SCENARIO_BODIES: usize = 256;
    /// Default tick count for the headless runner
    pub const DEFAULT_SCENARIO_TICKS: u64 = 600;
}
