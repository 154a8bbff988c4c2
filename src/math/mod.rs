//! Deterministic fixed-point math
//!
//! Everything the simulation computes goes through these types. There is no
//! floating point on the simulation side; `to_f32`/`to_vec2` exist only for
//! presentation.

pub mod fixed;
pub mod vec2;

pub use fixed::Fixed;
pub use vec2::Vec2d;
