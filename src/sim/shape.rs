//! Shape descriptor and per-body configuration
//!
//! Configuration is fixed once a body is initialized. Scalar parameters are
//! raw Q48.16 values when read from JSON so configs stay bit-exact.

use serde::{Deserialize, Serialize};

use crate::error::BodyError;
use crate::math::{Fixed, Vec2d};

fn default_half() -> Fixed {
    Fixed::HALF
}

/// Collision geometry of a body
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Shape {
    /// No geometry; the body never builds geometry or bounds
    #[default]
    None,
    Circle {
        #[serde(default = "default_half")]
        radius: Fixed,
    },
    /// Axis-aligned box (does not rotate with the body)
    AaBox {
        #[serde(default = "default_half")]
        half_width: Fixed,
        #[serde(default = "default_half")]
        half_height: Fixed,
    },
    /// Convex polygon in body-local space, counter-clockwise winding
    Polygon { vertices: Vec<Vec2d> },
}

/// Which geometry/bounds algorithm a shape selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    None,
    Circle,
    AaBox,
    Polygon,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::None => ShapeKind::None,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::AaBox { .. } => ShapeKind::AaBox,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Circle with the given radius
    pub fn circle(radius: Fixed) -> Self {
        Shape::Circle { radius }
    }

    /// Box with the given half extents
    pub fn aa_box(half_width: Fixed, half_height: Fixed) -> Self {
        Shape::AaBox {
            half_width,
            half_height,
        }
    }

    pub fn polygon(vertices: Vec<Vec2d>) -> Self {
        Shape::Polygon { vertices }
    }

    /// Local-space vertices (empty for non-polygons)
    pub fn vertices(&self) -> &[Vec2d] {
        match self {
            Shape::Polygon { vertices } => vertices,
            _ => &[],
        }
    }
}

/// Per-body configuration, editable until the body is initialized
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BodyConfig {
    pub shape: Shape,
    /// Overlap notifications only, no physical response
    #[serde(default)]
    pub trigger: bool,
    /// Callers skip integrating immovable bodies
    #[serde(default)]
    pub immovable: bool,
    /// Broad-phase ordering hint, not interpreted by the body
    #[serde(default)]
    pub priority: i32,
}

impl BodyConfig {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BodyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject parameter sets the geometry code can't handle
    pub fn validate(&self) -> Result<(), BodyError> {
        match &self.shape {
            Shape::None => Ok(()),
            Shape::Circle { radius } => {
                if *radius <= Fixed::ZERO {
                    return Err(BodyError::InvalidShape(format!(
                        "circle radius must be positive, got raw {}",
                        radius.raw()
                    )));
                }
                Ok(())
            }
            Shape::AaBox {
                half_width,
                half_height,
            } => {
                if *half_width <= Fixed::ZERO || *half_height <= Fixed::ZERO {
                    return Err(BodyError::InvalidShape(
                        "box half extents must be positive".to_string(),
                    ));
                }
                Ok(())
            }
            Shape::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(BodyError::InvalidShape(format!(
                        "polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                Ok(())
            }
        }
    }
}
