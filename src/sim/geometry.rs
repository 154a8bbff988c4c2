//! Geometry and bounds caches
//!
//! Polygons keep three per-vertex arrays: vertices rotated into the current
//! heading, the same vertices translated to world space, and outward edge
//! normals. Rotation work is only redone when the heading changed; the
//! translation into world space is cheap and runs on every rebuild.
//!
//! Bounds come in three flavours: the tight box around the current pose, a
//! "future" box swept along the velocity for the broad phase, and the
//! past-grid box the partition uses to detect cell membership changes.

use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::math::{Fixed, Vec2d};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    pub x_min: Fixed,
    pub x_max: Fixed,
    pub y_min: Fixed,
    pub y_max: Fixed,
}

impl Aabb {
    /// Box of the given half extents centered on `center`
    pub fn around(center: Vec2d, half_x: Fixed, half_y: Fixed) -> Self {
        Self {
            x_min: -half_x + center.x,
            x_max: half_x + center.x,
            y_min: -half_y + center.y,
            y_max: half_y + center.y,
        }
    }

    /// Smallest box holding every point. Empty input gives the zero box.
    pub fn from_points(points: &[Vec2d]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut aabb = Self {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        for p in &points[1..] {
            aabb.x_min = aabb.x_min.min(p.x);
            aabb.x_max = aabb.x_max.max(p.x);
            aabb.y_min = aabb.y_min.min(p.y);
            aabb.y_max = aabb.y_max.max(p.y);
        }
        aabb
    }

    /// Same box moved by `offset`
    pub fn shifted(self, offset: Vec2d) -> Self {
        Self {
            x_min: self.x_min + offset.x,
            x_max: self.x_max + offset.x,
            y_min: self.y_min + offset.y,
            y_max: self.y_max + offset.y,
        }
    }

    /// Inclusive overlap test
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }

    pub fn contains(&self, p: Vec2d) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}

/// Bounds cache of a body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBounds {
    /// Tight box around the current pose
    pub current: Aabb,
    /// `current` shifted by `velocity * spread_multiplier`
    pub future: Aabb,
    /// Box last used by the partition to place the body
    pub past_grid: Aabb,
}

impl BodyBounds {
    /// Rebuild current and future bounds for the committed pose.
    ///
    /// `real_points` is only read for polygons.
    pub fn rebuild(&mut self, shape: &Shape, position: Vec2d, real_points: &[Vec2d], sweep: Vec2d) {
        self.current = match shape {
            Shape::None => return,
            Shape::Circle { radius } => Aabb::around(position, *radius, *radius),
            Shape::AaBox {
                half_width,
                half_height,
            } => Aabb::around(position, *half_width, *half_height),
            Shape::Polygon { .. } => Aabb::from_points(real_points),
        };
        self.future = self.current.shifted(sweep);
    }
}

/// Coarse, orientation-independent radius around the body origin.
///
/// Circles use their radius, boxes the circumscribing circle and polygons the
/// farthest vertex. `None` has no extent.
pub fn bounding_radius(shape: &Shape) -> Fixed {
    match shape {
        Shape::None => Fixed::ZERO,
        Shape::Circle { radius } => *radius,
        Shape::AaBox {
            half_width,
            half_height,
        } => Vec2d::new(*half_width, *half_height).magnitude(),
        Shape::Polygon { vertices } => vertices
            .iter()
            .map(|v| v.sqr_magnitude())
            .max()
            .unwrap_or(Fixed::ZERO)
            .sqrt(),
    }
}

/// Per-vertex polygon caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    rotated: Vec<Vec2d>,
    real: Vec<Vec2d>,
    edge_normals: Vec<Vec2d>,
}

impl PolygonGeometry {
    /// Allocate the caches for `shape`, with rotated points already in
    /// `heading`. Returns `None` for anything but a polygon.
    pub fn generate(shape: &Shape, heading: Vec2d) -> Option<Self> {
        let Shape::Polygon { vertices } = shape else {
            return None;
        };
        Some(Self {
            rotated: vertices.iter().map(|v| v.rotate(heading)).collect(),
            real: vec![Vec2d::ZERO; vertices.len()],
            edge_normals: vec![Vec2d::ZERO; vertices.len()],
        })
    }

    /// Refresh the caches for the committed pose.
    ///
    /// With `rotation_changed` the rotated points and edge normals are
    /// recomputed from `vertices`; the world-space points are always
    /// re-translated by `position`.
    pub fn build(
        &mut self,
        vertices: &[Vec2d],
        heading: Vec2d,
        position: Vec2d,
        rotation_changed: bool,
    ) {
        if rotation_changed {
            for (slot, v) in self.rotated.iter_mut().zip(vertices) {
                *slot = v.rotate(heading);
            }
            let n = self.rotated.len();
            for i in 0..n {
                let prev = self.rotated[(i + n - 1) % n];
                // Clockwise quarter turn of a CCW edge points outward
                self.edge_normals[i] = (self.rotated[i] - prev).normalize().rotate_right();
            }
        }
        for (real, rotated) in self.real.iter_mut().zip(&self.rotated) {
            *real = *rotated + position;
        }
    }

    /// Vertices rotated into the body heading, not yet positioned
    pub fn rotated_points(&self) -> &[Vec2d] {
        &self.rotated
    }

    /// World-space vertices
    pub fn real_points(&self) -> &[Vec2d] {
        &self.real
    }

    /// Outward normal of the edge ending at each vertex
    pub fn edge_normals(&self) -> &[Vec2d] {
        &self.edge_normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Shape {
        Shape::polygon(vec![
            Vec2d::from_int(0, 0),
            Vec2d::from_int(2, 0),
            Vec2d::from_int(0, 2),
        ])
    }

    #[test]
    fn test_generate_points_only_for_polygons() {
        assert!(PolygonGeometry::generate(&Shape::circle(Fixed::ONE), Vec2d::RIGHT).is_none());
        assert!(PolygonGeometry::generate(&Shape::None, Vec2d::RIGHT).is_none());

        let geo = PolygonGeometry::generate(&triangle(), Vec2d::UP).expect("polygon");
        assert_eq!(geo.rotated_points()[1], Vec2d::from_int(0, 2));
        assert_eq!(geo.real_points().len(), 3);
        assert_eq!(geo.edge_normals().len(), 3);
    }

    #[test]
    fn test_build_translates_and_normals_point_outward() {
        let shape = triangle();
        let mut geo = PolygonGeometry::generate(&shape, Vec2d::RIGHT).expect("polygon");
        geo.build(shape.vertices(), Vec2d::RIGHT, Vec2d::from_int(5, 5), true);

        assert_eq!(
            geo.real_points(),
            &[Vec2d::from_int(5, 5), Vec2d::from_int(7, 5), Vec2d::from_int(5, 7)]
        );
        // Edge (0,2)->(0,0) faces -x, edge (0,0)->(2,0) faces -y
        assert_eq!(geo.edge_normals()[0], Vec2d::from_int(-1, 0));
        assert_eq!(geo.edge_normals()[1], Vec2d::from_int(0, -1));
        let hyp = geo.edge_normals()[2];
        assert!(hyp.x > Fixed::ZERO && hyp.y > Fixed::ZERO);
        assert_eq!(hyp.x, hyp.y);
    }

    #[test]
    fn test_build_without_rotation_keeps_normals() {
        let shape = triangle();
        let mut geo = PolygonGeometry::generate(&shape, Vec2d::RIGHT).expect("polygon");
        geo.build(shape.vertices(), Vec2d::RIGHT, Vec2d::ZERO, true);
        let normals = geo.edge_normals().to_vec();

        // Heading passed in is ignored when rotation didn't change
        geo.build(shape.vertices(), Vec2d::UP, Vec2d::from_int(1, 1), false);
        assert_eq!(geo.edge_normals(), normals.as_slice());
        assert_eq!(geo.real_points()[1], Vec2d::from_int(3, 1));
    }

    #[test]
    fn test_build_is_idempotent() {
        let shape = triangle();
        let mut geo = PolygonGeometry::generate(&shape, Vec2d::UP).expect("polygon");
        geo.build(shape.vertices(), Vec2d::UP, Vec2d::from_int(-3, 4), true);
        let first = geo.clone();
        geo.build(shape.vertices(), Vec2d::UP, Vec2d::from_int(-3, 4), true);
        assert_eq!(geo, first);
    }

    #[test]
    fn test_bounding_radius() {
        assert_eq!(bounding_radius(&Shape::circle(Fixed::from_int(3))), Fixed::from_int(3));
        assert_eq!(
            bounding_radius(&Shape::aa_box(Fixed::from_int(3), Fixed::from_int(4))),
            Fixed::from_int(5)
        );
        assert_eq!(bounding_radius(&triangle()), Fixed::from_int(2));
        assert_eq!(bounding_radius(&Shape::None), Fixed::ZERO);

        // Square box: sqrt(2) * half
        let square = bounding_radius(&Shape::aa_box(Fixed::ONE, Fixed::ONE));
        assert_eq!(square, Fixed::from_int(2).sqrt());
    }

    #[test]
    fn test_box_bounds_are_tight() {
        let shape = Shape::aa_box(Fixed::from_int(2), Fixed::from_int(1));
        let mut bounds = BodyBounds::default();
        bounds.rebuild(&shape, Vec2d::from_int(10, -4), &[], Vec2d::ZERO);
        assert_eq!(bounds.current.x_min, Fixed::from_int(8));
        assert_eq!(bounds.current.x_max, Fixed::from_int(12));
        assert_eq!(bounds.current.y_min, Fixed::from_int(-5));
        assert_eq!(bounds.current.y_max, Fixed::from_int(-3));
        assert_eq!(bounds.future, bounds.current);
    }

    #[test]
    fn test_future_bounds_follow_sweep() {
        let shape = Shape::circle(Fixed::ONE);
        let mut bounds = BodyBounds::default();
        let sweep = Vec2d::from_int(3, -2);
        bounds.rebuild(&shape, Vec2d::ZERO, &[], sweep);
        assert_eq!(bounds.future, bounds.current.shifted(sweep));
        assert_eq!(bounds.future.x_min, Fixed::from_int(2));
        assert_eq!(bounds.future.y_max, Fixed::from_int(-1));
    }

    #[test]
    fn test_none_shape_leaves_bounds_untouched() {
        let mut bounds = BodyBounds::default();
        bounds.rebuild(&Shape::None, Vec2d::from_int(9, 9), &[], Vec2d::from_int(1, 1));
        assert_eq!(bounds, BodyBounds::default());
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::around(Vec2d::ZERO, Fixed::ONE, Fixed::ONE);
        let b = Aabb::around(Vec2d::from_int(2, 0), Fixed::ONE, Fixed::ONE);
        let c = Aabb::around(Vec2d::from_int(5, 0), Fixed::ONE, Fixed::ONE);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(Vec2d::from_int(1, -1)));
    }
}
