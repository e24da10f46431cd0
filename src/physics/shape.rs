//! Collision geometry
//!
//! Only circles are exercised by the game, but `Shape` stays a tagged union so
//! fixtures carry their geometry by value.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle in body-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Local-space center offset from the body origin
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Circle centered on the body origin. Negative radii clamp to zero.
    pub fn new(radius: f32) -> Self {
        Self::with_offset(Vec2::ZERO, radius)
    }

    pub fn with_offset(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

/// Fixture geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle(Circle::new(radius))
    }

    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.radius,
        }
    }

    /// Place the shape in world space for a body at `position` rotated by `angle`
    pub fn to_world(&self, position: Vec2, angle: f32) -> WorldShape {
        match self {
            Shape::Circle(c) => {
                let center = if c.center == Vec2::ZERO {
                    position
                } else {
                    position + Vec2::from_angle(angle).rotate(c.center)
                };
                WorldShape::Circle {
                    center,
                    radius: c.radius,
                }
            }
        }
    }
}

/// A shape transformed into world space, used for one detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    Circle { center: Vec2, radius: f32 },
}

impl WorldShape {
    /// Strict overlap: touching circles (distance == r1 + r2) do not overlap
    pub fn overlaps(&self, other: &WorldShape) -> bool {
        match (self, other) {
            (
                WorldShape::Circle { center: ca, radius: ra },
                WorldShape::Circle { center: cb, radius: rb },
            ) => circles_overlap(*ca, *ra, *cb, *rb),
        }
    }
}

/// Two circles overlap when the distance between centers is below the radius sum
#[inline]
pub fn circles_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    center_a.distance_squared(center_b) < reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_circles_overlap_strict() {
        // Centers 20 apart, radii 10 + 10: touching, not overlapping
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(19.9, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(0.0, 25.0), 10.0));
    }

    #[test]
    fn test_negative_radius_clamps() {
        assert_eq!(Circle::new(-3.0).radius, 0.0);
    }

    #[test]
    fn test_offset_rotates_with_body() {
        let shape = Shape::Circle(Circle::with_offset(Vec2::new(5.0, 0.0), 1.0));
        let WorldShape::Circle { center, .. } = shape.to_world(Vec2::new(10.0, 10.0), FRAC_PI_2);
        assert!((center - Vec2::new(10.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn test_world_shape_overlap() {
        let a = Shape::circle(10.0).to_world(Vec2::ZERO, 0.0);
        let b = Shape::circle(5.0).to_world(Vec2::new(14.0, 0.0), 0.0);
        let c = Shape::circle(5.0).to_world(Vec2::new(16.0, 0.0), 0.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
