// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric primitives and utility functions.
//!
//! This module provides the surface-space position, size and offset types
//! shared by drawables and the drag session, plus the 2D affine transform
//! used to emulate a canvas-style transform stack.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in surface coordinates (pixels, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Difference between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Sub for Position {
    type Output = Offset;

    fn sub(self, rhs: Position) -> Offset {
        Offset {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, rhs: Offset) -> Position {
        Position::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// Width and height of a drawable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 2D affine transform in canvas layout:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Post-multiply by a translation, like `CanvasRenderingContext2D.translate`.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.e += self.a * tx + self.c * ty;
        self.f += self.b * tx + self.d * ty;
    }

    /// Post-multiply by a clockwise rotation (y axis points down).
    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f64, y: f64) -> Position {
        Position::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Corners of an axis-aligned rectangle after transformation, in
    /// top-left, top-right, bottom-right, bottom-left order.
    pub fn quad(&self, x: f64, y: f64, width: f64, height: f64) -> [Position; 4] {
        [
            self.apply(x, y),
            self.apply(x + width, y),
            self.apply(x + width, y + height),
            self.apply(x, y + height),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Position, x: f64, y: f64) {
        assert!((actual.x - x).abs() < 0.0001, "x: {} != {}", actual.x, x);
        assert!((actual.y - y).abs() < 0.0001, "y: {} != {}", actual.y, y);
    }

    #[test]
    fn test_offset_arithmetic() {
        let object = Position::new(30.0, 80.0);
        let grab = Position::new(40.0, 90.0);

        let offset = object - grab;
        assert_eq!(offset, Offset { dx: -10.0, dy: -10.0 });
        assert_eq!(Position::new(100.0, 100.0) + offset, Position::new(90.0, 90.0));
    }

    #[test]
    fn test_translate_then_rotate_quarter_turn() {
        let mut transform = Transform2D::IDENTITY;
        transform.translate(10.0, 20.0);
        transform.rotate(std::f64::consts::FRAC_PI_2);

        // +x in local space points down the screen after a quarter turn
        assert_close(transform.apply(5.0, 0.0), 10.0, 25.0);
        assert_close(transform.apply(0.0, 5.0), 5.0, 20.0);
    }

    #[test]
    fn test_quad_centered_on_origin() {
        let mut transform = Transform2D::IDENTITY;
        transform.translate(50.0, 50.0);

        let corners = transform.quad(-10.0, -5.0, 20.0, 10.0);
        assert_close(corners[0], 40.0, 45.0);
        assert_close(corners[2], 60.0, 55.0);
    }

    #[test]
    fn test_rotation_preserves_center() {
        let mut transform = Transform2D::IDENTITY;
        transform.translate(25.0, 25.0);
        transform.rotate(45f64.to_radians());

        assert_close(transform.apply(0.0, 0.0), 25.0, 25.0);
    }
}
