//! Drawing surface abstraction.
//!
//! Entities describe themselves through a handful of primitives so that any
//! front end (a canvas, a terminal, a JSON recorder) can display them. Render
//! calls never mutate simulation state.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Palette used by the arena's entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Blue,
    Green,
    Orange,
    Purple,
    Yellow,
    Gray,
    Black,
    Red,
}

/// A target for entity render callbacks.
pub trait Surface {
    /// Fills a circle.
    fn fill_circle(&mut self, center: Vector2<f64>, radius: f64, color: Color);

    /// Outlines a circle.
    fn stroke_circle(&mut self, center: Vector2<f64>, radius: f64, color: Color, width: f64);

    /// Draws a line segment.
    fn line(&mut self, from: Vector2<f64>, to: Vector2<f64>, color: Color, width: f64);
}

/// Surface that draws nothing. Useful when a frame is driven headless.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn fill_circle(&mut self, _center: Vector2<f64>, _radius: f64, _color: Color) {}

    fn stroke_circle(&mut self, _center: Vector2<f64>, _radius: f64, _color: Color, _width: f64) {}

    fn line(&mut self, _from: Vector2<f64>, _to: Vector2<f64>, _color: Color, _width: f64) {}
}

/// Unit vector for a heading in degrees.
pub(crate) fn heading_vector(degrees: f64) -> Vector2<f64> {
    let radians = degrees.to_radians();
    Vector2::new(radians.cos(), radians.sin())
}

/// Unit vector for a heading given in radians.
pub(crate) fn radians_vector(radians: f64) -> Vector2<f64> {
    Vector2::new(radians.cos(), radians.sin())
}
