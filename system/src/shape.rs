use euclid::default::{Point2D, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl std::default::Default for Color {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }
}

/// Stroke/fill style shared by every shape variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub color: Color,
    pub filled: bool,
}

/// One drawn primitive. Immutable once created; identity is the position
/// in the canvas, not a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle {
        bounds: Rect<f32>,
        style: ShapeStyle,
    },
    Ellipse {
        bounds: Rect<f32>,
        style: ShapeStyle,
    },
    RoundedRectangle {
        bounds: Rect<f32>,
        style: ShapeStyle,
    },
    Star {
        bounds: Rect<f32>,
        style: ShapeStyle,
    },
    Line {
        from: Point2D<f32>,
        to: Point2D<f32>,
        style: ShapeStyle,
    },
    Text {
        anchor: Point2D<f32>,
        content: String,
        style: ShapeStyle,
    },
    EraserStroke {
        points: Vec<Point2D<f32>>,
        width: f32,
        style: ShapeStyle,
    },
}
