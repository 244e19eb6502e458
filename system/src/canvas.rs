use serde::{Deserialize, Serialize};

use crate::shape::Shape;

/// The authoritative ordered list of drawn shapes. Append order is the
/// render order; nothing ever reorders it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasState {
    shapes: Vec<Shape>,
}

impl CanvasState {
    pub fn new() -> Self {
        CanvasState { shapes: Vec::new() }
    }

    pub fn append(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Owned copy handed to joining or resyncing clients.
    pub fn snapshot(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
