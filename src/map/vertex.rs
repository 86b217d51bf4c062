// src/map/vertex.rs
use crate::utils::Point2D;

pub type VertexId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point2D,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Vertex { pos: Point2D::new(x, y) }
    }
}
