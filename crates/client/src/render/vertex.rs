use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use cellwars::{Color, Shape};
use glam::Vec2;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexStepMode};

const CIRCLE_SEGMENTS: usize = 32;
const HAIRLINE: f32 = 1.0;

/// Flat-colored 2D vertex in world coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CanvasVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl CanvasVertex {
    const ATTRIBS: [VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x4   // color
    ];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<CanvasVertex>() as wgpu::BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Triangle list built from canvas shapes, in submission order.
#[derive(Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<CanvasVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn fill(&mut self, shape: &Shape, color: Color) {
        match *shape {
            Shape::Line { from, to } => self.segment(from, to, HAIRLINE, color),
            Shape::Circle { center, radius } => {
                if radius > 0.0 && center.is_finite() && radius.is_finite() {
                    self.disc(center, &outline(shape), color);
                }
            }
            _ => self.convex(&outline(shape), color),
        }
    }

    pub fn stroke(&mut self, shape: &Shape, color: Color, width: f32) {
        if let Shape::Line { from, to } = *shape {
            self.segment(from, to, width, color);
            return;
        }

        let points = outline(shape);
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.segment(from, to, width, color);
        }
    }

    fn segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let dir = to - from;
        if !(dir.length_squared() > 0.0) || !(width > 0.0) {
            return;
        }
        let normal = dir.normalize().perp() * (width * 0.5);
        self.quad([from + normal, to + normal, to - normal, from - normal], color);
    }

    fn quad(&mut self, corners: [Vec2; 4], color: Color) {
        let base = self.vertices.len() as u32;
        self.push_vertices(&corners, color);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Fan from the first corner of a convex polygon.
    fn convex(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || !points.iter().all(|p| p.is_finite()) {
            return;
        }
        let base = self.vertices.len() as u32;
        self.push_vertices(points, color);
        for i in 1..points.len() as u32 - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    /// Closed fan around `center`.
    fn disc(&mut self, center: Vec2, rim: &[Vec2], color: Color) {
        let base = self.vertices.len() as u32;
        self.push_vertices(&[center], color);
        self.push_vertices(rim, color);

        let n = rim.len() as u32;
        for i in 0..n {
            self.indices
                .extend_from_slice(&[base, base + 1 + i, base + 1 + (i + 1) % n]);
        }
    }

    fn push_vertices(&mut self, points: &[Vec2], color: Color) {
        let color = color.to_array();
        self.vertices.extend(points.iter().map(|p| CanvasVertex {
            position: p.to_array(),
            color,
        }));
    }
}

/// Corner or rim points, in winding order.
fn outline(shape: &Shape) -> Vec<Vec2> {
    match *shape {
        Shape::Rect { min, size } => vec![
            min,
            min + Vec2::new(size.x, 0.0),
            min + size,
            min + Vec2::new(0.0, size.y),
        ],
        Shape::OrientedRect {
            center,
            half_extents,
            angle,
        } => {
            let rot = Vec2::from_angle(angle);
            [
                Vec2::new(-half_extents.x, -half_extents.y),
                Vec2::new(half_extents.x, -half_extents.y),
                Vec2::new(half_extents.x, half_extents.y),
                Vec2::new(-half_extents.x, half_extents.y),
            ]
            .into_iter()
            .map(|corner| center + rot.rotate(corner))
            .collect()
        }
        Shape::Circle { center, radius } => (0..CIRCLE_SEGMENTS)
            .map(|i| center + Vec2::from_angle(i as f32 / CIRCLE_SEGMENTS as f32 * TAU) * radius)
            .collect(),
        Shape::Line { from, to } => vec![from, to],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_rect_is_two_triangles() {
        let mut mesh = Mesh::default();
        mesh.fill(&Shape::rect(0.0, 0.0, 10.0, 5.0), Color::WHITE);

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn filled_circle_is_a_closed_fan() {
        let mut mesh = Mesh::default();
        mesh.fill(&Shape::circle(Vec2::new(5.0, 5.0), 2.0), Color::RED);

        assert_eq!(mesh.vertices.len(), CIRCLE_SEGMENTS + 1);
        assert_eq!(mesh.indices.len(), CIRCLE_SEGMENTS * 3);
        assert_eq!(mesh.vertices[0].position, [5.0, 5.0]);
    }

    #[test]
    fn stroked_rect_is_four_segments() {
        let mut mesh = Mesh::default();
        mesh.stroke(&Shape::rect(0.0, 0.0, 10.0, 10.0), Color::WHITE, 2.0);

        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.indices.len(), 24);
    }

    #[test]
    fn oriented_rect_rotates_corners() {
        let shape = Shape::OrientedRect {
            center: Vec2::ZERO,
            half_extents: Vec2::new(2.0, 1.0),
            angle: std::f32::consts::FRAC_PI_2,
        };
        let corners = outline(&shape);
        assert!((corners[0] - Vec2::new(1.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn degenerate_shapes_emit_nothing() {
        let mut mesh = Mesh::default();
        mesh.stroke(
            &Shape::Line {
                from: Vec2::ONE,
                to: Vec2::ONE,
            },
            Color::WHITE,
            2.0,
        );
        mesh.fill(&Shape::circle(Vec2::ZERO, 0.0), Color::WHITE);
        mesh.stroke(&Shape::rect(0.0, 0.0, 10.0, 10.0), Color::WHITE, 0.0);

        assert!(mesh.is_empty());
    }
}
