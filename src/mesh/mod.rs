//! Mesh sources
//!
//! Everything here produces a flat `Vec<Patch>` in object space: the PLY importer for
//! authored models and a few procedural shapes for scenes that don't ship asset files.

pub mod ply;
pub mod primitives;

use crate::rasterizer::{Patch, Vec3};

pub use ply::{load_ply, parse_ply, PlyError};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box around one point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Check if a point is inside the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Expand bounds to include a point
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Object-space bounds of a patch list, `None` when empty
pub fn bounds(patches: &[Patch]) -> Option<Aabb> {
    let mut corners = patches.iter().flat_map(|p| p.pos.iter().map(|v| v.xyz()));
    let mut aabb = Aabb::from_point(corners.next()?);
    for c in corners {
        aabb.expand(c);
    }
    Some(aabb)
}
