//! Static level geometry used for line-of-sight checks.

use glam::Vec3;
use horde_core::LineOfSight;
use serde::{Deserialize, Serialize};

/// Spherical blocker that interrupts sight lines passing through it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Occluder {
    /// Centre of the blocker.
    pub center: Vec3,
    /// Radius of the blocker.
    pub radius: f32,
}

impl Occluder {
    /// Creates a blocker centred at `center`.
    #[must_use]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    fn blocks(&self, origin: Vec3, target: Vec3) -> bool {
        let segment = target - origin;
        let length_squared = segment.length_squared();
        let t = if length_squared <= f32::EPSILON {
            0.0
        } else {
            ((self.center - origin).dot(segment) / length_squared).clamp(0.0, 1.0)
        };
        let closest = origin + segment * t;
        closest.distance_squared(self.center) < self.radius * self.radius
    }
}

/// Collection of occluders forming the encounter's blocking geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terrain {
    occluders: Vec<Occluder>,
}

impl Terrain {
    /// Creates terrain from the provided occluders.
    #[must_use]
    pub fn new(occluders: Vec<Occluder>) -> Self {
        Self { occluders }
    }

    /// Occluders contained in the terrain.
    #[must_use]
    pub fn occluders(&self) -> &[Occluder] {
        &self.occluders
    }
}

impl LineOfSight for Terrain {
    fn has_line_of_sight(&self, origin: Vec3, target: Vec3) -> bool {
        !self
            .occluders
            .iter()
            .any(|occluder| occluder.blocks(origin, target))
    }
}
