// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Narrow-phase contact tests.
//!
//! Dynamic bodies are always approximated by a sphere of their collision
//! radius; static geometry is one of the closed set of [`StaticCollider`]s.

use pusher_core::math::{Aabb, Vec3};
use pusher_core::physics::{Body, BodyId, Shape};

/// Contact between a dynamic sphere and another shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactManifold {
    /// Unit normal pointing from the other shape toward the dynamic body
    /// (for dynamic pairs: from the first body toward the second).
    pub normal: Vec3,
    /// Penetration depth, always > 0.
    pub depth: f32,
    /// Contact point on the surface of the other shape.
    pub point: Vec3,
}

/// Collision volume of a static body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticCollider {
    /// Axis-aligned box.
    Box(Aabb),
    /// Sphere obstacle.
    Peg {
        /// Peg center.
        center: Vec3,
        /// Peg radius.
        radius: f32,
    },
    /// Infinite plane `normal · p = offset`.
    Plane {
        /// Unit normal.
        normal: Vec3,
        /// Offset along the normal.
        offset: f32,
    },
}

impl StaticCollider {
    /// Builds the collider of a static body from its shape and current position.
    ///
    /// Static cylinders collide as pegs of their radius.
    pub fn from_body(body: &Body) -> Self {
        match *body.shape() {
            Shape::Box { size } => {
                StaticCollider::Box(Aabb::from_center_half_extents(body.position, size * 0.5))
            }
            Shape::Sphere { radius } | Shape::Cylinder { radius, .. } => StaticCollider::Peg {
                center: body.position,
                radius,
            },
            Shape::Plane { normal, offset } => StaticCollider::Plane { normal, offset },
        }
    }
}

/// A static collider paired with the id of the body it came from.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
    /// Owning static body.
    pub id: BodyId,
    /// Collision volume at the start of the pass.
    pub collider: StaticCollider,
}

/// Narrow-phase collision detection system.
#[derive(Debug, Default, Clone, Copy)]
pub struct NarrowPhase;

impl NarrowPhase {
    /// Creates a new `NarrowPhase` instance.
    pub fn new() -> Self {
        Self
    }

    /// Tests a dynamic sphere against a static collider.
    pub fn detect_static(
        &self,
        center: Vec3,
        radius: f32,
        collider: &StaticCollider,
    ) -> Option<ContactManifold> {
        match *collider {
            StaticCollider::Box(aabb) => {
                let closest = aabb.closest_point(center);
                let delta = center - closest;
                let dist_sq = delta.length_squared();
                // A center inside the box has no usable normal.
                if dist_sq < radius * radius && dist_sq > 0.0 {
                    let dist = dist_sq.sqrt();
                    Some(ContactManifold {
                        normal: delta / dist,
                        depth: radius - dist,
                        point: closest,
                    })
                } else {
                    None
                }
            }
            StaticCollider::Peg {
                center: peg,
                radius: peg_radius,
            } => sphere_sphere(peg, peg_radius, center, radius),
            StaticCollider::Plane { normal, offset } => {
                let distance = center.dot(normal) - offset;
                if distance < radius {
                    Some(ContactManifold {
                        normal,
                        depth: radius - distance,
                        point: center - normal * distance,
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Tests two dynamic spheres. The normal points from `a` toward `b`.
    pub fn detect_pair(
        &self,
        center_a: Vec3,
        radius_a: f32,
        center_b: Vec3,
        radius_b: f32,
    ) -> Option<ContactManifold> {
        sphere_sphere(center_a, radius_a, center_b, radius_b)
    }
}

fn sphere_sphere(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> Option<ContactManifold> {
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let total_r = ra + rb;
    if dist_sq < total_r * total_r && dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        let normal = delta / dist;
        Some(ContactManifold {
            normal,
            depth: total_r - dist,
            point: pa + normal * ra,
        })
    } else {
        None
    }
}
