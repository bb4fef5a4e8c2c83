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

use serde::{Deserialize, Serialize};

use super::{BodyKind, PhysicsError};
use crate::math::Vec3;

/// Supported body shapes.
///
/// Dynamic bodies always collide as a sphere of [`Shape::collision_radius`];
/// the exact shape only matters for static geometry and for callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Flat disc, the coin shape.
    Cylinder {
        /// Disc radius.
        radius: f32,
        /// Disc thickness.
        height: f32,
    },
    /// Axis-aligned box with full sizes along x, y and z.
    Box {
        /// Width, height and depth.
        size: Vec3,
    },
    /// Sphere; as static geometry this is a peg.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// Infinite plane `normal · p = offset`.
    Plane {
        /// Plane normal, normalized on creation.
        normal: Vec3,
        /// Signed distance of the plane from the origin along `normal`.
        offset: f32,
    },
}

impl Shape {
    /// Radius of the sphere this shape collides as when it is dynamic.
    ///
    /// Boxes use their largest half extent. Planes have no radius.
    pub fn collision_radius(&self) -> f32 {
        match *self {
            Shape::Cylinder { radius, .. } | Shape::Sphere { radius } => radius,
            Shape::Box { size } => size.max_element() * 0.5,
            Shape::Plane { .. } => 0.0,
        }
    }

    /// Lower-case name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Cylinder { .. } => "cylinder",
            Shape::Box { .. } => "box",
            Shape::Sphere { .. } => "sphere",
            Shape::Plane { .. } => "plane",
        }
    }

    /// Validates the dimensions for a body of the given kind and returns the
    /// canonical shape (plane normals normalized).
    pub fn validated(self, kind: BodyKind) -> Result<Self, PhysicsError> {
        match self {
            Shape::Cylinder { radius, height } => {
                positive("radius", radius)?;
                positive("height", height)?;
                Ok(self)
            }
            Shape::Box { size } => {
                positive("width", size.x)?;
                positive("height", size.y)?;
                positive("depth", size.z)?;
                Ok(self)
            }
            Shape::Sphere { radius } => {
                positive("radius", radius)?;
                Ok(self)
            }
            Shape::Plane { normal, offset } => {
                if kind == BodyKind::Dynamic {
                    return Err(PhysicsError::UnsupportedShape {
                        kind: "dynamic",
                        shape: "plane",
                    });
                }
                if !normal.is_finite() {
                    return Err(PhysicsError::NonFinite("plane normal"));
                }
                if !offset.is_finite() {
                    return Err(PhysicsError::NonFinite("plane offset"));
                }
                let unit = normal.normalize();
                if unit.is_zero() {
                    return Err(PhysicsError::InvalidNormal);
                }
                Ok(Shape::Plane {
                    normal: unit,
                    offset,
                })
            }
        }
    }
}

fn positive(what: &'static str, value: f32) -> Result<(), PhysicsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidDimension { what, value })
    }
}
