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

//! # Physics Contracts
//!
//! Body identity, shapes and descriptions shared between the simulation and
//! the code that drives it.

mod body;
mod error;
mod shape;

pub use body::{Body, BodyDesc, FallCallback, FallResponse, Payload, VisualHandle};
pub use error::PhysicsError;
pub use shape::Shape;

use serde::{Deserialize, Serialize};

/// Upper bound accepted for friction and restitution coefficients.
///
/// Restitution may exceed `1.0` for deliberately lively surfaces.
pub const MAX_MATERIAL_COEFFICIENT: f32 = 2.0;

/// Opaque, stable identity of a body for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Defines whether a body is simulated or acts as fixed collision geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyKind {
    /// Responds to gravity and collisions.
    #[default]
    Dynamic,
    /// Immovable collision surface. May still be driven as an actuator.
    Static,
}

/// Friction and restitution of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Horizontal friction coefficient.
    pub friction: f32,
    /// Coefficient of restitution (bounciness).
    pub restitution: f32,
}

impl Material {
    /// Checks both coefficients against `[0, MAX_MATERIAL_COEFFICIENT]`.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        check_coefficient("friction", self.friction)?;
        check_coefficient("restitution", self.restitution)
    }
}

fn check_coefficient(what: &'static str, value: f32) -> Result<(), PhysicsError> {
    if !(0.0..=MAX_MATERIAL_COEFFICIENT).contains(&value) {
        return Err(PhysicsError::InvalidMaterial { what, value });
    }
    Ok(())
}
