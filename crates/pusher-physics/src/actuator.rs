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

//! Momentum transfer from kinematic pusher faces.
//!
//! A pusher is an ordinary static box whose id has a signed velocity entry
//! here. Box contacts consult the entry and shove touching bodies along the
//! push axis while the pusher moves forward. Retracting pushers never pull.

use std::collections::HashMap;

use pusher_core::math::Vec3;
use pusher_core::physics::{Body, BodyId};
use rand::Rng;

/// Actuator speeds at or below this magnitude inject nothing.
pub const ACTUATOR_DEADBAND: f32 = 0.1;
/// Gain applied to the actuator speed when shoving a body.
pub const PUSHER_AMPLIFICATION: f32 = 3.5;
/// Upper bound of the random upward kick given to a shoved body.
pub const PUSHER_LIFT_KICK: f32 = 0.3;
/// Magnitude bound of the random sideways kick given to a shoved body.
pub const PUSHER_LATERAL_KICK: f32 = 0.2;

/// Signed actuator speed per static body id. Missing entries read as zero.
#[derive(Debug, Default, Clone)]
pub struct ActuatorCoupling {
    velocities: HashMap<BodyId, f32>,
}

impl ActuatorCoupling {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the speed associated with `id`, returning the previous one.
    pub fn set(&mut self, id: BodyId, velocity: f32) -> Option<f32> {
        self.velocities.insert(id, velocity)
    }

    /// Current speed of `id`, zero when no entry exists.
    pub fn velocity(&self, id: BodyId) -> f32 {
        self.velocities.get(&id).copied().unwrap_or(0.0)
    }

    /// Drops the entry for `id`. Returns `true` if one existed.
    pub fn clear(&mut self, id: BodyId) -> bool {
        self.velocities.remove(&id).is_some()
    }

    /// Speed of `id` if it is moving forward faster than the deadband.
    pub fn forward_velocity(&self, id: BodyId) -> Option<f32> {
        let velocity = self.velocity(id);
        (velocity > ACTUATOR_DEADBAND).then_some(velocity)
    }

    /// Number of registered actuators.
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    /// Returns `true` if no actuator is registered.
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }
}

/// Shoves `body` along `axis` on behalf of a forward-moving pusher.
///
/// The body's speed along the axis is raised to at least
/// `actuator_velocity * PUSHER_AMPLIFICATION`; it is never lowered. A small
/// random lift and sideways kick keep coins from stacking into a rigid wall.
pub fn inject_push(body: &mut Body, actuator_velocity: f32, axis: Vec3, rng: &mut impl Rng) {
    let axis = axis.normalize();
    let push_speed = actuator_velocity * PUSHER_AMPLIFICATION;
    let along = body.velocity.dot(axis);
    if along < push_speed {
        body.velocity += axis * (push_speed - along);
    }

    let up = (Vec3::Y - axis * axis.y).normalize();
    let lateral = axis.cross(Vec3::Y).normalize();
    body.velocity += up * rng.gen_range(0.0..PUSHER_LIFT_KICK);
    body.velocity += lateral * rng.gen_range(-PUSHER_LATERAL_KICK..PUSHER_LATERAL_KICK);
    body.wake();
}
