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

//! Explicit Euler integration of awake dynamic bodies.

use pusher_core::math::{Vec3, PI, TAU};
use pusher_core::physics::Body;

/// Scale of the exponential horizontal friction decay, per unit friction and second.
pub const FRICTION_DECAY_RATE: f32 = 1.0;
/// Below this speed a body gets the strong settling damping.
pub const SLOW_SPEED_THRESHOLD: f32 = 0.5;
/// Linear damping per second for slow bodies.
pub const SLOW_LINEAR_DAMPING: f32 = 3.0;
/// Linear damping per second for everything else.
pub const LINEAR_DAMPING: f32 = 0.1;
/// Vertical velocities below `-FALL_PROTECTION_SPEED` are never damped.
pub const FALL_PROTECTION_SPEED: f32 = 1.0;
/// Angular damping per second.
pub const ANGULAR_DAMPING: f32 = 1.5;
/// Every velocity component must be below this for tilt correction to kick in.
pub const TILT_SETTLE_SPEED: f32 = 0.3;
/// Per-step multiplier pulling x/z tilt toward flat.
pub const TILT_DECAY: f32 = 0.9;
/// Component-wise cap on linear velocity.
pub const MAX_LINEAR_SPEED: f32 = 60.0;
/// Component-wise cap on angular velocity.
pub const MAX_ANGULAR_SPEED: f32 = 40.0;

/// Advances one dynamic body by `dt` seconds.
///
/// Sleeping bodies are left untouched; `dt` must already be clamped.
pub fn integrate(body: &mut Body, gravity: f32, dt: f32) {
    if body.sleeping || !body.is_dynamic() {
        return;
    }

    let mut v = body.velocity;
    v.y += gravity * dt;

    // Horizontal friction as an exponential decay.
    let friction = (-body.material.friction * FRICTION_DECAY_RATE * dt).exp();
    v.x *= friction;
    v.z *= friction;

    let damping = if v.length() < SLOW_SPEED_THRESHOLD {
        SLOW_LINEAR_DAMPING
    } else {
        LINEAR_DAMPING
    };
    let keep = (1.0 - damping * dt).max(0.0);
    v.x *= keep;
    v.z *= keep;
    // A body that is clearly falling keeps its vertical speed so it still reaches contact.
    if v.y > -FALL_PROTECTION_SPEED {
        v.y *= keep;
    }
    body.velocity = v.clamp(
        Vec3::ONE * -MAX_LINEAR_SPEED,
        Vec3::ONE * MAX_LINEAR_SPEED,
    );

    let angular_keep = (1.0 - ANGULAR_DAMPING * dt).max(0.0);
    body.angular_velocity = (body.angular_velocity * angular_keep).clamp(
        Vec3::ONE * -MAX_ANGULAR_SPEED,
        Vec3::ONE * MAX_ANGULAR_SPEED,
    );

    body.position += body.velocity * dt;
    let rotation = body.rotation + body.angular_velocity * dt;
    body.rotation = Vec3::new(
        wrap_angle(rotation.x),
        wrap_angle(rotation.y),
        wrap_angle(rotation.z),
    );

    let v = body.velocity.abs();
    if v.x < TILT_SETTLE_SPEED && v.y < TILT_SETTLE_SPEED && v.z < TILT_SETTLE_SPEED {
        body.rotation.x *= TILT_DECAY;
        body.rotation.z *= TILT_DECAY;
    }
}

/// Wraps an angle into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}
