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

//! Rest detection and sleep/wake transitions.

use pusher_core::math::{snap_to_right_angle, Vec3};
use pusher_core::physics::Body;

use crate::narrow_phase::ContactManifold;

/// Linear speed under which a body counts as resting.
pub const SLEEP_LINEAR_THRESHOLD: f32 = 0.12;
/// Angular speed under which a body counts as resting.
pub const SLEEP_ANGULAR_THRESHOLD: f32 = 0.15;
/// Consecutive resting steps before a body falls asleep.
pub const SLEEP_FRAME_THRESHOLD: u32 = 30;
/// Past half the frame threshold, velocity components below this snap to zero.
pub const REST_SNAP_SPEED: f32 = 0.1;
/// An awake body's rest counter only resets on contacts faster than this.
pub const CONTACT_WAKE_SPEED: f32 = 0.5;
/// Overlaps with a sleeping body up to this depth count as resting touch:
/// they are separated positionally and wake nobody.
pub const REST_CONTACT_SLOP: f32 = 1e-3;

/// Outcome of one rest evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestState {
    /// Already asleep; nothing was evaluated.
    Sleeping,
    /// Moving above the thresholds, counter reset.
    Moving,
    /// Below the thresholds for `n` consecutive steps.
    Settling(u32),
    /// Crossed the frame threshold during this evaluation.
    FellAsleep,
}

/// Updates the rest counter of one dynamic body and puts it to sleep when due.
pub fn update(body: &mut Body) -> RestState {
    if body.sleeping {
        return RestState::Sleeping;
    }

    let linear = body.velocity.length();
    let angular = body.angular_velocity.length();
    if linear >= SLEEP_LINEAR_THRESHOLD || angular >= SLEEP_ANGULAR_THRESHOLD {
        body.wake();
        return RestState::Moving;
    }

    body.rest_frames = body.rest_frames.saturating_add(1);
    if body.rest_frames > SLEEP_FRAME_THRESHOLD / 2 {
        body.velocity = snap_small(body.velocity);
        body.angular_velocity = snap_small(body.angular_velocity);
    }

    if body.rest_frames >= SLEEP_FRAME_THRESHOLD {
        put_to_sleep(body);
        log::trace!("{} fell asleep at {:?}", body.id(), body.position);
        return RestState::FellAsleep;
    }
    RestState::Settling(body.rest_frames)
}

/// Marks the body sleeping, pins its velocities to zero and lays it flat.
pub fn put_to_sleep(body: &mut Body) {
    body.sleeping = true;
    body.velocity = Vec3::ZERO;
    body.angular_velocity = Vec3::ZERO;
    body.rotation.x = snap_to_right_angle(body.rotation.x);
    body.rotation.z = snap_to_right_angle(body.rotation.z);
}

/// Wake rule for contacts.
///
/// A sleeping body always wakes. An awake body only restarts its rest count
/// when the impact is fast enough to matter, so bodies resting on a box floor
/// can still settle.
pub fn wake_on_contact(body: &mut Body, impact_speed: f32) {
    if body.sleeping || impact_speed > CONTACT_WAKE_SPEED {
        body.wake();
    }
}

/// Returns `true` if `body`'s center lies within `radius` of `center`.
pub fn in_region(body: &Body, center: Vec3, radius: f32) -> bool {
    body.position.distance_squared(center) <= radius * radius
}

/// Returns `true` if an overlap of `depth` involving a sleeper is resting touch.
#[inline]
pub fn is_resting_touch(any_sleeping: bool, depth: f32) -> bool {
    any_sleeping && depth <= REST_CONTACT_SLOP
}

/// Moves a sleeping body out of a shallow static overlap. Velocities are untouched.
pub fn settle_static(body: &mut Body, manifold: &ContactManifold) {
    body.position += manifold.normal * manifold.depth;
}

/// Separates a shallow pair involving at least one sleeper; `manifold.normal`
/// points from `a` to `b`.
///
/// An awake partner does all the moving. Two sleepers split the correction.
pub fn settle_pair(a: &mut Body, b: &mut Body, manifold: &ContactManifold) {
    let correction = manifold.normal * manifold.depth;
    match (a.sleeping, b.sleeping) {
        (true, false) => b.position += correction,
        (false, true) => a.position -= correction,
        _ => {
            a.position -= correction * 0.5;
            b.position += correction * 0.5;
        }
    }
}

fn snap_small(v: Vec3) -> Vec3 {
    let snap = |c: f32| if c.abs() < REST_SNAP_SPEED { 0.0 } else { c };
    Vec3::new(snap(v.x), snap(v.y), snap(v.z))
}
