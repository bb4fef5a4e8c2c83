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

//! Math primitives used by the simulation. Angles are in radians.

/// Lengths at or below this are treated as zero.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub mod geometry;
pub mod vector;

pub use self::geometry::Aabb;
pub use self::vector::Vec3;

/// Rounds an angle to the nearest multiple of a right angle.
///
/// # Examples
///
/// ```
/// use pusher_core::math::{snap_to_right_angle, FRAC_PI_2};
/// assert_eq!(snap_to_right_angle(0.2), 0.0);
/// assert_eq!(snap_to_right_angle(1.4), FRAC_PI_2);
/// assert_eq!(snap_to_right_angle(-1.7), -FRAC_PI_2);
/// ```
#[inline]
pub fn snap_to_right_angle(angle: f32) -> f32 {
    let snapped = (angle / FRAC_PI_2).round() * FRAC_PI_2;
    // Never hand back -0.0 for tiny negative tilts.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}
