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

//! Detection of bodies that left the playable volume.

use pusher_core::physics::Body;

use crate::config::PhysicsConfig;

/// Why a body was reported as fallen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallReason {
    /// Dropped below the fall threshold (scored or lost off the front).
    BelowThreshold,
    /// Escaped the arena horizontally.
    OutOfBounds,
}

/// Watches dynamic bodies for boundary crossings.
///
/// The monitor only reports; removal is up to the owner of each body.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryMonitor {
    scoring_plane_height: Option<f32>,
    fall_margin: f32,
    fallback_fall_height: f32,
    arena_half_extent: f32,
}

impl BoundaryMonitor {
    /// Builds a monitor from the world configuration.
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            scoring_plane_height: config.scoring_plane_height,
            fall_margin: config.fall_margin,
            fallback_fall_height: config.fallback_fall_height,
            arena_half_extent: config.arena_half_extent,
        }
    }

    /// Height below which a body counts as fallen.
    pub fn fall_threshold(&self) -> f32 {
        match self.scoring_plane_height {
            Some(height) => height - self.fall_margin,
            None => self.fallback_fall_height,
        }
    }

    /// Updates the external scoring plane height.
    pub fn set_scoring_plane_height(&mut self, height: Option<f32>) {
        self.scoring_plane_height = height.filter(|h| h.is_finite());
    }

    /// The scoring plane height currently in use, if any.
    pub fn scoring_plane_height(&self) -> Option<f32> {
        self.scoring_plane_height
    }

    /// Checks a body against the threshold and the arena bounds.
    pub fn check(&self, body: &Body) -> Option<FallReason> {
        let p = body.position;
        if p.y < self.fall_threshold() {
            Some(FallReason::BelowThreshold)
        } else if p.x.abs() > self.arena_half_extent || p.z.abs() > self.arena_half_extent {
            Some(FallReason::OutOfBounds)
        } else {
            None
        }
    }
}
