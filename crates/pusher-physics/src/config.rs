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

//! World-level tunables, loadable from RON.

use pusher_core::math::Vec3;
use pusher_core::physics::{Material, MAX_MATERIAL_COEFFICIENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`PhysicsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON text could not be parsed.
    #[error("failed to parse physics config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The config could not be written as RON.
    #[error("failed to serialize physics config: {0}")]
    Serialize(#[from] ron::Error),
    /// A field holds a value the simulation cannot run with.
    #[error("invalid physics config field `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

/// Configuration of a [`PhysicsWorld`](crate::PhysicsWorld).
///
/// Missing fields in a RON document take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical acceleration applied to awake dynamic bodies.
    pub gravity: f32,
    /// Friction for bodies that do not override it.
    pub default_friction: f32,
    /// Restitution for bodies that do not override it.
    pub default_restitution: f32,
    /// Upper bound for the step delta, in seconds.
    pub max_step: f32,
    /// Direction in which forward-moving pushers shove bodies.
    pub push_axis: Vec3,
    /// Height of the external scoring plane, if the board has one.
    pub scoring_plane_height: Option<f32>,
    /// Distance below the scoring plane at which a body counts as fallen.
    pub fall_margin: f32,
    /// Fall threshold used when no scoring plane height is known.
    pub fallback_fall_height: f32,
    /// Horizontal escape bound applied to |x| and |z|.
    pub arena_half_extent: f32,
    /// Seed of the generator behind randomized collision responses.
    pub seed: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -15.0,
            default_friction: 0.4,
            default_restitution: 0.3,
            max_step: 0.033,
            push_axis: Vec3::Z,
            scoring_plane_height: None,
            fall_margin: 1.0,
            fallback_fall_height: -10.0,
            arena_half_extent: 25.0,
            seed: 0x5EED,
        }
    }
}

impl PhysicsConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Material used for coefficients a body leaves unset.
    pub fn default_material(&self) -> Material {
        Material {
            friction: self.default_friction,
            restitution: self.default_restitution,
        }
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        for (field, value) in [
            ("default_friction", self.default_friction),
            ("default_restitution", self.default_restitution),
        ] {
            if !(0.0..=MAX_MATERIAL_COEFFICIENT).contains(&value) {
                return Err(invalid(
                    field,
                    format!("{value} is outside [0, {MAX_MATERIAL_COEFFICIENT}]"),
                ));
            }
        }
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(invalid("max_step", "must be finite and > 0"));
        }
        if !self.push_axis.is_finite() || self.push_axis.normalize().is_zero() {
            return Err(invalid("push_axis", "must be a finite, non-zero vector"));
        }
        if let Some(height) = self.scoring_plane_height {
            if !height.is_finite() {
                return Err(invalid("scoring_plane_height", "must be finite"));
            }
        }
        if !(self.fall_margin.is_finite() && self.fall_margin >= 0.0) {
            return Err(invalid("fall_margin", "must be finite and >= 0"));
        }
        if !self.fallback_fall_height.is_finite() {
            return Err(invalid("fallback_fall_height", "must be finite"));
        }
        if !(self.arena_half_extent.is_finite() && self.arena_half_extent > 0.0) {
            return Err(invalid("arena_half_extent", "must be finite and > 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
