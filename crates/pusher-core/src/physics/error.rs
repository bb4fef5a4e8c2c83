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

use thiserror::Error;

/// Precondition violations detected when a body is created.
///
/// Once a body exists, no simulation operation fails: degenerate geometry is
/// rejected here instead of silently producing NaNs later.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A shape dimension is zero, negative or not finite.
    #[error("invalid {what}: {value} (must be finite and > 0)")]
    InvalidDimension {
        /// Name of the offending dimension.
        what: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A dynamic body was given a mass that is not strictly positive, or so
    /// small that its inverse overflows.
    #[error("dynamic bodies need a finite mass > 0 with a finite inverse, got {0}")]
    NonPositiveMass(f32),
    /// A material coefficient lies outside the accepted range.
    #[error("invalid {what}: {value} (must lie in [0, 2])")]
    InvalidMaterial {
        /// Name of the offending coefficient.
        what: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A kinematic field contains NaN or infinity.
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    /// A plane normal has zero length.
    #[error("plane normal must have a non-zero length")]
    InvalidNormal,
    /// The shape cannot be used for this kind of body.
    #[error("{shape} shapes cannot be {kind}")]
    UnsupportedShape {
        /// Lower-case body kind.
        kind: &'static str,
        /// Lower-case shape name.
        shape: &'static str,
    },
}
