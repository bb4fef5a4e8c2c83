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

//! # Pusher Physics
//!
//! A small, deterministic rigid-body engine tuned for coin-pusher boards:
//! coins fall, bounce off pegs, boxes and planes, settle, fall asleep, get
//! shoved by pusher actuators and eventually drop off the front.
//!
//! Everything goes through [`PhysicsWorld`]:
//!
//! ```
//! use pusher_core::math::Vec3;
//! use pusher_core::physics::BodyDesc;
//! use pusher_physics::PhysicsWorld;
//!
//! let mut world = PhysicsWorld::default();
//! world.create_body(BodyDesc::plane(Vec3::Y, 0.0)).unwrap();
//! let coin = world
//!     .create_body(BodyDesc::coin(0.5, 0.1).at(Vec3::new(0.0, 2.0, 0.0)))
//!     .unwrap();
//! for _ in 0..60 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(coin).unwrap().position.y < 2.0);
//! ```

#![warn(missing_docs)]

pub mod actuator;
pub mod boundary;
pub mod config;
pub mod integrator;
pub mod narrow_phase;
pub mod registry;
pub mod report;
pub mod sleep;
pub mod solver;
pub mod visual_sync;
pub mod world;

pub use boundary::FallReason;
pub use config::{ConfigError, PhysicsConfig};
pub use report::{FallenBody, StepReport};
pub use world::PhysicsWorld;
