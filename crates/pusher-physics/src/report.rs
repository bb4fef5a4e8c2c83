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

//! Per-step summary handed back to the caller.

use std::time::Duration;

use pusher_core::physics::BodyId;

use crate::boundary::FallReason;

/// A body that crossed the play boundary during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallenBody {
    /// The body that crossed.
    pub id: BodyId,
    /// Which boundary it crossed.
    pub reason: FallReason,
}

/// What a single [`PhysicsWorld::step`](crate::PhysicsWorld::step) did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// The clamped delta actually simulated, in seconds.
    pub dt: f32,
    /// Dynamic bodies integrated (awake at the start of the step).
    pub integrated: usize,
    /// Dynamic-vs-static contacts resolved.
    pub static_contacts: usize,
    /// Dynamic-vs-dynamic contacts resolved.
    pub dynamic_contacts: usize,
    /// Shallow overlaps with sleepers separated without waking anyone.
    pub settled: usize,
    /// Bodies shoved by a forward-moving pusher.
    pub actuator_pushes: usize,
    /// Visual handles written.
    pub synced: usize,
    /// Bodies that fell asleep at the end of the step.
    pub fell_asleep: usize,
    /// Every boundary crossing, in scan order.
    pub fallen: Vec<FallenBody>,
    /// Bodies removed because their fall callback asked for it.
    pub removed: Vec<BodyId>,
    /// Wall-clock time spent in the step.
    pub elapsed: Duration,
}

impl StepReport {
    /// Total contacts resolved during the step.
    pub fn contacts(&self) -> usize {
        self.static_contacts + self.dynamic_contacts
    }
}
