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

//! # Physics World
//!
//! The engine context: owns every body, the actuator map, the seeded response
//! generator and the boundary settings, and advances them one step at a time.

use std::time::Instant;

use pusher_core::math::Vec3;
use pusher_core::physics::{Body, BodyDesc, BodyId, FallResponse, PhysicsError};

use crate::actuator::{inject_push, ActuatorCoupling};
use crate::boundary::BoundaryMonitor;
use crate::config::{ConfigError, PhysicsConfig};
use crate::integrator::integrate;
use crate::narrow_phase::{NarrowPhase, StaticCollider, StaticEntry};
use crate::registry::BodyRegistry;
use crate::report::{FallenBody, StepReport};
use crate::sleep::{self, RestState};
use crate::solver::ContactSolver;
use crate::visual_sync;

/// A single-threaded coin-pusher simulation.
///
/// Every mutation happens either inside [`step`](Self::step) or through the
/// explicit create/remove/set calls, all from the caller's thread.
#[derive(Debug)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    registry: BodyRegistry,
    actuators: ActuatorCoupling,
    narrow_phase: NarrowPhase,
    solver: ContactSolver,
    boundary: BoundaryMonitor,
    push_axis: Vec3,
    steps: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_valid_config(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Creates an empty world after validating `config`.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PhysicsConfig) -> Self {
        log::info!(
            "PhysicsWorld initialized: gravity {}, max step {}s, fall threshold {}, seed {:#x}",
            config.gravity,
            config.max_step,
            BoundaryMonitor::from_config(&config).fall_threshold(),
            config.seed
        );
        Self {
            registry: BodyRegistry::new(),
            actuators: ActuatorCoupling::new(),
            narrow_phase: NarrowPhase::new(),
            solver: ContactSolver::new(config.seed),
            boundary: BoundaryMonitor::from_config(&config),
            push_axis: config.push_axis.normalize(),
            steps: 0,
            config,
        }
    }

    /// The configuration the world was built with (scoring plane and gravity
    /// reflect later updates).
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // --- Body registry ---

    /// Validates `desc` and inserts a new body into the dynamic or static set.
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyId, PhysicsError> {
        self.registry.create(desc, self.config.default_material())
    }

    /// Removes a body. Calling it again, or with an unknown id, does nothing.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.registry.remove(id)?;
        if !body.is_dynamic() {
            self.actuators.clear(id);
        }
        Some(body)
    }

    /// Returns `true` if `id` refers to a live body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.registry.contains(id)
    }

    /// Looks a body up by id.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.registry.get(id)
    }

    /// Mutable access to a body.
    ///
    /// Callers that change the velocity of a sleeping body should also wake it.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.registry.get_mut(id)
    }

    /// Dynamic bodies in insertion order.
    pub fn dynamic_bodies(&self) -> impl Iterator<Item = &Body> {
        self.registry.dynamic().iter()
    }

    /// Static bodies in insertion order.
    pub fn static_bodies(&self) -> impl Iterator<Item = &Body> {
        self.registry.statics().iter()
    }

    /// Number of dynamic bodies, asleep or not.
    pub fn dynamic_count(&self) -> usize {
        self.registry.dynamic().len()
    }

    /// Number of static bodies.
    pub fn static_count(&self) -> usize {
        self.registry.statics().len()
    }

    /// Number of dynamic bodies that are not sleeping.
    pub fn active_count(&self) -> usize {
        self.registry
            .dynamic()
            .iter()
            .filter(|b| !b.sleeping)
            .count()
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Teleports a body. Used by board drivers to move pusher faces.
    ///
    /// Dynamic bodies are woken. Non-finite positions are ignored.
    pub fn set_body_position(&mut self, id: BodyId, position: Vec3) -> bool {
        if !position.is_finite() {
            log::warn!("Ignoring non-finite position {position:?} for {id}");
            return false;
        }
        match self.registry.get_mut(id) {
            Some(body) => {
                body.position = position;
                if body.is_dynamic() {
                    body.wake();
                }
                true
            }
            None => false,
        }
    }

    // --- Actuators ---

    /// Sets the signed pusher speed of a static body.
    ///
    /// Ids that are unknown or dynamic are ignored.
    pub fn set_actuator_velocity(&mut self, id: BodyId, velocity: f32) -> bool {
        if !velocity.is_finite() {
            log::warn!("Ignoring non-finite actuator velocity for {id}");
            return false;
        }
        match self.registry.get(id) {
            Some(body) if !body.is_dynamic() => {
                if self.actuators.set(id, velocity).is_none() {
                    log::debug!("Actuator registered on {id}");
                }
                true
            }
            _ => {
                log::warn!("set_actuator_velocity: {id} is not a static body, ignoring");
                false
            }
        }
    }

    /// Current pusher speed of `id`, zero if none is registered.
    pub fn actuator_velocity(&self, id: BodyId) -> f32 {
        self.actuators.velocity(id)
    }

    /// Forgets the pusher speed of `id`.
    pub fn clear_actuator(&mut self, id: BodyId) -> bool {
        self.actuators.clear(id)
    }

    // --- Sleep and impulses ---

    /// Wakes every dynamic body whose center lies within `radius` of `center`.
    ///
    /// Returns how many bodies were inside the region.
    pub fn wake_region(&mut self, center: Vec3, radius: f32) -> usize {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return 0;
        }
        let mut count = 0;
        for body in self.registry.dynamic_mut() {
            if sleep::in_region(body, center, radius) {
                body.wake();
                count += 1;
            }
        }
        log::debug!("wake_region at {center:?} r={radius}: {count} bodies");
        count
    }

    /// Adds `impulse / mass` to a dynamic body's velocity and wakes it.
    ///
    /// Static bodies, unknown ids and non-finite impulses are ignored.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec3) -> bool {
        if !impulse.is_finite() {
            log::warn!("Ignoring non-finite impulse {impulse:?} for {id}");
            return false;
        }
        match self.registry.get_mut(id) {
            Some(body) if body.is_dynamic() => {
                let velocity = body.velocity + impulse * body.inverse_mass();
                if !velocity.is_finite() {
                    log::warn!("Impulse {impulse:?} would overflow the velocity of {id}, ignoring");
                    return false;
                }
                body.velocity = velocity;
                body.wake();
                true
            }
            _ => false,
        }
    }

    // --- Boundary ---

    /// Sets the external scoring plane height; `None` falls back to the fixed threshold.
    pub fn set_scoring_plane_height(&mut self, height: Option<f32>) {
        self.boundary.set_scoring_plane_height(height);
        self.config.scoring_plane_height = self.boundary.scoring_plane_height();
        log::debug!("Fall threshold is now {}", self.boundary.fall_threshold());
    }

    /// Height below which dynamic bodies are reported as fallen.
    pub fn fall_threshold(&self) -> f32 {
        self.boundary.fall_threshold()
    }

    /// Changes gravity for subsequent steps. Non-finite values are ignored.
    pub fn set_gravity(&mut self, gravity: f32) {
        if gravity.is_finite() {
            self.config.gravity = gravity;
        }
    }

    // --- Stepping ---

    /// Advances the simulation by `dt` seconds, clamped to the configured maximum.
    ///
    /// Order: integrate, static contacts, dynamic pairs, visual sync, boundary
    /// scan (fall callbacks), sleep update.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let started = Instant::now();
        let dt = self.clamp_step(dt);
        let mut report = StepReport {
            dt,
            ..Default::default()
        };

        // 1. Integrate forces and motion.
        let gravity = self.config.gravity;
        for body in self.registry.dynamic_mut() {
            if !body.sleeping {
                integrate(body, gravity, dt);
                report.integrated += 1;
            }
        }

        // 2. Resolve contacts.
        self.resolve_static_contacts(&mut report);
        self.resolve_dynamic_pairs(&mut report);

        // 3. Push poses outward.
        report.synced = visual_sync::sync_all(self.registry.dynamic_mut().iter_mut())
            + visual_sync::sync_all(self.registry.statics_mut().iter_mut());

        // 4. Report bodies that left the board.
        self.scan_boundary(&mut report);

        // 5. Rest bookkeeping for the next step.
        for body in self.registry.dynamic_mut() {
            if sleep::update(body) == RestState::FellAsleep {
                report.fell_asleep += 1;
            }
        }

        self.steps += 1;
        report.elapsed = started.elapsed();
        log::trace!(
            "Step {} ({:.4}s): {} integrated, {} contacts, {} pushes, {} fallen, {} active",
            self.steps,
            dt,
            report.integrated,
            report.contacts(),
            report.actuator_pushes,
            report.fallen.len(),
            self.active_count()
        );
        report
    }

    fn clamp_step(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Invalid step delta {dt}, simulating 0s instead");
            return 0.0;
        }
        dt.min(self.config.max_step)
    }

    /// Every dynamic body against every static collider, body by body.
    fn resolve_static_contacts(&mut self, report: &mut StepReport) {
        let colliders: Vec<StaticEntry> = self
            .registry
            .statics()
            .iter()
            .map(|s| StaticEntry {
                id: s.id(),
                collider: StaticCollider::from_body(s),
            })
            .collect();

        for body in self.registry.dynamic_mut() {
            for entry in &colliders {
                let Some(manifold) =
                    self.narrow_phase
                        .detect_static(body.position, body.radius(), &entry.collider)
                else {
                    continue;
                };
                if sleep::is_resting_touch(body.sleeping, manifold.depth) {
                    sleep::settle_static(body, &manifold);
                    report.settled += 1;
                    continue;
                }
                report.static_contacts += 1;

                match entry.collider {
                    StaticCollider::Box(_) => {
                        self.solver.resolve_box(body, &manifold);
                        if let Some(speed) = self.actuators.forward_velocity(entry.id) {
                            inject_push(body, speed, self.push_axis, self.solver.rng_mut());
                            report.actuator_pushes += 1;
                        }
                    }
                    StaticCollider::Peg { .. } => {
                        self.solver.resolve_peg(body, &manifold);
                    }
                    StaticCollider::Plane { .. } => {
                        self.solver.resolve_plane(body, &manifold);
                    }
                }
            }
        }
    }

    /// Every unordered pair of dynamic bodies, in insertion order.
    fn resolve_dynamic_pairs(&mut self, report: &mut StepReport) {
        let bodies = self.registry.dynamic_mut();
        for i in 0..bodies.len() {
            let (head, tail) = bodies.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let Some(manifold) =
                    self.narrow_phase
                        .detect_pair(a.position, a.radius(), b.position, b.radius())
                else {
                    continue;
                };
                if sleep::is_resting_touch(a.sleeping || b.sleeping, manifold.depth) {
                    sleep::settle_pair(a, b, &manifold);
                    report.settled += 1;
                    continue;
                }
                self.solver.resolve_pair(a, b, &manifold);
                report.dynamic_contacts += 1;
            }
        }
    }

    /// Fires fall callbacks and removes the bodies whose owner asked for it.
    fn scan_boundary(&mut self, report: &mut StepReport) {
        let mut to_remove = Vec::new();
        for body in self.registry.dynamic_mut() {
            let Some(reason) = self.boundary.check(body) else {
                continue;
            };
            log::debug!("{} left the board ({reason:?}) at {:?}", body.id(), body.position);
            report.fallen.push(FallenBody {
                id: body.id(),
                reason,
            });
            if body.notify_fall() == Some(FallResponse::Remove) {
                to_remove.push(body.id());
            }
        }
        for id in to_remove {
            if self.remove_body(id).is_some() {
                report.removed.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::FallReason;

    #[test]
    fn step_delta_is_clamped() {
        let mut world = PhysicsWorld::default();
        assert_eq!(world.step(1.0).dt, 0.033);
        assert_eq!(world.step(0.01).dt, 0.01);
        assert_eq!(world.step(f32::NAN).dt, 0.0);
        assert_eq!(world.step(-1.0).dt, 0.0);
        assert_eq!(world.step_count(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PhysicsConfig {
            max_step: -1.0,
            ..Default::default()
        };
        assert!(PhysicsWorld::new(config).is_err());
    }

    #[test]
    fn actuators_only_attach_to_static_bodies() {
        let mut world = PhysicsWorld::default();
        let coin = world.create_body(BodyDesc::coin(0.5, 0.1)).unwrap();
        let pusher = world
            .create_body(BodyDesc::static_box(Vec3::new(4.0, 1.0, 1.0)))
            .unwrap();
        assert!(!world.set_actuator_velocity(coin, 1.0));
        assert!(!world.set_actuator_velocity(BodyId(999), 1.0));
        assert!(!world.set_actuator_velocity(pusher, f32::NAN));
        assert!(world.set_actuator_velocity(pusher, 1.0));
        assert_eq!(world.actuator_velocity(pusher), 1.0);

        world.remove_body(pusher);
        assert_eq!(world.actuator_velocity(pusher), 0.0);
    }

    #[test]
    fn impulse_scales_with_inverse_mass() {
        let mut world = PhysicsWorld::default();
        let heavy = world
            .create_body(BodyDesc::coin(0.5, 0.1).with_mass(4.0))
            .unwrap();
        let wall = world.create_body(BodyDesc::static_box(Vec3::ONE)).unwrap();
        assert!(world.apply_impulse(heavy, Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(world.body(heavy).unwrap().velocity, Vec3::new(2.0, 0.0, 0.0));
        assert!(!world.apply_impulse(wall, Vec3::X));
        assert!(!world.apply_impulse(heavy, Vec3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn scoring_plane_drives_the_threshold() {
        let mut world = PhysicsWorld::default();
        assert_eq!(world.fall_threshold(), -10.0);
        world.set_scoring_plane_height(Some(-1.0));
        assert_eq!(world.fall_threshold(), -2.0);
        assert_eq!(world.config().scoring_plane_height, Some(-1.0));

        let coin = world
            .create_body(BodyDesc::coin(0.5, 0.1).at(Vec3::new(0.0, -2.5, 0.0)))
            .unwrap();
        let report = world.step(1.0 / 60.0);
        assert_eq!(
            report.fallen,
            vec![FallenBody {
                id: coin,
                reason: FallReason::BelowThreshold
            }]
        );
    }

    #[test]
    fn moving_a_static_body_is_seen_by_the_next_step() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: 0.0,
            ..Default::default()
        })
        .unwrap();
        let coin = world.create_body(BodyDesc::sphere(0.5)).unwrap();
        let wall = world
            .create_body(BodyDesc::static_box(Vec3::ONE).at(Vec3::new(0.0, 0.0, -5.0)))
            .unwrap();
        assert_eq!(world.step(1.0 / 60.0).static_contacts, 0);
        assert!(world.set_body_position(wall, Vec3::new(0.0, 0.0, -0.8)));
        let report = world.step(1.0 / 60.0);
        assert_eq!(report.static_contacts, 1);
        assert!(world.body(coin).unwrap().position.z > 0.0);
    }
}
