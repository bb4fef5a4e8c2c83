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

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use pusher_core::math::Vec3;
use pusher_core::physics::{BodyDesc, BodyId, PhysicsError, VisualHandle};
use pusher_physics::{PhysicsConfig, PhysicsWorld};

const DT: f32 = 1.0 / 60.0;

fn zero_gravity() -> PhysicsWorld {
    PhysicsWorld::new(PhysicsConfig {
        gravity: 0.0,
        default_friction: 0.0,
        ..Default::default()
    })
    .unwrap()
}

/// A floor, a driven pusher and a handful of coins dropped from above.
fn build_board(world: &mut PhysicsWorld) -> (BodyId, Vec<BodyId>) {
    world
        .create_body(BodyDesc::static_box(Vec3::new(12.0, 1.0, 12.0)).at(Vec3::new(0.0, -0.5, 0.0)))
        .unwrap();
    world
        .create_body(BodyDesc::peg(0.2).at(Vec3::new(1.0, 1.0, 1.0)))
        .unwrap();
    let pusher = world
        .create_body(BodyDesc::static_box(Vec3::new(10.0, 1.0, 1.0)).at(Vec3::new(0.0, 0.5, -4.0)))
        .unwrap();
    world.set_scoring_plane_height(Some(-1.0));

    let mut coins = Vec::new();
    for i in 0..25 {
        let x = (i % 5) as f32 - 2.0;
        let z = (i / 5) as f32 - 2.0;
        let y = 2.0 + (i % 3) as f32;
        coins.push(
            world
                .create_body(BodyDesc::coin(0.45, 0.1).at(Vec3::new(x * 1.1, y, z * 1.1)))
                .unwrap(),
        );
    }
    (pusher, coins)
}

fn drive_pusher(world: &mut PhysicsWorld, pusher: BodyId, frame: u32) {
    let t = frame as f32 * DT;
    let z = -4.0 + (t * 2.0).sin();
    let velocity = 2.0 * (t * 2.0).cos();
    world.set_body_position(pusher, Vec3::new(0.0, 0.5, z));
    world.set_actuator_velocity(pusher, velocity);
}

#[test]
fn test_sphere_settles_and_sleeps_on_plane() {
    let mut world = PhysicsWorld::default();
    world.create_body(BodyDesc::plane(Vec3::Y, 0.0)).unwrap();
    let ball = world
        .create_body(BodyDesc::sphere(0.5).at(Vec3::new(0.0, 5.0, 0.0)))
        .unwrap();

    let mut lowest = f32::MAX;
    for step in 1..=300 {
        world.step(DT);
        let body = world.body(ball).unwrap();
        lowest = lowest.min(body.position.y);
        if step == 120 {
            assert_abs_diff_eq!(body.position.y, 0.5, epsilon = 0.05);
            assert_abs_diff_eq!(body.velocity.y, 0.0, epsilon = 0.05);
        }
    }

    let body = world.body(ball).unwrap();
    assert!(body.sleeping, "ball should be asleep, got {body:?}");
    assert_eq!(body.velocity, Vec3::ZERO);
    assert_eq!(body.angular_velocity, Vec3::ZERO);
    assert_abs_diff_eq!(body.position.y, 0.5, epsilon = 1e-3);
    assert!(lowest > 0.0, "ball tunneled through the plane: {lowest}");
    assert_eq!(world.active_count(), 0);
}

#[test]
fn test_elastic_head_on_collision_exchanges_velocities() {
    let mut world = zero_gravity();
    // Close enough to collide during the first step, so damping acts only once.
    let a = world
        .create_body(
            BodyDesc::sphere(0.5)
                .at(Vec3::new(-0.55, 0.0, 0.0))
                .with_velocity(Vec3::new(5.0, 0.0, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();
    let b = world
        .create_body(
            BodyDesc::sphere(0.5)
                .at(Vec3::new(0.55, 0.0, 0.0))
                .with_velocity(Vec3::new(-5.0, 0.0, 0.0))
                .with_restitution(1.0),
        )
        .unwrap();

    let report = world.step(DT);
    assert_eq!(report.dynamic_contacts, 1);

    let va = world.body(a).unwrap().velocity;
    let vb = world.body(b).unwrap().velocity;
    assert_abs_diff_eq!(va.x, -5.0, epsilon = 1e-2);
    assert_abs_diff_eq!(vb.x, 5.0, epsilon = 1e-2);
    assert_abs_diff_eq!(va.x + vb.x, 0.0, epsilon = 1e-5);
    assert_eq!(va.y, 0.0);
    assert_eq!(vb.z, 0.0);

    for _ in 0..30 {
        world.step(DT);
    }
    assert!(world.body(a).unwrap().position.x < -1.0);
    assert!(world.body(b).unwrap().position.x > 1.0);
}

#[test]
fn test_heavier_body_keeps_its_direction() {
    let mut world = zero_gravity();
    let heavy = world
        .create_body(
            BodyDesc::sphere(0.5)
                .at(Vec3::new(-1.5, 0.0, 0.0))
                .with_velocity(Vec3::new(2.0, 0.0, 0.0))
                .with_mass(10.0),
        )
        .unwrap();
    let light = world
        .create_body(BodyDesc::sphere(0.5).at(Vec3::new(0.0, 0.0, 0.0)))
        .unwrap();

    for _ in 0..30 {
        world.step(DT);
    }
    assert!(world.body(heavy).unwrap().velocity.x > 0.0);
    assert!(world.body(light).unwrap().velocity.x > world.body(heavy).unwrap().velocity.x);
}

#[test]
fn test_same_seed_same_trajectory() {
    let run = || {
        let mut world = PhysicsWorld::default();
        let (pusher, coins) = build_board(&mut world);
        for frame in 0..240 {
            drive_pusher(&mut world, pusher, frame);
            world.step(DT);
        }
        coins
            .iter()
            .filter_map(|&id| world.body(id).map(|b| (b.position, b.rotation)))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_state_stays_finite_under_adversarial_input() {
    let mut world = PhysicsWorld::default();
    let (pusher, coins) = build_board(&mut world);

    assert_eq!(
        world
            .create_body(BodyDesc::coin(0.5, 0.1).at(Vec3::new(f32::NAN, 0.0, 0.0)))
            .unwrap_err(),
        PhysicsError::NonFinite("position")
    );
    assert!(!world.apply_impulse(coins[0], Vec3::new(f32::INFINITY, 0.0, 0.0)));
    assert!(!world.set_body_position(pusher, Vec3::new(0.0, f32::NAN, 0.0)));
    world.apply_impulse(coins[1], Vec3::new(0.0, 0.0, 1.0e6));

    let mut removed = 0;
    for frame in 0..600 {
        drive_pusher(&mut world, pusher, frame);
        let dt = match frame % 97 {
            0 => f32::NAN,
            1 => 5.0,
            _ => DT,
        };
        let report = world.step(dt);
        assert!(report.dt.is_finite() && report.dt <= world.config().max_step);
        removed += report.removed.len();

        for body in world.dynamic_bodies() {
            assert!(body.is_finite(), "non-finite state at frame {frame}: {body:?}");
            if body.sleeping {
                assert_eq!(body.velocity, Vec3::ZERO);
                assert_eq!(body.angular_velocity, Vec3::ZERO);
            }
        }
    }
    assert_eq!(world.dynamic_count() + removed, coins.len());
}

#[test]
fn test_vanishing_mass_is_rejected() {
    let mut world = zero_gravity();
    assert_eq!(
        world
            .create_body(BodyDesc::sphere(0.5).with_mass(1e-40))
            .unwrap_err(),
        PhysicsError::NonPositiveMass(1e-40)
    );

    // The lightest accepted mass still gives finite state after a hit.
    let light = world
        .create_body(
            BodyDesc::sphere(0.5)
                .at(Vec3::new(-1.2, 0.0, 0.0))
                .with_velocity(Vec3::new(3.0, 0.0, 0.0))
                .with_mass(1e-37),
        )
        .unwrap();
    let heavy = world.create_body(BodyDesc::sphere(0.5)).unwrap();
    world.apply_impulse(light, Vec3::new(1.0, 0.0, 0.0));
    assert!(!world.apply_impulse(light, Vec3::new(f32::MAX, 0.0, 0.0)));
    for _ in 0..3 {
        world.step(DT);
    }
    assert!(world.body(light).unwrap().is_finite());
    assert!(world.body(heavy).unwrap().is_finite());

    assert!(world.body_mut(heavy).unwrap().set_mass(0.0).is_err());
    assert_eq!(world.body(heavy).unwrap().mass(), 1.0);
}

#[test]
fn test_remove_is_idempotent() {
    let mut world = PhysicsWorld::default();
    let a = world.create_body(BodyDesc::coin(0.5, 0.1)).unwrap();
    let b = world
        .create_body(BodyDesc::coin(0.5, 0.1).at(Vec3::new(3.0, 0.0, 0.0)))
        .unwrap();

    assert!(world.remove_body(a).is_some());
    assert!(world.remove_body(a).is_none());
    assert!(world.remove_body(BodyId(4242)).is_none());
    assert!(!world.contains(a));
    assert!(world.body(a).is_none());
    assert_eq!(world.dynamic_count(), 1);

    world.step(DT);
    assert!(world.contains(b));

    let c = world.create_body(BodyDesc::coin(0.5, 0.1)).unwrap();
    assert_ne!(c, a, "ids are never reused");
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<(Vec3, Vec3)>>>);

impl VisualHandle for Recorder {
    fn set_pose(&mut self, position: Vec3, rotation: Vec3) {
        self.0.borrow_mut().push((position, rotation));
    }
}

#[test]
fn test_visual_receives_pose_every_step() {
    let mut world = PhysicsWorld::default();
    let recorder = Recorder::default();
    let muted = Recorder::default();
    let coin = world
        .create_body(
            BodyDesc::coin(0.5, 0.1)
                .at(Vec3::new(0.0, 3.0, 0.0))
                .with_visual(recorder.clone()),
        )
        .unwrap();
    world
        .create_body(
            BodyDesc::coin(0.5, 0.1)
                .at(Vec3::new(5.0, 3.0, 0.0))
                .with_visual(muted.clone())
                .without_visual_sync(),
        )
        .unwrap();

    for _ in 0..5 {
        assert_eq!(world.step(DT).synced, 1);
    }

    let poses = recorder.0.borrow();
    assert_eq!(poses.len(), 5);
    let body = world.body(coin).unwrap();
    assert_eq!(poses[4], (body.position, body.rotation));
    assert!(poses[4].0.y < poses[0].0.y);
    assert!(muted.0.borrow().is_empty());
}

#[test]
fn test_world_from_ron_config() {
    let config = PhysicsConfig::from_ron_str("(gravity: -9.81, seed: 7, scoring_plane_height: Some(-2.0))")
        .unwrap();
    let world = PhysicsWorld::new(config).unwrap();
    assert_eq!(world.config().gravity, -9.81);
    assert_eq!(world.fall_threshold(), -3.0);
}
