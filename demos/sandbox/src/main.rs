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

// Coin pusher sandbox
// Headless board used to watch the physics world from the log output.
//
// Usage: sandbox [config.ron] [frames]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use pusher_core::math::Vec3;
use pusher_core::physics::{BodyDesc, BodyId, FallResponse};
use pusher_physics::{PhysicsConfig, PhysicsWorld};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u32 = 1800;
const PUSHER_STROKE: f32 = 1.5;
const PUSHER_FREQUENCY: f32 = 0.8;
const PUSHER_REST_Z: f32 = -5.0;
const COIN_RADIUS: f32 = 0.45;
const DROP_EVERY: u32 = 20;

/// Value carried by each coin, read back when it drops off the front.
#[derive(Debug, Clone, Copy)]
struct CoinValue(u32);

struct PusherBoard {
    world: PhysicsWorld,
    pusher: BodyId,
    score: Rc<Cell<u32>>,
    dropped: u32,
}

impl PusherBoard {
    fn new(config: PhysicsConfig) -> Result<Self> {
        let mut world = PhysicsWorld::new(config).context("Invalid physics configuration")?;

        // Floor with a front lip at z = +6 where coins fall off.
        world.create_body(
            BodyDesc::static_box(Vec3::new(8.0, 1.0, 14.0)).at(Vec3::new(0.0, -0.5, -1.0)),
        )?;
        // Side and back walls.
        for x in [-4.5, 4.5] {
            world.create_body(
                BodyDesc::static_box(Vec3::new(1.0, 4.0, 14.0)).at(Vec3::new(x, 2.0, -1.0)),
            )?;
        }
        world.create_body(
            BodyDesc::static_box(Vec3::new(8.0, 4.0, 1.0)).at(Vec3::new(0.0, 2.0, -8.5)),
        )?;

        let pusher = world.create_body(
            BodyDesc::static_box(Vec3::new(8.0, 1.0, 2.0)).at(Vec3::new(0.0, 0.5, PUSHER_REST_Z)),
        )?;

        // A row of pegs above the drop zone.
        for i in 0..5 {
            let x = i as f32 * 1.5 - 3.0;
            world.create_body(BodyDesc::peg(0.15).at(Vec3::new(x, 4.0, -3.0)))?;
        }

        if world.config().scoring_plane_height.is_none() {
            world.set_scoring_plane_height(Some(-0.5));
        }

        let mut board = Self {
            world,
            pusher,
            score: Rc::new(Cell::new(0)),
            dropped: 0,
        };
        // Pre-fill the shelf so the pusher has something to shove.
        for i in 0..24 {
            let x = (i % 6) as f32 * 1.0 - 2.5;
            let z = (i / 6) as f32 * 1.0 - 1.0;
            board.drop_coin(Vec3::new(x, 0.6, z), i)?;
        }
        Ok(board)
    }

    fn drop_coin(&mut self, position: Vec3, value: u32) -> Result<BodyId> {
        let score = Rc::clone(&self.score);
        let id = self.world.create_body(
            BodyDesc::coin(COIN_RADIUS, 0.1)
                .at(position)
                .with_rotation(Vec3::new(0.05 * value as f32, 0.0, 0.0))
                .with_payload(CoinValue(1 + value % 3))
                .on_fall(move |body| {
                    let value = body.payload::<CoinValue>().map_or(0, |v| v.0);
                    score.set(score.get() + value);
                    FallResponse::Remove
                }),
        )?;
        self.dropped += 1;
        Ok(id)
    }

    fn update(&mut self, frame: u32) -> Result<()> {
        let t = frame as f32 * FRAME_DT;
        let phase = t * PUSHER_FREQUENCY * std::f32::consts::TAU;
        let z = PUSHER_REST_Z + PUSHER_STROKE * phase.sin();
        let velocity = PUSHER_STROKE * PUSHER_FREQUENCY * std::f32::consts::TAU * phase.cos();
        self.world.set_body_position(self.pusher, Vec3::new(0.0, 0.5, z));
        self.world.set_actuator_velocity(self.pusher, velocity);

        if frame % DROP_EVERY == 0 {
            let x = ((frame / DROP_EVERY) % 5) as f32 * 1.5 - 3.0 + 0.4;
            let position = Vec3::new(x, 6.0, -3.0);
            self.drop_coin(position, frame / DROP_EVERY)?;
            // Let the new coin disturb the pile under it.
            self.world.wake_region(Vec3::new(x, 0.5, -3.0), 2.0);
        }

        let report = self.world.step(FRAME_DT);
        for fallen in &report.fallen {
            log::debug!("Frame {frame}: {} left the board ({:?})", fallen.id, fallen.reason);
        }
        if frame % 300 == 0 {
            log::info!(
                "Frame {frame}: {} coins ({} awake), score {}, step took {:?}",
                self.world.dynamic_count(),
                self.world.active_count(),
                self.score.get(),
                report.elapsed
            );
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {path}"))?;
            PhysicsConfig::from_ron_str(&source)
                .with_context(|| format!("Failed to parse config file {path}"))?
        }
        None => PhysicsConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n.parse().context("Frame count must be a positive integer")?,
        None => DEFAULT_FRAMES,
    };

    let mut board = PusherBoard::new(config)?;
    for frame in 0..frames {
        board.update(frame)?;
    }

    log::info!(
        "Done after {frames} frames: {} coins dropped, {} still on the board, score {}",
        board.dropped,
        board.world.dynamic_count(),
        board.score.get()
    );
    Ok(())
}
