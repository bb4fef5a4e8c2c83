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

//! # Contact Solver
//!
//! Positional correction and impulse response for every contact kind.
//! Each contact is resolved on its own, in the order it is found; several
//! contacts on one body in the same step may slightly over-correct.

use pusher_core::math::Vec3;
use pusher_core::physics::Body;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::narrow_phase::ContactManifold;
use crate::sleep::wake_on_contact;

/// Extra separation applied when pushing a body out of a box.
pub const SEPARATION_MARGIN: f32 = 1.1;
/// Restitution gain for peg contacts.
pub const PEG_RESTITUTION_SCALE: f32 = 1.5;
/// Random tumble per unit impact speed on box contacts.
pub const BOX_SPIN: f32 = 0.1;
/// Random tumble per unit impact speed on peg contacts.
pub const PEG_SPIN: f32 = 0.6;
/// Random spin about the vertical axis per unit impact speed on peg contacts.
pub const PEG_YAW_SPIN: f32 = 0.6;
/// Spin per unit tangential speed on plane bounces.
pub const PLANE_SPIN: f32 = 0.05;
/// Random tumble per unit approach speed between two dynamic bodies.
pub const PAIR_SPIN: f32 = 0.1;

/// Resolves contacts, owning the seeded generator behind the random spin.
#[derive(Debug, Clone)]
pub struct ContactSolver {
    rng: StdRng,
}

impl ContactSolver {
    /// Creates a solver whose random responses are fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The response generator, shared with actuator injection.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Sphere against box. Returns the impact speed along the normal.
    pub fn resolve_box(&mut self, body: &mut Body, manifold: &ContactManifold) -> f32 {
        body.position += manifold.normal * (manifold.depth * SEPARATION_MARGIN);
        let impact = reflect(body, manifold.normal, body.material.restitution);
        if impact > 0.0 {
            let spin = impact * BOX_SPIN;
            body.angular_velocity += Vec3::new(
                self.rng.gen_range(-0.5..0.5) * spin,
                0.0,
                self.rng.gen_range(-0.5..0.5) * spin,
            );
        }
        wake_on_contact(body, impact);
        impact
    }

    /// Sphere against peg: exact separation, livelier bounce, more spin.
    pub fn resolve_peg(&mut self, body: &mut Body, manifold: &ContactManifold) -> f32 {
        body.position += manifold.normal * manifold.depth;
        let restitution = body.material.restitution * PEG_RESTITUTION_SCALE;
        let impact = reflect(body, manifold.normal, restitution);
        if impact > 0.0 {
            let spin = impact * PEG_SPIN;
            body.angular_velocity += Vec3::new(
                self.rng.gen_range(-0.5..0.5) * spin,
                self.rng.gen_range(-0.5..0.5) * impact * PEG_YAW_SPIN,
                self.rng.gen_range(-0.5..0.5) * spin,
            );
        }
        wake_on_contact(body, impact);
        impact
    }

    /// Sphere against plane, with deterministic roll from the sliding direction.
    pub fn resolve_plane(&mut self, body: &mut Body, manifold: &ContactManifold) -> f32 {
        body.position += manifold.normal * manifold.depth;
        let impact = reflect(body, manifold.normal, body.material.restitution);
        if impact > 0.0 {
            body.angular_velocity.x += body.velocity.z * PLANE_SPIN;
            body.angular_velocity.z += -body.velocity.x * PLANE_SPIN;
        }
        wake_on_contact(body, impact);
        impact
    }

    /// Two dynamic spheres; `manifold.normal` points from `a` to `b`.
    ///
    /// Returns the approach speed, zero if the bodies were already separating.
    pub fn resolve_pair(&mut self, a: &mut Body, b: &mut Body, manifold: &ContactManifold) -> f32 {
        let n = manifold.normal;
        let half = manifold.depth * 0.5;
        a.position -= n * half;
        b.position += n * half;

        // Relative velocity in the direction of the normal; negative means approaching.
        let vel_along_normal = (b.velocity - a.velocity).dot(n);
        let mut approach = 0.0;
        if vel_along_normal < 0.0 {
            let inv_mass_a = a.inverse_mass();
            let inv_mass_b = b.inverse_mass();
            let total_inv_mass = inv_mass_a + inv_mass_b;
            if total_inv_mass > 0.0 {
                let restitution = a.material.restitution.min(b.material.restitution);
                let j = -(1.0 + restitution) * vel_along_normal / total_inv_mass;
                a.velocity -= n * (j * inv_mass_a);
                b.velocity += n * (j * inv_mass_b);
            }

            approach = -vel_along_normal;
            let spin = approach * PAIR_SPIN;
            let kick = Vec3::new(
                self.rng.gen_range(-0.5..0.5) * spin,
                self.rng.gen_range(-0.5..0.5) * spin,
                self.rng.gen_range(-0.5..0.5) * spin,
            );
            a.angular_velocity += kick;
            b.angular_velocity -= kick;
        }

        wake_on_contact(a, approach);
        wake_on_contact(b, approach);
        approach
    }
}

/// Reflects the normal component of the velocity if the body moves into the
/// surface. Returns the impact speed, zero when already separating.
fn reflect(body: &mut Body, normal: Vec3, restitution: f32) -> f32 {
    let vn = body.velocity.dot(normal);
    if vn < 0.0 {
        body.velocity += normal * (-(1.0 + restitution) * vn);
        -vn
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pusher_core::physics::{BodyDesc, BodyId, Material};

    fn sphere(id: u64, restitution: f32, velocity: Vec3) -> Body {
        Body::new(
            BodyId(id),
            BodyDesc::sphere(0.5)
                .with_restitution(restitution)
                .with_velocity(velocity),
            Material {
                friction: 0.4,
                restitution: 0.3,
            },
        )
        .unwrap()
    }

    fn floor_contact(depth: f32) -> ContactManifold {
        ContactManifold {
            normal: Vec3::Y,
            depth,
            point: Vec3::ZERO,
        }
    }

    #[test]
    fn box_contact_separates_with_margin_and_bounces() {
        let mut solver = ContactSolver::new(1);
        let mut body = sphere(0, 0.5, Vec3::new(0.0, -4.0, 0.0));
        let impact = solver.resolve_box(&mut body, &floor_contact(0.1));
        assert_abs_diff_eq!(body.position.y, 0.11, epsilon = 1e-6);
        assert_abs_diff_eq!(body.velocity.y, 2.0, epsilon = 1e-6);
        assert_eq!(impact, 4.0);
        assert_eq!(body.angular_velocity.y, 0.0);
    }

    #[test]
    fn separating_body_keeps_its_velocity() {
        let mut solver = ContactSolver::new(1);
        let mut body = sphere(0, 0.5, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(solver.resolve_box(&mut body, &floor_contact(0.1)), 0.0);
        assert_eq!(body.velocity, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn peg_contact_is_extra_bouncy_and_exact() {
        let mut solver = ContactSolver::new(1);
        let mut body = sphere(0, 0.4, Vec3::new(0.0, -2.0, 0.0));
        solver.resolve_peg(&mut body, &floor_contact(0.1));
        assert_abs_diff_eq!(body.position.y, 0.1, epsilon = 1e-6);
        // -(1 + 0.4 * 1.5) * -2 added to -2.
        assert_abs_diff_eq!(body.velocity.y, 1.2, epsilon = 1e-6);
    }

    #[test]
    fn plane_spin_is_deterministic() {
        let mut a = sphere(0, 0.3, Vec3::new(2.0, -3.0, 1.0));
        let mut b = sphere(1, 0.3, Vec3::new(2.0, -3.0, 1.0));
        ContactSolver::new(1).resolve_plane(&mut a, &floor_contact(0.05));
        ContactSolver::new(99).resolve_plane(&mut b, &floor_contact(0.05));
        assert_eq!(a.angular_velocity, b.angular_velocity);
        assert_abs_diff_eq!(a.angular_velocity.x, 1.0 * PLANE_SPIN, epsilon = 1e-6);
        assert_abs_diff_eq!(a.angular_velocity.z, -2.0 * PLANE_SPIN, epsilon = 1e-6);
    }

    #[test]
    fn elastic_equal_masses_exchange_velocities() {
        let mut solver = ContactSolver::new(3);
        let mut a = sphere(0, 1.0, Vec3::new(1.0, 0.0, 0.0));
        let mut b = sphere(1, 1.0, Vec3::new(-1.0, 0.0, 0.0));
        let manifold = ContactManifold {
            normal: Vec3::X,
            depth: 0.2,
            point: Vec3::ZERO,
        };
        assert_eq!(solver.resolve_pair(&mut a, &mut b, &manifold), 2.0);
        assert_abs_diff_eq!(a.velocity.x, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.velocity.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(a.position.x, -0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(b.position.x, 0.1, epsilon = 1e-6);
        // Symmetric spin.
        assert_eq!(a.angular_velocity, b.angular_velocity * -1.0);
    }

    #[test]
    fn pair_uses_the_smaller_restitution() {
        let mut solver = ContactSolver::new(3);
        let mut a = sphere(0, 1.0, Vec3::new(1.0, 0.0, 0.0));
        let mut b = sphere(1, 0.0, Vec3::ZERO);
        let manifold = ContactManifold {
            normal: Vec3::X,
            depth: 0.01,
            point: Vec3::ZERO,
        };
        solver.resolve_pair(&mut a, &mut b, &manifold);
        // Perfectly inelastic: both end with the common velocity.
        assert_abs_diff_eq!(a.velocity.x, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(b.velocity.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn same_seed_same_response() {
        let run = |seed| {
            let mut solver = ContactSolver::new(seed);
            let mut body = sphere(0, 0.3, Vec3::new(0.0, -5.0, 0.0));
            solver.resolve_peg(&mut body, &floor_contact(0.1));
            body.angular_velocity
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }
}
