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

use std::any::Any;
use std::fmt;

use super::{BodyId, BodyKind, Material, PhysicsError, Shape};
use crate::math::Vec3;

/// Receives the pose of a body after each step.
///
/// Implemented by whatever owns the renderable (a scene node, a sprite, a test
/// recorder). The simulation only ever writes into it.
pub trait VisualHandle {
    /// Called with the final position and Euler rotation (radians) of the body.
    fn set_pose(&mut self, position: Vec3, rotation: Vec3);
}

/// Caller data attached to a body. Never inspected by the simulation.
pub type Payload = Box<dyn Any>;

/// What the owner of a body wants done after it crossed the play boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallResponse {
    /// Leave the body in the world.
    Keep,
    /// Remove the body once the boundary scan is over.
    Remove,
}

/// Invoked synchronously during a step when a body leaves the play volume.
pub type FallCallback = Box<dyn FnMut(&Body) -> FallResponse>;

/// Description for creating a body.
///
/// Unset material coefficients fall back to the world defaults.
pub struct BodyDesc {
    /// Collision and render shape.
    pub shape: Shape,
    /// Dynamic or static.
    pub kind: BodyKind,
    /// Initial position of the body center.
    pub position: Vec3,
    /// Initial Euler rotation in radians.
    pub rotation: Vec3,
    /// Initial linear velocity.
    pub velocity: Vec3,
    /// Initial angular velocity in radians per second.
    pub angular_velocity: Vec3,
    /// Mass in kilograms. Ignored for static bodies.
    pub mass: f32,
    /// Overrides the world's default friction.
    pub friction: Option<f32>,
    /// Overrides the world's default restitution.
    pub restitution: Option<f32>,
    /// Whether the pose is pushed into `visual` after each step.
    pub sync_visual: bool,
    /// External renderable that mirrors the body.
    pub visual: Option<Box<dyn VisualHandle>>,
    /// Opaque caller data.
    pub payload: Option<Payload>,
    /// Called when the body falls off the board.
    pub on_fall: Option<FallCallback>,
}

impl BodyDesc {
    /// Creates a description with neutral kinematic state for the given shape and kind.
    pub fn new(shape: Shape, kind: BodyKind) -> Self {
        Self {
            shape,
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            friction: None,
            restitution: None,
            sync_visual: true,
            visual: None,
            payload: None,
            on_fall: None,
        }
    }

    /// A dynamic coin (flat cylinder).
    pub fn coin(radius: f32, height: f32) -> Self {
        Self::new(Shape::Cylinder { radius, height }, BodyKind::Dynamic)
    }

    /// A dynamic sphere.
    pub fn sphere(radius: f32) -> Self {
        Self::new(Shape::Sphere { radius }, BodyKind::Dynamic)
    }

    /// A static axis-aligned box with full sizes `size`.
    pub fn static_box(size: Vec3) -> Self {
        Self::new(Shape::Box { size }, BodyKind::Static)
    }

    /// A static peg.
    pub fn peg(radius: f32) -> Self {
        Self::new(Shape::Sphere { radius }, BodyKind::Static)
    }

    /// A static plane `normal · p = offset`.
    pub fn plane(normal: Vec3, offset: f32) -> Self {
        Self::new(Shape::Plane { normal, offset }, BodyKind::Static)
    }

    /// Sets the initial position.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial rotation.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the initial linear velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Overrides the friction coefficient.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Overrides the restitution coefficient.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    /// Attaches a renderable that receives the pose after each step.
    pub fn with_visual(mut self, visual: impl VisualHandle + 'static) -> Self {
        self.visual = Some(Box::new(visual));
        self
    }

    /// Opts out of pose syncing, e.g. for a pusher whose mesh is animated elsewhere.
    pub fn without_visual_sync(mut self) -> Self {
        self.sync_visual = false;
        self
    }

    /// Attaches opaque caller data.
    pub fn with_payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Registers the fall callback.
    pub fn on_fall(mut self, callback: impl FnMut(&Body) -> FallResponse + 'static) -> Self {
        self.on_fall = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for BodyDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyDesc")
            .field("shape", &self.shape)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("mass", &self.mass)
            .field("friction", &self.friction)
            .field("restitution", &self.restitution)
            .field("has_visual", &self.visual.is_some())
            .field("has_on_fall", &self.on_fall.is_some())
            .finish_non_exhaustive()
    }
}

/// A rigid body record, dynamic or static.
pub struct Body {
    id: BodyId,
    kind: BodyKind,
    shape: Shape,
    /// Position of the body center.
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Angular velocity in radians per second.
    pub angular_velocity: Vec3,
    mass: f32,
    /// Friction and restitution.
    pub material: Material,
    /// Excluded from integration while `true`; velocities are then exactly zero.
    pub sleeping: bool,
    /// Consecutive steps spent below the rest thresholds.
    pub rest_frames: u32,
    /// Whether the pose is pushed into the visual handle.
    pub sync_visual: bool,
    visual: Option<Box<dyn VisualHandle>>,
    payload: Option<Payload>,
    on_fall: Option<FallCallback>,
}

impl Body {
    /// Validates `desc` and builds the body record.
    ///
    /// `defaults` supplies the coefficients the description leaves unset.
    pub fn new(id: BodyId, desc: BodyDesc, defaults: Material) -> Result<Self, PhysicsError> {
        let shape = desc.shape.validated(desc.kind)?;
        for (what, v) in [
            ("position", desc.position),
            ("rotation", desc.rotation),
            ("velocity", desc.velocity),
            ("angular velocity", desc.angular_velocity),
        ] {
            if !v.is_finite() {
                return Err(PhysicsError::NonFinite(what));
            }
        }
        if desc.kind == BodyKind::Dynamic {
            check_mass(desc.mass)?;
        }
        let material = Material {
            friction: desc.friction.unwrap_or(defaults.friction),
            restitution: desc.restitution.unwrap_or(defaults.restitution),
        };
        material.validate()?;

        Ok(Self {
            id,
            kind: desc.kind,
            shape,
            position: desc.position,
            rotation: desc.rotation,
            velocity: desc.velocity,
            angular_velocity: desc.angular_velocity,
            mass: desc.mass,
            material,
            sleeping: false,
            rest_frames: 0,
            sync_visual: desc.sync_visual,
            visual: desc.visual,
            payload: desc.payload,
            on_fall: desc.on_fall,
        })
    }

    /// The body's identity.
    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Dynamic or static.
    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Returns `true` for simulated bodies.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// The validated shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Radius of the sphere the body collides as.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.shape.collision_radius()
    }

    /// Mass in kilograms. Meaningless for static bodies.
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Changes the mass of a dynamic body, with the same checks as creation.
    pub fn set_mass(&mut self, mass: f32) -> Result<(), PhysicsError> {
        if self.is_dynamic() {
            check_mass(mass)?;
        }
        self.mass = mass;
        Ok(())
    }

    /// `1 / mass` for dynamic bodies, `0` for static ones.
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Dynamic => 1.0 / self.mass,
            BodyKind::Static => 0.0,
        }
    }

    /// Clears the sleeping flag and the rest counter.
    #[inline]
    pub fn wake(&mut self) {
        self.sleeping = false;
        self.rest_frames = 0;
    }

    /// Downcasts the payload to `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Mutable access to the payload as `T`.
    pub fn payload_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Returns `true` if a fall callback is registered.
    pub fn has_fall_callback(&self) -> bool {
        self.on_fall.is_some()
    }

    /// Invokes the fall callback, if any, and returns its answer.
    pub fn notify_fall(&mut self) -> Option<FallResponse> {
        let mut callback = self.on_fall.take()?;
        let response = callback(self);
        self.on_fall = Some(callback);
        Some(response)
    }

    /// Pushes the current pose into the visual handle when syncing is enabled.
    ///
    /// Returns `true` if a handle was written.
    pub fn sync_visual(&mut self) -> bool {
        if !self.sync_visual {
            return false;
        }
        match self.visual.as_mut() {
            Some(visual) => {
                visual.set_pose(self.position, self.rotation);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if position, rotation and both velocities are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}

/// A dynamic mass must be positive and have a finite inverse.
fn check_mass(mass: f32) -> Result<(), PhysicsError> {
    if mass.is_finite() && mass > 0.0 && (1.0 / mass).is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::NonPositiveMass(mass))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("velocity", &self.velocity)
            .field("angular_velocity", &self.angular_velocity)
            .field("mass", &self.mass)
            .field("material", &self.material)
            .field("sleeping", &self.sleeping)
            .field("rest_frames", &self.rest_frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DEFAULTS: Material = Material {
        friction: 0.4,
        restitution: 0.3,
    };

    struct Recorder(Rc<RefCell<Vec<Vec3>>>);

    impl VisualHandle for Recorder {
        fn set_pose(&mut self, position: Vec3, _rotation: Vec3) {
            self.0.borrow_mut().push(position);
        }
    }

    #[test]
    fn unset_material_takes_defaults() {
        let body = Body::new(BodyId(1), BodyDesc::coin(0.5, 0.1).with_friction(0.9), DEFAULTS)
            .unwrap();
        assert_eq!(body.material.friction, 0.9);
        assert_eq!(body.material.restitution, 0.3);
        assert!(!body.sleeping);
    }

    #[test]
    fn dynamic_mass_must_be_positive() {
        let err = Body::new(BodyId(1), BodyDesc::sphere(0.5).with_mass(0.0), DEFAULTS).unwrap_err();
        assert_eq!(err, PhysicsError::NonPositiveMass(0.0));
        // Static bodies are immovable whatever their mass says.
        let wall = Body::new(
            BodyId(2),
            BodyDesc::static_box(Vec3::ONE).with_mass(-3.0),
            DEFAULTS,
        )
        .unwrap();
        assert_eq!(wall.inverse_mass(), 0.0);
    }

    #[test]
    fn subnormal_mass_is_rejected() {
        let err = Body::new(BodyId(1), BodyDesc::sphere(0.5).with_mass(1e-40), DEFAULTS)
            .unwrap_err();
        assert_eq!(err, PhysicsError::NonPositiveMass(1e-40));

        let mut body = Body::new(BodyId(2), BodyDesc::sphere(0.5).with_mass(2.0), DEFAULTS).unwrap();
        assert!(body.set_mass(0.0).is_err());
        assert!(body.set_mass(1e-40).is_err());
        assert_eq!(body.mass(), 2.0);
        body.set_mass(4.0).unwrap();
        assert_eq!(body.inverse_mass(), 0.25);
    }

    #[test]
    fn non_finite_state_is_rejected() {
        let err = Body::new(
            BodyId(1),
            BodyDesc::sphere(0.5).with_velocity(Vec3::new(f32::INFINITY, 0.0, 0.0)),
            DEFAULTS,
        )
        .unwrap_err();
        assert_eq!(err, PhysicsError::NonFinite("velocity"));
    }

    #[test]
    fn payload_round_trips_through_downcast() {
        let mut body = Body::new(BodyId(3), BodyDesc::coin(0.5, 0.1).with_payload(42u32), DEFAULTS)
            .unwrap();
        assert_eq!(body.payload::<u32>(), Some(&42));
        assert_eq!(body.payload::<String>(), None);
        *body.payload_mut::<u32>().unwrap() += 1;
        assert_eq!(body.payload::<u32>(), Some(&43));
    }

    #[test]
    fn fall_callback_sees_body_and_survives_the_call() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut body = Body::new(
            BodyId(9),
            BodyDesc::coin(0.5, 0.1).on_fall(move |b| {
                sink.borrow_mut().push(b.id());
                FallResponse::Remove
            }),
            DEFAULTS,
        )
        .unwrap();
        assert_eq!(body.notify_fall(), Some(FallResponse::Remove));
        assert_eq!(body.notify_fall(), Some(FallResponse::Remove));
        assert_eq!(*seen.borrow(), vec![BodyId(9), BodyId(9)]);
        assert!(body.has_fall_callback());
    }

    #[test]
    fn visual_sync_respects_opt_out() {
        let poses = Rc::new(RefCell::new(Vec::new()));
        let mut synced = Body::new(
            BodyId(1),
            BodyDesc::coin(0.5, 0.1)
                .at(Vec3::new(1.0, 2.0, 3.0))
                .with_visual(Recorder(Rc::clone(&poses))),
            DEFAULTS,
        )
        .unwrap();
        let mut pusher = Body::new(
            BodyId(2),
            BodyDesc::static_box(Vec3::ONE)
                .with_visual(Recorder(Rc::clone(&poses)))
                .without_visual_sync(),
            DEFAULTS,
        )
        .unwrap();
        assert!(synced.sync_visual());
        assert!(!pusher.sync_visual());
        assert_eq!(*poses.borrow(), vec![Vec3::new(1.0, 2.0, 3.0)]);
    }
}
