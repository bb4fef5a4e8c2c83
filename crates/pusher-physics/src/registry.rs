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

//! Ownership of the dynamic and static body sets.

use std::collections::HashMap;

use pusher_core::physics::{Body, BodyDesc, BodyId, BodyKind, Material, PhysicsError};

/// Owns every live body, split into a dynamic and a static set.
///
/// Both sets keep insertion order; collision passes walk them in that order.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    dynamic: Vec<Body>,
    statics: Vec<Body>,
    /// Which set each live id belongs to.
    kinds: HashMap<BodyId, BodyKind>,
    next_id: u64,
}

impl BodyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `desc`, assigns a fresh id and inserts the body into its set.
    pub fn create(&mut self, desc: BodyDesc, defaults: Material) -> Result<BodyId, PhysicsError> {
        let id = BodyId(self.next_id);
        let body = Body::new(id, desc, defaults)?;
        self.next_id += 1;

        log::debug!(
            "Created {:?} {} {id} at {:?}",
            body.kind(),
            body.shape().name(),
            body.position
        );
        self.kinds.insert(id, body.kind());
        match body.kind() {
            BodyKind::Dynamic => self.dynamic.push(body),
            BodyKind::Static => self.statics.push(body),
        }
        Ok(id)
    }

    /// Removes the body from whichever set holds it.
    ///
    /// Unknown or already removed ids are a no-op and return `None`.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let kind = self.kinds.remove(&id)?;
        let set = self.set_mut(kind);
        let index = set.iter().position(|b| b.id() == id)?;
        log::debug!("Removed {id}");
        Some(set.remove(index))
    }

    /// Returns `true` if the id belongs to a live body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.kinds.contains_key(&id)
    }

    /// Looks a body up by id.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        let kind = *self.kinds.get(&id)?;
        self.set(kind).iter().find(|b| b.id() == id)
    }

    /// Looks a body up by id for mutation.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let kind = *self.kinds.get(&id)?;
        self.set_mut(kind).iter_mut().find(|b| b.id() == id)
    }

    /// Dynamic bodies in insertion order.
    pub fn dynamic(&self) -> &[Body] {
        &self.dynamic
    }

    /// Static bodies in insertion order.
    pub fn statics(&self) -> &[Body] {
        &self.statics
    }

    /// Mutable access to the dynamic set.
    pub(crate) fn dynamic_mut(&mut self) -> &mut [Body] {
        &mut self.dynamic
    }

    /// Mutable access to the static set.
    pub(crate) fn statics_mut(&mut self) -> &mut [Body] {
        &mut self.statics
    }

    /// Total number of live bodies.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no body is alive.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn set(&self, kind: BodyKind) -> &Vec<Body> {
        match kind {
            BodyKind::Dynamic => &self.dynamic,
            BodyKind::Static => &self.statics,
        }
    }

    fn set_mut(&mut self, kind: BodyKind) -> &mut Vec<Body> {
        match kind {
            BodyKind::Dynamic => &mut self.dynamic,
            BodyKind::Static => &mut self.statics,
        }
    }
}
