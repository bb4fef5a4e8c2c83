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

//! One-way pose push into external renderables.

use pusher_core::physics::Body;

/// Writes the pose of every opted-in body into its visual handle.
///
/// Returns how many handles were written.
pub fn sync_all<'a>(bodies: impl IntoIterator<Item = &'a mut Body>) -> usize {
    bodies
        .into_iter()
        .map(|body| body.sync_visual())
        .filter(|&written| written)
        .count()
}
