//! The target-agnostic intermediate representation produced by lowering.
//!
//! A [`LoweredProtocol`] carries one [`ClassIr`] per [`Role`]. Every type is plain
//! data, compares structurally and serializes with `serde`, so two lowerings of
//! the same input can be compared directly.

/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

// --- Public Re-exports ---
pub use class::{
    ClassIr, FieldIr, FieldKind, GuardEdge, GuardIr, MethodIr, MethodKind, ParamIr, Role,
    TransitionIr, TypeIr,
};
pub use protocol::{
    LoweredProtocol, MessageId, MessageIds, StateEnumIr, FIRST_MESSAGE_ID, MESSAGE_ID_STRIDE,
};

// --- Submodules ---

/// Defines [`ClassIr`] and its parts.
mod class;
/// Implements the canonical `Display` dump.
mod format;
/// Defines [`LoweredProtocol`], [`MessageIds`] and [`StateEnumIr`].
mod protocol;
