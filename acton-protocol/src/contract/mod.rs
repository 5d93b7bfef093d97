//! An executable model of the contract generated stubs honour.
//!
//! The model is single-threaded and deterministic. It runs the guards recorded
//! in a [`ClassIr`](crate::ir::ClassIr) and the ordering rules of the three send
//! semantics, so the guarantees of lowered protocols can be exercised without a
//! backend.
//!
//! *   [`ActorInstance`]: One endpoint and its current state.
//! *   [`Channel`]: Both endpoints of a protocol instance, their queues and the
//!     stack of requests awaiting a reply.
//! *   [`ActorTree`]: Manager and managed lifetimes.

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
pub use actor::ActorInstance;
pub use channel::{Channel, ChannelState, Delivery, Envelope, EnvelopeKind};
pub use fault::{DispatchResult, ProtocolFault};
pub use lifetime::{ActorId, ActorTree, LifetimeError};

// --- Submodules ---

/// Defines [`ActorInstance`].
mod actor;
/// Defines [`Channel`] and its envelopes.
mod channel;
/// Defines [`ProtocolFault`] and [`DispatchResult`].
mod fault;
/// Defines [`ActorTree`].
mod lifetime;
