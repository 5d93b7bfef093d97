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

use derive_new::new;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use crate::ir::{ClassIr, Role};

/// First message id of every protocol.
pub const FIRST_MESSAGE_ID: u32 = 1;
/// Distance between consecutive message ids; the gap holds the reply id.
pub const MESSAGE_ID_STRIDE: u32 = 2;

/// The state enumeration shared by both classes of a protocol.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateEnumIr {
    /// Every state: declared ones in order, then dead, then error.
    pub states: Vec<String>,
    /// Initial state.
    pub start: String,
    /// Entered on close or destroy.
    pub dead: String,
    /// Entered on a protocol violation.
    pub error: String,
}

impl StateEnumIr {
    /// Returns `true` if `state` is one of the enumerated states.
    pub fn contains(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Returns `true` for the dead and error states.
    pub fn is_terminal(&self, state: &str) -> bool {
        state == self.dead || state == self.error
    }
}

/// Wire ids of one message.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId {
    /// Request id.
    pub id: u32,
    /// Reply id (`id + 1`) when the message carries a reply.
    pub reply: Option<u32>,
}

/// Message ids of one protocol, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIds {
    ids: IndexMap<String, MessageId>,
}

impl MessageIds {
    /// Assigns ids to `(name, has_reply)` pairs in order.
    pub fn assign<'m>(messages: impl IntoIterator<Item = (&'m str, bool)>) -> Self {
        let mut ids = IndexMap::new();
        let mut next = FIRST_MESSAGE_ID;
        for (name, has_reply) in messages {
            if ids.contains_key(name) {
                continue;
            }
            let reply = has_reply.then_some(next + 1);
            ids.insert(name.to_string(), MessageId::new(next, reply));
            next += MESSAGE_ID_STRIDE;
        }
        Self { ids }
    }

    /// Ids of `message`.
    pub fn get(&self, message: &str) -> Option<MessageId> {
        self.ids.get(message).copied()
    }

    /// The message a request id belongs to.
    pub fn message_for(&self, id: u32) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, ids)| ids.id == id)
            .map(|(name, _)| name.as_str())
    }

    /// All entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MessageId)> {
        self.ids.iter().map(|(name, ids)| (name.as_str(), *ids))
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when the protocol has no messages.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Everything lowered from one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoweredProtocol {
    /// Fully qualified protocol name.
    pub protocol: String,
    /// File the protocol came from.
    pub file: String,
    /// Message ids.
    pub message_ids: MessageIds,
    /// State enumeration.
    pub states: StateEnumIr,
    /// Parent class, then child class.
    pub classes: [ClassIr; 2],
}

impl LoweredProtocol {
    /// The class implementing `role`.
    pub fn class(&self, role: Role) -> &ClassIr {
        &self.classes[role.index()]
    }

    /// The parent-side class.
    pub fn parent(&self) -> &ClassIr {
        self.class(Role::Parent)
    }

    /// The child-side class.
    pub fn child(&self) -> &ClassIr {
        self.class(Role::Child)
    }
}

assert_impl_all!(LoweredProtocol: Send, Sync, Clone);
