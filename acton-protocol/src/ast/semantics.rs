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

//! Send semantics, message directions and transition triggers.
//!
//! These are plain enumerations with pure derivation functions. Directions are
//! always expressed from the parent role's point of view: an `out` message
//! travels parent → child, an `in` message travels child → parent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a message is delivered and whether the sender waits for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendSemantics {
    /// Fire-and-forget; FIFO per channel, the sender never blocks.
    #[default]
    Async,
    /// The sender blocks until the callee replies.
    Sync,
    /// Reentrant call: the caller blocks but can still answer nested calls from its peer.
    Rpc,
}

impl SendSemantics {
    /// Returns `true` when the exchange carries a reply (`sync` and `rpc`).
    #[must_use]
    pub const fn has_reply(self) -> bool {
        matches!(self, Self::Sync | Self::Rpc)
    }

    /// Returns `true` when the sender is suspended until the reply arrives.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        self.has_reply()
    }

    /// Returns `true` when nested calls are accepted while the caller is blocked.
    #[must_use]
    pub const fn is_reentrant(self) -> bool {
        matches!(self, Self::Rpc)
    }

    /// The keyword used in protocol source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Async => "async",
            Self::Sync => "sync",
            Self::Rpc => "rpc",
        }
    }

    /// The trigger an actor fires when it issues a message with these semantics.
    #[must_use]
    pub const fn outbound_trigger(self) -> Trigger {
        match self {
            Self::Rpc => Trigger::Call,
            Self::Async | Self::Sync => Trigger::Send,
        }
    }

    /// The trigger an actor fires when it accepts a message with these semantics.
    #[must_use]
    pub const fn inbound_trigger(self) -> Trigger {
        match self {
            Self::Rpc => Trigger::Answer,
            Self::Async | Self::Sync => Trigger::Recv,
        }
    }
}

impl fmt::Display for SendSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Which way a message travels, seen from the parent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Child → parent.
    In,
    /// Parent → child.
    Out,
    /// Either side may send it.
    InOut,
}

impl Direction {
    /// The keyword used in protocol source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
        }
    }

    /// Returns `true` if a message declared with this direction may travel `flow`.
    ///
    /// `flow` is a concrete direction (`In` or `Out`); `InOut` permits both.
    #[must_use]
    pub const fn permits(self, flow: Direction) -> bool {
        match (self, flow) {
            (Self::InOut, _) => true,
            (Self::In, Self::In) | (Self::Out, Self::Out) => true,
            _ => false,
        }
    }

    /// The stub family generated for this direction and semantics.
    ///
    /// `inout` has no single family; it yields both the `in` and the `out` one.
    #[must_use]
    pub const fn stub_family(self, semantics: SendSemantics) -> Option<&'static str> {
        match (self, semantics) {
            (Self::In, SendSemantics::Async) => Some("AsyncRecv"),
            (Self::In, SendSemantics::Sync) => Some("SyncRecv"),
            (Self::In, SendSemantics::Rpc) => Some("RpcAnswer"),
            (Self::Out, SendSemantics::Async) => Some("AsyncSend"),
            (Self::Out, SendSemantics::Sync) => Some("SyncSend"),
            (Self::Out, SendSemantics::Rpc) => Some("RpcCall"),
            (Self::InOut, _) => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The event that fires a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Issue an async or sync message.
    Send,
    /// Accept an async or sync message.
    Recv,
    /// Issue an rpc call.
    Call,
    /// Accept (and answer) an rpc call.
    Answer,
}

impl Trigger {
    /// All triggers in declaration order.
    pub const ALL: [Trigger; 4] = [Self::Send, Self::Recv, Self::Call, Self::Answer];

    /// `send`/`call` are outbound, `recv`/`answer` inbound.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Send | Self::Call => Direction::Out,
            Self::Recv | Self::Answer => Direction::In,
        }
    }

    /// The trigger the peer fires for the same exchange.
    #[must_use]
    pub const fn mirror(self) -> Self {
        match self {
            Self::Send => Self::Recv,
            Self::Recv => Self::Send,
            Self::Call => Self::Answer,
            Self::Answer => Self::Call,
        }
    }

    /// Returns `true` for the rpc triggers.
    #[must_use]
    pub const fn is_rpc(self) -> bool {
        matches!(self, Self::Call | Self::Answer)
    }

    /// Returns `true` if this trigger may fire a message with `semantics`.
    #[must_use]
    pub const fn accepts(self, semantics: SendSemantics) -> bool {
        self.is_rpc() == semantics.is_reentrant()
    }

    /// The keyword used in protocol source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Recv => "recv",
            Self::Call => "call",
            Self::Answer => "answer",
        }
    }

    /// Parses a trigger keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
