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

use thiserror::Error;

use crate::ast::{SendSemantics, Trigger};
use crate::contract::ChannelState;
use crate::ir::Role;

/// How a receiving endpoint disposed of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchResult {
    /// Delivered and handled.
    Processed,
    /// The receiver has no handler for the message.
    NotKnown,
    /// The message is not legal in the receiver's current state.
    NotAllowed,
    /// The message does not fit the exchange it claims to belong to.
    PayloadError,
    /// The message cannot be routed over this channel.
    RouteError,
    /// The message carries a value that does not match what was expected.
    ValueError,
}

impl DispatchResult {
    /// Returns `true` for [`DispatchResult::Processed`].
    pub fn is_processed(self) -> bool {
        self == DispatchResult::Processed
    }
}

/// A fault of the generated-code contract.
///
/// Every fault is fatal to the channel it happens on: both endpoints enter the
/// error state and nothing more may be sent.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolFault {
    #[error("protocol violation: `{trigger} {message}` is not allowed in state `{state}`")]
    ProtocolViolation {
        state: String,
        trigger: Trigger,
        message: String,
    },

    #[error("the {role} has no stub for `{message}`")]
    UnknownMessage { role: Role, message: String },

    #[error("`{message}` is {semantics}; use the matching send operation")]
    SemanticsMismatch {
        message: String,
        semantics: SendSemantics,
    },

    #[error("the {role} may not {operation} `{message}` while `{pending}` awaits its reply")]
    FirewallBreach {
        role: Role,
        operation: &'static str,
        message: String,
        pending: String,
    },

    #[error("reply `{message}` does not answer pending request `{pending}`")]
    ReplyMismatch { message: String, pending: String },

    #[error("reply `{message}` arrived with no request pending")]
    UnexpectedReply { message: String },

    #[error("the channel is {state}")]
    ChannelError { state: ChannelState },
}

impl ProtocolFault {
    /// The listener result code a receiver reports for this fault.
    pub fn dispatch_result(&self) -> DispatchResult {
        match self {
            ProtocolFault::ProtocolViolation { .. } | ProtocolFault::FirewallBreach { .. } => {
                DispatchResult::NotAllowed
            }
            ProtocolFault::UnknownMessage { .. } => DispatchResult::NotKnown,
            ProtocolFault::SemanticsMismatch { .. } | ProtocolFault::ReplyMismatch { .. } => {
                DispatchResult::ValueError
            }
            ProtocolFault::UnexpectedReply { .. } => DispatchResult::PayloadError,
            ProtocolFault::ChannelError { .. } => DispatchResult::RouteError,
        }
    }
}
