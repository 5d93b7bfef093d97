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

//! The channel half of the generated-code contract.
//!
//! A [`Channel`] connects the two endpoints of one protocol instance. It keeps
//! one FIFO queue per direction and a stack of requests awaiting their reply.
//! The ordering firewall applies to the endpoint a pending request blocks:
//!
//! * a caller may only dispatch what reaches it until its reply is dispatched;
//! * a `sync` callee may only reply between delivery and reply;
//! * an `rpc` callee may reply or call back into its caller in that window.
//!
//! A callee that has replied is released, and a fire-and-forget message sent
//! before a request reaches its callee simply crosses it. Two requests crossing
//! each other are a race and fault.
//!
//! Every fault is fatal: both endpoints fail and the channel stops accepting work.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use derive_new::new;
use static_assertions::assert_impl_all;
use tracing::{debug, error, instrument, trace};

use crate::ast::SendSemantics;
use crate::contract::{ActorInstance, ProtocolFault};
use crate::ir::{LoweredProtocol, Role};

/// Lifecycle of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// Open with no request outstanding.
    Idle,
    /// Open with at least one request awaiting its reply.
    Waiting,
    /// Closed normally; both endpoints are dead.
    Closed,
    /// Torn down by a fault; both endpoints are failed.
    Error,
}

impl ChannelState {
    /// Returns `true` while the channel accepts work.
    pub fn is_open(self) -> bool {
        matches!(self, ChannelState::Idle | ChannelState::Waiting)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelState::Idle => "idle",
            ChannelState::Waiting => "waiting",
            ChannelState::Closed => "closed",
            ChannelState::Error => "in error",
        })
    }
}

/// What an envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// A fire-and-forget message.
    Message,
    /// A `sync` or `rpc` request.
    Request,
    /// The reply to a request.
    Reply,
}

/// One queued message.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// What the envelope carries.
    pub kind: EnvelopeKind,
    /// Message name.
    pub message: String,
    /// Message id, or the reply id for replies.
    pub id: u32,
    /// Semantics of the exchange.
    pub semantics: SendSemantics,
}

/// A delivered envelope, as seen by its receiver.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The receiving end.
    pub to: Role,
    /// What was delivered.
    pub kind: EnvelopeKind,
    /// Message name.
    pub message: String,
    /// Receiver state after delivery.
    pub state: String,
}

#[derive(new, Debug, Clone)]
struct Frame {
    caller: Role,
    message: String,
    id: u32,
    semantics: SendSemantics,
    #[new(default)]
    delivered: bool,
    #[new(default)]
    answered: bool,
}

assert_impl_all!(Envelope: Send, Sync);

/// Both endpoints of one protocol instance and the traffic between them.
#[derive(Debug, Clone)]
pub struct Channel {
    protocol: String,
    endpoints: [ActorInstance; 2],
    queues: [VecDeque<Envelope>; 2],
    pending: Vec<Frame>,
    state: ChannelState,
}

impl Channel {
    /// Opens a channel with both endpoints in the start state.
    pub fn open(protocol: &LoweredProtocol) -> Self {
        debug!(protocol = %protocol.protocol, "channel opened");
        Self {
            protocol: protocol.protocol.clone(),
            endpoints: [
                ActorInstance::new(Arc::new(protocol.parent().clone())),
                ActorInstance::new(Arc::new(protocol.child().clone())),
            ],
            queues: [VecDeque::new(), VecDeque::new()],
            pending: Vec::new(),
            state: ChannelState::Idle,
        }
    }

    /// Current channel state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// The endpoint playing `role`.
    pub fn endpoint(&self, role: Role) -> &ActorInstance {
        &self.endpoints[role.index()]
    }

    /// Number of requests awaiting their reply.
    pub fn pending_depth(&self) -> usize {
        self.pending.len()
    }

    /// Number of envelopes queued for `to`.
    pub fn queued(&self, to: Role) -> usize {
        self.queues[to.index()].len()
    }

    /// Sends a fire-and-forget message.
    pub fn send(&mut self, from: Role, message: &str) -> Result<(), ProtocolFault> {
        self.guarded(|ch| ch.issue(from, message, SendSemantics::Async))
    }

    /// Sends a `sync` request; the sender waits until the reply is dispatched to it.
    pub fn send_sync(&mut self, from: Role, message: &str) -> Result<(), ProtocolFault> {
        self.guarded(|ch| ch.issue(from, message, SendSemantics::Sync))
    }

    /// Issues an `rpc` call.
    pub fn call(&mut self, from: Role, message: &str) -> Result<(), ProtocolFault> {
        self.guarded(|ch| ch.issue(from, message, SendSemantics::Rpc))
    }

    /// Replies to the innermost pending request.
    pub fn reply(&mut self, from: Role, message: &str) -> Result<(), ProtocolFault> {
        self.guarded(|ch| ch.answer(from, message))
    }

    /// Delivers the oldest envelope queued for `to`, `None` when there is none.
    pub fn dispatch(&mut self, to: Role) -> Result<Option<Delivery>, ProtocolFault> {
        self.guarded(|ch| match ch.queues[to.index()].pop_front() {
            Some(envelope) => ch.deliver(to, envelope).map(Some),
            None => Ok(None),
        })
    }

    /// Dispatches everything queued for `to`, in order.
    pub fn drain(&mut self, to: Role) -> Result<Vec<Delivery>, ProtocolFault> {
        let mut delivered = Vec::new();
        while let Some(delivery) = self.dispatch(to)? {
            delivered.push(delivery);
        }
        Ok(delivered)
    }

    /// Closes the channel, moving both endpoints to the dead state.
    ///
    /// Closing twice is harmless; closing a faulted channel is not possible.
    #[instrument(skip(self), fields(protocol = %self.protocol))]
    pub fn close(&mut self) -> Result<(), ProtocolFault> {
        match self.state {
            ChannelState::Closed => return Ok(()),
            ChannelState::Error => return Err(ProtocolFault::ChannelError { state: self.state }),
            ChannelState::Idle | ChannelState::Waiting => {}
        }
        for endpoint in &mut self.endpoints {
            endpoint.destroy();
        }
        self.queues.iter_mut().for_each(VecDeque::clear);
        self.pending.clear();
        self.state = ChannelState::Closed;
        debug!("channel closed");
        Ok(())
    }

    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, ProtocolFault>,
    ) -> Result<T, ProtocolFault> {
        if !self.state.is_open() {
            return Err(ProtocolFault::ChannelError { state: self.state });
        }
        op(self).map_err(|fault| self.tear_down(fault))
    }

    fn tear_down(&mut self, fault: ProtocolFault) -> ProtocolFault {
        error!(protocol = %self.protocol, %fault, "channel fault");
        for endpoint in &mut self.endpoints {
            endpoint.fail();
        }
        self.queues.iter_mut().for_each(VecDeque::clear);
        self.pending.clear();
        self.state = ChannelState::Error;
        fault
    }

    fn issue(
        &mut self,
        from: Role,
        message: &str,
        expected: SendSemantics,
    ) -> Result<(), ProtocolFault> {
        let stub = self.endpoints[from.index()].outbound(message)?;
        let semantics = stub.semantics.unwrap_or_default();
        let id = stub.id.unwrap_or_default();
        if semantics != expected {
            return Err(ProtocolFault::SemanticsMismatch {
                message: message.to_string(),
                semantics,
            });
        }
        self.firewall(from, message, semantics)?;
        self.endpoints[from.index()].fire(semantics.outbound_trigger(), message)?;

        let kind = if semantics.has_reply() {
            self.pending
                .push(Frame::new(from, message.to_string(), id, semantics));
            self.state = ChannelState::Waiting;
            EnvelopeKind::Request
        } else {
            EnvelopeKind::Message
        };
        self.queues[from.peer().index()].push_back(Envelope::new(
            kind,
            message.to_string(),
            id,
            semantics,
        ));
        trace!(from = %from, message, id, depth = self.pending.len(), "queued");
        Ok(())
    }

    fn firewall(
        &self,
        from: Role,
        message: &str,
        semantics: SendSemantics,
    ) -> Result<(), ProtocolFault> {
        let breach = |frame: &Frame| ProtocolFault::FirewallBreach {
            role: from,
            operation: if semantics.has_reply() { "call" } else { "send" },
            message: message.to_string(),
            pending: frame.message.clone(),
        };
        for frame in self.pending.iter().rev() {
            if frame.caller == from {
                return Err(breach(frame));
            }
            if frame.answered {
                continue;
            }
            if !frame.delivered {
                if semantics.has_reply() {
                    return Err(breach(frame));
                }
                continue;
            }
            let nested_call =
                semantics == SendSemantics::Rpc && frame.semantics == SendSemantics::Rpc;
            return if nested_call { Ok(()) } else { Err(breach(frame)) };
        }
        Ok(())
    }

    fn answer(&mut self, from: Role, message: &str) -> Result<(), ProtocolFault> {
        let top = self
            .pending
            .last_mut()
            .ok_or_else(|| ProtocolFault::UnexpectedReply {
                message: message.to_string(),
            })?;
        if top.caller == from || !top.delivered || top.answered || top.message != message {
            return Err(ProtocolFault::ReplyMismatch {
                message: message.to_string(),
                pending: top.message.clone(),
            });
        }
        top.answered = true;
        let envelope = Envelope::new(
            EnvelopeKind::Reply,
            message.to_string(),
            top.id + 1,
            top.semantics,
        );
        self.queues[top.caller.index()].push_back(envelope);
        trace!(from = %from, message, "reply queued");
        Ok(())
    }

    fn deliver(&mut self, to: Role, envelope: Envelope) -> Result<Delivery, ProtocolFault> {
        match envelope.kind {
            EnvelopeKind::Message | EnvelopeKind::Request => {
                let trigger = envelope.semantics.inbound_trigger();
                let state = self.endpoints[to.index()]
                    .fire(trigger, &envelope.message)?
                    .to_string();
                if envelope.kind == EnvelopeKind::Request {
                    if let Some(frame) = self
                        .pending
                        .iter_mut()
                        .rev()
                        .find(|f| f.id == envelope.id && f.caller == to.peer() && !f.delivered)
                    {
                        frame.delivered = true;
                    }
                }
                Ok(Delivery::new(to, envelope.kind, envelope.message, state))
            }
            EnvelopeKind::Reply => {
                // Frames above the receiver's own belong to requests its peer
                // issued after replying.
                let position = self
                    .pending
                    .iter()
                    .rposition(|f| f.caller == to)
                    .ok_or_else(|| ProtocolFault::UnexpectedReply {
                        message: envelope.message.clone(),
                    })?;
                let frame = &self.pending[position];
                if !frame.answered || envelope.id != frame.id + 1 {
                    return Err(ProtocolFault::ReplyMismatch {
                        message: envelope.message,
                        pending: frame.message.clone(),
                    });
                }
                self.pending.remove(position);
                if self.pending.is_empty() {
                    self.state = ChannelState::Idle;
                }
                let state = self.endpoints[to.index()].state().to_string();
                Ok(Delivery::new(to, envelope.kind, envelope.message, state))
            }
        }
    }
}

assert_impl_all!(Channel: Send, Sync);
