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

//! The generated-class description handed to a backend.
//!
//! Nothing here decides how text looks; the types only record what a class
//! contains, in a fixed order.

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::ast::{Direction, SendSemantics, Trigger};
use crate::common::NamingConfig;
use crate::ir::StateEnumIr;

/// One end of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The side `out` messages leave from.
    Parent,
    /// The side `in` messages leave from.
    Child,
}

impl Role {
    /// Both roles, parent first.
    pub const BOTH: [Role; 2] = [Role::Parent, Role::Child];

    /// The other end of the channel.
    #[must_use]
    pub const fn peer(self) -> Self {
        match self {
            Role::Parent => Role::Child,
            Role::Child => Role::Parent,
        }
    }

    /// The direction of messages this role sends.
    #[must_use]
    pub const fn outbound(self) -> Direction {
        match self {
            Role::Parent => Direction::Out,
            Role::Child => Direction::In,
        }
    }

    /// The direction of messages this role receives.
    #[must_use]
    pub const fn inbound(self) -> Direction {
        self.peer().outbound()
    }

    /// Index into [`LoweredProtocol::classes`](crate::ir::LoweredProtocol::classes).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Role::Parent => 0,
            Role::Child => 1,
        }
    }

    /// Class-name suffix configured for this role.
    pub fn suffix(self, naming: &NamingConfig) -> &str {
        match self {
            Role::Parent => &naming.parent_suffix,
            Role::Child => &naming.child_suffix,
        }
    }

    /// Lower-case name for dumps and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lowered field or parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeIr {
    /// A native type, fully qualified.
    Native(String),
    /// An actor of the named class, in any state.
    Class(String),
    /// An actor of the named class that must be in `state`.
    Actor {
        /// Qualified class name for the role holding the reference.
        class: String,
        /// Required state.
        state: String,
    },
}

/// A typed method parameter or reply value.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamIr {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeIr,
}

/// What a field is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// The actor's current protocol state.
    CurrentState,
    /// Non-owning back-reference from a managed actor to its manager.
    ManagerRef,
    /// Owning collection of live managed actors of one protocol.
    ManagedActors,
}

/// One field of a generated class.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldIr {
    /// Field name.
    pub name: String,
    /// Purpose.
    pub kind: FieldKind,
    /// Type name as the backend should spell it.
    pub ty: String,
    /// Whether the class owns what the field refers to.
    pub owning: bool,
    /// Initial value, if fixed.
    pub init: Option<String>,
}

/// What a method does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Concrete async or sync sender.
    Send,
    /// Concrete rpc caller.
    Call,
    /// Virtual async or sync handler.
    Recv,
    /// Virtual rpc handler.
    Answer,
    /// Creates a managed actor.
    Construct,
    /// Destroys a managed actor.
    Destroy,
}

impl MethodKind {
    /// The stub kind firing `trigger`.
    #[must_use]
    pub const fn for_trigger(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Send => MethodKind::Send,
            Trigger::Call => MethodKind::Call,
            Trigger::Recv => MethodKind::Recv,
            Trigger::Answer => MethodKind::Answer,
        }
    }

    /// The trigger a message stub fires; `None` for lifetime methods.
    #[must_use]
    pub const fn trigger(self) -> Option<Trigger> {
        match self {
            MethodKind::Send => Some(Trigger::Send),
            MethodKind::Call => Some(Trigger::Call),
            MethodKind::Recv => Some(Trigger::Recv),
            MethodKind::Answer => Some(Trigger::Answer),
            MethodKind::Construct | MethodKind::Destroy => None,
        }
    }

    /// Name prefix of methods of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            MethodKind::Send => "Send",
            MethodKind::Call => "Call",
            MethodKind::Recv => "Recv",
            MethodKind::Answer => "Answer",
            MethodKind::Construct => "Construct",
            MethodKind::Destroy => "Destroy",
        }
    }
}

/// One legal `from -> to` move of a guarded stub.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardEdge {
    /// State the actor must be in.
    pub from: String,
    /// State the actor enters.
    pub to: String,
}

/// The state check wrapped around a message stub.
///
/// The operation is legal only from a state listed in `edges`; anything else
/// is a protocol violation.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardIr {
    /// Trigger the stub fires.
    pub trigger: Trigger,
    /// Message the stub carries.
    pub message: String,
    /// Legal moves in declaration order.
    pub edges: Vec<GuardEdge>,
}

impl GuardIr {
    /// The state entered when firing from `state`, `None` if illegal there.
    pub fn target(&self, state: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|edge| edge.from == state)
            .map(|edge| edge.to.as_str())
    }
}

/// One row of a role's transition table.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionIr {
    /// Source state.
    pub from: String,
    /// Trigger as seen by this role.
    pub trigger: Trigger,
    /// Fired message.
    pub message: String,
    /// Destination state.
    pub to: String,
}

/// One method of a generated class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodIr {
    /// Method name (`SendOpen`, `RecvOpen`, `ConstructPChild`, ...).
    pub name: String,
    /// What the method does.
    pub kind: MethodKind,
    /// Carried message; `None` for lifetime methods.
    pub message: Option<String>,
    /// Message id; `None` for lifetime methods.
    pub id: Option<u32>,
    /// Reply id when the exchange carries a reply.
    pub reply_id: Option<u32>,
    /// Effective semantics; `None` for lifetime methods.
    pub semantics: Option<SendSemantics>,
    /// Inputs.
    pub params: Vec<ParamIr>,
    /// Reply values.
    pub returns: Vec<ParamIr>,
    /// Handlers are virtual and implemented by hand; senders are generated.
    pub is_virtual: bool,
    /// Whether the caller waits for a reply.
    pub blocking: bool,
    /// Whether nested calls are accepted while waiting.
    pub reentrant: bool,
    /// State check run before the operation.
    pub guard: Option<GuardIr>,
    /// Managed protocol class for lifetime methods.
    pub managed: Option<String>,
}

impl MethodIr {
    /// The trigger this method fires, `None` for lifetime methods.
    pub fn trigger(&self) -> Option<Trigger> {
        self.kind.trigger()
    }

    /// Returns `true` for message stubs.
    pub fn is_stub(&self) -> bool {
        self.message.is_some()
    }
}

/// One generated class: a protocol seen from one role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassIr {
    /// Unqualified class name.
    pub name: String,
    /// Fully qualified protocol name.
    pub protocol: String,
    /// Enclosing namespaces, outermost first.
    pub namespaces: Vec<String>,
    /// Which end of the channel this class implements.
    pub role: Role,
    /// Fields in a fixed order: current state, manager, managed collections.
    pub fields: Vec<FieldIr>,
    /// The state enumeration.
    pub states: StateEnumIr,
    /// This role's transition table.
    pub transitions: Vec<TransitionIr>,
    /// Methods in a fixed order: message stubs, then lifetime methods.
    pub methods: Vec<MethodIr>,
}

impl ClassIr {
    /// Fully qualified class name.
    pub fn qualified_name(&self) -> String {
        self.namespaces
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodIr> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The stub firing `trigger` for `message`.
    pub fn stub(&self, trigger: Trigger, message: &str) -> Option<&MethodIr> {
        self.methods
            .iter()
            .find(|m| m.trigger() == Some(trigger) && m.message.as_deref() == Some(message))
    }

    /// Message stubs in order.
    pub fn stubs(&self) -> impl Iterator<Item = &MethodIr> {
        self.methods.iter().filter(|m| m.is_stub())
    }

    /// Looks up a field by kind.
    pub fn field(&self, kind: FieldKind) -> Option<&FieldIr> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    /// The state entered by firing `(trigger, message)` from `state`.
    pub fn next_state(&self, state: &str, trigger: Trigger, message: &str) -> Option<&str> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.trigger == trigger && t.message == message)
            .map(|t| t.to.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_send_opposite_directions() {
        assert_eq!(Role::Parent.outbound(), Direction::Out);
        assert_eq!(Role::Child.outbound(), Direction::In);
        assert_eq!(Role::Parent.inbound(), Role::Child.outbound());
        assert_eq!(Role::Child.peer(), Role::Parent);
    }

    #[test]
    fn guard_target_follows_edges() {
        let guard = GuardIr::new(
            Trigger::Send,
            "Open".into(),
            vec![GuardEdge::new("START".into(), "OPEN".into())],
        );
        assert_eq!(guard.target("START"), Some("OPEN"));
        assert_eq!(guard.target("OPEN"), None);
    }

    #[test]
    fn lifetime_methods_have_no_trigger() {
        assert_eq!(MethodKind::Construct.trigger(), None);
        for trigger in Trigger::ALL {
            assert_eq!(MethodKind::for_trigger(trigger).trigger(), Some(trigger));
        }
    }
}
