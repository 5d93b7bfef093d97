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

//! Protocol declaration nodes.
//!
//! A [`Protocol`] owns its namespaces, manager/manages statements, message
//! declarations and transition statements. The front-end builds it once through
//! the `add_*` helpers; afterwards it is read-only.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ast::{Direction, Loc, QualifiedId, SendSemantics, Trigger};

/// One enclosing namespace of a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Location of the namespace keyword.
    pub loc: Loc,
    /// Namespace identifier.
    pub name: String,
}

impl Namespace {
    /// Creates a namespace node.
    pub fn new(loc: Loc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
        }
    }
}

/// `manager X;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStmt {
    /// Location of the statement.
    pub loc: Loc,
    /// The managing protocol's name as written.
    pub name: String,
}

impl ManagerStmt {
    /// Creates a manager statement.
    pub fn new(loc: Loc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
        }
    }
}

/// `manages Y;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagesStmt {
    /// Location of the statement.
    pub loc: Loc,
    /// The managed protocol's name as written.
    pub name: String,
}

impl ManagesStmt {
    /// Creates a manages statement.
    pub fn new(loc: Loc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
        }
    }
}

/// A named state. Two states are equal when their names are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    /// Where the state was mentioned.
    pub loc: Loc,
    /// State name, unique within its protocol.
    pub name: String,
}

impl State {
    /// Creates a state reference.
    pub fn new(loc: Loc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A type as written in a parameter or `using` statement.
///
/// When `state` is present the type names an actor protocol, and the actor
/// must currently be in that state for the reference to be valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Where the type was written.
    pub loc: Loc,
    /// The (possibly qualified) type name.
    pub spec: QualifiedId,
    /// Required actor state; marks the type as an actor type.
    pub state: Option<State>,
}

impl TypeSpec {
    /// A plain native type.
    pub fn native(loc: Loc, spec: QualifiedId) -> Self {
        Self {
            loc,
            spec,
            state: None,
        }
    }

    /// An actor type pinned to `state`.
    pub fn actor(loc: Loc, spec: QualifiedId, state: State) -> Self {
        Self {
            loc,
            spec,
            state: Some(state),
        }
    }

    /// The innermost identifier of the type.
    pub fn basename(&self) -> &str {
        &self.spec.base
    }

    /// Returns `true` if this refers to an actor type.
    pub fn is_actor(&self) -> bool {
        self.state.is_some()
    }
}

/// A named, typed message field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Where the parameter was declared.
    pub loc: Loc,
    /// Field name.
    pub name: String,
    /// Field type.
    pub type_spec: TypeSpec,
}

impl Param {
    /// Creates a parameter.
    pub fn new(loc: Loc, type_spec: TypeSpec, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
            type_spec,
        }
    }
}

/// One message of a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDecl {
    /// Where the message was declared.
    pub loc: Loc,
    /// Message name, unique within its protocol.
    pub name: String,
    /// Declared semantics; `None` inherits the protocol default.
    pub send_semantics: Option<SendSemantics>,
    /// Travel direction, seen from the parent role.
    pub direction: Direction,
    /// Request fields.
    pub in_params: Vec<Param>,
    /// Reply fields.
    pub out_params: Vec<Param>,
}

impl MessageDecl {
    /// A message with inherited semantics and no parameters.
    pub fn new(loc: Loc, name: impl Into<String>, direction: Direction) -> Self {
        Self {
            loc,
            name: name.into(),
            send_semantics: None,
            direction,
            in_params: Vec::new(),
            out_params: Vec::new(),
        }
    }

    /// Sets explicit semantics.
    #[must_use]
    pub fn with_semantics(mut self, semantics: SendSemantics) -> Self {
        self.send_semantics = Some(semantics);
        self
    }

    /// Appends request fields.
    pub fn add_in_params(&mut self, params: impl IntoIterator<Item = Param>) {
        self.in_params.extend(params);
    }

    /// Appends reply fields.
    pub fn add_out_params(&mut self, params: impl IntoIterator<Item = Param>) {
        self.out_params.extend(params);
    }

    /// Builder form of [`MessageDecl::add_in_params`] for a single field.
    #[must_use]
    pub fn with_in_param(mut self, param: Param) -> Self {
        self.in_params.push(param);
        self
    }

    /// Builder form of [`MessageDecl::add_out_params`] for a single field.
    #[must_use]
    pub fn with_out_param(mut self, param: Param) -> Self {
        self.out_params.push(param);
        self
    }

    /// The semantics in effect, falling back to `inherited`.
    #[must_use]
    pub fn semantics(&self, inherited: SendSemantics) -> SendSemantics {
        self.send_semantics.unwrap_or(inherited)
    }

    /// Whether the exchange carries a reply.
    #[must_use]
    pub fn has_reply(&self, inherited: SendSemantics) -> bool {
        self.semantics(inherited).has_reply()
    }

    /// In-params followed by out-params.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.in_params.iter().chain(self.out_params.iter())
    }
}

/// A transition out of the enclosing [`TransitionStmt`]'s state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Where the transition was written.
    pub loc: Loc,
    /// Event kind.
    pub trigger: Trigger,
    /// Name of the message the event carries.
    pub message: String,
    /// State entered once the event fires.
    pub to_state: State,
}

impl Transition {
    /// Creates a transition.
    pub fn new(loc: Loc, trigger: Trigger, message: impl Into<String>, to_state: State) -> Self {
        Self {
            loc,
            trigger,
            message: message.into(),
            to_state,
        }
    }
}

/// Declares `state` and the transitions leaving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStmt {
    /// Where the block starts.
    pub loc: Loc,
    /// The declared state.
    pub state: State,
    /// Transitions leaving `state`, in source order.
    pub transitions: Vec<Transition>,
}

impl TransitionStmt {
    /// Creates a transition statement.
    pub fn new(loc: Loc, state: State, transitions: Vec<Transition>) -> Self {
        Self {
            loc,
            state,
            transitions,
        }
    }
}

/// A protocol: the contract between the two actors of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    /// Where the protocol keyword was written.
    pub loc: Loc,
    /// Unqualified protocol name.
    pub name: String,
    /// Enclosing namespaces, outermost first.
    pub namespaces: Vec<Namespace>,
    /// Managing protocol, if any.
    pub manager: Option<ManagerStmt>,
    /// Managed protocols.
    pub manages: Vec<ManagesStmt>,
    /// Default semantics for messages that declare none.
    pub send_semantics: SendSemantics,
    /// Messages in declaration order.
    pub messages: Vec<MessageDecl>,
    /// State machine; empty for a stateless protocol.
    pub transition_stmts: Vec<TransitionStmt>,
}

impl Protocol {
    /// An empty async protocol.
    pub fn new(loc: Loc, name: impl Into<String>) -> Self {
        Self {
            loc,
            name: name.into(),
            namespaces: Vec::new(),
            manager: None,
            manages: Vec::new(),
            send_semantics: SendSemantics::default(),
            messages: Vec::new(),
            transition_stmts: Vec::new(),
        }
    }

    /// Adds a namespace enclosing all current ones.
    ///
    /// The front-end discovers namespaces inside-out, so each call inserts at the front.
    pub fn add_outer_namespace(&mut self, namespace: Namespace) {
        self.namespaces.insert(0, namespace);
    }

    /// Sets the manager statement.
    pub fn set_manager(&mut self, manager: ManagerStmt) {
        self.manager = Some(manager);
    }

    /// Appends manages statements.
    pub fn add_manages(&mut self, manages: impl IntoIterator<Item = ManagesStmt>) {
        self.manages.extend(manages);
    }

    /// Appends message declarations.
    pub fn add_messages(&mut self, messages: impl IntoIterator<Item = MessageDecl>) {
        self.messages.extend(messages);
    }

    /// Appends transition statements.
    pub fn add_transition_stmts(&mut self, stmts: impl IntoIterator<Item = TransitionStmt>) {
        self.transition_stmts.extend(stmts);
    }

    /// The fully qualified protocol name.
    pub fn qualified_name(&self) -> QualifiedId {
        QualifiedId::with_quals(
            self.loc.clone(),
            self.name.clone(),
            self.namespaces.iter().map(|ns| ns.name.clone()).collect(),
        )
    }

    /// A protocol without transition statements accepts every message in any order.
    pub fn is_stateless(&self) -> bool {
        self.transition_stmts.is_empty()
    }

    /// Looks up a message by name; the first declaration wins.
    pub fn message(&self, name: &str) -> Option<&MessageDecl> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Semantics in effect for `message`.
    pub fn semantics_of(&self, message: &MessageDecl) -> SendSemantics {
        message.semantics(self.send_semantics)
    }

    /// Declared states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.transition_stmts.iter().map(|stmt| &stmt.state)
    }

    /// All declared transitions paired with their source state.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, &Transition)> {
        self.transition_stmts
            .iter()
            .flat_map(|stmt| stmt.transitions.iter().map(move |t| (&stmt.state, t)))
    }

    /// The implicit start state.
    ///
    /// The first declared state that no *other* state transitions into; when every
    /// state is entered from elsewhere (a cycle through the start), the first
    /// declared state. `None` for a stateless protocol.
    pub fn start_state(&self) -> Option<&State> {
        let first = self.transition_stmts.first()?;
        let entered_from_elsewhere = |name: &str| {
            self.transitions()
                .any(|(from, t)| from.name != name && t.to_state.name == name)
        };
        self.states()
            .find(|state| !entered_from_elsewhere(&state.name))
            .or(Some(&first.state))
    }
}
