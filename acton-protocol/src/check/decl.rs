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

//! Resolved facts about named entities, kept beside the tree rather than in it.

use std::fmt;

use derive_new::new;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{Direction, Loc, QualifiedId, SendSemantics};

/// Stable identity of a named entity within one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeclKey {
    /// The protocol itself.
    Protocol,
    /// A message, by name.
    Message(String),
    /// A state, by name.
    State(String),
    /// A message field, by message and field name.
    Param {
        /// Owning message.
        message: String,
        /// Field name.
        param: String,
    },
}

impl DeclKey {
    /// Key of a message.
    pub fn message(name: impl Into<String>) -> Self {
        Self::Message(name.into())
    }

    /// Key of a state.
    pub fn state(name: impl Into<String>) -> Self {
        Self::State(name.into())
    }

    /// Key of a message field.
    pub fn param(message: impl Into<String>, param: impl Into<String>) -> Self {
        Self::Param {
            message: message.into(),
            param: param.into(),
        }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKey::Protocol => write!(f, "protocol"),
            DeclKey::Message(name) => write!(f, "message {name}"),
            DeclKey::State(name) => write!(f, "state {name}"),
            DeclKey::Param { message, param } => write!(f, "param {message}.{param}"),
        }
    }
}

/// The resolved type of a message field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    /// A builtin or `using`-introduced native type, fully qualified.
    Native(QualifiedId),
    /// A reference to an actor of `protocol` that must be in `state`.
    Actor {
        /// Fully qualified protocol name.
        protocol: QualifiedId,
        /// Required state of the referenced actor.
        state: String,
    },
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Native(name) => write!(f, "{name}"),
            ParamType::Actor { protocol, state } => write!(f, "{protocol}:{state}"),
        }
    }
}

/// What kind of entity a [`Decl`] describes, with its resolved type facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclType {
    /// A protocol.
    Protocol {
        /// Resolved manager, if any.
        manager: Option<QualifiedId>,
        /// Resolved managed protocols.
        managed: Vec<QualifiedId>,
        /// Whether the protocol has no state machine.
        stateless: bool,
    },
    /// A message.
    Message {
        /// Effective semantics.
        semantics: SendSemantics,
        /// Declared direction.
        direction: Direction,
    },
    /// A state.
    State {
        /// Whether this is the implicit start state.
        start: bool,
    },
    /// A message field.
    Param(ParamType),
}

/// Resolved facts about one named entity.
#[derive(new, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    /// Where the entity was declared.
    pub loc: Loc,
    /// The name as written.
    pub progname: String,
    /// Shortest unambiguous reference form.
    pub shortname: String,
    /// Fully qualified reference form.
    pub fullname: String,
    /// Resolved type.
    pub decl_type: DeclType,
    /// Fully qualified name of the enclosing scope, `None` at the top level.
    pub scope: Option<String>,
}

/// Immutable table of [`Decl`]s for one protocol, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclTable {
    decls: IndexMap<DeclKey, Decl>,
}

impl DeclTable {
    pub(crate) fn builder() -> DeclTableBuilder {
        DeclTableBuilder::default()
    }

    /// Looks up the facts for `key`.
    pub fn get(&self, key: &DeclKey) -> Option<&Decl> {
        self.decls.get(key)
    }

    /// The resolved type of a message field.
    pub fn param_type(&self, message: &str, param: &str) -> Option<&ParamType> {
        match self.get(&DeclKey::param(message, param)).map(|d| &d.decl_type) {
            Some(DeclType::Param(ty)) => Some(ty),
            _ => None,
        }
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeclKey, &Decl)> {
        self.decls.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Returns `true` when no entity resolved.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Accumulates decls during one resolver run. The first entry for a key wins.
#[derive(Debug, Default)]
pub(crate) struct DeclTableBuilder {
    decls: IndexMap<DeclKey, Decl>,
}

impl DeclTableBuilder {
    pub(crate) fn insert(&mut self, key: DeclKey, decl: Decl) {
        self.decls.entry(key).or_insert(decl);
    }

    pub(crate) fn get_mut(&mut self, key: &DeclKey) -> Option<&mut Decl> {
        self.decls.get_mut(key)
    }

    pub(crate) fn finish(self) -> DeclTable {
        DeclTable { decls: self.decls }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(name: &str) -> Decl {
        Decl::new(
            Loc::none(),
            "x".into(),
            "x".into(),
            "P::Msg::x".into(),
            DeclType::Param(ParamType::Native(QualifiedId::parse(Loc::none(), name))),
            Some("P::Msg".into()),
        )
    }

    #[test]
    fn first_insert_wins() {
        let mut builder = DeclTable::builder();
        builder.insert(DeclKey::param("Msg", "x"), native("int"));
        builder.insert(DeclKey::param("Msg", "x"), native("bool"));
        let table = builder.finish();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.param_type("Msg", "x").map(ToString::to_string),
            Some("int".to_string())
        );
        assert!(table.param_type("Msg", "y").is_none());
    }

    #[test]
    fn keys_render_their_path() {
        assert_eq!(DeclKey::param("Open", "id").to_string(), "param Open.id");
        assert_eq!(DeclKey::state("START").to_string(), "state START");
    }
}
