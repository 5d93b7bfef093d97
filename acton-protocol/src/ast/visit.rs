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

//! Closed traversal over the AST.
//!
//! [`Node`] enumerates every node kind. [`Visitor::visit_node`] dispatches with an
//! exhaustive `match`, so a new kind cannot be added without every pass that
//! overrides `visit_node` being updated. Each `visit_*` method defaults to the
//! matching `walk_*` function, which fixes the traversal order:
//!
//! | node | children, in order |
//! |------|--------------------|
//! | `TranslationUnit` | cxx includes, protocol includes, using statements, protocol |
//! | `Protocol` | namespaces, manager, manages, messages, transition statements |
//! | `MessageDecl` | in params, out params |
//! | `TransitionStmt` | state, transitions |
//! | `Transition` | destination state |
//! | `Param` | type spec |
//! | `UsingStmt` | type spec |
//!
//! Protocol includes are leaves: the included unit is a separate tree and each
//! pass decides how to reach it.

use crate::ast::{
    CxxInclude, Loc, ManagerStmt, ManagesStmt, MessageDecl, Namespace, Param, Protocol,
    ProtocolInclude, State, Transition, TransitionStmt, TranslationUnit, TypeSpec, UsingStmt,
};

/// A borrowed reference to any AST node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A whole file.
    TranslationUnit(&'a TranslationUnit),
    /// `include "x.h";`
    CxxInclude(&'a CxxInclude),
    /// `include protocol "x";`
    ProtocolInclude(&'a ProtocolInclude),
    /// `using T;`
    UsingStmt(&'a UsingStmt),
    /// A protocol declaration.
    Protocol(&'a Protocol),
    /// An enclosing namespace.
    Namespace(&'a Namespace),
    /// `manager X;`
    ManagerStmt(&'a ManagerStmt),
    /// `manages Y;`
    ManagesStmt(&'a ManagesStmt),
    /// A message declaration.
    MessageDecl(&'a MessageDecl),
    /// A state block.
    TransitionStmt(&'a TransitionStmt),
    /// One transition.
    Transition(&'a Transition),
    /// A state reference.
    State(&'a State),
    /// A message field.
    Param(&'a Param),
    /// A type reference.
    TypeSpec(&'a TypeSpec),
}

impl<'a> Node<'a> {
    /// The node's source location.
    pub fn loc(&self) -> &'a Loc {
        match *self {
            Node::TranslationUnit(n) => &n.loc,
            Node::CxxInclude(n) => &n.loc,
            Node::ProtocolInclude(n) => &n.loc,
            Node::UsingStmt(n) => &n.loc,
            Node::Protocol(n) => &n.loc,
            Node::Namespace(n) => &n.loc,
            Node::ManagerStmt(n) => &n.loc,
            Node::ManagesStmt(n) => &n.loc,
            Node::MessageDecl(n) => &n.loc,
            Node::TransitionStmt(n) => &n.loc,
            Node::Transition(n) => &n.loc,
            Node::State(n) => &n.loc,
            Node::Param(n) => &n.loc,
            Node::TypeSpec(n) => &n.loc,
        }
    }

    /// A stable name for the node kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::TranslationUnit(_) => "TranslationUnit",
            Node::CxxInclude(_) => "CxxInclude",
            Node::ProtocolInclude(_) => "ProtocolInclude",
            Node::UsingStmt(_) => "UsingStmt",
            Node::Protocol(_) => "Protocol",
            Node::Namespace(_) => "Namespace",
            Node::ManagerStmt(_) => "ManagerStmt",
            Node::ManagesStmt(_) => "ManagesStmt",
            Node::MessageDecl(_) => "MessageDecl",
            Node::TransitionStmt(_) => "TransitionStmt",
            Node::Transition(_) => "Transition",
            Node::State(_) => "State",
            Node::Param(_) => "Param",
            Node::TypeSpec(_) => "TypeSpec",
        }
    }
}

/// A pass over the AST. Override the `visit_*` methods of interest and call the
/// matching `walk_*` function to keep descending.
pub trait Visitor<'a> {
    /// Dispatches to the `visit_*` method for the node's kind.
    fn visit_node(&mut self, node: Node<'a>) {
        match node {
            Node::TranslationUnit(n) => self.visit_translation_unit(n),
            Node::CxxInclude(n) => self.visit_cxx_include(n),
            Node::ProtocolInclude(n) => self.visit_protocol_include(n),
            Node::UsingStmt(n) => self.visit_using_stmt(n),
            Node::Protocol(n) => self.visit_protocol(n),
            Node::Namespace(n) => self.visit_namespace(n),
            Node::ManagerStmt(n) => self.visit_manager_stmt(n),
            Node::ManagesStmt(n) => self.visit_manages_stmt(n),
            Node::MessageDecl(n) => self.visit_message_decl(n),
            Node::TransitionStmt(n) => self.visit_transition_stmt(n),
            Node::Transition(n) => self.visit_transition(n),
            Node::State(n) => self.visit_state(n),
            Node::Param(n) => self.visit_param(n),
            Node::TypeSpec(n) => self.visit_type_spec(n),
        }
    }

    /// Visits a translation unit.
    fn visit_translation_unit(&mut self, tu: &'a TranslationUnit) {
        walk_translation_unit(self, tu);
    }

    /// Visits a native include.
    fn visit_cxx_include(&mut self, _inc: &'a CxxInclude) {}

    /// Visits a protocol include. The included unit is not entered.
    fn visit_protocol_include(&mut self, _inc: &'a ProtocolInclude) {}

    /// Visits a using statement.
    fn visit_using_stmt(&mut self, using: &'a UsingStmt) {
        walk_using_stmt(self, using);
    }

    /// Visits a protocol.
    fn visit_protocol(&mut self, protocol: &'a Protocol) {
        walk_protocol(self, protocol);
    }

    /// Visits a namespace.
    fn visit_namespace(&mut self, _ns: &'a Namespace) {}

    /// Visits a manager statement.
    fn visit_manager_stmt(&mut self, _mgr: &'a ManagerStmt) {}

    /// Visits a manages statement.
    fn visit_manages_stmt(&mut self, _managed: &'a ManagesStmt) {}

    /// Visits a message declaration.
    fn visit_message_decl(&mut self, md: &'a MessageDecl) {
        walk_message_decl(self, md);
    }

    /// Visits a transition statement.
    fn visit_transition_stmt(&mut self, ts: &'a TransitionStmt) {
        walk_transition_stmt(self, ts);
    }

    /// Visits a transition.
    fn visit_transition(&mut self, t: &'a Transition) {
        walk_transition(self, t);
    }

    /// Visits a state reference.
    fn visit_state(&mut self, _state: &'a State) {}

    /// Visits a parameter.
    fn visit_param(&mut self, param: &'a Param) {
        walk_param(self, param);
    }

    /// Visits a type reference.
    fn visit_type_spec(&mut self, _ts: &'a TypeSpec) {}
}

/// Cxx includes, protocol includes, using statements, then the protocol.
pub fn walk_translation_unit<'a, V: Visitor<'a> + ?Sized>(v: &mut V, tu: &'a TranslationUnit) {
    for inc in &tu.cxx_includes {
        v.visit_node(Node::CxxInclude(inc));
    }
    for inc in &tu.protocol_includes {
        v.visit_node(Node::ProtocolInclude(inc));
    }
    for using in &tu.using {
        v.visit_node(Node::UsingStmt(using));
    }
    v.visit_node(Node::Protocol(&tu.protocol));
}

/// The type spec of a using statement.
pub fn walk_using_stmt<'a, V: Visitor<'a> + ?Sized>(v: &mut V, using: &'a UsingStmt) {
    v.visit_node(Node::TypeSpec(&using.type_spec));
}

/// Namespaces, manager, manages, messages, then transition statements.
pub fn walk_protocol<'a, V: Visitor<'a> + ?Sized>(v: &mut V, protocol: &'a Protocol) {
    for ns in &protocol.namespaces {
        v.visit_node(Node::Namespace(ns));
    }
    if let Some(manager) = &protocol.manager {
        v.visit_node(Node::ManagerStmt(manager));
    }
    for managed in &protocol.manages {
        v.visit_node(Node::ManagesStmt(managed));
    }
    for md in &protocol.messages {
        v.visit_node(Node::MessageDecl(md));
    }
    for ts in &protocol.transition_stmts {
        v.visit_node(Node::TransitionStmt(ts));
    }
}

/// In params, then out params.
pub fn walk_message_decl<'a, V: Visitor<'a> + ?Sized>(v: &mut V, md: &'a MessageDecl) {
    for param in &md.in_params {
        v.visit_node(Node::Param(param));
    }
    for param in &md.out_params {
        v.visit_node(Node::Param(param));
    }
}

/// The declared state, then its transitions.
pub fn walk_transition_stmt<'a, V: Visitor<'a> + ?Sized>(v: &mut V, ts: &'a TransitionStmt) {
    v.visit_node(Node::State(&ts.state));
    for t in &ts.transitions {
        v.visit_node(Node::Transition(t));
    }
}

/// The destination state.
pub fn walk_transition<'a, V: Visitor<'a> + ?Sized>(v: &mut V, t: &'a Transition) {
    v.visit_node(Node::State(&t.to_state));
}

/// The parameter's type spec.
pub fn walk_param<'a, V: Visitor<'a> + ?Sized>(v: &mut V, param: &'a Param) {
    v.visit_node(Node::TypeSpec(&param.type_spec));
}
