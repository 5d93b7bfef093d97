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

use std::collections::VecDeque;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::ast::visit::{walk_message_decl, walk_protocol, walk_transition, walk_transition_stmt};
use crate::ast::{
    ManagerStmt, ManagesStmt, MessageDecl, Param, Program, Protocol, ProtocolInclude,
    QualifiedId, State, Transition, TransitionStmt, TranslationUnit, Trigger, TypeSpec,
    UsingStmt, Visitor,
};
use crate::check::builtin::is_builtin;
use crate::check::decl::DeclTableBuilder;
use crate::check::symbols::refers_to;
use crate::check::{
    CheckError, CheckWarning, Decl, DeclKey, DeclTable, DeclType, Diagnostics, ParamType,
    ProtocolSymbols,
};
use crate::common::CompilerConfig;

/// The protocols one unit can see.
pub(crate) struct Scope<'a> {
    pub(crate) own: &'a ProtocolSymbols,
    /// Units this unit includes directly.
    pub(crate) included: Vec<&'a ProtocolSymbols>,
    /// Units that include this unit directly.
    pub(crate) includers: Vec<&'a ProtocolSymbols>,
}

/// What one resolver run learned about its unit.
pub(crate) struct Resolution {
    pub(crate) decls: DeclTable,
    pub(crate) manager: Option<QualifiedId>,
    pub(crate) managed: Vec<QualifiedId>,
}

/// Resolves every cross-reference of one translation unit.
pub(crate) struct Resolver<'a, 'd> {
    unit: &'a TranslationUnit,
    program: &'a Program,
    scope: Scope<'a>,
    config: &'a CompilerConfig,
    diags: &'d mut Diagnostics,
    decls: DeclTableBuilder,
    using: Vec<QualifiedId>,
    current_message: Option<&'a MessageDecl>,
    current_state: Option<&'a State>,
    triples: IndexSet<(String, Trigger, String)>,
    fired: IndexSet<String>,
    manager: Option<QualifiedId>,
    managed: Vec<QualifiedId>,
}

impl<'a, 'd> Resolver<'a, 'd> {
    pub(crate) fn run(
        unit: &'a TranslationUnit,
        program: &'a Program,
        scope: Scope<'a>,
        config: &'a CompilerConfig,
        diags: &'d mut Diagnostics,
    ) -> Resolution {
        debug!(file = %unit.filename, protocol = %scope.own.name, "resolving");
        let mut resolver = Resolver {
            unit,
            program,
            scope,
            config,
            diags,
            decls: DeclTable::builder(),
            using: Vec::new(),
            current_message: None,
            current_state: None,
            triples: IndexSet::new(),
            fired: IndexSet::new(),
            manager: None,
            managed: Vec::new(),
        };
        resolver.visit_translation_unit(unit);
        Resolution {
            decls: resolver.decls.finish(),
            manager: resolver.manager,
            managed: resolver.managed,
        }
    }

    fn protocol(&self) -> &'a Protocol {
        &self.unit.protocol
    }

    fn protocol_name(&self) -> String {
        self.scope.own.name.to_string()
    }

    fn resolve_type(&mut self, ts: &TypeSpec) -> Option<ParamType> {
        let written = ts.spec.to_string();
        if let Some(state) = &ts.state {
            let own = self.scope.own;
            let Some(target) = std::iter::once(own)
                .chain(self.scope.included.iter().copied())
                .find(|s| s.is_named(&written))
            else {
                self.diags
                    .error(&ts.loc, CheckError::UnknownActorType { name: written });
                return None;
            };
            if !target.has_state(&state.name) {
                self.diags.error(
                    &state.loc,
                    CheckError::UnknownActorState {
                        state: state.name.clone(),
                        protocol: target.name.to_string(),
                    },
                );
                return None;
            }
            return Some(ParamType::Actor {
                protocol: target.name.clone(),
                state: state.name.clone(),
            });
        }

        let using = self.using.iter().find(|u| {
            u.to_string() == written || (ts.spec.is_simple() && u.base == ts.spec.base)
        });
        if let Some(using) = using {
            return Some(ParamType::Native(using.clone()));
        }
        if is_builtin(&written, &self.config.types.extra_builtins) {
            return Some(ParamType::Native(ts.spec.clone()));
        }
        self.diags
            .error(&ts.loc, CheckError::UnknownType { name: written });
        None
    }

    fn check_fired_message(&mut self, t: &Transition) {
        let protocol = self.protocol();
        let Some(md) = protocol.message(&t.message) else {
            let protocol = self.protocol_name();
            self.diags.error(
                &t.loc,
                CheckError::UnknownMessage {
                    name: t.message.clone(),
                    protocol,
                },
            );
            return;
        };
        self.fired.insert(md.name.clone());

        let expected = t.trigger.direction();
        if !md.direction.permits(expected) {
            self.diags.error(
                &t.loc,
                CheckError::TriggerDirection {
                    trigger: t.trigger,
                    message: md.name.clone(),
                    direction: md.direction,
                    expected,
                },
            );
        }
        let semantics = protocol.semantics_of(md);
        if !t.trigger.accepts(semantics) {
            self.diags.error(
                &t.loc,
                CheckError::TriggerSemantics {
                    trigger: t.trigger,
                    message: md.name.clone(),
                    semantics,
                },
            );
        }
    }

    fn report_unused_messages(&mut self) {
        let protocol = self.protocol();
        if protocol.is_stateless() {
            return;
        }
        let mut reported = IndexSet::new();
        for md in &protocol.messages {
            if !self.fired.contains(&md.name) && reported.insert(md.name.as_str()) {
                self.diags.warning(
                    &md.loc,
                    CheckWarning::UnusedMessage {
                        name: md.name.clone(),
                    },
                );
            }
        }
    }

    fn report_unreachable_states(&mut self) {
        if !self.config.diagnostics.warn_unreachable_states {
            return;
        }
        let protocol = self.protocol();
        let own = self.scope.own;
        let Some(start) = protocol.start_state() else {
            return;
        };
        let mut reached: IndexSet<&str> = IndexSet::new();
        let mut queue = VecDeque::from([start.name.as_str()]);
        while let Some(state) = queue.pop_front() {
            if !reached.insert(state) {
                continue;
            }
            for (from, t) in protocol.transitions() {
                if from.name == state {
                    queue.push_back(t.to_state.name.as_str());
                }
            }
        }
        for (name, loc) in &own.states {
            if !reached.contains(name.as_str()) {
                self.diags.warning(
                    loc,
                    CheckWarning::UnreachableState {
                        name: name.clone(),
                        start: start.name.clone(),
                    },
                );
            }
        }
    }
}

impl<'a> Visitor<'a> for Resolver<'a, '_> {
    fn visit_protocol_include(&mut self, inc: &'a ProtocolInclude) {
        if self.program.unit(&inc.file).is_none() {
            self.diags.error(
                &inc.loc,
                CheckError::MissingInclude {
                    file: inc.file.clone(),
                },
            );
        }
    }

    fn visit_using_stmt(&mut self, using: &'a UsingStmt) {
        self.using.push(using.type_spec.spec.clone());
    }

    fn visit_protocol(&mut self, protocol: &'a Protocol) {
        let fullname = self.protocol_name();
        let scope = (!protocol.namespaces.is_empty()).then(|| {
            protocol
                .namespaces
                .iter()
                .map(|ns| ns.name.as_str())
                .collect::<Vec<_>>()
                .join("::")
        });
        self.decls.insert(
            DeclKey::Protocol,
            Decl::new(
                protocol.loc.clone(),
                protocol.name.clone(),
                protocol.name.clone(),
                fullname,
                DeclType::Protocol {
                    manager: None,
                    managed: Vec::new(),
                    stateless: protocol.is_stateless(),
                },
                scope,
            ),
        );

        walk_protocol(self, protocol);

        if let Some(decl) = self.decls.get_mut(&DeclKey::Protocol) {
            decl.decl_type = DeclType::Protocol {
                manager: self.manager.clone(),
                managed: self.managed.clone(),
                stateless: protocol.is_stateless(),
            };
        }
        self.report_unused_messages();
        self.report_unreachable_states();
    }

    fn visit_manager_stmt(&mut self, mgr: &'a ManagerStmt) {
        let own = self.scope.own;
        let found = self
            .scope
            .included
            .iter()
            .chain(self.scope.includers.iter())
            .copied()
            .find(|s| s.is_named(&mgr.name));
        match found {
            None => self.diags.error(
                &mgr.loc,
                CheckError::UnknownManager {
                    name: mgr.name.clone(),
                },
            ),
            Some(manager) if !manager.manages(&own.name) => self.diags.error(
                &mgr.loc,
                CheckError::ManagerDoesNotManage {
                    manager: manager.name.to_string(),
                    protocol: own.name.to_string(),
                },
            ),
            Some(manager) => {
                trace!(manager = %manager.name, "resolved manager");
                self.manager = Some(manager.name.clone());
            }
        }
    }

    fn visit_manages_stmt(&mut self, managed: &'a ManagesStmt) {
        let own = self.scope.own;
        // Self-management and duplicates were reported while collecting symbols.
        if own.managed.get(&managed.name) != Some(&managed.loc) {
            return;
        }
        let found = self
            .scope
            .included
            .iter()
            .copied()
            .find(|s| s.is_named(&managed.name));
        let Some(target) = found else {
            self.diags.error(
                &managed.loc,
                CheckError::UnknownManaged {
                    name: managed.name.clone(),
                },
            );
            return;
        };
        let reciprocal = target
            .manager
            .as_deref()
            .is_some_and(|mgr| refers_to(mgr, &own.name));
        if !reciprocal {
            self.diags.error(
                &managed.loc,
                CheckError::ManagerMismatch {
                    managed: target.name.to_string(),
                    protocol: own.name.to_string(),
                },
            );
            return;
        }
        if !self.managed.contains(&target.name) {
            self.managed.push(target.name.clone());
        }
    }

    fn visit_message_decl(&mut self, md: &'a MessageDecl) {
        let protocol = self.protocol_name();
        let semantics = self.protocol().semantics_of(md);
        self.decls.insert(
            DeclKey::message(&md.name),
            Decl::new(
                md.loc.clone(),
                md.name.clone(),
                md.name.clone(),
                format!("{protocol}::{}", md.name),
                DeclType::Message {
                    semantics,
                    direction: md.direction,
                },
                Some(protocol),
            ),
        );
        if !semantics.has_reply() && !md.out_params.is_empty() {
            self.diags.error(
                &md.loc,
                CheckError::ReturnsWithoutReply {
                    name: md.name.clone(),
                    semantics,
                },
            );
        }
        self.current_message = Some(md);
        walk_message_decl(self, md);
        self.current_message = None;
    }

    fn visit_param(&mut self, param: &'a Param) {
        let Some(ty) = self.resolve_type(&param.type_spec) else {
            return;
        };
        let Some(md) = self.current_message else {
            return;
        };
        let scope = format!("{}::{}", self.protocol_name(), md.name);
        self.decls.insert(
            DeclKey::param(&md.name, &param.name),
            Decl::new(
                param.loc.clone(),
                param.name.clone(),
                param.name.clone(),
                format!("{scope}::{}", param.name),
                DeclType::Param(ty),
                Some(scope),
            ),
        );
    }

    fn visit_transition_stmt(&mut self, ts: &'a TransitionStmt) {
        let protocol = self.protocol_name();
        let start = self.protocol().start_state() == Some(&ts.state);
        self.decls.insert(
            DeclKey::state(&ts.state.name),
            Decl::new(
                ts.state.loc.clone(),
                ts.state.name.clone(),
                ts.state.name.clone(),
                format!("{protocol}::{}", ts.state.name),
                DeclType::State { start },
                Some(protocol),
            ),
        );
        let naming = &self.config.naming;
        let reserved = [
            &naming.stateless_state,
            &naming.dead_state,
            &naming.error_state,
        ];
        if reserved.contains(&&ts.state.name) {
            self.diags.error(
                &ts.state.loc,
                CheckError::ReservedState {
                    name: ts.state.name.clone(),
                },
            );
        }
        self.current_state = Some(&ts.state);
        walk_transition_stmt(self, ts);
        self.current_state = None;
    }

    fn visit_transition(&mut self, t: &'a Transition) {
        self.check_fired_message(t);
        if let Some(from) = self.current_state {
            let triple = (from.name.clone(), t.trigger, t.message.clone());
            if !self.triples.insert(triple) {
                self.diags.error(
                    &t.loc,
                    CheckError::NondeterministicTransition {
                        state: from.name.clone(),
                        trigger: t.trigger,
                        message: t.message.clone(),
                    },
                );
            }
        }
        walk_transition(self, t);
    }

    fn visit_state(&mut self, state: &'a State) {
        if !self.scope.own.has_state(&state.name) {
            let protocol = self.protocol_name();
            self.diags.error(
                &state.loc,
                CheckError::UnknownState {
                    name: state.name.clone(),
                    protocol,
                },
            );
        }
    }
}
