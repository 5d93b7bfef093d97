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

use indexmap::IndexMap;
use tracing::trace;

use crate::ast::{
    Loc, ManagerStmt, ManagesStmt, MessageDecl, QualifiedId, TransitionStmt, TranslationUnit,
    Visitor,
};
use crate::check::{CheckError, Diagnostics};

/// Returns `true` if the name as written in source refers to `qualified`.
///
/// A simple name matches on the base alone; a qualified one must match a suffix
/// of the qualifier list (`ipc::PFoo` names `mozilla::ipc::PFoo`).
pub fn refers_to(written: &str, qualified: &QualifiedId) -> bool {
    let id = QualifiedId::parse(Loc::none(), written);
    id.base == qualified.base && qualified.quals.ends_with(&id.quals)
}

/// The names one protocol declares, first declaration wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSymbols {
    /// File declaring the protocol.
    pub file: String,
    /// Fully qualified protocol name.
    pub name: QualifiedId,
    /// Manager name as written.
    pub manager: Option<String>,
    /// Managed names as written.
    pub managed: IndexMap<String, Loc>,
    /// Declared messages.
    pub messages: IndexMap<String, Loc>,
    /// Declared states.
    pub states: IndexMap<String, Loc>,
}

impl ProtocolSymbols {
    /// Collects the symbols of `unit`'s protocol, reporting duplicates into `diags`.
    pub fn collect(unit: &TranslationUnit, diags: &mut Diagnostics) -> Self {
        let mut collector = SymbolCollector {
            symbols: ProtocolSymbols {
                file: unit.filename.clone(),
                name: unit.protocol.qualified_name(),
                manager: None,
                managed: IndexMap::new(),
                messages: IndexMap::new(),
                states: IndexMap::new(),
            },
            diags,
        };
        collector.visit_protocol(&unit.protocol);
        let symbols = collector.symbols;
        trace!(
            protocol = %symbols.name,
            messages = symbols.messages.len(),
            states = symbols.states.len(),
            "collected symbols"
        );
        symbols
    }

    /// Returns `true` if `written` names this protocol.
    pub fn is_named(&self, written: &str) -> bool {
        refers_to(written, &self.name)
    }

    /// Returns `true` if this protocol lists `protocol` among its managed names.
    pub fn manages(&self, protocol: &QualifiedId) -> bool {
        self.managed.keys().any(|m| refers_to(m, protocol))
    }

    /// Returns `true` if this protocol declares `name` as a state.
    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Returns `true` if this protocol declares `name` as a message.
    pub fn has_message(&self, name: &str) -> bool {
        self.messages.contains_key(name)
    }
}

struct SymbolCollector<'d> {
    symbols: ProtocolSymbols,
    diags: &'d mut Diagnostics,
}

impl<'a> Visitor<'a> for SymbolCollector<'_> {
    fn visit_manager_stmt(&mut self, mgr: &'a ManagerStmt) {
        self.symbols.manager = Some(mgr.name.clone());
    }

    fn visit_manages_stmt(&mut self, managed: &'a ManagesStmt) {
        if refers_to(&managed.name, &self.symbols.name) {
            self.diags.error(
                &managed.loc,
                CheckError::SelfManaged {
                    name: managed.name.clone(),
                },
            );
            return;
        }
        if self.symbols.managed.contains_key(&managed.name) {
            self.diags.error(
                &managed.loc,
                CheckError::DuplicateManaged {
                    name: managed.name.clone(),
                    protocol: self.symbols.name.to_string(),
                },
            );
            return;
        }
        self.symbols
            .managed
            .insert(managed.name.clone(), managed.loc.clone());
    }

    fn visit_message_decl(&mut self, md: &'a MessageDecl) {
        if self.symbols.messages.contains_key(&md.name) {
            self.diags.error(
                &md.loc,
                CheckError::DuplicateMessage {
                    name: md.name.clone(),
                    protocol: self.symbols.name.to_string(),
                },
            );
        } else {
            self.symbols.messages.insert(md.name.clone(), md.loc.clone());
        }
    }

    fn visit_transition_stmt(&mut self, ts: &'a TransitionStmt) {
        let state = &ts.state;
        if self.symbols.states.contains_key(&state.name) {
            self.diags.error(
                &state.loc,
                CheckError::DuplicateState {
                    name: state.name.clone(),
                    protocol: self.symbols.name.to_string(),
                },
            );
        } else {
            self.symbols
                .states
                .insert(state.name.clone(), state.loc.clone());
        }
    }
}
