//! Resolution and well-formedness checking.
//!
//! [`check`] walks every translation unit of a [`Program`], resolves the names it
//! references and accumulates every violation as a [`Diagnostic`] instead of
//! stopping at the first one. What it learns is returned beside the tree in
//! per-unit [`DeclTable`]s; the tree itself is never touched.

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

use std::fmt;

use indexmap::IndexMap;
use static_assertions::assert_impl_all;
use tracing::{debug, info, instrument, warn};

use crate::ast::{Program, Protocol, QualifiedId, State, TranslationUnit};
use crate::common::CompilerConfig;

use self::resolver::{Resolution, Resolver, Scope};

// --- Public Re-exports ---
pub use builtin::{is_builtin, BUILTIN_TYPES};
pub use decl::{Decl, DeclKey, DeclTable, DeclType, ParamType};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::{CheckError, CheckWarning};
pub use include_graph::IncludeGraph;
pub use symbols::{refers_to, ProtocolSymbols};

// --- Submodules ---

/// Defines the builtin native type list.
mod builtin;
/// Defines the [`DeclTable`] side table.
mod decl;
/// Defines [`Diagnostic`] and its sink.
mod diagnostics;
/// Defines [`CheckError`] and [`CheckWarning`].
mod errors;
/// Defines [`IncludeGraph`].
mod include_graph;
/// Defines the per-unit resolver pass.
mod resolver;
/// Defines [`ProtocolSymbols`].
mod symbols;

/// Why a unit did not pass the check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The unit itself produced errors.
    Errors,
    /// The unit lies on an include cycle.
    Cycle,
    /// A unit it includes failed.
    DependencyFailed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Errors => write!(f, "has errors"),
            FailureReason::Cycle => write!(f, "lies on an include cycle"),
            FailureReason::DependencyFailed(file) => write!(f, "depends on failed `{file}`"),
        }
    }
}

/// A unit that passed the check, with everything the lowering engine needs.
#[derive(Debug, Clone)]
pub struct CheckedUnit<'a> {
    /// The checked unit.
    pub unit: &'a TranslationUnit,
    /// Its protocol's symbols.
    pub symbols: ProtocolSymbols,
    /// Resolved facts about its named entities.
    pub decls: DeclTable,
    /// Resolved manager.
    pub manager: Option<QualifiedId>,
    /// Resolved managed protocols, in declaration order.
    pub managed: Vec<QualifiedId>,
}

impl<'a> CheckedUnit<'a> {
    /// The unit's protocol.
    pub fn protocol(&self) -> &'a Protocol {
        &self.unit.protocol
    }

    /// The unit's file name.
    pub fn file(&self) -> &'a str {
        &self.unit.filename
    }

    /// The implicit start state, `None` when stateless.
    pub fn start_state(&self) -> Option<&'a State> {
        self.unit.protocol.start_state()
    }
}

assert_impl_all!(CheckedUnit<'static>: Send, Sync);

/// Result of checking a [`Program`].
#[derive(Debug, Clone)]
pub struct CheckOutcome<'a> {
    diagnostics: Diagnostics,
    order: Vec<String>,
    failed: IndexMap<String, FailureReason>,
    units: IndexMap<String, CheckedUnit<'a>>,
}

impl<'a> CheckOutcome<'a> {
    /// `true` when no unit failed and no error was reported.
    pub fn ok(&self) -> bool {
        self.failed.is_empty() && !self.diagnostics.has_errors()
    }

    /// Every diagnostic, units in program order, then discovery order.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Every file, included files before their includers.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Failed files and why, in program order.
    pub fn failed(&self) -> &IndexMap<String, FailureReason> {
        &self.failed
    }

    /// Returns `true` if `file` failed.
    pub fn is_failed(&self, file: &str) -> bool {
        self.failed.contains_key(file)
    }

    /// The checked facts of a unit that passed.
    pub fn unit(&self, file: &str) -> Option<&CheckedUnit<'a>> {
        self.units.get(file)
    }

    /// Units that passed, in dependency order.
    pub fn checked_units(&self) -> impl Iterator<Item = &CheckedUnit<'a>> {
        self.units.values()
    }

    /// Splits the outcome into its diagnostics and checked units.
    pub fn into_parts(
        self,
    ) -> (
        Diagnostics,
        IndexMap<String, FailureReason>,
        IndexMap<String, CheckedUnit<'a>>,
    ) {
        (self.diagnostics, self.failed, self.units)
    }
}

/// Checks every unit of `program`.
///
/// Never stops at the first problem: every rule violation found is reported,
/// units in program order. A unit that fails, lies on an include cycle or
/// includes a failed unit is listed in [`CheckOutcome::failed`] and yields no
/// [`CheckedUnit`]; unrelated units are unaffected.
#[instrument(skip(program, config), fields(units = program.len()), level = "debug")]
pub fn check<'a>(program: &'a Program, config: &CompilerConfig) -> CheckOutcome<'a> {
    let promote = config.diagnostics.warnings_as_errors;
    let graph = IncludeGraph::build(program);
    let mut per_unit: IndexMap<String, Diagnostics> = program
        .units()
        .map(|u| (u.filename.clone(), Diagnostics::new(promote)))
        .collect();
    let mut failed: IndexMap<String, FailureReason> = IndexMap::new();

    for cycle in graph.cycles() {
        let (Some(first), Some(next)) = (cycle.first(), cycle.get(1)) else {
            continue;
        };
        let Some(unit) = program.unit(first) else {
            continue;
        };
        let loc = unit
            .protocol_includes
            .iter()
            .find(|inc| &inc.file == next)
            .map_or(&unit.loc, |inc| &inc.loc);
        warn!(cycle = %cycle.join(" -> "), "include cycle");
        if let Some(diags) = per_unit.get_mut(first) {
            diags.error(
                loc,
                CheckError::IncludeCycle {
                    files: cycle.clone(),
                },
            );
        }
        for file in cycle {
            failed.entry(file.clone()).or_insert(FailureReason::Cycle);
        }
    }
    propagate_failures(&graph, &mut failed);

    let mut scratch = Diagnostics::new(promote);
    let mut symbols: IndexMap<String, ProtocolSymbols> = IndexMap::new();
    for unit in program.units() {
        let sink = match per_unit.get_mut(&unit.filename) {
            Some(diags) if !failed.contains_key(&unit.filename) => diags,
            _ => &mut scratch,
        };
        symbols.insert(unit.filename.clone(), ProtocolSymbols::collect(unit, sink));
    }

    let mut declared: IndexMap<String, &str> = IndexMap::new();
    for unit in program.units() {
        if failed.contains_key(&unit.filename) {
            continue;
        }
        let Some(own) = symbols.get(&unit.filename) else {
            continue;
        };
        let name = own.name.to_string();
        match declared.get(&name) {
            Some(previous) => {
                if let Some(diags) = per_unit.get_mut(&unit.filename) {
                    diags.error(
                        &unit.protocol.loc,
                        CheckError::DuplicateProtocol {
                            name,
                            previous: (*previous).to_string(),
                        },
                    );
                }
            }
            None => {
                declared.insert(name, unit.filename.as_str());
            }
        }
    }

    let mut resolutions: IndexMap<String, Resolution> = IndexMap::new();
    for unit in program.units() {
        let file = unit.filename.as_str();
        if failed.contains_key(file) {
            continue;
        }
        let (Some(own), Some(diags)) = (symbols.get(file), per_unit.get_mut(file)) else {
            continue;
        };
        let scope = Scope {
            own,
            included: graph.includes(file).filter_map(|f| symbols.get(f)).collect(),
            includers: graph.includers(file).filter_map(|f| symbols.get(f)).collect(),
        };
        let resolution = Resolver::run(unit, program, scope, config, diags);
        resolutions.insert(file.to_string(), resolution);
    }

    for (file, diags) in &per_unit {
        if diags.has_errors() {
            failed.entry(file.clone()).or_insert(FailureReason::Errors);
        }
    }
    propagate_failures(&graph, &mut failed);

    let mut diagnostics = Diagnostics::new(promote);
    for (_, diags) in per_unit {
        diagnostics.append(diags);
    }

    let mut units = IndexMap::new();
    for file in graph.order() {
        if failed.contains_key(file) {
            continue;
        }
        let (Some(unit), Some(own), Some(resolution)) = (
            program.unit(file),
            symbols.swap_remove(file),
            resolutions.swap_remove(file),
        ) else {
            continue;
        };
        units.insert(
            file.clone(),
            CheckedUnit {
                unit,
                symbols: own,
                decls: resolution.decls,
                manager: resolution.manager,
                managed: resolution.managed,
            },
        );
    }

    let failed: IndexMap<String, FailureReason> = program
        .units()
        .filter_map(|u| {
            failed
                .get(&u.filename)
                .map(|reason| (u.filename.clone(), reason.clone()))
        })
        .collect();
    for (file, reason) in &failed {
        debug!(file = %file, reason = %reason, "unit failed");
    }
    info!(
        units = program.len(),
        passed = units.len(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "checked program"
    );

    CheckOutcome {
        diagnostics,
        order: graph.order().to_vec(),
        failed,
        units,
    }
}

/// Marks every unit that includes a failed unit, walking dependencies first.
fn propagate_failures(graph: &IncludeGraph, failed: &mut IndexMap<String, FailureReason>) {
    for file in graph.order() {
        if failed.contains_key(file) {
            continue;
        }
        let dependency = graph
            .includes(file)
            .find(|dep| failed.contains_key(*dep))
            .map(str::to_string);
        if let Some(dependency) = dependency {
            failed.insert(file.clone(), FailureReason::DependencyFailed(dependency));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Direction, Loc, MessageDecl, Param, ProtocolInclude, QualifiedId, State, Transition,
        TransitionStmt, Trigger, TypeSpec, UsingStmt,
    };

    fn loc(line: u32) -> Loc {
        Loc::new("PTest.ipdl", line)
    }

    fn single(protocol: Protocol) -> Program {
        Program::new().with_unit(TranslationUnit::new("PTest.ipdl", protocol))
    }

    fn messages(outcome: &CheckOutcome<'_>) -> Vec<String> {
        outcome
            .diagnostics()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn stateless_protocol_passes() {
        let mut protocol = Protocol::new(loc(1), "PTest");
        protocol.add_messages([MessageDecl::new(loc(2), "Ping", Direction::InOut)]);
        let program = single(protocol);
        let outcome = check(&program, &CompilerConfig::default());
        assert!(outcome.ok(), "{:?}", messages(&outcome));
        assert!(outcome.diagnostics().is_empty());
        assert!(outcome.unit("PTest.ipdl").is_some());
    }

    #[test]
    fn unknown_state_and_message_accumulate() {
        let mut protocol = Protocol::new(loc(1), "PTest");
        protocol.add_messages([MessageDecl::new(loc(2), "Open", Direction::Out)]);
        protocol.add_transition_stmts([TransitionStmt::new(
            loc(3),
            State::new(loc(3), "START"),
            vec![
                Transition::new(loc(4), Trigger::Send, "Open", State::new(loc(4), "NOWHERE")),
                Transition::new(loc(5), Trigger::Send, "Shut", State::new(loc(5), "START")),
            ],
        )]);
        let program = single(protocol);
        let outcome = check(&program, &CompilerConfig::default());
        assert!(!outcome.ok());
        let lines: Vec<u32> = outcome
            .diagnostics()
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.line)
            .collect();
        assert_eq!(lines, vec![4, 5]);
        assert_eq!(outcome.failed().get("PTest.ipdl"), Some(&FailureReason::Errors));
        assert!(outcome.unit("PTest.ipdl").is_none());
    }

    #[test]
    fn using_statements_introduce_types() {
        let shmem = QualifiedId::parse(loc(1), "mozilla::ipc::SharedThing");
        let mut protocol = Protocol::new(loc(2), "PTest");
        protocol.add_messages([MessageDecl::new(loc(3), "Give", Direction::Out)
            .with_in_param(Param::new(
                loc(3),
                TypeSpec::native(loc(3), QualifiedId::new(loc(3), "SharedThing")),
                "thing",
            ))
            .with_in_param(Param::new(
                loc(3),
                TypeSpec::native(loc(3), QualifiedId::new(loc(3), "Mystery")),
                "other",
            ))]);
        let mut unit = TranslationUnit::new("PTest.ipdl", protocol);
        unit.add_using_stmt(UsingStmt::new(loc(1), TypeSpec::native(loc(1), shmem)));
        let program = Program::new().with_unit(unit);

        let outcome = check(&program, &CompilerConfig::default());
        assert_eq!(
            messages(&outcome),
            vec!["type `Mystery` is neither builtin nor brought in by a `using` statement"]
        );
    }

    #[test]
    fn missing_include_is_an_error() {
        let mut unit = TranslationUnit::new("PTest.ipdl", Protocol::new(loc(1), "PTest"));
        unit.add_protocol_include(ProtocolInclude::new(loc(1), "PGone.ipdl"));
        let program = Program::new().with_unit(unit);
        let outcome = check(&program, &CompilerConfig::default());
        assert_eq!(
            messages(&outcome),
            vec!["can't locate included protocol file `PGone.ipdl`"]
        );
    }
}
