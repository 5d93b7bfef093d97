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

use acton_protocol::check::FailureReason;
use acton_protocol::prelude::*;

use crate::setup::initialize_tracing;
use crate::setup::protocols::{browser, loc, manager_and_managed, p_open};

mod setup;

fn messages(outcome: &CheckOutcome<'_>) -> Vec<String> {
    outcome
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn test_well_formed_programs_pass() -> anyhow::Result<()> {
    initialize_tracing();
    let config = CompilerConfig::default();
    for program in [p_open(), manager_and_managed(), browser()] {
        let outcome = check(&program, &config);
        assert!(outcome.ok(), "{:?}", messages(&outcome));
        assert!(outcome.diagnostics().is_empty(), "{:?}", messages(&outcome));
        assert_eq!(outcome.checked_units().count(), program.len());
    }
    Ok(())
}

#[test]
fn test_dependency_order_puts_included_units_first() -> anyhow::Result<()> {
    initialize_tracing();
    let program = browser();
    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(outcome.order(), ["PTab.ipdl", "PBrowser.ipdl"]);
    let files: Vec<&str> = outcome.checked_units().map(|u| u.file()).collect();
    assert_eq!(files, vec!["PTab.ipdl", "PBrowser.ipdl"]);
    Ok(())
}

#[test]
fn test_duplicate_message_is_cited() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = p_open();
    let mut unit = program
        .unit("P.ipdl")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("fixture lost its unit"))?;
    unit.protocol
        .add_messages([MessageDecl::new(loc("P.ipdl", 3), "Open", Direction::Out)]);
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert!(!outcome.ok());
    let rendered: Vec<String> = outcome.diagnostics().iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["P.ipdl:3: error: message `Open` is already declared in protocol `P`"]
    );
    Ok(())
}

#[test]
fn test_errors_accumulate_across_units() -> anyhow::Result<()> {
    initialize_tracing();
    let mut a = Protocol::new(loc("PA.ipdl", 1), "PA");
    a.add_messages([
        MessageDecl::new(loc("PA.ipdl", 2), "Go", Direction::Out),
        MessageDecl::new(loc("PA.ipdl", 3), "Back", Direction::In)
            .with_out_param(Param::new(
                loc("PA.ipdl", 3),
                TypeSpec::native(loc("PA.ipdl", 3), QualifiedId::new(loc("PA.ipdl", 3), "int")),
                "n",
            )),
    ]);
    a.add_transition_stmts([TransitionStmt::new(
        loc("PA.ipdl", 4),
        State::new(loc("PA.ipdl", 4), "S"),
        vec![
            Transition::new(loc("PA.ipdl", 5), Trigger::Recv, "Go", State::new(loc("PA.ipdl", 5), "S")),
            Transition::new(loc("PA.ipdl", 6), Trigger::Call, "Back", State::new(loc("PA.ipdl", 6), "S")),
        ],
    )]);
    let mut b = Protocol::new(loc("PB.ipdl", 1), "PB");
    b.add_manages([ManagesStmt::new(loc("PB.ipdl", 2), "PNowhere")]);
    let program = Program::new()
        .with_unit(TranslationUnit::new("PA.ipdl", a))
        .with_unit(TranslationUnit::new("PB.ipdl", b));

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        messages(&outcome),
        vec![
            "`async` message `Back` has no reply but declares reply values",
            "`recv` needs an `in` or `inout` message, but `Go` is declared `out`",
            "`call` needs an `out` or `inout` message, but `Back` is declared `in`",
            "`call` cannot fire `Back`, which has `async` semantics",
            "managed protocol `PNowhere` is not an included protocol",
        ]
    );
    assert_eq!(outcome.failed().len(), 2);
    Ok(())
}

#[test]
fn test_include_cycle_fails_only_its_members() -> anyhow::Result<()> {
    initialize_tracing();
    let mut a = TranslationUnit::new("PA.ipdl", Protocol::new(loc("PA.ipdl", 2), "PA"));
    a.add_protocol_include(ProtocolInclude::new(loc("PA.ipdl", 1), "PB.ipdl"));
    let mut b = TranslationUnit::new("PB.ipdl", Protocol::new(loc("PB.ipdl", 2), "PB"));
    b.add_protocol_include(ProtocolInclude::new(loc("PB.ipdl", 1), "PA.ipdl"));
    let program = Program::new()
        .with_unit(a)
        .with_unit(b)
        .with_unit(TranslationUnit::new("PC.ipdl", Protocol::new(loc("PC.ipdl", 1), "PC")));

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(outcome.failed().get("PA.ipdl"), Some(&FailureReason::Cycle));
    assert_eq!(outcome.failed().get("PB.ipdl"), Some(&FailureReason::Cycle));
    assert!(outcome.unit("PC.ipdl").is_some());
    let cycle_errors = messages(&outcome)
        .into_iter()
        .filter(|m| m.starts_with("protocol include cycle"))
        .count();
    assert_eq!(cycle_errors, 1);
    Ok(())
}

#[test]
fn test_managed_protocol_must_name_its_manager() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = manager_and_managed();
    let mut c = program
        .unit("C.ipdl")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("fixture lost its unit"))?;
    c.protocol.manager = None;
    program.add_unit(c);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        messages(&outcome),
        vec!["`M` manages `C`, which does not declare `M` as its manager"]
    );
    assert!(outcome.unit("C.ipdl").is_some());
    assert!(outcome.is_failed("M.ipdl"));
    Ok(())
}

#[test]
fn test_warnings_can_fail_the_check() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = p_open();
    let mut unit = program
        .unit("P.ipdl")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("fixture lost its unit"))?;
    unit.protocol
        .add_messages([MessageDecl::new(loc("P.ipdl", 3), "Close", Direction::Out)]);
    program.add_unit(unit);

    let lenient = check(&program, &CompilerConfig::default());
    assert!(lenient.ok());
    assert_eq!(lenient.diagnostics().warning_count(), 1);
    assert_eq!(
        messages(&lenient),
        vec!["message `Close` is never fired by any transition"]
    );

    let mut strict_config = CompilerConfig::default();
    strict_config.diagnostics.warnings_as_errors = true;
    let strict = check(&program, &strict_config);
    assert!(!strict.ok());
    assert_eq!(strict.diagnostics().error_count(), 1);
    Ok(())
}

#[test]
fn test_unreachable_state_warning_can_be_disabled() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = p_open();
    let mut unit = program
        .unit("P.ipdl")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("fixture lost its unit"))?;
    unit.protocol.add_transition_stmts([TransitionStmt::new(
        loc("P.ipdl", 7),
        State::new(loc("P.ipdl", 7), "LIMBO"),
        vec![Transition::new(
            loc("P.ipdl", 8),
            Trigger::Send,
            "Open",
            State::new(loc("P.ipdl", 8), "OPEN"),
        )],
    )]);
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        messages(&outcome),
        vec!["state `LIMBO` is unreachable from start state `START`"]
    );

    let mut quiet = CompilerConfig::default();
    quiet.diagnostics.warn_unreachable_states = false;
    assert!(check(&program, &quiet).diagnostics().is_empty());
    Ok(())
}

#[test]
fn test_reply_follows_semantics() {
    assert!(SendSemantics::Rpc.has_reply());
    assert!(SendSemantics::Sync.has_reply());
    assert!(!SendSemantics::Async.has_reply());
    assert!(SendSemantics::Rpc.is_reentrant());
}

fn rendered(outcome: &CheckOutcome<'_>) -> Vec<String> {
    outcome.diagnostics().iter().map(ToString::to_string).collect()
}

fn unit_of(program: &Program, file: &str) -> anyhow::Result<TranslationUnit> {
    program
        .unit(file)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("fixture lost `{file}`"))
}

#[test]
fn test_unknown_manager_is_cited() -> anyhow::Result<()> {
    initialize_tracing();
    let mut c = Protocol::new(loc("C.ipdl", 1), "C");
    c.set_manager(ManagerStmt::new(loc("C.ipdl", 2), "PGhost"));
    c.add_messages([MessageDecl::new(loc("C.ipdl", 3), "Work", Direction::Out)]);
    let program = Program::new().with_unit(TranslationUnit::new("C.ipdl", c));

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["C.ipdl:2: error: manager `PGhost` is not a visible protocol"]
    );
    assert!(outcome.is_failed("C.ipdl"));
    Ok(())
}

#[test]
fn test_manager_must_list_the_protocol() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = manager_and_managed();
    let mut m = unit_of(&program, "M.ipdl")?;
    m.protocol.manages.clear();
    program.add_unit(m);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["C.ipdl:2: error: `M` is declared as the manager of `C` but does not manage it"]
    );
    assert_eq!(
        outcome.failed().get("M.ipdl"),
        Some(&FailureReason::DependencyFailed("C.ipdl".into()))
    );
    Ok(())
}

#[test]
fn test_unknown_actor_type_is_cited() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = browser();
    let mut unit = unit_of(&program, "PBrowser.ipdl")?;
    let f = "PBrowser.ipdl";
    unit.protocol.messages[1].in_params[0].type_spec = TypeSpec::actor(
        loc(f, 9),
        QualifiedId::new(loc(f, 9), "PWindow"),
        State::new(loc(f, 9), "LIVE"),
    );
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["PBrowser.ipdl:9: error: actor type `PWindow` does not name an included protocol"]
    );
    assert!(outcome.unit("PTab.ipdl").is_some());
    Ok(())
}

#[test]
fn test_actor_state_must_exist_in_its_protocol() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = browser();
    let mut unit = unit_of(&program, "PBrowser.ipdl")?;
    let f = "PBrowser.ipdl";
    unit.protocol.messages[1].in_params[0].type_spec = TypeSpec::actor(
        loc(f, 9),
        QualifiedId::new(loc(f, 9), "PTab"),
        State::new(loc(f, 10), "CLOSED"),
    );
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec![
            "PBrowser.ipdl:10: error: actor state `CLOSED` is not declared in protocol `mozilla::dom::PTab`"
        ]
    );
    assert!(outcome.is_failed("PBrowser.ipdl"));
    Ok(())
}

#[test]
fn test_repeated_transition_is_nondeterministic() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = p_open();
    let mut unit = unit_of(&program, "P.ipdl")?;
    unit.protocol.transition_stmts[0].transitions.push(Transition::new(
        loc("P.ipdl", 7),
        Trigger::Send,
        "Open",
        State::new(loc("P.ipdl", 7), "OPEN"),
    ));
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["P.ipdl:7: error: state `START` already has a `send Open` transition"]
    );
    assert!(!outcome.ok());
    Ok(())
}

#[test]
fn test_implicit_state_names_are_reserved() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = p_open();
    let mut unit = unit_of(&program, "P.ipdl")?;
    unit.protocol.transition_stmts[0].transitions[0].to_state =
        State::new(loc("P.ipdl", 5), "__Error");
    unit.protocol.transition_stmts[1].state = State::new(loc("P.ipdl", 6), "__Error");
    program.add_unit(unit);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["P.ipdl:6: error: state name `__Error` is reserved for an implicit state"]
    );
    assert!(outcome.is_failed("P.ipdl"));
    Ok(())
}

#[test]
fn test_protocol_may_be_declared_once_per_program() -> anyhow::Result<()> {
    initialize_tracing();
    let mut again = Protocol::new(loc("P2.ipdl", 1), "P");
    again.add_messages([MessageDecl::new(loc("P2.ipdl", 2), "Open", Direction::Out)]);
    let program = p_open().with_unit(TranslationUnit::new("P2.ipdl", again));

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["P2.ipdl:1: error: protocol `P` is already declared in `P.ipdl`"]
    );
    assert!(outcome.unit("P.ipdl").is_some());
    assert!(outcome.is_failed("P2.ipdl"));
    Ok(())
}

#[test]
fn test_managed_protocol_is_listed_once() -> anyhow::Result<()> {
    initialize_tracing();
    let mut program = manager_and_managed();
    let mut m = unit_of(&program, "M.ipdl")?;
    m.protocol
        .add_manages([ManagesStmt::new(loc("M.ipdl", 5), "C")]);
    program.add_unit(m);

    let outcome = check(&program, &CompilerConfig::default());
    assert_eq!(
        rendered(&outcome),
        vec!["M.ipdl:5: error: protocol `C` is already listed as managed by `M`"]
    );
    assert!(outcome.unit("C.ipdl").is_some());
    assert!(outcome.is_failed("M.ipdl"));
    Ok(())
}
