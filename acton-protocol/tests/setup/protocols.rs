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

#![allow(unused)]

use acton_protocol::prelude::*;

pub fn loc(file: &str, line: u32) -> Loc {
    Loc::new(file, line)
}

fn native(file: &str, line: u32, name: &str) -> TypeSpec {
    TypeSpec::native(loc(file, line), QualifiedId::parse(loc(file, line), name))
}

/// `P`: states `START` and `OPEN`, one `out` message `Open`, one transition
/// `START: send Open goto OPEN`.
pub fn p_open() -> Program {
    let f = "P.ipdl";
    let mut p = Protocol::new(loc(f, 1), "P");
    p.add_messages([MessageDecl::new(loc(f, 2), "Open", Direction::Out)]);
    p.add_transition_stmts([
        TransitionStmt::new(
            loc(f, 4),
            State::new(loc(f, 4), "START"),
            vec![Transition::new(
                loc(f, 5),
                Trigger::Send,
                "Open",
                State::new(loc(f, 5), "OPEN"),
            )],
        ),
        TransitionStmt::new(loc(f, 6), State::new(loc(f, 6), "OPEN"), vec![]),
    ]);
    Program::new().with_unit(TranslationUnit::new(f, p))
}

/// `M` manages `C`; `M.ipdl` includes `C.ipdl`.
pub fn manager_and_managed() -> Program {
    let mut m = Protocol::new(loc("M.ipdl", 2), "M");
    m.add_manages([ManagesStmt::new(loc("M.ipdl", 3), "C")]);
    m.add_messages([MessageDecl::new(loc("M.ipdl", 4), "Spawned", Direction::In)]);
    let mut m_unit = TranslationUnit::new("M.ipdl", m);
    m_unit.add_protocol_include(ProtocolInclude::new(loc("M.ipdl", 1), "C.ipdl"));

    let mut c = Protocol::new(loc("C.ipdl", 1), "C");
    c.set_manager(ManagerStmt::new(loc("C.ipdl", 2), "M"));
    c.add_messages([MessageDecl::new(loc("C.ipdl", 3), "Work", Direction::Out)]);
    let c_unit = TranslationUnit::new("C.ipdl", c);

    Program::new().with_unit(m_unit).with_unit(c_unit)
}

fn in_mozilla_dom(protocol: &mut Protocol, file: &str) {
    protocol.add_outer_namespace(Namespace::new(loc(file, 1), "dom"));
    protocol.add_outer_namespace(Namespace::new(loc(file, 1), "mozilla"));
}

/// `mozilla::dom::PTab`, managed by `PBrowser`.
///
/// ```text
/// out async Navigate(nsCString url);
/// in async Loaded();
/// in sync GetTitle() returns (nsString title);
/// inout rpc Ping();
///
/// state LIVE:
///     send Navigate goto LOADING;
///     recv GetTitle goto LIVE;
///     call Ping goto LIVE;
///     answer Ping goto LIVE;
/// state LOADING:
///     recv Loaded goto LIVE;
/// ```
pub fn tab_unit() -> TranslationUnit {
    let f = "PTab.ipdl";
    let mut tab = Protocol::new(loc(f, 3), "PTab");
    in_mozilla_dom(&mut tab, f);
    tab.set_manager(ManagerStmt::new(loc(f, 4), "PBrowser"));
    tab.add_messages([
        MessageDecl::new(loc(f, 6), "Navigate", Direction::Out)
            .with_in_param(Param::new(loc(f, 6), native(f, 6, "nsCString"), "url")),
        MessageDecl::new(loc(f, 7), "Loaded", Direction::In),
        MessageDecl::new(loc(f, 8), "GetTitle", Direction::In)
            .with_semantics(SendSemantics::Sync)
            .with_out_param(Param::new(loc(f, 8), native(f, 8, "nsString"), "title")),
        MessageDecl::new(loc(f, 9), "Ping", Direction::InOut).with_semantics(SendSemantics::Rpc),
    ]);
    let state = |line, name| State::new(loc(f, line), name);
    tab.add_transition_stmts([
        TransitionStmt::new(
            loc(f, 11),
            state(11, "LIVE"),
            vec![
                Transition::new(loc(f, 12), Trigger::Send, "Navigate", state(12, "LOADING")),
                Transition::new(loc(f, 13), Trigger::Recv, "GetTitle", state(13, "LIVE")),
                Transition::new(loc(f, 14), Trigger::Call, "Ping", state(14, "LIVE")),
                Transition::new(loc(f, 15), Trigger::Answer, "Ping", state(15, "LIVE")),
            ],
        ),
        TransitionStmt::new(
            loc(f, 16),
            state(16, "LOADING"),
            vec![Transition::new(loc(f, 17), Trigger::Recv, "Loaded", state(17, "LIVE"))],
        ),
    ]);
    TranslationUnit::new(f, tab)
}

/// `mozilla::dom::PBrowser`, stateless, managing `PTab`.
///
/// ```text
/// include protocol "PTab.ipdl";
/// using mozilla::gfx::Rect;
///
/// out async Resize(Rect bounds);
/// in async TabOpened(PTab:LIVE tab);
/// ```
pub fn browser_unit() -> TranslationUnit {
    let f = "PBrowser.ipdl";
    let mut browser = Protocol::new(loc(f, 5), "PBrowser");
    in_mozilla_dom(&mut browser, f);
    browser.add_manages([ManagesStmt::new(loc(f, 6), "PTab")]);
    browser.add_messages([
        MessageDecl::new(loc(f, 8), "Resize", Direction::Out)
            .with_in_param(Param::new(loc(f, 8), native(f, 8, "Rect"), "bounds")),
        MessageDecl::new(loc(f, 9), "TabOpened", Direction::In).with_in_param(Param::new(
            loc(f, 9),
            TypeSpec::actor(
                loc(f, 9),
                QualifiedId::new(loc(f, 9), "PTab"),
                State::new(loc(f, 9), "LIVE"),
            ),
            "tab",
        )),
    ]);
    let mut unit = TranslationUnit::new(f, browser);
    unit.add_protocol_include(ProtocolInclude::new(loc(f, 1), "PTab.ipdl"));
    unit.add_using_stmt(UsingStmt::new(loc(f, 2), native(f, 2, "mozilla::gfx::Rect")));
    unit
}

/// The browser and its tabs, the including unit first.
pub fn browser() -> Program {
    Program::new()
        .with_unit(browser_unit())
        .with_unit(tab_unit())
}

pub fn compile(program: &Program) -> CompileOutput {
    ProtocolCompiler::new(CompilerConfig::default()).compile(program)
}

/// Compiles `program` and returns the protocol lowered from `file`.
pub fn lowered(program: &Program, file: &str) -> anyhow::Result<LoweredProtocol> {
    let output = compile(program);
    let diagnostics: Vec<String> = output.diagnostics.iter().map(ToString::to_string).collect();
    output
        .protocol(file)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("`{file}` was not lowered: {diagnostics:?}"))
}
