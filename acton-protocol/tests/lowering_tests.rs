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

use acton_protocol::ir::{FieldKind, MethodKind, TypeIr};
use acton_protocol::prelude::*;

use crate::setup::initialize_tracing;
use crate::setup::protocols::{browser, compile, lowered, p_open};

mod setup;

fn method<'c>(class: &'c ClassIr, name: &str) -> anyhow::Result<&'c MethodIr> {
    class
        .method(name)
        .ok_or_else(|| anyhow::anyhow!("`{}` has no method `{name}`", class.name))
}

#[test]
fn test_one_class_per_role() -> anyhow::Result<()> {
    initialize_tracing();
    let output = compile(&browser());
    assert!(output.ok());
    assert_eq!(output.lowered.len(), 2);
    for protocol in &output.lowered {
        assert_eq!(protocol.parent().role, Role::Parent);
        assert_eq!(protocol.child().role, Role::Child);
    }
    let names: Vec<String> = output
        .lowered
        .iter()
        .flat_map(|p| p.classes.iter().map(ClassIr::qualified_name))
        .collect();
    assert_eq!(
        names,
        vec![
            "mozilla::dom::PTabParent",
            "mozilla::dom::PTabChild",
            "mozilla::dom::PBrowserParent",
            "mozilla::dom::PBrowserChild",
        ]
    );
    Ok(())
}

#[test]
fn test_every_message_gets_a_stub_pair() -> anyhow::Result<()> {
    initialize_tracing();
    let tab = lowered(&browser(), "PTab.ipdl")?;
    for name in ["Navigate", "Loaded", "GetTitle", "Ping"] {
        let senders = tab
            .classes
            .iter()
            .flat_map(|c| c.stubs())
            .filter(|m| m.message.as_deref() == Some(name) && !m.is_virtual)
            .count();
        let handlers = tab
            .classes
            .iter()
            .flat_map(|c| c.stubs())
            .filter(|m| m.message.as_deref() == Some(name) && m.is_virtual)
            .count();
        // `inout` messages can travel both ways, so each role gets both halves.
        let expected = if name == "Ping" { 2 } else { 1 };
        assert_eq!((senders, handlers), (expected, expected), "{name}");
    }

    let parent = tab.parent();
    let navigate = method(parent, "SendNavigate")?;
    assert_eq!(navigate.kind, MethodKind::Send);
    assert_eq!(navigate.params[0].ty, TypeIr::Native("nsCString".into()));

    let title = method(parent, "RecvGetTitle")?;
    assert!(title.is_virtual && title.blocking && !title.reentrant);
    assert_eq!(title.returns[0].name, "title");
    assert_eq!((title.id, title.reply_id), (Some(5), Some(6)));

    let ping = method(tab.child(), "CallPing")?;
    assert!(ping.blocking && ping.reentrant);
    Ok(())
}

#[test]
fn test_guards_mirror_between_roles() -> anyhow::Result<()> {
    initialize_tracing();
    let tab = lowered(&browser(), "PTab.ipdl")?;
    let sent = method(tab.parent(), "SendNavigate")?
        .guard
        .clone()
        .ok_or_else(|| anyhow::anyhow!("unguarded"))?;
    let received = method(tab.child(), "RecvNavigate")?
        .guard
        .clone()
        .ok_or_else(|| anyhow::anyhow!("unguarded"))?;
    assert_eq!(sent.trigger, Trigger::Send);
    assert_eq!(received.trigger, Trigger::Recv);
    assert_eq!(sent.edges, received.edges);
    assert_eq!(sent.target("LIVE"), Some("LOADING"));

    assert_eq!(tab.states.start, "LIVE");
    assert_eq!(tab.states.states, vec!["LIVE", "LOADING", "__Dead", "__Error"]);
    Ok(())
}

#[test]
fn test_manager_owns_managed_actors() -> anyhow::Result<()> {
    initialize_tracing();
    let program = browser();
    let browser = lowered(&program, "PBrowser.ipdl")?;
    let parent = browser.parent();

    let collection = parent
        .field(FieldKind::ManagedActors)
        .ok_or_else(|| anyhow::anyhow!("no managed collection"))?;
    assert_eq!(collection.name, "managed_PTab");
    assert_eq!(collection.ty, "mozilla::dom::PTabParent");
    assert!(collection.owning);

    let construct = method(parent, "ConstructPTab")?;
    assert_eq!(construct.kind, MethodKind::Construct);
    assert_eq!(construct.managed.as_deref(), Some("mozilla::dom::PTabParent"));
    assert!(construct.guard.is_none());
    assert!(method(parent, "DestroyPTab")?.params.len() == 1);

    let opened = method(parent, "RecvTabOpened")?;
    assert_eq!(
        opened.params[0].ty,
        TypeIr::Actor {
            class: "mozilla::dom::PTabParent".into(),
            state: "LIVE".into(),
        }
    );

    let tab = lowered(&program, "PTab.ipdl")?;
    let back_ref = tab
        .child()
        .field(FieldKind::ManagerRef)
        .ok_or_else(|| anyhow::anyhow!("no manager field"))?;
    assert_eq!(back_ref.ty, "mozilla::dom::PBrowserChild");
    assert!(!back_ref.owning);
    assert!(tab.child().field(FieldKind::ManagedActors).is_none());
    Ok(())
}

#[test]
fn test_start_state_initialises_the_state_field() -> anyhow::Result<()> {
    initialize_tracing();
    let p = lowered(&p_open(), "P.ipdl")?;
    for class in &p.classes {
        let field = class
            .field(FieldKind::CurrentState)
            .ok_or_else(|| anyhow::anyhow!("no state field"))?;
        assert_eq!(field.init.as_deref(), Some("START"));
        assert_eq!(class.fields.len(), 1);
    }
    assert_eq!(p.parent().next_state("START", Trigger::Send, "Open"), Some("OPEN"));
    assert_eq!(p.child().next_state("START", Trigger::Recv, "Open"), Some("OPEN"));
    assert_eq!(p.parent().next_state("OPEN", Trigger::Send, "Open"), None);
    Ok(())
}

#[test]
fn test_message_ids_leave_room_for_replies() -> anyhow::Result<()> {
    initialize_tracing();
    let tab = lowered(&browser(), "PTab.ipdl")?;
    let ids: Vec<(&str, u32, Option<u32>)> = tab
        .message_ids
        .iter()
        .map(|(name, id)| (name, id.id, id.reply))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("Navigate", 1, None),
            ("Loaded", 3, None),
            ("GetTitle", 5, Some(6)),
            ("Ping", 7, Some(8)),
        ]
    );
    assert_eq!(tab.message_ids.message_for(5), Some("GetTitle"));
    assert_eq!(tab.message_ids.message_for(6), None);
    Ok(())
}
