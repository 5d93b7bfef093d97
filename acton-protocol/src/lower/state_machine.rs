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

//! State enumeration, per-role transition tables and stub guards.
//!
//! Declared transitions are written from the parent's point of view. The child
//! table is the same relation with every trigger mirrored, so a parent `send`
//! and the child `recv` of the same message move both ends along the same edge.

use crate::ast::{Protocol, Trigger};
use crate::common::NamingConfig;
use crate::ir::{GuardEdge, GuardIr, MethodIr, Role, StateEnumIr, TransitionIr};
use crate::lower::LowerError;

/// Enumerates the states of `protocol`: declared ones (or the single implicit
/// state of a stateless protocol), then the dead and error states.
pub(crate) fn build_states(
    protocol: &Protocol,
    naming: &NamingConfig,
) -> Result<StateEnumIr, LowerError> {
    let name = || protocol.qualified_name().to_string();
    let implicit = [
        &naming.stateless_state,
        &naming.dead_state,
        &naming.error_state,
    ];

    let (mut states, start) = if protocol.is_stateless() {
        (
            vec![naming.stateless_state.clone()],
            naming.stateless_state.clone(),
        )
    } else {
        let start = protocol
            .start_state()
            .ok_or_else(|| LowerError::MissingStartState { protocol: name() })?;
        let mut states: Vec<String> = Vec::new();
        for state in protocol.states() {
            if implicit.contains(&&state.name) {
                return Err(LowerError::StateClash {
                    protocol: name(),
                    state: state.name.clone(),
                });
            }
            if states.contains(&state.name) {
                return Err(LowerError::DuplicateState {
                    protocol: name(),
                    state: state.name.clone(),
                });
            }
            states.push(state.name.clone());
        }
        (states, start.name.clone())
    };
    states.push(naming.dead_state.clone());
    states.push(naming.error_state.clone());

    Ok(StateEnumIr::new(
        states,
        start,
        naming.dead_state.clone(),
        naming.error_state.clone(),
    ))
}

/// The declared transitions of a stateful protocol, validated against `states`.
pub(crate) fn declared_table(
    protocol: &Protocol,
    states: &StateEnumIr,
) -> Result<Vec<TransitionIr>, LowerError> {
    let name = || protocol.qualified_name().to_string();
    let mut table = Vec::new();
    for (from, t) in protocol.transitions() {
        if !states.contains(&t.to_state.name) || states.is_terminal(&t.to_state.name) {
            return Err(LowerError::UndeclaredState {
                protocol: name(),
                state: t.to_state.name.clone(),
            });
        }
        if protocol.message(&t.message).is_none() {
            return Err(LowerError::UndeclaredMessage {
                protocol: name(),
                message: t.message.clone(),
            });
        }
        table.push(TransitionIr::new(
            from.name.clone(),
            t.trigger,
            t.message.clone(),
            t.to_state.name.clone(),
        ));
    }
    Ok(table)
}

/// The table `role` sees, given the parent-view table.
pub(crate) fn role_table(parent_view: &[TransitionIr], role: Role) -> Vec<TransitionIr> {
    match role {
        Role::Parent => parent_view.to_vec(),
        Role::Child => parent_view
            .iter()
            .map(|t| TransitionIr::new(t.from.clone(), t.trigger.mirror(), t.message.clone(), t.to.clone()))
            .collect(),
    }
}

/// A stateless protocol allows every stub from its single state, staying there.
pub(crate) fn stateless_table(start: &str, stubs: &[MethodIr]) -> Vec<TransitionIr> {
    stubs
        .iter()
        .filter_map(|stub| Some((stub.trigger()?, stub.message.as_deref()?)))
        .map(|(trigger, message)| {
            TransitionIr::new(start.to_string(), trigger, message.to_string(), start.to_string())
        })
        .collect()
}

/// The guard of the stub firing `(trigger, message)`.
pub(crate) fn guard_for(table: &[TransitionIr], trigger: Trigger, message: &str) -> GuardIr {
    let edges = table
        .iter()
        .filter(|t| t.trigger == trigger && t.message == message)
        .map(|t| GuardEdge::new(t.from.clone(), t.to.clone()))
        .collect();
    GuardIr::new(trigger, message.to_string(), edges)
}
