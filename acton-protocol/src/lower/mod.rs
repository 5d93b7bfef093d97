//! Lowering of a checked protocol into one [`ClassIr`] per role.
//!
//! Each class gets a current-state field starting in the implicit start state,
//! one stub per message direction it takes part in, and a guard on every stub
//! that looks up `(current state, trigger, message)` in the role's transition
//! table. Managing and managed protocols additionally get their lifetime members.

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

use tracing::{debug, instrument, trace};

use crate::check::CheckedUnit;
use crate::common::CompilerConfig;
use crate::ir::{
    ClassIr, FieldIr, FieldKind, LoweredProtocol, MessageIds, Role, StateEnumIr, TransitionIr,
};

use self::stubs::StubContext;

// --- Public Re-exports ---
pub use errors::LowerError;

// --- Submodules ---

/// Defines [`LowerError`].
mod errors;
/// State enumeration, role tables and guards.
mod state_machine;
/// Message stubs and lifetime members.
mod stubs;

/// Lowers one checked protocol.
///
/// Every protocol this one includes or manages must already have been lowered;
/// [`CheckOutcome::checked_units`](crate::check::CheckOutcome::checked_units)
/// yields units in that order.
///
/// # Errors
///
/// Returns a [`LowerError`] when the input breaks an invariant the checker
/// guarantees. That is a compiler defect, never a user diagnostic.
#[instrument(skip(unit, config), fields(protocol = %unit.symbols.name), level = "debug")]
pub fn lower(unit: &CheckedUnit<'_>, config: &CompilerConfig) -> Result<LoweredProtocol, LowerError> {
    let protocol = unit.protocol();
    let naming = &config.naming;

    let states = state_machine::build_states(protocol, naming)?;
    let ids = MessageIds::assign(
        protocol
            .messages
            .iter()
            .map(|md| (md.name.as_str(), protocol.semantics_of(md).has_reply())),
    );
    let declared = if protocol.is_stateless() {
        None
    } else {
        Some(state_machine::declared_table(protocol, &states)?)
    };

    let parent = lower_class(unit, Role::Parent, config, &states, &ids, declared.as_deref())?;
    let child = lower_class(unit, Role::Child, config, &states, &ids, declared.as_deref())?;
    debug!(
        start = %states.start,
        messages = ids.len(),
        "lowered protocol"
    );

    Ok(LoweredProtocol {
        protocol: unit.symbols.name.to_string(),
        file: unit.file().to_string(),
        message_ids: ids,
        states,
        classes: [parent, child],
    })
}

fn lower_class(
    unit: &CheckedUnit<'_>,
    role: Role,
    config: &CompilerConfig,
    states: &StateEnumIr,
    ids: &MessageIds,
    declared: Option<&[TransitionIr]>,
) -> Result<ClassIr, LowerError> {
    let protocol = unit.protocol();
    let context = StubContext {
        unit,
        role,
        naming: &config.naming,
        ids,
    };

    let mut methods = context.message_stubs()?;
    let transitions = match declared {
        Some(parent_view) => state_machine::role_table(parent_view, role),
        None => state_machine::stateless_table(&states.start, &methods),
    };
    for method in &mut methods {
        if let (Some(trigger), Some(message)) = (method.trigger(), method.message.as_deref()) {
            let guard = state_machine::guard_for(&transitions, trigger, message);
            trace!(method = %method.name, edges = guard.edges.len(), "guarded stub");
            method.guard = Some(guard);
        }
    }

    let mut fields = vec![FieldIr::new(
        "state".to_string(),
        FieldKind::CurrentState,
        "State".to_string(),
        true,
        Some(states.start.clone()),
    )];
    let (lifetime_fields, lifetime_methods) = context.lifetime_members();
    fields.extend(lifetime_fields);
    methods.extend(lifetime_methods);

    let class = ClassIr {
        name: format!("{}{}", protocol.name, role.suffix(&config.naming)),
        protocol: unit.symbols.name.to_string(),
        namespaces: protocol.namespaces.iter().map(|ns| ns.name.clone()).collect(),
        role,
        fields,
        states: states.clone(),
        transitions,
        methods,
    };
    debug!(class = %class.name, methods = class.methods.len(), "lowered class");
    Ok(class)
}
