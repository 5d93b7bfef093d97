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

use thiserror::Error;

use crate::ast::{Direction, SendSemantics, Trigger};

/// A violated resolution or well-formedness rule.
///
/// These are never returned as `Err`; the checker renders them into
/// [`Diagnostic`](crate::check::Diagnostic)s and keeps going.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("can't locate included protocol file `{file}`")]
    MissingInclude { file: String },

    #[error("protocol include cycle: {}", .files.join(" -> "))]
    IncludeCycle { files: Vec<String> },

    #[error("protocol `{name}` is already declared in `{previous}`")]
    DuplicateProtocol { name: String, previous: String },

    #[error("message `{name}` is already declared in protocol `{protocol}`")]
    DuplicateMessage { name: String, protocol: String },

    #[error("state `{name}` is already declared in protocol `{protocol}`")]
    DuplicateState { name: String, protocol: String },

    #[error("protocol `{name}` is already listed as managed by `{protocol}`")]
    DuplicateManaged { name: String, protocol: String },

    #[error("protocol `{name}` cannot manage itself")]
    SelfManaged { name: String },

    #[error("manager `{name}` is not a visible protocol")]
    UnknownManager { name: String },

    #[error("`{manager}` is declared as the manager of `{protocol}` but does not manage it")]
    ManagerDoesNotManage { manager: String, protocol: String },

    #[error("managed protocol `{name}` is not an included protocol")]
    UnknownManaged { name: String },

    #[error("`{protocol}` manages `{managed}`, which does not declare `{protocol}` as its manager")]
    ManagerMismatch { managed: String, protocol: String },

    #[error("`{semantics}` message `{name}` has no reply but declares reply values")]
    ReturnsWithoutReply { name: String, semantics: SendSemantics },

    #[error("state name `{name}` is reserved for an implicit state")]
    ReservedState { name: String },

    #[error("state `{name}` is not declared in protocol `{protocol}`")]
    UnknownState { name: String, protocol: String },

    #[error("actor type `{name}` does not name an included protocol")]
    UnknownActorType { name: String },

    #[error("actor state `{state}` is not declared in protocol `{protocol}`")]
    UnknownActorState { state: String, protocol: String },

    #[error("type `{name}` is neither builtin nor brought in by a `using` statement")]
    UnknownType { name: String },

    #[error("message `{name}` is not declared in protocol `{protocol}`")]
    UnknownMessage { name: String, protocol: String },

    #[error("`{trigger}` needs an `{expected}` or `inout` message, but `{message}` is declared `{direction}`")]
    TriggerDirection {
        trigger: Trigger,
        message: String,
        direction: Direction,
        expected: Direction,
    },

    #[error("`{trigger}` cannot fire `{message}`, which has `{semantics}` semantics")]
    TriggerSemantics {
        trigger: Trigger,
        message: String,
        semantics: SendSemantics,
    },

    #[error("state `{state}` already has a `{trigger} {message}` transition")]
    NondeterministicTransition {
        state: String,
        trigger: Trigger,
        message: String,
    },
}

/// A suspicious but legal construct.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CheckWarning {
    #[error("message `{name}` is never fired by any transition")]
    UnusedMessage { name: String },

    #[error("state `{name}` is unreachable from start state `{start}`")]
    UnreachableState { name: String, start: String },
}
