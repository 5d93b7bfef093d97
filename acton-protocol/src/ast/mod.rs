//! The abstract syntax tree handed over by the front-end.
//!
//! Nodes are built once and are read-only afterwards; the checker records what it
//! learns in a side table instead of annotating them. [`visit`] provides the one
//! traversal mechanism every pass uses.

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

// --- Public Re-exports ---
pub use loc::Loc;
pub use program::Program;
pub use protocol::{
    ManagerStmt, ManagesStmt, MessageDecl, Namespace, Param, Protocol, State, Transition,
    TransitionStmt, TypeSpec,
};
pub use qualified_id::QualifiedId;
pub use semantics::{Direction, SendSemantics, Trigger};
pub use translation_unit::{CxxInclude, ProtocolInclude, TranslationUnit, UsingStmt};
pub use visit::{Node, Visitor};

// --- Submodules ---

/// Defines [`Loc`].
mod loc;
/// Defines [`Program`].
mod program;
/// Defines protocol-level nodes.
mod protocol;
/// Defines [`QualifiedId`].
mod qualified_id;
/// Defines the send-semantics, direction and trigger enumerations.
mod semantics;
/// Defines [`TranslationUnit`] and its include/using nodes.
mod translation_unit;
/// Defines [`Node`], [`Visitor`] and the `walk_*` functions.
pub mod visit;
