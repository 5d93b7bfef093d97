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

#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Acton Protocol Library
//!
//! Checks declarative actor protocol descriptions and lowers them into one
//! state-machine-guarded class description per channel role.
//!
//! The pipeline is split into three passes over a [`Program`](ast::Program)
//! handed over by a front-end:
//!
//! 1. [`check`](check::check) resolves names and types and accumulates every
//!    diagnostic instead of stopping at the first.
//! 2. [`lower`](lower::lower) turns each checked protocol into a
//!    [`LoweredProtocol`](ir::LoweredProtocol): a parent class and a child class
//!    with guarded message stubs and lifetime members.
//! 3. A [`Backend`](prelude::Backend) renders the IR; the crate ships the
//!    canonical [`IrDump`](prelude::IrDump).
//!
//! [`ProtocolCompiler`](prelude::ProtocolCompiler) runs the passes over a whole
//! program. The [`contract`] module executes the guards and ordering rules of
//! lowered classes so their guarantees can be exercised without a backend.

/// Protocol syntax tree and its visitor.
pub mod ast;
/// Name resolution and type checking.
pub mod check;
/// Compiler driver and configuration.
pub(crate) mod common;
/// Executable model of the generated-code contract.
pub mod contract;
/// The lowered class description.
pub mod ir;
/// Lowering of checked protocols.
pub mod lower;
/// Trait definitions at the compiler's seams.
pub(crate) mod traits;

pub use common::{
    CompileError, CompileOutput, CompilerConfig, DiagnosticsConfig, NamingConfig,
    ProtocolCompiler, TypesConfig, CONFIG,
};
pub use traits::{Backend, IrDump};

/// Prelude module for convenient imports.
///
/// Re-exports the syntax tree constructors, the compiler driver and its
/// configuration, the IR and the contract model.
pub mod prelude {
    pub use crate::ast::{
        CxxInclude, Direction, Loc, ManagerStmt, ManagesStmt, MessageDecl, Namespace, Param,
        Program, Protocol, ProtocolInclude, QualifiedId, SendSemantics, State, TranslationUnit,
        Transition, TransitionStmt, Trigger, TypeSpec, UsingStmt,
    };
    pub use crate::check::{check, CheckOutcome, CheckedUnit, Diagnostic, Diagnostics, Severity};
    pub use crate::common::{
        CompileError, CompileOutput, CompilerConfig, ProtocolCompiler, CONFIG,
    };
    pub use crate::contract::{
        ActorId, ActorInstance, ActorTree, Channel, ChannelState, DispatchResult, ProtocolFault,
    };
    pub use crate::ir::{ClassIr, LoweredProtocol, MethodIr, Role};
    pub use crate::lower::{lower, LowerError};
    pub use crate::traits::{Backend, IrDump};
}
