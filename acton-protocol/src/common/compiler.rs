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

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::ast::Program;
use crate::check::{check, Diagnostics, FailureReason};
use crate::common::{CompilerConfig, CONFIG};
use crate::ir::LoweredProtocol;
use crate::lower::{lower, LowerError};
use crate::traits::Backend;

/// Why a unit produced no lowered protocol.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("`{file}` {reason}")]
    CheckFailed { file: String, reason: FailureReason },

    #[error("`{file}`: {source}")]
    Internal {
        file: String,
        #[source]
        source: LowerError,
    },

    #[error("`{file}` was not lowered because `{dependency}` failed to lower")]
    DependencyFailed { file: String, dependency: String },
}

impl CompileError {
    /// The unit the error is about.
    pub fn file(&self) -> &str {
        match self {
            CompileError::CheckFailed { file, .. }
            | CompileError::Internal { file, .. }
            | CompileError::DependencyFailed { file, .. } => file,
        }
    }

    /// Returns `true` for compiler defects, as opposed to problems with the input.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal { .. })
    }
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Lowered protocols, included and managed protocols first.
    pub lowered: Vec<LoweredProtocol>,
    /// Every user-facing diagnostic, in discovery order.
    pub diagnostics: Diagnostics,
    /// Units that produced nothing, in the order they were given up on.
    pub failed: IndexMap<String, CompileError>,
}

impl CompileOutput {
    /// `true` when every unit was lowered and no error was reported.
    pub fn ok(&self) -> bool {
        self.failed.is_empty() && !self.diagnostics.has_errors()
    }

    /// The lowered protocol of `file`.
    pub fn protocol(&self, file: &str) -> Option<&LoweredProtocol> {
        self.lowered.iter().find(|p| p.file == file)
    }

    /// Renders every lowered protocol with `backend`, one `(file, text)` pair each.
    pub fn render<B: Backend + ?Sized>(&self, backend: &B) -> Vec<(String, String)> {
        self.lowered
            .iter()
            .map(|p| (p.file.clone(), backend.render_protocol(p)))
            .collect()
    }
}

/// Runs the check and the lowering engine over whole programs.
///
/// ```
/// use acton_protocol::prelude::*;
///
/// let mut protocol = Protocol::new(Loc::new("PPing.ipdl", 1), "PPing");
/// protocol.add_messages([MessageDecl::new(Loc::new("PPing.ipdl", 2), "Ping", Direction::Out)]);
/// let program = Program::new().with_unit(TranslationUnit::new("PPing.ipdl", protocol));
///
/// let output = ProtocolCompiler::new(CompilerConfig::default()).compile(&program);
/// assert!(output.ok());
/// assert_eq!(output.lowered[0].parent().name, "PPingParent");
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolCompiler {
    config: CompilerConfig,
}

impl Default for ProtocolCompiler {
    /// Uses the configuration loaded from the XDG config directory.
    fn default() -> Self {
        Self::new(CONFIG.clone())
    }
}

impl ProtocolCompiler {
    /// A compiler with an explicit configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Checks `program`, then lowers every unit that passed.
    ///
    /// A lowering failure is recorded against its unit and against every unit
    /// including it, but never stops unrelated units from being lowered.
    #[instrument(skip(self, program), fields(units = program.len()), level = "debug")]
    pub fn compile(&self, program: &Program) -> CompileOutput {
        let outcome = check(program, &self.config);
        let (diagnostics, check_failed, checked) = outcome.into_parts();

        let mut failed: IndexMap<String, CompileError> = check_failed
            .into_iter()
            .map(|(file, reason)| {
                let err = CompileError::CheckFailed {
                    file: file.clone(),
                    reason,
                };
                (file, err)
            })
            .collect();
        let mut lower_failed: IndexSet<String> = IndexSet::new();
        let mut lowered = Vec::with_capacity(checked.len());

        for (file, unit) in &checked {
            if let Some(dependency) = unit
                .unit
                .included_files()
                .find(|inc| lower_failed.contains(*inc))
            {
                warn!(file = %file, dependency, "skipping unit with a failed dependency");
                failed.insert(
                    file.clone(),
                    CompileError::DependencyFailed {
                        file: file.clone(),
                        dependency: dependency.to_string(),
                    },
                );
                lower_failed.insert(file.clone());
                continue;
            }

            match lower(unit, &self.config) {
                Ok(protocol) => {
                    debug!(file = %file, protocol = %protocol.protocol, "lowered unit");
                    lowered.push(protocol);
                }
                Err(source) => {
                    error!(file = %file, error = %source, "lowering failed");
                    failed.insert(
                        file.clone(),
                        CompileError::Internal {
                            file: file.clone(),
                            source,
                        },
                    );
                    lower_failed.insert(file.clone());
                }
            }
        }

        info!(
            lowered = lowered.len(),
            failed = failed.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "compilation finished"
        );
        CompileOutput {
            lowered,
            diagnostics,
            failed,
        }
    }
}
