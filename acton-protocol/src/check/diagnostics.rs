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

use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ast::Loc;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the check.
    Error,
    /// Reported only; fails the check when warnings are promoted.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One `(file, line, severity, message)` record.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File the offending node came from.
    pub file: String,
    /// Line of the offending node.
    pub line: u32,
    /// Error or warning.
    pub severity: Severity,
    /// Rendered message.
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic located at `loc`.
    pub fn at(loc: &Loc, severity: Severity, message: impl fmt::Display) -> Self {
        Self::new(loc.file.clone(), loc.line, severity, message.to_string())
    }

    /// Returns `true` for errors.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.file, self.line, self.severity, self.message
        )
    }
}

/// An append-only diagnostic sink that preserves discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    warnings_as_errors: bool,
}

impl Diagnostics {
    /// An empty sink; `warnings_as_errors` promotes every warning it receives.
    pub fn new(warnings_as_errors: bool) -> Self {
        Self {
            items: Vec::new(),
            warnings_as_errors,
        }
    }

    /// Records an error at `loc`.
    pub fn error(&mut self, loc: &Loc, message: impl fmt::Display) {
        let diagnostic = Diagnostic::at(loc, Severity::Error, message);
        debug!(%diagnostic, "check error");
        self.items.push(diagnostic);
    }

    /// Records a warning at `loc`, promoted to an error when configured.
    pub fn warning(&mut self, loc: &Loc, message: impl fmt::Display) {
        let severity = if self.warnings_as_errors {
            Severity::Error
        } else {
            Severity::Warning
        };
        let diagnostic = Diagnostic::at(loc, severity, message);
        trace!(%diagnostic, "check warning");
        self.items.push(diagnostic);
    }

    /// Appends every record of `other`, keeping its order.
    pub fn append(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    /// Number of (unpromoted) warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.items.len() - self.error_count()
    }

    /// Returns `true` if any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Records in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The records as a slice.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Consumes the sink.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
