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

use serde::{Deserialize, Serialize};

use crate::ast::Loc;

/// An identifier with its enclosing qualifiers, outermost first (`a::b::Base`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedId {
    /// Where the identifier was written.
    pub loc: Loc,
    /// The innermost identifier.
    pub base: String,
    /// Enclosing qualifiers, outermost first.
    pub quals: Vec<String>,
}

impl QualifiedId {
    /// An unqualified identifier.
    pub fn new(loc: Loc, base: impl Into<String>) -> Self {
        Self {
            loc,
            base: base.into(),
            quals: Vec::new(),
        }
    }

    /// An identifier with explicit qualifiers.
    pub fn with_quals(loc: Loc, base: impl Into<String>, quals: Vec<String>) -> Self {
        Self {
            loc,
            base: base.into(),
            quals,
        }
    }

    /// Parses `a::b::C`; empty segments are ignored.
    pub fn parse(loc: Loc, text: &str) -> Self {
        let mut parts: Vec<String> = text
            .split("::")
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        let base = parts.pop().unwrap_or_default();
        Self::with_quals(loc, base, parts)
    }

    /// Pushes the current base onto the qualifiers and makes `id` the new base.
    pub fn qualify(&mut self, id: impl Into<String>) {
        let previous = std::mem::replace(&mut self.base, id.into());
        self.quals.push(previous);
    }

    /// Returns `true` when there are no qualifiers.
    pub fn is_simple(&self) -> bool {
        self.quals.is_empty()
    }

    /// A copy with `suffix` appended to the base, keeping the qualifiers.
    pub fn with_base_suffix(&self, suffix: &str) -> Self {
        Self {
            loc: self.loc.clone(),
            base: format!("{}{suffix}", self.base),
            quals: self.quals.clone(),
        }
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qual in &self.quals {
            write!(f, "{qual}::")?;
        }
        f.write_str(&self.base)
    }
}
