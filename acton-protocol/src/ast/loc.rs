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

/// File name used by [`Loc::none`] for nodes without a known origin.
const UNKNOWN_FILE: &str = "<??>";

/// Source location of a node: the file it was parsed from and the line it starts on.
///
/// Every diagnostic produced by the checker cites a `Loc`, so the front-end is
/// expected to fill it in for every node it builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    /// The file the node was read from.
    pub file: String,
    /// One-based line number; `0` when unknown.
    pub line: u32,
}

impl Loc {
    /// Creates a location in `file` at `line`.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The placeholder location (`<??>:0`) for synthesized nodes.
    pub fn none() -> Self {
        Self::new(UNKNOWN_FILE, 0)
    }

    /// Returns `true` for the placeholder location.
    pub fn is_none(&self) -> bool {
        self.line == 0 && self.file == UNKNOWN_FILE
    }
}

impl Default for Loc {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
