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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::TranslationUnit;

/// The translation units of one compilation graph, keyed by file name.
///
/// Insertion order is preserved and drives diagnostic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    units: IndexMap<String, TranslationUnit>,
}

impl Program {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit, returning the one previously registered under the same file name.
    pub fn add_unit(&mut self, unit: TranslationUnit) -> Option<TranslationUnit> {
        self.units.insert(unit.filename.clone(), unit)
    }

    /// Builder form of [`Program::add_unit`].
    #[must_use]
    pub fn with_unit(mut self, unit: TranslationUnit) -> Self {
        self.add_unit(unit);
        self
    }

    /// Looks up a unit by file name.
    pub fn unit(&self, file: &str) -> Option<&TranslationUnit> {
        self.units.get(file)
    }

    /// Units in insertion order.
    pub fn units(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.units.values()
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` when the program holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<TranslationUnit> for Program {
    fn from_iter<I: IntoIterator<Item = TranslationUnit>>(iter: I) -> Self {
        let mut program = Self::new();
        for unit in iter {
            program.add_unit(unit);
        }
        program
    }
}
