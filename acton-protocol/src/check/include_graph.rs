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
use tracing::debug;

use crate::ast::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// The protocol-include graph of a [`Program`].
///
/// Only edges to files present in the program are kept; a missing file is the
/// resolver's to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeGraph {
    includes: IndexMap<String, IndexSet<String>>,
    includers: IndexMap<String, IndexSet<String>>,
    order: Vec<String>,
    cycles: Vec<Vec<String>>,
}

impl IncludeGraph {
    /// Builds the graph and its dependency order.
    pub fn build(program: &Program) -> Self {
        let mut graph = Self::default();
        for unit in program.units() {
            graph.includes.entry(unit.filename.clone()).or_default();
            graph.includers.entry(unit.filename.clone()).or_default();
        }
        for unit in program.units() {
            for file in unit.included_files() {
                if program.unit(file).is_none() {
                    continue;
                }
                if let Some(edges) = graph.includes.get_mut(&unit.filename) {
                    edges.insert(file.to_string());
                }
                if let Some(back) = graph.includers.get_mut(file) {
                    back.insert(unit.filename.clone());
                }
            }
        }

        let mut marks = IndexMap::new();
        let mut path = Vec::new();
        let roots: Vec<String> = graph.includes.keys().cloned().collect();
        for root in roots {
            graph.visit(&root, &mut marks, &mut path);
        }
        debug!(
            units = graph.order.len(),
            cycles = graph.cycles.len(),
            "built include graph"
        );
        graph
    }

    fn visit(&mut self, file: &str, marks: &mut IndexMap<String, Mark>, path: &mut Vec<String>) {
        match marks.get(file) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                if let Some(start) = path.iter().position(|f| f == file) {
                    let mut cycle = path[start..].to_vec();
                    cycle.push(file.to_string());
                    self.record_cycle(cycle);
                }
                return;
            }
            None => {}
        }
        marks.insert(file.to_string(), Mark::Visiting);
        path.push(file.to_string());
        let targets: Vec<String> = self
            .includes
            .get(file)
            .map(|edges| edges.iter().cloned().collect())
            .unwrap_or_default();
        for target in targets {
            self.visit(&target, marks, path);
        }
        path.pop();
        marks.insert(file.to_string(), Mark::Done);
        self.order.push(file.to_string());
    }

    fn record_cycle(&mut self, cycle: Vec<String>) {
        let mut members: Vec<&String> = cycle.iter().skip(1).collect();
        members.sort();
        let seen = self.cycles.iter().any(|known| {
            let mut other: Vec<&String> = known.iter().skip(1).collect();
            other.sort();
            other == members
        });
        if !seen {
            self.cycles.push(cycle);
        }
    }

    /// Files `file` includes directly, in source order.
    pub fn includes(&self, file: &str) -> impl Iterator<Item = &str> {
        self.includes
            .get(file)
            .into_iter()
            .flat_map(|edges| edges.iter().map(String::as_str))
    }

    /// Files that include `file` directly, in program order.
    pub fn includers(&self, file: &str) -> impl Iterator<Item = &str> {
        self.includers
            .get(file)
            .into_iter()
            .flat_map(|edges| edges.iter().map(String::as_str))
    }

    /// Every file, included files before their includers.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Each distinct cycle as a closed path (`A -> B -> A`).
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    /// Returns `true` if `file` lies on a cycle.
    pub fn on_cycle(&self, file: &str) -> bool {
        self.cycles.iter().any(|c| c.iter().any(|f| f == file))
    }
}
