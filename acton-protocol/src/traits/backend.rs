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

use std::fmt::Debug;

use crate::ir::{ClassIr, LoweredProtocol};

/// Renders lowered classes into target text.
///
/// Implementations must be pure functions of the IR: equal classes render to
/// byte-identical text, so unchanged output files can be left untouched.
pub trait Backend: Debug {
    /// Renders one class.
    fn render(&self, class: &ClassIr) -> String;

    /// Renders both classes of a protocol, parent first.
    fn render_protocol(&self, protocol: &LoweredProtocol) -> String {
        protocol
            .classes
            .iter()
            .map(|class| self.render(class))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders classes as the canonical IR dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrDump;

impl Backend for IrDump {
    fn render(&self, class: &ClassIr) -> String {
        class.to_string()
    }

    fn render_protocol(&self, protocol: &LoweredProtocol) -> String {
        protocol.to_string()
    }
}
