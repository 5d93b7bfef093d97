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

//! Canonical text dump of the IR.
//!
//! The dump is a pure function of the IR value, one item per line, so equal IR
//! always renders to identical text.

use std::fmt::{self, Display, Formatter};

use crate::ir::{ClassIr, FieldIr, FieldKind, LoweredProtocol, MethodIr, ParamIr, TypeIr};

impl Display for TypeIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeIr::Native(name) | TypeIr::Class(name) => write!(f, "{name}"),
            TypeIr::Actor { class, state } => write!(f, "{class}:{state}"),
        }
    }
}

impl Display for ParamIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

fn write_params(f: &mut Formatter<'_>, params: &[ParamIr]) -> fmt::Result {
    write!(f, "(")?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{param}")?;
    }
    write!(f, ")")
}

impl Display for FieldIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FieldKind::CurrentState => "current-state",
            FieldKind::ManagerRef => "manager-ref",
            FieldKind::ManagedActors => "managed-actors",
        };
        let ownership = if self.owning { "owning" } else { "non-owning" };
        write!(f, "field {}: {} [{kind}, {ownership}]", self.name, self.ty)?;
        if let Some(init) = &self.init {
            write!(f, " = {init}")?;
        }
        Ok(())
    }
}

impl Display for MethodIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let linkage = if self.is_virtual { "virtual" } else { "concrete" };
        write!(f, "method {} [{linkage}", self.name)?;
        if let Some(semantics) = self.semantics {
            write!(f, ", {semantics}")?;
        }
        if self.blocking {
            write!(f, ", blocking")?;
        }
        if self.reentrant {
            write!(f, ", reentrant")?;
        }
        if let Some(id) = self.id {
            write!(f, ", id={id}")?;
        }
        if let Some(reply) = self.reply_id {
            write!(f, ", reply={reply}")?;
        }
        if let Some(managed) = &self.managed {
            write!(f, ", manages={managed}")?;
        }
        write!(f, "] ")?;
        write_params(f, &self.params)?;
        write!(f, " -> ")?;
        write_params(f, &self.returns)?;
        if let Some(guard) = &self.guard {
            write!(f, " guard {} {} {{", guard.trigger, guard.message)?;
            for (i, edge) in guard.edges.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {} -> {}", edge.from, edge.to)?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

impl Display for ClassIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "class {} (protocol {}, role {})",
            self.qualified_name(),
            self.protocol,
            self.role
        )?;
        write!(f, "  states")?;
        for state in &self.states.states {
            let marker = if *state == self.states.start { "*" } else { "" };
            write!(f, " {state}{marker}")?;
        }
        writeln!(f)?;
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        for t in &self.transitions {
            writeln!(f, "  transition {} {} {} -> {}", t.from, t.trigger, t.message, t.to)?;
        }
        for method in &self.methods {
            writeln!(f, "  {method}")?;
        }
        Ok(())
    }
}

impl Display for LoweredProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "protocol {} ({})", self.protocol, self.file)?;
        for (name, ids) in self.message_ids.iter() {
            match ids.reply {
                Some(reply) => writeln!(f, "  message {name} id={} reply={reply}", ids.id)?,
                None => writeln!(f, "  message {name} id={}", ids.id)?,
            }
        }
        for class in &self.classes {
            write!(f, "{class}")?;
        }
        Ok(())
    }
}
