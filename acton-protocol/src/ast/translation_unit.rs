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

use serde::{Deserialize, Serialize};

use crate::ast::{Loc, Protocol, TypeSpec};

/// `include "native/header.h";`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CxxInclude {
    /// Location of the statement.
    pub loc: Loc,
    /// Included native header.
    pub file: String,
}

impl CxxInclude {
    /// Creates a native include.
    pub fn new(loc: Loc, file: impl Into<String>) -> Self {
        Self {
            loc,
            file: file.into(),
        }
    }
}

/// `include protocol "PFoo.ipdl";`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInclude {
    /// Location of the statement.
    pub loc: Loc,
    /// File name of the included translation unit.
    pub file: String,
}

impl ProtocolInclude {
    /// Creates a protocol include.
    pub fn new(loc: Loc, file: impl Into<String>) -> Self {
        Self {
            loc,
            file: file.into(),
        }
    }
}

/// `using mozilla::ipc::Shmem;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingStmt {
    /// Location of the statement.
    pub loc: Loc,
    /// The native type brought into scope.
    pub type_spec: TypeSpec,
}

impl UsingStmt {
    /// Creates a using statement.
    pub fn new(loc: Loc, type_spec: TypeSpec) -> Self {
        Self { loc, type_spec }
    }
}

/// One parsed file: its includes, using statements and exactly one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Location of the unit itself (line 0 of `filename`).
    pub loc: Loc,
    /// File name; other units include this unit by it.
    pub filename: String,
    /// Native includes in source order.
    pub cxx_includes: Vec<CxxInclude>,
    /// Protocol includes in source order.
    pub protocol_includes: Vec<ProtocolInclude>,
    /// Using statements in source order.
    pub using: Vec<UsingStmt>,
    /// The protocol declared by this file.
    pub protocol: Protocol,
}

impl TranslationUnit {
    /// A unit without includes or using statements.
    pub fn new(filename: impl Into<String>, protocol: Protocol) -> Self {
        let filename = filename.into();
        Self {
            loc: Loc::new(filename.clone(), 0),
            filename,
            cxx_includes: Vec::new(),
            protocol_includes: Vec::new(),
            using: Vec::new(),
            protocol,
        }
    }

    /// Appends a native include.
    pub fn add_cxx_include(&mut self, include: CxxInclude) {
        self.cxx_includes.push(include);
    }

    /// Appends a protocol include.
    pub fn add_protocol_include(&mut self, include: ProtocolInclude) {
        self.protocol_includes.push(include);
    }

    /// Appends a using statement.
    pub fn add_using_stmt(&mut self, using: UsingStmt) {
        self.using.push(using);
    }

    /// Files this unit includes, in source order.
    pub fn included_files(&self) -> impl Iterator<Item = &str> {
        self.protocol_includes.iter().map(|inc| inc.file.as_str())
    }
}
