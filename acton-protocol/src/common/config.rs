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

use std::path::Path;

use anyhow::Context;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Directory name under the XDG config home.
const CONFIG_PREFIX: &str = "acton-protocol";
/// File name searched for inside [`CONFIG_PREFIX`].
const CONFIG_FILE: &str = "config.toml";

/// Configuration for the protocol compiler
///
/// Loaded from TOML files in XDG-compliant directories. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Names given to generated classes and implicit states
    pub naming: NamingConfig,
    /// Diagnostic reporting switches
    pub diagnostics: DiagnosticsConfig,
    /// Native type configuration
    pub types: TypesConfig,
}

/// Names used by the lowering engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix of the parent-side class (`PFoo` → `PFooParent`)
    pub parent_suffix: String,
    /// Suffix of the child-side class (`PFoo` → `PFooChild`)
    pub child_suffix: String,
    /// The single state of a protocol without transition statements
    pub stateless_state: String,
    /// Terminal state entered on close or destroy
    pub dead_state: String,
    /// Terminal state entered on a protocol violation
    pub error_state: String,
}

/// Diagnostic reporting switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Report warnings as errors, failing the check
    pub warnings_as_errors: bool,
    /// Warn about states the start state can never reach
    pub warn_unreachable_states: bool,
}

/// Native type configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Additional native type names accepted without a `using` statement
    pub extra_builtins: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            parent_suffix: "Parent".to_string(),
            child_suffix: "Child".to_string(),
            stateless_state: "__Start".to_string(),
            dead_state: "__Dead".to_string(),
            error_state: "__Error".to_string(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            warnings_as_errors: false,
            warn_unreachable_states: true,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `$XDG_CONFIG_HOME/acton-protocol/config.toml` (falling back to
    /// `~/.config/acton-protocol/config.toml`).
    ///
    /// If no configuration file is found, returns the default configuration.
    /// If a configuration file exists but is malformed, logs an error and uses defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix(CONFIG_PREFIX) {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        if let Some(path) = xdg_dirs.find_config_file(CONFIG_FILE) {
            info!("Loading configuration from: {}", path.display());
            match Self::load_from(&path) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("{:#}", e);
                    Self::default()
                }
            }
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration TOML.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid configuration TOML.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str::<Self>(text)?)
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: CompilerConfig = CompilerConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() -> anyhow::Result<()> {
        let config = CompilerConfig::from_toml(
            r#"
            [naming]
            parent_suffix = "Host"

            [types]
            extra_builtins = ["Shmem"]
            "#,
        )?;
        assert_eq!(config.naming.parent_suffix, "Host");
        assert_eq!(config.naming.child_suffix, "Child");
        assert_eq!(config.types.extra_builtins, vec!["Shmem".to_string()]);
        assert!(config.diagnostics.warn_unreachable_states);
        Ok(())
    }

    #[test]
    fn empty_file_is_default() -> anyhow::Result<()> {
        assert_eq!(CompilerConfig::from_toml("")?, CompilerConfig::default());
        Ok(())
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let result = CompilerConfig::from_toml("[diagnostics]\nwarnings_as_errors = \"yes\"\n");
        assert!(result.is_err());
    }
}
