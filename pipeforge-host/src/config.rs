//! Loader configuration read from `pipeforge.toml`.
//!
//! ```toml
//! [extensions]
//! mode = "denylist"
//! ids = ["ext.experimental"]
//!
//! [validation]
//! node-types = true
//! ```

use crate::error::HostResult;
use pipeforge_types::SourceId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name looked up by [`LoaderConfig::load_from_dir`].
pub const CONFIG_FILE_NAME: &str = "pipeforge.toml";

/// Which extensions may be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPolicyMode {
    /// Only listed extensions are loaded.
    Allowlist,
    /// Every extension except the listed ones is loaded.
    Denylist,
    #[default]
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub mode: ExtensionPolicyMode,
    /// Allow- or denylist, depending on `mode`.
    #[serde(default)]
    pub extension_ids: Vec<String>,
    /// Check node slots and parameters against the registries after loading.
    #[serde(default = "default_validate_node_types")]
    pub validate_node_types: bool,
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_validate_node_types() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            mode: ExtensionPolicyMode::Unrestricted,
            extension_ids: Vec::new(),
            validate_node_types: default_validate_node_types(),
            path: None,
        }
    }
}

impl LoaderConfig {
    /// Loads `pipeforge.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Self {
        Self::load_from(dir.join(CONFIG_FILE_NAME))
    }

    /// Loads the configuration from an explicit path.
    ///
    /// A missing file yields the defaults. A file that cannot be read or
    /// parsed also yields the defaults, with a warning.
    pub fn load_from(path: PathBuf) -> Self {
        if !path.exists() {
            info!("No loader configuration at {:?}, loading all extensions", path);
            return Self::default();
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read loader configuration {:?}: {}", path, e);
                return Self::default().with_path(path);
            }
        };

        match Self::parse(&contents) {
            Ok(config) => {
                info!("Loaded loader configuration from {:?}", path);
                config.with_path(path)
            }
            Err(e) => {
                warn!(
                    "Failed to parse loader configuration {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default().with_path(path)
            }
        }
    }

    /// Only the listed extensions may load.
    pub fn allowlist<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: ExtensionPolicyMode::Allowlist,
            extension_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every extension except the listed ones may load.
    pub fn denylist<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: ExtensionPolicyMode::Denylist,
            extension_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_node_validation(mut self, enabled: bool) -> Self {
        self.validate_node_types = enabled;
        self
    }

    /// Parses the TOML file format.
    pub fn parse(contents: &str) -> HostResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.into_config())
    }

    fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Path of the file this configuration was read from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_extension_allowed(&self, id: &SourceId) -> bool {
        if *id == SourceId::core() {
            return true;
        }
        let listed = self.extension_ids.iter().any(|listed| listed == id.as_str());
        match self.mode {
            ExtensionPolicyMode::Unrestricted => true,
            ExtensionPolicyMode::Allowlist => listed,
            ExtensionPolicyMode::Denylist => !listed,
        }
    }
}

/// Raw TOML structure of `pipeforge.toml`.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    extensions: ExtensionsSection,
    #[serde(default)]
    validation: ValidationSection,
}

#[derive(Deserialize, Default)]
struct ExtensionsSection {
    #[serde(default)]
    mode: ExtensionPolicyMode,
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct ValidationSection {
    #[serde(default = "default_validate_node_types", rename = "node-types")]
    node_types: bool,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            node_types: default_validate_node_types(),
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> LoaderConfig {
        LoaderConfig {
            mode: self.extensions.mode,
            extension_ids: self.extensions.ids,
            validate_node_types: self.validation.node_types,
            path: None,
        }
    }
}
