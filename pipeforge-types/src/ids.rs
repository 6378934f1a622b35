//! Identifier types used throughout the pipeforge registries.
//!
//! Entity ids are namespace-qualified strings (`"imaging:threshold"`). They
//! are the stable reference persisted pipeline documents use, so parsing is
//! strict: exactly one `:` separating two non-empty parts, no whitespace.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Builds an id from its namespace and name.
    pub fn new(namespace: &str, name: &str) -> Result<Self> {
        Self::parse(&format!("{namespace}:{name}"))
    }

    /// Parses an id of the form `namespace:name`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidId {
            id: s.to_string(),
            reason,
        };

        if s.chars().any(char::is_whitespace) {
            return Err(invalid("whitespace is not allowed"));
        }
        let (namespace, name) = s.split_once(':').ok_or_else(|| invalid("missing ':' separator"))?;
        if namespace.is_empty() {
            return Err(invalid("namespace is empty"));
        }
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.contains(':') {
            return Err(invalid("more than one ':' separator"));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the namespace part (before the `:`).
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or_default()
    }

    /// Returns the name part (after the `:`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once(':').map(|(_, name)| name).unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifies the extension (provenance) an entity was registered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Creates a source id. Empty or whitespace-only ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidSource(id));
        }
        Ok(Self(id))
    }

    /// The source used for entities the host registers on its own behalf.
    #[must_use]
    pub fn core() -> Self {
        Self("pipeforge:core".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SourceId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}
