use crate::host::ExtensionHost;
use pipeforge_types::SourceId;
use serde::{Deserialize, Serialize};

/// Describes an extension. The id doubles as the provenance of everything
/// the extension registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    pub id: SourceId,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl ExtensionMetadata {
    pub fn new(id: SourceId, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            version: version.into(),
            description: String::new(),
            authors: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }
}

/// A unit of contributed functionality.
///
/// `register` is called once, on the loader thread. It registers entities
/// directly or schedules registration tasks for entities whose dependencies
/// may come from extensions loaded later. An error marks the extension as
/// failed; whatever it registered before failing stays registered.
pub trait Extension {
    fn metadata(&self) -> ExtensionMetadata;

    fn register(&self, host: &mut ExtensionHost) -> anyhow::Result<()>;
}
