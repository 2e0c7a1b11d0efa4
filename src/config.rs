//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a metadata registry.
///
/// All fields are optional; the defaults give a replace-on-attach registry
/// with a generated ID and no reflection support.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// If true, new metadata is appended to existing metadata for the same
    /// class or method. If false, new metadata replaces it.
    ///
    /// The policy is captured by the handle at creation time: two handles
    /// opened on the same ID with different configs each apply their own
    /// policy to the shared record.
    #[serde(default)]
    pub merge: bool,

    /// Unique identifier for the registry. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// If true, the factory looks for a [`ReflectionProvider`] and, when one
    /// is found, the handle exposes reflection-augmented operations. When no
    /// provider is available this degrades to the base operations with a
    /// warning.
    ///
    /// [`ReflectionProvider`]: crate::reflect::ReflectionProvider
    #[serde(default)]
    pub use_reflection: bool,
}

impl RegistryConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable merge-on-attach.
    pub fn merged(mut self) -> Self {
        self.merge = true;
        self
    }

    /// Use a fixed registry ID instead of a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Request reflection-augmented operations.
    pub fn with_reflection(mut self) -> Self {
        self.use_reflection = true;
        self
    }
}
