//! Registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record exists for the given registry ID.
    ///
    /// Unreachable through normal use of [`MetadataFactory`](crate::MetadataFactory),
    /// which creates the record before handing out operations. Seeing this in
    /// practice means the backing store was tampered with (e.g. cleared)
    /// while handles were still live.
    #[error("Registry with ID \"{0}\" not found")]
    NotFound(String),

    /// The record for this ID was created with different metadata type
    /// parameters.
    #[error("Registry with ID \"{id}\" holds metadata of a different type (expected {expected})")]
    TypeMismatch { id: String, expected: &'static str },
}
