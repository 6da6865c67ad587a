use thiserror::Error;

use crate::component::Vec3;
use crate::state::PersistenceError;

/// Errors reported by [`crate::registry::ComponentRegistry`] operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// The operation referenced a component id that is not in the registry
    #[error("Component not found: {0}")]
    NotFound(String),

    /// The record references a section the registry does not know
    #[error("Invalid section: {0}")]
    InvalidSection(String),

    /// A size component is zero, negative or not finite
    #[error("Invalid size {0}: all dimensions must be positive")]
    InvalidSize(Vec3),

    /// Another component already uses this id
    #[error("Duplicate component id: {0}")]
    DuplicateId(String),
}

/// Errors raised while exchanging configuration documents
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The top-level payload is not a usable configuration document
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_and_parse_failures_read_differently() {
        let source = || serde_json::from_str::<u32>("x").unwrap_err();
        assert!(ConfigError::Serialize(source()).to_string().starts_with("Failed to serialize"));
        assert!(ConfigError::from(source()).to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn invalid_size_names_the_dimensions() {
        let err = RegistryError::InvalidSize(Vec3::new(4.0, 0.0, 3.0));
        assert!(err.to_string().contains("must be positive"));
    }
}
