//! Error types for the stubgen generator.

use thiserror::Error;

/// Errors that can occur while turning descriptors into client code.
///
/// Skipped streaming methods and service-less units are not errors; they
/// are reported through [`crate::diagnostics`] or silently ignored.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Generated tokens did not parse as a Rust file.
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A descriptor name does not map to a Rust identifier.
    #[error("Invalid {what} '{name}' in '{source_path}': not a valid Rust identifier")]
    InvalidName {
        source_path: String,
        what: &'static str,
        name: String,
    },

    /// Two declarations map to the same generated item.
    #[error("Name clash in '{source_path}': {first} and {second} both generate '{generated}'")]
    NameClash {
        source_path: String,
        first: String,
        second: String,
        generated: String,
    },

    /// Protobuf input (plugin request or descriptor set) could not be decoded.
    #[error("Failed to decode {what}: {source}")]
    DecodeError {
        what: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// A JSON descriptor model could not be read.
    #[error("Failed to parse descriptor model '{path}': {source}")]
    ModelError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading input or writing plugin output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
