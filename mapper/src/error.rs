//! Error types for sheetmapper.
//!
//! Faults are split by where they originate:
//!
//! - [`ConfigError`] - Validator registration faults (missing or cyclic groups)
//! - [`SheetError`] - CSV codec adapter errors
//! - [`RulesError`] - Rule file loading errors
//! - [`MappingError`] - Row-to-object population errors
//! - [`AppError`] - Top-level errors used by the CLI
//!
//! Data-quality failures are never errors here: they become
//! [`crate::models::ErrorMessage`] values collected by a validation session.

use thiserror::Error;

// =============================================================================
// Configuration Faults
// =============================================================================

/// Faults in how validators were registered.
///
/// Raised once, before any row is touched, and fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A group depends on a group nobody registered.
    #[error("Group '{group}' depends on missing group '{missing}'")]
    MissingDependencyGroup { group: String, missing: String },

    /// Groups depend on each other in a loop.
    #[error("Cyclic dependency between groups: {}", .cycle.join(" -> "))]
    CyclicDependencyGroup { cycle: Vec<String> },
}

// =============================================================================
// Sheet Codec Errors
// =============================================================================

/// Errors while flattening CSV input into a sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty input.
    #[error("Input is empty")]
    EmptyFile,

    /// Header row / data start row do not describe this sheet.
    #[error("Invalid sheet meta: {0}")]
    InvalidMeta(String),
}

// =============================================================================
// Rule File Errors
// =============================================================================

/// Errors while loading a rule file.
#[derive(Debug, Error)]
pub enum RulesError {
    /// IO error.
    #[error("Rules IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Rules JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The rule file does not satisfy the embedded schema.
    #[error("Rules do not match schema: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// A regex or date pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// A field setter rejected a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}, column {column} (field '{field}'): {message}")]
pub struct MappingError {
    pub row: usize,
    pub column: usize,
    pub field: String,
    pub message: String,
}

impl MappingError {
    pub fn new(
        row: usize,
        column: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column,
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Application Errors (top-level)
// =============================================================================

/// Top-level errors for the command line front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validator configuration fault.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sheet codec error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Rule file error.
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    /// Mapping error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for validator configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for sheet codec operations.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for rule loading.
pub type RulesResult<T> = Result<T, RulesError>;

/// Result type for object mapping.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for the CLI.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let config_err = ConfigError::MissingDependencyGroup {
            group: "age".into(),
            missing: "required".into(),
        };
        let app_err: AppError = config_err.into();
        assert!(app_err.to_string().contains("missing group 'required'"));

        let sheet_err = SheetError::EmptyFile;
        let app_err: AppError = sheet_err.into();
        assert!(app_err.to_string().contains("empty"));
    }

    #[test]
    fn test_cycle_error_format() {
        let err = ConfigError::CyclicDependencyGroup {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency between groups: a -> b -> a");
    }

    #[test]
    fn test_mapping_error_format() {
        let err = MappingError::new(3, 2, "age", "not a number");
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("field 'age'"));
        assert!(msg.contains("not a number"));
    }
}
