//! # Sheetmapper - dependency-aware spreadsheet validation
//!
//! Sheetmapper checks tabular data (header row + data rows) against groups
//! of validators that may depend on one another, then maps the rows that
//! pass into domain objects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validation │────▶│   Mapping   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (dep. graph)│     │ (setters)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                         ┌─────────────┐
//!                                         │ Rules JSON  │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetmapper::{parse_file_auto, RuleSet, ValidationSession};
//!
//! let parsed = parse_file_auto("students.csv")?;
//! let rules = RuleSet::from_file("students.rules.json")?;
//! let registry = rules.to_registry()?;
//!
//! let mut session = ValidationSession::new(&registry, &parsed.sheet, rules.sheet_meta()?)?;
//! if !session.valid() {
//!     for message in session.error_messages() {
//!         println!("{}", message);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Sheet/Row/Cell tree, sheet metadata, error messages
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Validator groups, dependency graph, row engine, session
//! - [`rules`] - JSON rule files
//! - [`mapping`] - Rows to domain objects and back
//! - [`logs`] - Progress log broadcasting

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod rules;
pub mod validation;

// Mapping
pub mod mapping;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AppError, AppResult, ConfigError, ConfigResult, MappingError, MappingResult, RulesError,
    RulesResult, SheetError, SheetResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, ErrorMessage, HeaderFields, Row, Sheet, SheetMeta, WriteStrategy};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    CellValidator, DependencyGraph, DependencyValidator, GroupStatus, Outcome, RowContext,
    RowOutcome, RowValidationEngine, RowValidator, SheetValidator, ValidationReport,
    ValidationSession, ValidatorGroup, ValidatorRegistry,
};

// =============================================================================
// Re-exports - Rules
// =============================================================================

pub use rules::{CellKind, CellRuleConfig, RowKind, RowRuleConfig, RuleOptions, RuleSet, SheetRule};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file,
    parse_file_auto, parse_sheet, ParseResult,
};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{
    FieldExtractor, FieldSetter, FnFieldExtractor, FnFieldSetter, JsonFieldSetter, JsonModel,
    LocalDateExtractor, LocalDateSetter, ObjectComposer, ObjectMapper,
};
