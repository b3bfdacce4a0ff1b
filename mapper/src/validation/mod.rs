//! Dependency-aware validation of a sheet.
//!
//! Validators come in three kinds:
//!
//! - [`SheetValidator`] - checks the whole sheet (usually its header row)
//! - [`RowValidator`] - checks one data row
//! - [`CellValidator`] - checks one cell, matched to cells by field name
//!
//! Row and cell validators belong to a named *group* and may declare the
//! groups they depend on. For each row, a group only runs once every group
//! it depends on has passed for that same row; otherwise it is skipped.
//!
//! # Flow
//!
//! ```text
//! ValidatorRegistry ──▶ DependencyGraph ──▶ check + execution order   (once)
//!                                                  │
//! Sheet ──▶ SheetValidators ──(all pass)──▶ RowValidationEngine        (per row)
//!                                                  │
//!                                          Vec<ErrorMessage>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetmapper::validation::{ValidatorRegistry, ValidationSession};
//! use sheetmapper::validation::builtin::{FieldValidator, LocalDate, Required, RequireFields};
//!
//! let registry = ValidatorRegistry::new()
//!     .with_sheet(RequireFields::new(["name", "enrollDate"]))
//!     .with_cell(FieldValidator::new("enrollDate", Required).in_group("required"))
//!     .with_cell(
//!         FieldValidator::new("enrollDate", LocalDate::pattern("yyyy-MM-dd")?)
//!             .in_group("date")
//!             .requires(["required"]),
//!     );
//!
//! let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default())?;
//! if !session.valid() {
//!     for msg in session.error_messages() {
//!         println!("{}", msg);
//!     }
//! }
//! ```

pub mod builtin;
pub mod engine;
pub mod graph;
pub mod registry;
pub mod session;

pub use engine::{GroupStatus, RowOutcome, RowValidationEngine};
pub use graph::DependencyGraph;
pub use registry::{ValidatorGroup, ValidatorRegistry};
pub use session::{ValidationReport, ValidationSession};

use std::collections::BTreeSet;

use crate::models::{Cell, HeaderFields, Row, Sheet, SheetMeta, WriteStrategy};

// =============================================================================
// Outcome
// =============================================================================

/// Result of evaluating one rule against one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
    /// The rule does not apply here; neither a pass nor a failure.
    Skip,
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

// =============================================================================
// Row Context
// =============================================================================

/// A data row together with the header lookup, for row validators.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub row: &'a Row,
    pub fields: &'a HeaderFields,
    pub meta: &'a SheetMeta,
}

impl<'a> RowContext<'a> {
    /// The cell under the column titled `field`.
    pub fn cell(&self, field: &str) -> Option<&'a Cell> {
        self.row
            .cells
            .iter()
            .find(|c| self.fields.field(c.column_index) == Some(field))
    }

    /// Trimmed, non-blank value of `field`.
    pub fn value(&self, field: &str) -> Option<&'a str> {
        self.cell(field)
            .and_then(Cell::value)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

// =============================================================================
// Validator Traits
// =============================================================================

/// Checks the sheet as a whole. Failures are reported as sheet-level text boxes.
pub trait SheetValidator: Send + Sync {
    fn error_message(&self) -> &str;

    fn validate(&self, sheet: &Sheet, meta: &SheetMeta) -> bool;
}

/// Shared capabilities of row and cell validators.
pub trait DependencyValidator: Send + Sync {
    fn group(&self) -> &str;

    /// Groups that must have passed for the current row before this one runs.
    fn depends_on(&self) -> &BTreeSet<String>;

    fn error_message(&self) -> &str;

    fn write_strategy(&self) -> WriteStrategy;
}

pub trait RowValidator: DependencyValidator {
    fn validate(&self, ctx: &RowContext<'_>) -> Outcome;
}

pub trait CellValidator: DependencyValidator {
    /// Header field whose cells this validator checks.
    fn field(&self) -> &str;

    fn validate(&self, cell: &Cell, meta: &SheetMeta) -> Outcome;
}
