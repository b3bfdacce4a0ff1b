//! Validation session: one sheet, one registry, one pass.
//!
//! 1. Build the dependency graph and check it (on construction).
//! 2. Run sheet validators; any failure ends validation with text boxes.
//! 3. Run the row engine over every data row.
//! 4. The sheet is valid iff no error message was collected.

use serde::Serialize;

use crate::error::ConfigResult;
use crate::logs::{log_info, log_success, log_warning};
use crate::models::{ErrorMessage, HeaderFields, Sheet, SheetMeta, WriteStrategy};

use super::engine::RowValidationEngine;
use super::graph::DependencyGraph;
use super::registry::ValidatorRegistry;

/// Serializable summary of a session, for reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub error_count: usize,
    pub messages: Vec<ErrorMessage>,
}

pub struct ValidationSession<'a> {
    registry: &'a ValidatorRegistry,
    sheet: &'a Sheet,
    meta: SheetMeta,
    graph: DependencyGraph,
    order: Vec<String>,
    error_messages: Vec<ErrorMessage>,
}

impl<'a> ValidationSession<'a> {
    /// Fails with a [`crate::error::ConfigError`] when a group depends on a
    /// missing group or the groups form a cycle.
    pub fn new(
        registry: &'a ValidatorRegistry,
        sheet: &'a Sheet,
        meta: SheetMeta,
    ) -> ConfigResult<Self> {
        let graph = DependencyGraph::build(registry);
        let order = graph.execution_order()?;
        log_info(format!(
            "Validator groups checked: {} (order: {})",
            order.len(),
            order.join(" → ")
        ));

        Ok(Self {
            registry,
            sheet,
            meta,
            graph,
            order,
            error_messages: Vec::new(),
        })
    }

    /// Validate the sheet. Messages from a previous call are discarded.
    pub fn valid(&mut self) -> bool {
        self.error_messages.clear();

        if !self.valid_sheet() {
            log_warning(format!(
                "Sheet {} failed {} sheet check(s); rows not validated",
                self.sheet.index,
                self.error_messages.len()
            ));
            return false;
        }

        let fields = HeaderFields::from_sheet(self.sheet, &self.meta);
        let engine = RowValidationEngine::new(
            self.registry,
            &self.graph,
            &self.order,
            &self.meta,
            &fields,
            self.sheet.index,
        );

        let mut rows = 0;
        for index in self.meta.data_start_row_index..=self.sheet.row_count() {
            let Some(row) = self.sheet.row(index) else {
                continue;
            };
            let outcome = engine.validate_row(row);
            self.error_messages.extend(outcome.messages);
            rows += 1;
        }

        if self.error_messages.is_empty() {
            log_success(format!("Sheet {}: {} rows valid", self.sheet.index, rows));
            true
        } else {
            log_warning(format!(
                "Sheet {}: {} error(s) in {} rows",
                self.sheet.index,
                self.error_messages.len(),
                rows
            ));
            false
        }
    }

    fn valid_sheet(&mut self) -> bool {
        for validator in self.registry.sheet_validators() {
            if !validator.validate(self.sheet, &self.meta) {
                self.error_messages.push(ErrorMessage::sheet(
                    WriteStrategy::TextBox,
                    validator.error_message(),
                    self.sheet.index,
                ));
            }
        }
        self.error_messages.is_empty()
    }

    pub fn error_messages(&self) -> &[ErrorMessage] {
        &self.error_messages
    }

    pub fn into_error_messages(self) -> Vec<ErrorMessage> {
        self.error_messages
    }

    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            valid: self.error_messages.is_empty(),
            error_count: self.error_messages.len(),
            messages: self.error_messages.clone(),
        }
    }

    /// Group execution order used for every row.
    pub fn execution_order(&self) -> &[String] {
        &self.order
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::models::Row;
    use crate::validation::builtin::{
        FieldValidator, FnCellCheck, Integer, LocalDate, RequireFields, Required,
    };
    use crate::validation::Outcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn student_sheet(rows: &[[&str; 3]]) -> Sheet {
        let mut sheet = Sheet::new(0);
        sheet.push_row(Row::from_values(1, ["name", "age", "enrollDate"]));
        for (i, values) in rows.iter().enumerate() {
            sheet.push_row(Row::from_values(i + 2, values.iter().copied()));
        }
        sheet
    }

    #[test]
    fn test_cycle_fails_before_any_row() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = ValidatorRegistry::new()
            .with_cell(
                FieldValidator::new(
                    "name",
                    FnCellCheck::new("x", move |_: &str| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Outcome::Pass
                    }),
                )
                .in_group("a")
                .requires(["b"]),
            )
            .with_cell(FieldValidator::new("age", Required).in_group("b").requires(["a"]));

        let sheet = student_sheet(&[["bob", "18", "2015-09-01"]]);
        let result = ValidationSession::new(&registry, &sheet, SheetMeta::default());
        assert!(matches!(result, Err(ConfigError::CyclicDependencyGroup { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_dependency_fails_construction() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("age", Integer::default()).requires(["required"]));
        let sheet = student_sheet(&[]);
        match ValidationSession::new(&registry, &sheet, SheetMeta::default()) {
            Err(ConfigError::MissingDependencyGroup { group, missing }) => {
                assert_eq!(group, "age");
                assert_eq!(missing, "required");
            }
            Err(other) => panic!("Expected missing dependency, got {:?}", other),
            Ok(_) => panic!("Expected missing dependency error"),
        }
    }

    #[test]
    fn test_scenario_missing_header_field() {
        let registry = ValidatorRegistry::new()
            .with_sheet(RequireFields::new(["A", "B", "C"]))
            .with_cell(FieldValidator::new("A", Required));

        let mut sheet = Sheet::new(0);
        sheet.push_row(Row::from_values(1, ["A", "B"]));
        sheet.push_row(Row::from_values(2, ["", "x"]));

        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(!session.valid());
        let messages = session.error_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].strategy, WriteStrategy::TextBox);
        assert_eq!(messages[0].row_index, None);
        assert_eq!(messages[0].column_index, None);
    }

    #[test]
    fn test_scenario_date_pattern() {
        let registry = ValidatorRegistry::new().with_cell(
            FieldValidator::new("enrollDate", LocalDate::pattern("yyyy-MM-dd").unwrap())
                .in_group("date"),
        );
        let sheet = student_sheet(&[["std1", "18", "2015-09-01"], ["std2", "18", "2015-13-01"]]);

        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(!session.valid());
        let messages = session.error_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].strategy, WriteStrategy::Comment);
        assert_eq!(messages[0].row_index, Some(3));
        assert_eq!(messages[0].column_index, Some(3));
    }

    #[test]
    fn test_scenario_dependent_group_skipped() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("name", Required).in_group("required"))
            .with_cell(
                FieldValidator::new("age", Integer::default())
                    .in_group("age")
                    .requires(["required"]),
            );

        let sheet = student_sheet(&[["", "not a number", "2015-09-01"]]);
        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(!session.valid());
        let messages = session.error_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].column_index, Some(1));
    }

    #[test]
    fn test_rerun_yields_identical_messages() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("name", Required).in_group("required"))
            .with_cell(FieldValidator::new("age", Integer::between(Some(0), None)))
            .with_cell(FieldValidator::new(
                "enrollDate",
                LocalDate::pattern("yyyy-MM-dd").unwrap(),
            ));

        let sheet = student_sheet(&[["", "-1", "bad"], ["bob", "x", "2015-09-01"], ["", "", ""]]);
        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(!session.valid());
        let first = session.error_messages().to_vec();
        assert!(!session.valid());
        assert_eq!(session.error_messages(), first.as_slice());

        let mut fresh = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        fresh.valid();
        assert_eq!(fresh.into_error_messages(), first);
    }

    #[test]
    fn test_messages_ordered_by_row() {
        let registry = ValidatorRegistry::new().with_cell(FieldValidator::new("name", Required));
        let sheet = student_sheet(&[["", "", ""], ["ok", "", ""], ["", "", ""]]);
        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        session.valid();
        let rows: Vec<Option<usize>> =
            session.error_messages().iter().map(|m| m.row_index).collect();
        assert_eq!(rows, vec![Some(2), Some(4)]);
    }

    #[test]
    fn test_valid_sheet_report() {
        let registry = ValidatorRegistry::new()
            .with_sheet(RequireFields::new(["name"]))
            .with_cell(FieldValidator::new("name", Required));
        let sheet = student_sheet(&[["std1", "18", "2015-09-01"]]);
        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(session.valid());

        let report = session.report();
        assert!(report.valid);
        assert_eq!(report.error_count, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorCount"], 0);
    }

    #[test]
    fn test_header_row_is_not_validated() {
        let registry =
            ValidatorRegistry::new().with_cell(FieldValidator::new("age", Integer::default()));
        let sheet = student_sheet(&[["bob", "18", ""]]);
        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(session.valid());
    }
}
