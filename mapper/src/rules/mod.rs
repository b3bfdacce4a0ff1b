//! Declarative rule files.
//!
//! A rule file is JSON, checked against the embedded Draft 7 schema
//! (`schemas/validation-rules.json`) before it is deserialized and turned
//! into a [`ValidatorRegistry`].
//!
//! # Example
//!
//! ```json
//! {
//!   "headerRow": 1,
//!   "dataStartRow": 2,
//!   "sheet": [{ "type": "requireFields", "fields": ["name", "age", "enrollDate"] }],
//!   "cells": [
//!     { "type": "required", "field": "name", "group": "required" },
//!     { "type": "integer", "field": "age", "min": 0, "dependsOn": ["required"] },
//!     { "type": "localDate", "field": "enrollDate", "pattern": "yyyy-MM-dd" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{RulesError, RulesResult, SheetResult};
use crate::models::{SheetMeta, WriteStrategy};
use crate::validation::builtin::{
    Boolean, CellCheck, FieldScope, FieldValidator, Integer, Length, LocalDate, LocalDateTime,
    Number, OneOf, Pattern, RequireFields, RequireOneOf, RequireTogether, Required, RowCheck,
    RowRule,
};
use crate::validation::{CellValidator, RowValidator, SheetValidator, ValidatorRegistry};

const RULES_SCHEMA: &str = include_str!("../../schemas/validation-rules.json");

/// The embedded JSON Schema for rule files.
pub fn schema() -> &'static str {
    RULES_SCHEMA
}

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Rule File Model
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_start_row: Option<usize>,
    #[serde(default)]
    pub sheet: Vec<SheetRule>,
    #[serde(default)]
    pub rows: Vec<RowRuleConfig>,
    #[serde(default)]
    pub cells: Vec<CellRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SheetRule {
    RequireFields {
        fields: Vec<String>,
        #[serde(default)]
        message: Option<String>,
    },
    FieldScope {
        fields: Vec<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

/// Settings shared by row and cell rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<WriteStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowRuleConfig {
    pub fields: Vec<String>,
    #[serde(flatten)]
    pub options: RuleOptions,
    #[serde(flatten)]
    pub kind: RowKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RowKind {
    RequireOneOf,
    RequireTogether,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellRuleConfig {
    pub field: String,
    #[serde(flatten)]
    pub options: RuleOptions,
    #[serde(flatten)]
    pub kind: CellKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellKind {
    Required,
    LocalDate {
        pattern: String,
    },
    LocalDateTime {
        pattern: String,
    },
    Regex {
        pattern: String,
    },
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Number,
    Boolean,
    OneOf {
        values: Vec<String>,
    },
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
}

// =============================================================================
// Loading
// =============================================================================

impl RuleSet {
    /// Parse and schema-check a rule file's text.
    pub fn from_json(text: &str) -> RulesResult<Self> {
        let data: Value = serde_json::from_str(text)?;
        let schema: Value = serde_json::from_str(RULES_SCHEMA)?;
        validate(&schema, &data).map_err(|errors| RulesError::SchemaError { errors })?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> RulesResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Header row defaults to 1; data starts on the row after the header.
    pub fn sheet_meta(&self) -> SheetResult<SheetMeta> {
        let header = self.header_row.unwrap_or(1);
        let data_start = self.data_start_row.unwrap_or(header + 1);
        SheetMeta::new(header, data_start)
    }

    /// Build the validators described by this rule set.
    pub fn to_registry(&self) -> RulesResult<ValidatorRegistry> {
        let mut registry = ValidatorRegistry::new();

        for rule in &self.sheet {
            registry.register_sheet(sheet_validator(rule));
        }
        for rule in &self.rows {
            registry.register_row(row_validator(rule));
        }
        for rule in &self.cells {
            registry.register_cell(cell_validator(rule)?);
        }

        Ok(registry)
    }
}

fn sheet_validator(rule: &SheetRule) -> Box<dyn SheetValidator> {
    match rule {
        SheetRule::RequireFields { fields, message } => {
            let v = RequireFields::new(fields.iter().cloned());
            match message {
                Some(m) => Box::new(v.message(m.clone())),
                None => Box::new(v),
            }
        }
        SheetRule::FieldScope { fields, message } => {
            let v = FieldScope::new(fields.iter().cloned());
            match message {
                Some(m) => Box::new(v.message(m.clone())),
                None => Box::new(v),
            }
        }
    }
}

fn row_validator(rule: &RowRuleConfig) -> Box<dyn RowValidator> {
    let fields = rule.fields.iter().cloned();
    match rule.kind {
        RowKind::RequireOneOf => bind_row(RequireOneOf::new(fields), &rule.options),
        RowKind::RequireTogether => bind_row(RequireTogether::new(fields), &rule.options),
    }
}

fn bind_row<C: RowCheck + 'static>(check: C, options: &RuleOptions) -> Box<dyn RowValidator> {
    let mut rule = RowRule::new(check).requires(options.depends_on.iter().cloned());
    if let Some(group) = &options.group {
        rule = rule.in_group(group.clone());
    }
    if let Some(message) = &options.message {
        rule = rule.message(message.clone());
    }
    if let Some(strategy) = options.strategy {
        rule = rule.strategy(strategy);
    }
    Box::new(rule)
}

fn cell_validator(rule: &CellRuleConfig) -> RulesResult<Box<dyn CellValidator>> {
    let field = rule.field.as_str();
    let options = &rule.options;
    Ok(match &rule.kind {
        CellKind::Required => bind_cell(field, Required, options),
        CellKind::LocalDate { pattern } => {
            bind_cell(field, LocalDate::pattern(pattern.clone())?, options)
        }
        CellKind::LocalDateTime { pattern } => {
            bind_cell(field, LocalDateTime::pattern(pattern.clone())?, options)
        }
        CellKind::Regex { pattern } => bind_cell(field, Pattern::new(pattern.clone())?, options),
        CellKind::Integer { min, max } => bind_cell(field, Integer::between(*min, *max), options),
        CellKind::Number => bind_cell(field, Number, options),
        CellKind::Boolean => bind_cell(field, Boolean, options),
        CellKind::OneOf { values } => bind_cell(field, OneOf::new(values.iter().cloned()), options),
        CellKind::Length { min, max } => bind_cell(field, Length::between(*min, *max), options),
    })
}

fn bind_cell<C: CellCheck + 'static>(
    field: &str,
    check: C,
    options: &RuleOptions,
) -> Box<dyn CellValidator> {
    let mut validator =
        FieldValidator::new(field, check).requires(options.depends_on.iter().cloned());
    if let Some(group) = &options.group {
        validator = validator.in_group(group.clone());
    }
    if let Some(message) = &options.message {
        validator = validator.message(message.clone());
    }
    if let Some(strategy) = options.strategy {
        validator = validator.strategy(strategy);
    }
    Box::new(validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Row, Sheet};
    use crate::validation::ValidationSession;
    use std::io::Write;

    const STUDENT_RULES: &str = r#"{
        "sheet": [{ "type": "requireFields", "fields": ["name", "age", "enrollDate"] }],
        "cells": [
            { "type": "required", "field": "name", "group": "required" },
            {
                "type": "integer", "field": "age", "min": 0, "max": 150,
                "dependsOn": ["required"], "message": "bad age"
            },
            {
                "type": "localDate", "field": "enrollDate", "pattern": "yyyy-MM-dd",
                "group": "date", "strategy": "text_box"
            }
        ]
    }"#;

    #[test]
    fn test_embedded_schema_is_valid_json() {
        let schema: Value = serde_json::from_str(schema()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn test_load_rules() {
        let rules = RuleSet::from_json(STUDENT_RULES).unwrap();
        assert_eq!(rules.sheet.len(), 1);
        assert_eq!(rules.cells.len(), 3);
        assert!(matches!(rules.cells[1].kind, CellKind::Integer { min: Some(0), max: Some(150) }));
        assert_eq!(rules.cells[1].options.depends_on, vec!["required"]);
        assert_eq!(rules.cells[2].options.strategy, Some(WriteStrategy::TextBox));
        assert_eq!(rules.sheet_meta().unwrap(), SheetMeta::default());
    }

    #[test]
    fn test_registry_from_rules() {
        let registry = RuleSet::from_json(STUDENT_RULES).unwrap().to_registry().unwrap();
        let groups: Vec<&str> = registry.groups().iter().map(|g| g.name()).collect();
        assert_eq!(groups, vec!["required", "age", "date"]);
        assert_eq!(registry.sheet_validators().len(), 1);
    }

    #[test]
    fn test_rules_drive_a_session() {
        let registry = RuleSet::from_json(STUDENT_RULES).unwrap().to_registry().unwrap();
        let mut sheet = Sheet::new(0);
        sheet.push_row(Row::from_values(1, ["name", "age", "enrollDate"]));
        sheet.push_row(Row::from_values(2, ["std1", "-3", "2015-09-01"]));
        sheet.push_row(Row::from_values(3, ["", "-3", "2015-13-01"]));

        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(!session.valid());
        let texts: Vec<(usize, &str)> = session
            .error_messages()
            .iter()
            .map(|m| (m.row_index.unwrap_or(0), m.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![
                (2, "bad age"),
                (3, "value is required"),
                (3, "date format should be: yyyy-MM-dd"),
            ]
        );
    }

    #[test]
    fn test_schema_violation() {
        let json = r#"{ "cells": [{ "type": "localDate", "field": "d" }] }"#;
        let err = RuleSet::from_json(json).unwrap_err();
        match err {
            RulesError::SchemaError { errors } => assert!(!errors.is_empty()),
            other => panic!("Expected schema error, got {:?}", other),
        }

        assert!(matches!(
            RuleSet::from_json(r#"{ "cells": [{ "type": "nope", "field": "d" }] }"#),
            Err(RulesError::SchemaError { .. })
        ));
    }

    #[test]
    fn test_invalid_regex_reported() {
        let json = r#"{ "cells": [{ "type": "regex", "field": "code", "pattern": "(" }] }"#;
        let rules = RuleSet::from_json(json).unwrap();
        assert!(matches!(rules.to_registry(), Err(RulesError::InvalidPattern { .. })));
    }

    #[test]
    fn test_cell_rule_on_missing_column_never_fires() {
        let json = r#"{ "cells": [{ "type": "required", "field": "nickname" }] }"#;
        let registry = RuleSet::from_json(json).unwrap().to_registry().unwrap();

        let mut sheet = Sheet::new(0);
        sheet.push_row(Row::from_values(1, ["name", "age"]));
        sheet.push_row(Row::from_values(2, ["", ""]));

        let mut session = ValidationSession::new(&registry, &sheet, SheetMeta::default()).unwrap();
        assert!(session.valid());
        assert!(session.error_messages().is_empty());
    }

    #[test]
    fn test_row_rules() {
        let rules = RuleSet::from_json(
            r#"{ "rows": [{
                "type": "requireOneOf", "fields": ["email", "phone"], "group": "contact"
            }] }"#,
        )
        .unwrap();
        let registry = rules.to_registry().unwrap();
        assert_eq!(registry.group("contact").unwrap().row_validators().len(), 1);
    }

    #[test]
    fn test_custom_rows_meta() {
        let rules = RuleSet::from_json(r#"{ "headerRow": 2, "dataStartRow": 4 }"#).unwrap();
        assert_eq!(rules.sheet_meta().unwrap(), SheetMeta::new(2, 4).unwrap());

        let rules = RuleSet::from_json(r#"{ "headerRow": 3 }"#).unwrap();
        assert_eq!(rules.sheet_meta().unwrap().data_start_row_index, 4);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STUDENT_RULES.as_bytes()).unwrap();
        let rules = RuleSet::from_file(file.path()).unwrap();
        assert_eq!(rules.cells.len(), 3);
    }
}
