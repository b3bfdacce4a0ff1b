//! Cell validators.
//!
//! A [`FieldValidator`] binds a [`CellCheck`] to a header field, a group and
//! an error message:
//!
//! ```rust,ignore
//! FieldValidator::new("enrollDate", LocalDate::pattern("yyyy-MM-dd")?)
//!     .in_group("date")
//!     .requires(["required"])
//!     .message("enroll date must look like 2015-09-01");
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeSet;

use crate::error::{RulesError, RulesResult};
use crate::models::{Cell, SheetMeta, WriteStrategy};
use crate::validation::{CellValidator, DependencyValidator, Outcome};

use super::datetime::to_chrono_format;

// =============================================================================
// Check trait + field binding
// =============================================================================

/// The rule itself, independent of which field it is bound to.
pub trait CellCheck: Send + Sync {
    /// Evaluate a non-blank value (already trimmed).
    fn check(&self, value: &str) -> Outcome;

    /// Message used when none is configured.
    fn default_message(&self) -> String;

    /// Whether blank cells are evaluated (with `""`) instead of skipped.
    fn checks_blank(&self) -> bool {
        false
    }
}

/// A [`CellCheck`] bound to a header field.
pub struct FieldValidator<C> {
    field: String,
    group: String,
    depends_on: BTreeSet<String>,
    message: String,
    strategy: WriteStrategy,
    check: C,
}

impl<C: CellCheck> FieldValidator<C> {
    /// The group defaults to the field name.
    pub fn new(field: impl Into<String>, check: C) -> Self {
        let field = field.into();
        Self {
            group: field.clone(),
            field,
            depends_on: BTreeSet::new(),
            message: check.default_message(),
            strategy: WriteStrategy::Comment,
            check,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn requires<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn strategy(mut self, strategy: WriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl<C: CellCheck> DependencyValidator for FieldValidator<C> {
    fn group(&self) -> &str {
        &self.group
    }

    fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    fn error_message(&self) -> &str {
        &self.message
    }

    fn write_strategy(&self) -> WriteStrategy {
        self.strategy
    }
}

impl<C: CellCheck> CellValidator for FieldValidator<C> {
    fn field(&self) -> &str {
        &self.field
    }

    fn validate(&self, cell: &Cell, _meta: &SheetMeta) -> Outcome {
        let value = cell.value().map(str::trim).unwrap_or("");
        if value.is_empty() && !self.check.checks_blank() {
            return Outcome::Skip;
        }
        self.check.check(value)
    }
}

// =============================================================================
// Checks
// =============================================================================

/// Value must be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl CellCheck for Required {
    fn check(&self, value: &str) -> Outcome {
        (!value.is_empty()).into()
    }

    fn default_message(&self) -> String {
        "value is required".into()
    }

    fn checks_blank(&self) -> bool {
        true
    }
}

/// Value must parse as a date with the given pattern.
#[derive(Debug, Clone)]
pub struct LocalDate {
    pattern: String,
    format: String,
}

impl LocalDate {
    pub fn pattern(pattern: impl Into<String>) -> RulesResult<Self> {
        let pattern = pattern.into();
        let format = to_chrono_format(&pattern)?;
        Ok(Self { pattern, format })
    }
}

impl CellCheck for LocalDate {
    fn check(&self, value: &str) -> Outcome {
        NaiveDate::parse_from_str(value, &self.format).is_ok().into()
    }

    fn default_message(&self) -> String {
        format!("date format should be: {}", self.pattern)
    }
}

/// Value must parse as a date and time with the given pattern.
#[derive(Debug, Clone)]
pub struct LocalDateTime {
    pattern: String,
    format: String,
}

impl LocalDateTime {
    pub fn pattern(pattern: impl Into<String>) -> RulesResult<Self> {
        let pattern = pattern.into();
        let format = to_chrono_format(&pattern)?;
        Ok(Self { pattern, format })
    }
}

impl CellCheck for LocalDateTime {
    fn check(&self, value: &str) -> Outcome {
        NaiveDateTime::parse_from_str(value, &self.format).is_ok().into()
    }

    fn default_message(&self) -> String {
        format!("date time format should be: {}", self.pattern)
    }
}

/// Whole value must match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> RulesResult<Self> {
        let source = pattern.into();
        let regex =
            Regex::new(&format!("^(?:{})$", source)).map_err(|e| RulesError::InvalidPattern {
                pattern: source.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { source, regex })
    }
}

impl CellCheck for Pattern {
    fn check(&self, value: &str) -> Outcome {
        self.regex.is_match(value).into()
    }

    fn default_message(&self) -> String {
        format!("value should match: {}", self.source)
    }
}

/// Value must be an integer, optionally within bounds (inclusive).
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Integer {
    pub fn between(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }
}

impl CellCheck for Integer {
    fn check(&self, value: &str) -> Outcome {
        match value.parse::<i64>() {
            Ok(n) => {
                (self.min.map_or(true, |m| n >= m) && self.max.map_or(true, |m| n <= m)).into()
            }
            Err(_) => Outcome::Fail,
        }
    }

    fn default_message(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("should be an integer between {} and {}", min, max),
            (Some(min), None) => format!("should be an integer >= {}", min),
            (None, Some(max)) => format!("should be an integer <= {}", max),
            (None, None) => "should be an integer".into(),
        }
    }
}

/// Value must be a finite decimal number.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl CellCheck for Number {
    fn check(&self, value: &str) -> Outcome {
        value.parse::<f64>().map_or(false, f64::is_finite).into()
    }

    fn default_message(&self) -> String {
        "should be a number".into()
    }
}

/// Value must be a recognised boolean word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl Boolean {
    pub fn parse(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "oui" => Some(true),
            "false" | "no" | "n" | "0" | "non" => Some(false),
            _ => None,
        }
    }
}

impl CellCheck for Boolean {
    fn check(&self, value: &str) -> Outcome {
        Self::parse(value).is_some().into()
    }

    fn default_message(&self) -> String {
        "should be true or false".into()
    }
}

/// Value must be one of a fixed set.
#[derive(Debug, Clone)]
pub struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl CellCheck for OneOf {
    fn check(&self, value: &str) -> Outcome {
        self.values.iter().any(|v| v == value).into()
    }

    fn default_message(&self) -> String {
        format!("should be one of: {}", self.values.join(", "))
    }
}

/// Character count within bounds (inclusive).
#[derive(Debug, Clone, Copy, Default)]
pub struct Length {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Length {
    pub fn between(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }
}

impl CellCheck for Length {
    fn check(&self, value: &str) -> Outcome {
        let n = value.chars().count();
        (self.min.map_or(true, |m| n >= m) && self.max.map_or(true, |m| n <= m)).into()
    }

    fn default_message(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("length should be between {} and {}", min, max),
            (Some(min), None) => format!("length should be at least {}", min),
            (None, Some(max)) => format!("length should be at most {}", max),
            (None, None) => "invalid length".into(),
        }
    }
}

/// Ad-hoc check from a closure.
pub struct FnCellCheck<F> {
    check: F,
    message: String,
}

impl<F> FnCellCheck<F>
where
    F: Fn(&str) -> Outcome + Send + Sync,
{
    pub fn new(message: impl Into<String>, check: F) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl<F> CellCheck for FnCellCheck<F>
where
    F: Fn(&str) -> Outcome + Send + Sync,
{
    fn check(&self, value: &str) -> Outcome {
        (self.check)(value)
    }

    fn default_message(&self) -> String {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: &str) -> Cell {
        Cell::new(2, 1, if value.is_empty() { None } else { Some(value.to_string()) })
    }

    fn run<C: CellCheck>(check: C, value: &str) -> Outcome {
        FieldValidator::new("f", check).validate(&cell(value), &SheetMeta::default())
    }

    #[test]
    fn test_local_date() {
        let check = || LocalDate::pattern("yyyy-MM-dd").unwrap();
        assert_eq!(run(check(), "2015-09-01"), Outcome::Pass);
        assert_eq!(run(check(), "2015-13-01"), Outcome::Fail);
        assert_eq!(run(check(), "01/09/2015"), Outcome::Fail);
    }

    #[test]
    fn test_local_date_time() {
        let check = || LocalDateTime::pattern("yyyy-MM-dd HH:mm:ss").unwrap();
        assert_eq!(run(check(), "2015-09-01 08:30:00"), Outcome::Pass);
        assert_eq!(run(check(), "2015-09-01"), Outcome::Fail);
    }

    #[test]
    fn test_blank_is_skipped_except_required() {
        assert_eq!(run(Integer::default(), ""), Outcome::Skip);
        assert_eq!(run(LocalDate::pattern("yyyy-MM-dd").unwrap(), "   "), Outcome::Skip);
        assert_eq!(run(Required, ""), Outcome::Fail);
        assert_eq!(run(Required, "x"), Outcome::Pass);
    }

    #[test]
    fn test_pattern_matches_whole_value() {
        let check = || Pattern::new("[0-9]{4}").unwrap();
        assert_eq!(run(check(), "1234"), Outcome::Pass);
        assert_eq!(run(check(), "12345"), Outcome::Fail);
        assert!(Pattern::new("(").is_err());
    }

    #[test]
    fn test_integer_bounds() {
        let check = Integer::between(Some(0), Some(120));
        assert_eq!(run(check, "18"), Outcome::Pass);
        assert_eq!(run(check, "-1"), Outcome::Fail);
        assert_eq!(run(check, "abc"), Outcome::Fail);
        assert_eq!(check.default_message(), "should be an integer between 0 and 120");
    }

    #[test]
    fn test_number_boolean_one_of_length() {
        assert_eq!(run(Number, "3.14"), Outcome::Pass);
        assert_eq!(run(Number, "NaN"), Outcome::Fail);
        assert_eq!(run(Boolean, "Oui"), Outcome::Pass);
        assert_eq!(run(Boolean, "maybe"), Outcome::Fail);
        assert_eq!(run(OneOf::new(["M", "F"]), "F"), Outcome::Pass);
        assert_eq!(run(OneOf::new(["M", "F"]), "X"), Outcome::Fail);
        assert_eq!(run(Length::between(None, Some(3)), "abcd"), Outcome::Fail);
    }

    #[test]
    fn test_closure_check_can_skip() {
        let check = FnCellCheck::new("must be even", |v: &str| match v.parse::<i64>() {
            Ok(n) => (n % 2 == 0).into(),
            Err(_) => Outcome::Skip,
        });
        let validator = FieldValidator::new("n", check);
        let meta = SheetMeta::default();
        assert_eq!(validator.validate(&cell("4"), &meta), Outcome::Pass);
        assert_eq!(validator.validate(&cell("3"), &meta), Outcome::Fail);
        assert_eq!(validator.validate(&cell("n/a"), &meta), Outcome::Skip);
        assert_eq!(validator.error_message(), "must be even");
    }

    #[test]
    fn test_builder_defaults() {
        let validator = FieldValidator::new("age", Required);
        assert_eq!(validator.group(), "age");
        assert_eq!(validator.write_strategy(), WriteStrategy::Comment);
        assert!(validator.depends_on().is_empty());

        let validator = validator
            .in_group("required")
            .requires(["a", "b"])
            .strategy(WriteStrategy::TextBox);
        assert_eq!(validator.group(), "required");
        assert_eq!(validator.depends_on().len(), 2);
        assert_eq!(validator.write_strategy(), WriteStrategy::TextBox);
    }
}
