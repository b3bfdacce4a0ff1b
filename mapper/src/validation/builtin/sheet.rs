//! Sheet validators. These look at the header row; when one fails, no data
//! row is validated at all.

use crate::models::{HeaderFields, Sheet, SheetMeta};
use crate::validation::SheetValidator;

/// The header row must contain every listed field.
///
/// Cell validators and field setters are matched by field name, so a
/// missing column would otherwise make them silently do nothing.
#[derive(Debug, Clone)]
pub struct RequireFields {
    fields: Vec<String>,
    message: String,
}

impl RequireFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let message = format!("sheet must contain the fields: {}", fields.join(", "));
        Self { fields, message }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Required fields absent from the header row.
    pub fn missing(&self, sheet: &Sheet, meta: &SheetMeta) -> Vec<&str> {
        let header = HeaderFields::from_sheet(sheet, meta);
        self.fields
            .iter()
            .filter(|f| !header.contains(f))
            .map(String::as_str)
            .collect()
    }
}

impl SheetValidator for RequireFields {
    fn error_message(&self) -> &str {
        &self.message
    }

    fn validate(&self, sheet: &Sheet, meta: &SheetMeta) -> bool {
        self.missing(sheet, meta).is_empty()
    }
}

/// The header row may only contain the listed fields.
#[derive(Debug, Clone)]
pub struct FieldScope {
    fields: Vec<String>,
    message: String,
}

impl FieldScope {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let message = format!("sheet may only contain the fields: {}", fields.join(", "));
        Self { fields, message }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl SheetValidator for FieldScope {
    fn error_message(&self) -> &str {
        &self.message
    }

    fn validate(&self, sheet: &Sheet, meta: &SheetMeta) -> bool {
        HeaderFields::from_sheet(sheet, meta)
            .names()
            .iter()
            .all(|name| self.fields.contains(name))
    }
}

/// Ad-hoc sheet rule from a closure.
pub struct FnSheetValidator<F> {
    message: String,
    check: F,
}

impl<F> FnSheetValidator<F>
where
    F: Fn(&Sheet, &SheetMeta) -> bool + Send + Sync,
{
    pub fn new(message: impl Into<String>, check: F) -> Self {
        Self {
            message: message.into(),
            check,
        }
    }
}

impl<F> SheetValidator for FnSheetValidator<F>
where
    F: Fn(&Sheet, &SheetMeta) -> bool + Send + Sync,
{
    fn error_message(&self) -> &str {
        &self.message
    }

    fn validate(&self, sheet: &Sheet, meta: &SheetMeta) -> bool {
        (self.check)(sheet, meta)
    }
}
