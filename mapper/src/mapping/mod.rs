//! Population of domain objects from validated rows, and the way back.
//!
//! An [`ObjectMapper`] creates one model per data row from a factory, then
//! walks the row's cells. For each non-blank cell the header field name is
//! offered to the setters in registration order and the first setter that
//! matches takes the cell. Cells no setter claims are ignored.
//!
//! An [`ObjectComposer`] goes the other way: it writes a header row from its
//! field list and one row per model, asking its extractors for each field.
//!
//! ```text
//! row ──▶ factory() ──▶ before hooks ──▶ cells × setters ──▶ after hooks ──▶ T
//! T   ──▶ fields × extractors ──▶ row
//! ```

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{MappingError, MappingResult, RulesResult};
use crate::models::{Cell, HeaderFields, Row, Sheet, SheetMeta};
use crate::validation::builtin::to_chrono_format;

// =============================================================================
// Field Setters
// =============================================================================

pub trait FieldSetter<T>: Send + Sync {
    fn matches(&self, field: &str) -> bool;

    /// Write the cell into the model. Only called for non-blank cells.
    fn set(&self, model: &mut T, field: &str, cell: &Cell) -> MappingResult<()>;
}

/// Setter for one named field, backed by a closure receiving the trimmed value.
pub struct FnFieldSetter<F> {
    field: String,
    apply: F,
}

impl<F> FnFieldSetter<F> {
    pub fn new(field: impl Into<String>, apply: F) -> Self {
        Self {
            field: field.into(),
            apply,
        }
    }
}

impl<T, F> FieldSetter<T> for FnFieldSetter<F>
where
    F: Fn(&mut T, &str) -> Result<(), String> + Send + Sync,
{
    fn matches(&self, field: &str) -> bool {
        self.field == field
    }

    fn set(&self, model: &mut T, field: &str, cell: &Cell) -> MappingResult<()> {
        let value = cell.value().unwrap_or("").trim();
        (self.apply)(model, value)
            .map_err(|message| MappingError::new(cell.row_index, cell.column_index, field, message))
    }
}

/// Parses the cell as a date before handing it to the closure.
pub struct LocalDateSetter<F> {
    field: String,
    pattern: String,
    format: String,
    apply: F,
}

impl<F> LocalDateSetter<F> {
    /// `pattern` uses the same `yyyy-MM-dd` form as the date validators.
    pub fn new(
        field: impl Into<String>,
        pattern: impl Into<String>,
        apply: F,
    ) -> RulesResult<Self> {
        let pattern = pattern.into();
        let format = to_chrono_format(&pattern)?;
        Ok(Self {
            field: field.into(),
            pattern,
            format,
            apply,
        })
    }
}

impl<T, F> FieldSetter<T> for LocalDateSetter<F>
where
    F: Fn(&mut T, NaiveDate) + Send + Sync,
{
    fn matches(&self, field: &str) -> bool {
        self.field == field
    }

    fn set(&self, model: &mut T, field: &str, cell: &Cell) -> MappingResult<()> {
        let value = cell.value().unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(value, &self.format).map_err(|_| {
            MappingError::new(
                cell.row_index,
                cell.column_index,
                field,
                format!("'{}' does not match {}", value, self.pattern),
            )
        })?;
        (self.apply)(model, date);
        Ok(())
    }
}

/// Claims every field and stores the raw value under the field name.
pub struct JsonFieldSetter;

impl FieldSetter<JsonModel> for JsonFieldSetter {
    fn matches(&self, _field: &str) -> bool {
        true
    }

    fn set(&self, model: &mut JsonModel, field: &str, cell: &Cell) -> MappingResult<()> {
        let value = cell.value().unwrap_or("").trim();
        model.insert(field.to_string(), Value::String(value.to_string()));
        Ok(())
    }
}

// =============================================================================
// Object Mapper
// =============================================================================

type Hook<T> = Box<dyn Fn(&mut T, &Row) + Send + Sync>;

pub struct ObjectMapper<T> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    setters: Vec<Box<dyn FieldSetter<T>>>,
    before_row: Vec<Hook<T>>,
    after_row: Vec<Hook<T>>,
}

impl<T> ObjectMapper<T> {
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            setters: Vec::new(),
            before_row: Vec::new(),
            after_row: Vec::new(),
        }
    }

    pub fn with_setter(mut self, setter: impl FieldSetter<T> + 'static) -> Self {
        self.setters.push(Box::new(setter));
        self
    }

    /// Shorthand for a [`FnFieldSetter`].
    pub fn with_field<F>(self, field: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut T, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.with_setter(FnFieldSetter::new(field, apply))
    }

    /// Runs on the fresh model before any cell is set.
    pub fn before_row(mut self, hook: impl Fn(&mut T, &Row) + Send + Sync + 'static) -> Self {
        self.before_row.push(Box::new(hook));
        self
    }

    /// Runs once every cell of the row has been set.
    pub fn after_row(mut self, hook: impl Fn(&mut T, &Row) + Send + Sync + 'static) -> Self {
        self.after_row.push(Box::new(hook));
        self
    }

    pub fn map_row(&self, row: &Row, fields: &HeaderFields) -> MappingResult<T> {
        let mut model = (self.factory)();
        for hook in &self.before_row {
            hook(&mut model, row);
        }

        for cell in row.cells() {
            if cell.is_blank() {
                continue;
            }
            let Some(field) = fields.field(cell.column_index) else {
                continue;
            };
            if let Some(setter) = self.setters.iter().find(|s| s.matches(field)) {
                setter.set(&mut model, field, cell)?;
            }
        }

        for hook in &self.after_row {
            hook(&mut model, row);
        }
        Ok(model)
    }

    /// Map every data row, stopping at the first rejected cell.
    pub fn map_sheet(&self, sheet: &Sheet, meta: &SheetMeta) -> MappingResult<Vec<T>> {
        let fields = HeaderFields::from_sheet(sheet, meta);
        sheet.data_rows(meta).map(|row| self.map_row(row, &fields)).collect()
    }
}

// =============================================================================
// JSON Model
// =============================================================================

/// A row as a JSON object keyed by header field name.
pub type JsonModel = Map<String, Value>;

impl ObjectMapper<JsonModel> {
    pub fn json() -> Self {
        ObjectMapper::new(Map::new).with_setter(JsonFieldSetter)
    }
}

// =============================================================================
// Field Extractors
// =============================================================================

pub trait FieldExtractor<T>: Send + Sync {
    fn matches(&self, field: &str) -> bool;

    /// Text for the cell; `None` leaves the cell absent.
    fn extract(&self, model: &T, field: &str) -> Option<String>;
}

/// Extractor for one named field, backed by a getter closure.
pub struct FnFieldExtractor<F> {
    field: String,
    get: F,
}

impl<F> FnFieldExtractor<F> {
    pub fn new(field: impl Into<String>, get: F) -> Self {
        Self {
            field: field.into(),
            get,
        }
    }
}

impl<T, F> FieldExtractor<T> for FnFieldExtractor<F>
where
    F: Fn(&T) -> Option<String> + Send + Sync,
{
    fn matches(&self, field: &str) -> bool {
        self.field == field
    }

    fn extract(&self, model: &T, _field: &str) -> Option<String> {
        (self.get)(model)
    }
}

/// Formats a date field with a `yyyy-MM-dd` style pattern.
pub struct LocalDateExtractor<F> {
    field: String,
    format: String,
    get: F,
}

impl<F> LocalDateExtractor<F> {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>, get: F) -> RulesResult<Self> {
        let format = to_chrono_format(&pattern.into())?;
        Ok(Self {
            field: field.into(),
            format,
            get,
        })
    }
}

impl<T, F> FieldExtractor<T> for LocalDateExtractor<F>
where
    F: Fn(&T) -> Option<NaiveDate> + Send + Sync,
{
    fn matches(&self, field: &str) -> bool {
        self.field == field
    }

    fn extract(&self, model: &T, _field: &str) -> Option<String> {
        (self.get)(model).map(|date| date.format(&self.format).to_string())
    }
}

// =============================================================================
// Object Composer
// =============================================================================

/// Writes models back into a sheet: header on row 1, model `i` on row `i + 2`.
pub struct ObjectComposer<T> {
    fields: Vec<String>,
    extractors: Vec<Box<dyn FieldExtractor<T>>>,
}

impl<T> ObjectComposer<T> {
    /// `fields` fixes the header and the column order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            extractors: Vec::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: impl FieldExtractor<T> + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Shorthand for a [`FnFieldExtractor`].
    pub fn with_field<F>(self, field: impl Into<String>, get: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.with_extractor(FnFieldExtractor::new(field, get))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn compose_row(&self, model: &T, index: usize) -> Row {
        let mut row = Row::new(index);
        for (i, field) in self.fields.iter().enumerate() {
            let value = self
                .extractors
                .iter()
                .find(|e| e.matches(field))
                .and_then(|e| e.extract(model, field))
                .filter(|v| !v.is_empty());
            row.cells.push(Cell::new(index, i + 1, value));
        }
        row
    }

    pub fn compose(&self, models: &[T], sheet_index: usize) -> Sheet {
        let mut sheet = Sheet::new(sheet_index);
        sheet.push_row(Row::from_values(1, self.fields.iter().cloned()));
        for (i, model) in models.iter().enumerate() {
            sheet.push_row(self.compose_row(model, i + 2));
        }
        sheet
    }
}
