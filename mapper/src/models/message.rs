use serde::{Deserialize, Serialize};
use std::fmt;

/// How the annotator should present an error message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    /// A note anchored to the offending cell.
    #[default]
    Comment,
    /// A floating shape near the sheet or the offending row.
    TextBox,
}

impl WriteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::TextBox => "text_box",
        }
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation failure anchored to a sheet, row or cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub strategy: WriteStrategy,
    pub text: String,
    pub sheet_index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column_index: Option<usize>,
}

impl ErrorMessage {
    pub fn sheet(strategy: WriteStrategy, text: impl Into<String>, sheet_index: usize) -> Self {
        Self {
            strategy,
            text: text.into(),
            sheet_index,
            row_index: None,
            column_index: None,
        }
    }

    pub fn row(
        strategy: WriteStrategy,
        text: impl Into<String>,
        sheet_index: usize,
        row_index: usize,
    ) -> Self {
        Self {
            row_index: Some(row_index),
            ..Self::sheet(strategy, text, sheet_index)
        }
    }

    pub fn cell(
        strategy: WriteStrategy,
        text: impl Into<String>,
        sheet_index: usize,
        row_index: usize,
        column_index: usize,
    ) -> Self {
        Self {
            row_index: Some(row_index),
            column_index: Some(column_index),
            ..Self::sheet(strategy, text, sheet_index)
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row_index, self.column_index) {
            (Some(row), Some(col)) => write!(
                f,
                "Sheet {}, row {}, column {}: {}",
                self.sheet_index, row, col, self.text
            ),
            (Some(row), None) => {
                write!(f, "Sheet {}, row {}: {}", self.sheet_index, row, self.text)
            }
            _ => write!(f, "Sheet {}: {}", self.sheet_index, self.text),
        }
    }
}
