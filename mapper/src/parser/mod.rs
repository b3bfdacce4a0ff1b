//! CSV codec adapter with encoding and delimiter auto-detection.
//!
//! Flattens a CSV file into the plain [`Sheet`] value tree the validation
//! engine consumes. Line 1 becomes row 1; columns are numbered from 1. Rows
//! shorter than the widest row are padded with absent cells.

use std::path::Path;

use crate::error::{SheetError, SheetResult};
use crate::logs::{log_info, log_success};
use crate::models::{Cell, Row, Sheet};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub sheet: Sheet,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the named encoding.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SheetResult<String> {
    let Some(codec) = encoding_rs::Encoding::for_label(encoding.trim().as_bytes()) else {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    };

    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors && codec == encoding_rs::UTF_8 {
        return Err(SheetError::EncodingError(format!("content is not valid {}", encoding)));
    }
    Ok(text.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a sheet with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use sheetmapper::parser::parse_sheet;
///
/// let sheet = parse_sheet("name;age\nAlice;30", ';', 0).unwrap();
/// assert_eq!(sheet.row(2).unwrap().cell(1).unwrap().value(), Some("Alice"));
/// ```
pub fn parse_sheet(content: &str, delimiter: char, sheet_index: usize) -> SheetResult<Sheet> {
    if content.trim().is_empty() {
        return Err(SheetError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(SheetError::ParseError {
            line: 0,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SheetError::ParseError {
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        records.push(values);
    }

    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    let mut sheet = Sheet::new(sheet_index);

    for (i, values) in records.into_iter().enumerate() {
        let index = i + 1;
        let mut row = Row::new(index);
        for col in 0..width {
            let value = values.get(col).filter(|v| !v.is_empty()).cloned();
            row.cells.push(Cell::new(index, col + 1, value));
        }
        sheet.push_row(row);
    }

    Ok(sheet)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SheetResult<ParseResult> {
    if bytes.is_empty() {
        return Err(SheetError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let sheet = parse_sheet(&content, delimiter, 0)?;

    log_success(format!("Detected encoding: {}", encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(delimiter)));
    log_info(format!("Read {} rows", sheet.rows.len()));

    Ok(ParseResult {
        sheet,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection; the sheet is named after the file.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> SheetResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let mut result = parse_bytes_auto(&bytes)?;
    result.sheet.name = path.file_stem().and_then(|s| s.to_str()).map(String::from);
    Ok(result)
}

/// Parse a CSV file with an explicit delimiter; the encoding is still detected.
pub fn parse_file(path: &Path, delimiter: char) -> SheetResult<Sheet> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(SheetError::EmptyFile);
    }
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    let mut sheet = parse_sheet(&content, delimiter, 0)?;
    sheet.name = path.file_stem().and_then(|s| s.to_str()).map(String::from);
    Ok(sheet)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
