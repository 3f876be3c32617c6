//! CSV loader for batch quoting.
//!
//! ## CSV Format
//!
//! One quote per row. The `widget` column picks the calculator; every other
//! column is a selection slot, named exactly as on the command line
//! (`--set paper-type=premium`). Empty cells leave the slot unset, so the
//! calculator's default applies. Column order does not matter.
//!
//! | Column        | Required | Notes                                                    |
//! |---------------|----------|----------------------------------------------------------|
//! | `widget`      | yes      | `generic`, `childrens-book`, `comic-book`, `quick-quote` |
//! | any slot name | no       | e.g. `quantity`, `paper-type`, `binding`, `unit-price`   |
//!
//! ```csv
//! widget,quantity,product-type,paper-type,binding,pages
//! generic,500,business-cards,premium,,
//! comic-book,100,,,perfect,48
//! ```
//!
//! A row that cannot be read is reported with its 1-based row number
//! (header excluded) and does not stop the rest of the file.

use std::path::Path;

use print_core::models::Widget;
use print_core::resolver::RawSelection;

pub const WIDGET_COLUMN: &str = "widget";

#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The header row itself is unreadable.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("missing required column 'widget'")]
    MissingWidgetColumn,

    #[error("CSV parse error on row {row}: {message}")]
    Row { row: usize, message: String },

    #[error("unrecognised widget '{widget}' on row {row}")]
    UnknownWidget { widget: String, row: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// 1-based, header excluded.
    pub row: usize,
    pub widget: Widget,
    pub raw: RawSelection,
}

/// Rows that loaded, and the errors of those that did not.
#[derive(Debug, Default)]
pub struct BatchLoad {
    pub rows: Vec<BatchRow>,
    pub errors: Vec<CsvLoadError>,
}

fn convert_record(
    headers: &csv::StringRecord,
    widget_index: usize,
    record: &csv::StringRecord,
    row: usize,
) -> Result<BatchRow, CsvLoadError> {
    let widget_cell = record.get(widget_index).unwrap_or_default();
    let widget = Widget::parse(widget_cell).ok_or_else(|| CsvLoadError::UnknownWidget {
        widget: widget_cell.to_string(),
        row,
    })?;

    let raw = headers
        .iter()
        .zip(record.iter())
        .enumerate()
        .filter(|(idx, (_, value))| *idx != widget_index && !value.is_empty())
        .map(|(_, (slot, value))| (slot.to_string(), value.to_string()))
        .collect();

    Ok(BatchRow { row, widget, raw })
}

/// Parses batch CSV text. Only a missing or unreadable header fails the
/// whole load.
pub fn load_from_str(input: &str) -> Result<BatchLoad, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let widget_index = headers
        .iter()
        .position(|h| h == WIDGET_COLUMN)
        .ok_or(CsvLoadError::MissingWidgetColumn)?;

    let mut load = BatchLoad::default();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let converted = result
            .map_err(|e| CsvLoadError::Row {
                row,
                message: e.to_string(),
            })
            .and_then(|record| convert_record(&headers, widget_index, &record, row));

        match converted {
            Ok(batch_row) => load.rows.push(batch_row),
            Err(e) => load.errors.push(e),
        }
    }
    Ok(load)
}

pub fn load_from_file(path: &Path) -> Result<BatchLoad, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}
