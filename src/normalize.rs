//! Input normalization.
//!
//! Every accepted payload shape is resolved exactly once into a [`RawInput`]
//! and then coerced into the canonical [`Table`]:
//!
//! ```text
//! mapping of name -> list      columns in mapping order
//! mapping of name -> scalar    `label` / `value` columns in key order
//! list of scalars              single anonymous column
//! list of mappings             row records, keys unioned in first-seen order
//! list of lists                positional rows, columns `0`, `1`, ...
//! text                         JSON first, then comma-separated with a header line
//! ```

use crate::csv_reader;
use crate::data::{Column, Scalar, Table};
use crate::error::{ChartError, ChartResult};
use serde_json::{Map, Value};
use tracing::debug;

/// Column names used when a mapping of scalars is turned into a table.
pub const LABEL_COLUMN: &str = "label";
pub const VALUE_COLUMN: &str = "value";

/// Untyped payload as received from the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Sequence(Vec<Value>),
    Mapping(Map<String, Value>),
}

impl TryFrom<Value> for RawInput {
    type Error = ChartError;

    fn try_from(value: Value) -> ChartResult<Self> {
        match value {
            Value::String(s) => Ok(RawInput::Text(s)),
            Value::Array(items) => Ok(RawInput::Sequence(items)),
            Value::Object(map) => Ok(RawInput::Mapping(map)),
            other => Err(ChartError::data_format(format!(
                "data must be a string (JSON or CSV), a list, or a mapping; got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::Text(text.to_string())
    }
}

impl From<String> for RawInput {
    fn from(text: String) -> Self {
        RawInput::Text(text)
    }
}

/// Convert any accepted payload into a [`Table`].
pub fn normalize(raw: RawInput) -> ChartResult<Table> {
    match raw {
        RawInput::Mapping(map) => from_mapping(map),
        RawInput::Sequence(items) => from_sequence(items),
        RawInput::Text(text) => from_text(&text),
    }
}

fn from_text(text: &str) -> ChartResult<Table> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => {
            debug!(keys = map.len(), "text data parsed as JSON mapping");
            from_mapping(map)
        }
        Ok(Value::Array(items)) => {
            debug!(items = items.len(), "text data parsed as JSON list");
            from_sequence(items)
        }
        Ok(value) => csv_reader::parse_delimited(text).map_err(|err| match err {
            ChartError::DataFormat(reason) => ChartError::data_format(format!(
                "text parsed as a bare JSON {} and not as delimited text ({})",
                json_type_name(&value),
                reason
            )),
            err => err,
        }),
        Err(json_err) => {
            debug!(error = %json_err, "text data is not JSON, trying delimited text");
            csv_reader::parse_delimited(text).map_err(|err| match err {
                ChartError::DataFormat(reason) => ChartError::data_format(format!(
                    "could not parse data as JSON ({}) or as delimited text ({})",
                    json_err, reason
                )),
                err => err,
            })
        }
    }
}

fn from_mapping(map: Map<String, Value>) -> ChartResult<Table> {
    if map.is_empty() {
        return Err(ChartError::data_format("data mapping is empty"));
    }

    if map.values().all(Value::is_array) {
        let columns = map
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::Array(items) => Some((name, items)),
                _ => None,
            })
            .map(|(name, items)| {
                let cells = items
                    .into_iter()
                    .enumerate()
                    .map(|(row, item)| scalar_from_json(item, &name, row))
                    .collect::<ChartResult<Vec<_>>>()?;
                Column::from_scalars(name, cells)
            })
            .collect::<ChartResult<Vec<_>>>()?;
        return Table::new(columns);
    }

    if map.values().all(is_scalar) {
        debug!("mapping of scalars treated as labelled values");
        let mut labels = Vec::with_capacity(map.len());
        let mut values = Vec::with_capacity(map.len());
        for (row, (key, value)) in map.into_iter().enumerate() {
            values.push(scalar_from_json(value, &key, row)?);
            labels.push(key);
        }
        return Table::new(vec![
            Column::text(LABEL_COLUMN, labels),
            Column::from_scalars(VALUE_COLUMN, values)?,
        ]);
    }

    Err(ChartError::data_format(
        "mapping values must be either all lists (columns) or all scalars (labelled values)",
    ))
}

fn from_sequence(items: Vec<Value>) -> ChartResult<Table> {
    if items.is_empty() {
        return Err(ChartError::data_format("data list is empty"));
    }

    if items.iter().all(Value::is_object) {
        return from_records(items);
    }

    if items.iter().all(Value::is_array) {
        return from_rows(items);
    }

    if items.iter().all(is_scalar) {
        let cells = items
            .into_iter()
            .enumerate()
            .map(|(row, item)| scalar_from_json(item, Table::ANONYMOUS_COLUMN, row))
            .collect::<ChartResult<Vec<_>>>()?;
        return Table::anonymous(cells);
    }

    Err(ChartError::data_format(
        "list items must be all scalars, all records (mappings), or all rows (lists)",
    ))
}

/// Row-oriented records. Keys are unioned in first-seen order and every
/// record must provide a value for every key.
fn from_records(items: Vec<Value>) -> ChartResult<Table> {
    let records: Vec<Map<String, Value>> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    let mut keys: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }

    if keys.is_empty() {
        return Err(ChartError::data_format("none of the records contain any fields"));
    }
    debug!(records = records.len(), fields = keys.len(), "list of records");

    let columns = keys
        .into_iter()
        .map(|key| {
            let cells = records
                .iter()
                .enumerate()
                .map(|(idx, record)| match record.get(&key) {
                    Some(Value::Null) | None => Err(ChartError::data_format(format!(
                        "record {} is missing field '{}'",
                        idx + 1,
                        key
                    ))),
                    Some(value) => scalar_from_json(value.clone(), &key, idx),
                })
                .collect::<ChartResult<Vec<_>>>()?;
            Column::from_scalars(key, cells)
        })
        .collect::<ChartResult<Vec<_>>>()?;

    Table::new(columns)
}

/// Positional rows; columns are named by their index.
fn from_rows(items: Vec<Value>) -> ChartResult<Table> {
    let rows: Vec<Vec<Value>> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(row) => Some(row),
            _ => None,
        })
        .collect();

    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(ChartError::data_format("rows must contain at least one value"));
    }

    let mut cells: Vec<Vec<Scalar>> = vec![Vec::with_capacity(rows.len()); width];
    for (idx, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(ChartError::data_format(format!(
                "row {} has {} values but the first row has {}",
                idx + 1,
                row.len(),
                width
            )));
        }
        for (col, value) in row.into_iter().enumerate() {
            cells[col].push(scalar_from_json(value, &col.to_string(), idx)?);
        }
    }

    let columns = cells
        .into_iter()
        .enumerate()
        .map(|(col, column_cells)| Column::from_scalars(col.to_string(), column_cells))
        .collect::<ChartResult<Vec<_>>>()?;

    Table::new(columns)
}

fn scalar_from_json(value: Value, column: &str, row: usize) -> ChartResult<Scalar> {
    match value {
        Value::Number(n) => n.as_f64().map(Scalar::Number).ok_or_else(|| {
            ChartError::data_format(format!(
                "number {} in column '{}' is out of range",
                n, column
            ))
        }),
        Value::String(s) => Ok(Scalar::Text(s)),
        Value::Bool(b) => Ok(Scalar::Text(b.to_string())),
        Value::Null => Err(ChartError::data_format(format!(
            "missing value in column '{}' at row {}",
            column,
            row + 1
        ))),
        other => Err(ChartError::data_format(format!(
            "nested {} in column '{}' at row {} is not a scalar value",
            json_type_name(&other),
            column,
            row + 1
        ))),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::String(_) | Value::Bool(_))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
