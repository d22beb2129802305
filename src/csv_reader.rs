// Delimited-text input: header line followed by comma-separated rows

use crate::data::{Column, Scalar, Table};
use crate::error::{ChartError, ChartResult};

/// Parse comma-separated text with a header line into a [`Table`].
pub fn parse_delimited(text: &str) -> ChartResult<Table> {
    let non_empty_lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_empty_lines < 2 {
        return Err(ChartError::data_format(
            "delimited text needs a header line and at least one data row",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ChartError::data_format(format!("failed to read header line: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if let Some(pos) = headers.iter().position(|h| h.is_empty()) {
        return Err(ChartError::data_format(format!(
            "header column {} has an empty name",
            pos + 1
        )));
    }

    let mut cells: Vec<Vec<Scalar>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record =
            record.map_err(|e| ChartError::data_format(format!("failed to read row: {}", e)))?;
        // whitespace-only lines trim down to a single empty field
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() != headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(ChartError::data_format(format!(
                "line {} has {} fields but the header has {}",
                line,
                record.len(),
                headers.len()
            )));
        }
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(Scalar::Text(field.to_string()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, column_cells)| Column::from_scalars(name, column_cells))
        .collect::<ChartResult<Vec<_>>>()?;

    Table::new(columns)
}
