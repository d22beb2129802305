use crate::error::{ChartError, ChartResult};
use std::collections::HashSet;
use std::fmt;

/// A single cell value before column typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric reading of the cell: numbers as-is, text when it parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => parse_number(s),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    /// Type a column of raw cells.
    ///
    /// The column is numeric when it has at least one non-empty cell and every
    /// non-empty cell reads as a number; otherwise every cell is kept as text.
    /// A numeric column with an empty cell is rejected.
    pub fn from_scalars(name: impl Into<String>, cells: Vec<Scalar>) -> ChartResult<Self> {
        let name = name.into();
        let mut filled = cells.iter().filter(|c| !c.is_blank()).peekable();
        let numeric = filled.peek().is_some() && filled.all(|c| c.as_number().is_some());

        if !numeric {
            let values = cells.iter().map(|c| c.to_string()).collect();
            return Ok(Self::text(name, values));
        }

        let mut values = Vec::with_capacity(cells.len());
        for (row, cell) in cells.iter().enumerate() {
            match cell.as_number() {
                Some(n) => values.push(n),
                None => {
                    return Err(ChartError::data_format(format!(
                        "column '{}' is missing a value at row {}",
                        name,
                        row + 1
                    )))
                }
            }
        }
        Ok(Self::numeric(name, values))
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    /// The column as numbers, or `InvalidValueError` pointing at the first cell that is not one.
    pub fn numbers(&self) -> ChartResult<&[f64]> {
        match &self.values {
            ColumnValues::Numeric(values) => Ok(values),
            ColumnValues::Text(values) => {
                let detail = values
                    .iter()
                    .enumerate()
                    .find(|(_, v)| parse_number(v).is_none())
                    .map(|(row, cell)| format!("row {} contains '{}'", row + 1, cell))
                    .unwrap_or_else(|| "it holds text values".to_string());
                Err(ChartError::invalid_value(format!(
                    "column '{}' must be numeric, but {}",
                    self.name, detail
                )))
            }
        }
    }

    /// Every cell rendered as text, in row order.
    pub fn labels(&self) -> Vec<String> {
        match &self.values {
            ColumnValues::Numeric(values) => values.iter().map(|n| n.to_string()).collect(),
            ColumnValues::Text(values) => values.clone(),
        }
    }
}

/// Canonical rectangular, column-oriented table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    anonymous: bool,
}

impl Table {
    /// Name given to the single column built from a flat list.
    pub const ANONYMOUS_COLUMN: &'static str = "value";

    pub fn new(columns: Vec<Column>) -> ChartResult<Self> {
        let first = columns
            .first()
            .ok_or_else(|| ChartError::data_format("data table has no columns"))?;
        let rows = first.len();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ChartError::data_format(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != rows {
                return Err(ChartError::data_format(format!(
                    "column '{}' has {} values but column '{}' has {}",
                    column.name,
                    column.len(),
                    first.name,
                    rows
                )));
            }
        }

        if rows == 0 {
            return Err(ChartError::data_format("data table has no rows"));
        }

        Ok(Self {
            columns,
            anonymous: false,
        })
    }

    /// Wrap a flat list of cells as a single anonymous column.
    pub fn anonymous(cells: Vec<Scalar>) -> ChartResult<Self> {
        let column = Column::from_scalars(Self::ANONYMOUS_COLUMN, cells)?;
        let mut table = Self::new(vec![column])?;
        table.anonymous = true;
        Ok(table)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// True when the table came from a flat list with no column semantics.
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn first_numeric(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_numeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.to_string())
    }

    #[test]
    fn test_from_scalars_numeric_text_cells() {
        let col = Column::from_scalars("v", vec![text("1"), Scalar::Number(2.5), text(" 3 ")]).unwrap();
        assert_eq!(col.values, ColumnValues::Numeric(vec![1.0, 2.5, 3.0]));
    }

    #[test]
    fn test_from_scalars_mixed_stays_text() {
        let col = Column::from_scalars("v", vec![Scalar::Number(1.0), text("x")]).unwrap();
        assert_eq!(col.values, ColumnValues::Text(vec!["1".into(), "x".into()]));
    }

    #[test]
    fn test_from_scalars_non_finite_is_text() {
        let col = Column::from_scalars("v", vec![text("nan"), text("inf")]).unwrap();
        assert!(!col.is_numeric());
    }

    #[test]
    fn test_from_scalars_numeric_with_blank_fails() {
        let result = Column::from_scalars("v", vec![text("1"), text(""), text("3")]);
        let err = result.unwrap_err();
        assert!(matches!(err, ChartError::DataFormat(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_from_scalars_all_blank_is_text() {
        let col = Column::from_scalars("v", vec![text(""), text(" ")]).unwrap();
        assert!(!col.is_numeric());
    }

    #[test]
    fn test_numbers_reports_offending_cell() {
        let col = Column::text("sales", vec!["1".into(), "2".into(), "abc".into()]);
        let err = col.numbers().unwrap_err();
        assert!(matches!(err, ChartError::InvalidValue(_)));
        let msg = err.to_string();
        assert!(msg.contains("'sales'"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ]);
        assert!(result.unwrap_err().to_string().contains("has 1 values"));
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ]);
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_table_rejects_no_rows() {
        let result = Table::new(vec![Column::numeric("a", vec![])]);
        assert!(matches!(result, Err(ChartError::DataFormat(_))));
    }

    #[test]
    fn test_table_rejects_no_columns() {
        assert!(matches!(Table::new(vec![]), Err(ChartError::DataFormat(_))));
    }

    #[test]
    fn test_anonymous_table() {
        let table = Table::anonymous(vec![Scalar::Number(1.0), Scalar::Number(2.0)]).unwrap();
        assert!(table.is_anonymous());
        assert_eq!(table.column_names(), vec![Table::ANONYMOUS_COLUMN]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_labels_render_numbers_shortest() {
        let col = Column::numeric("n", vec![1000.0, 1.5]);
        assert_eq!(col.labels(), vec!["1000", "1.5"]);
    }
}
