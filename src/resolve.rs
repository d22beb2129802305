use crate::data::{Column, Table};
use crate::error::{ChartError, ChartResult};

/// Purpose a column plays in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Category / x axis
    X,
    /// Value / y axis
    Y,
    /// Pie slice names
    Label,
    /// Pie slice sizes
    Value,
}

impl Role {
    fn is_primary(self) -> bool {
        matches!(self, Role::X | Role::Label)
    }
}

/// Where the data for a role comes from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Column(&'a Column),
    /// Row positions, used for the primary role of an anonymous (flat list) table
    RowIndex,
}

/// Resolve a role to a column: explicit name first, positional default otherwise.
///
/// Omitted (or blank) selectors fall back to the first column for `X`/`Label`
/// and to the second column (or the first, if there is only one) for `Y`/`Value`.
/// Flat-list tables have no column semantics, so their primary role maps to the
/// row positions instead.
pub fn resolve_column<'a>(
    table: &'a Table,
    role: Role,
    selector: Option<&str>,
) -> ChartResult<Source<'a>> {
    if let Some(name) = explicit(selector) {
        return lookup(table, name).map(Source::Column);
    }

    if role.is_primary() && table.is_anonymous() {
        return Ok(Source::RowIndex);
    }

    let columns = table.columns();
    let column = if role.is_primary() {
        columns.first()
    } else {
        columns.get(1).or_else(|| columns.first())
    };

    column
        .map(Source::Column)
        .ok_or_else(|| ChartError::data_format("data table has no columns"))
}

/// Resolve the single value column of a distribution chart.
///
/// Without a selector this is the sole column, else the first numeric column,
/// else the first column (which then fails the numeric check downstream).
pub fn resolve_distribution_column<'a>(
    table: &'a Table,
    selector: Option<&str>,
) -> ChartResult<&'a Column> {
    if let Some(name) = explicit(selector) {
        return lookup(table, name);
    }

    table
        .first_numeric()
        .or_else(|| table.columns().first())
        .ok_or_else(|| ChartError::data_format("data table has no columns"))
}

fn explicit(selector: Option<&str>) -> Option<&str> {
    selector.filter(|s| !s.trim().is_empty())
}

fn lookup<'a>(table: &'a Table, name: &str) -> ChartResult<&'a Column> {
    table
        .column(name)
        .ok_or_else(|| ChartError::column_not_found(name, table.column_names()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Scalar};

    fn make_table() -> Table {
        Table::new(vec![
            Column::text("category", vec!["A".into(), "B".into()]),
            Column::numeric("value", vec![1.0, 2.0]),
            Column::numeric("other", vec![3.0, 4.0]),
        ])
        .unwrap()
    }

    fn name(source: Source<'_>) -> String {
        match source {
            Source::Column(c) => c.name.clone(),
            Source::RowIndex => "<row>".to_string(),
        }
    }

    #[test]
    fn test_resolve_explicit() {
        let table = make_table();
        let source = resolve_column(&table, Role::Y, Some("other")).unwrap();
        assert_eq!(name(source), "other");
    }

    #[test]
    fn test_resolve_missing_column() {
        let table = make_table();
        let err = resolve_column(&table, Role::X, Some("missing")).unwrap_err();
        assert_eq!(
            err,
            ChartError::ColumnNotFound {
                column: "missing".into(),
                available: vec!["category".into(), "value".into(), "other".into()],
            }
        );
    }

    #[test]
    fn test_resolve_positional_defaults() {
        let table = make_table();
        assert_eq!(name(resolve_column(&table, Role::X, None).unwrap()), "category");
        assert_eq!(name(resolve_column(&table, Role::Y, None).unwrap()), "value");
        assert_eq!(name(resolve_column(&table, Role::Label, None).unwrap()), "category");
        assert_eq!(name(resolve_column(&table, Role::Value, None).unwrap()), "value");
    }

    #[test]
    fn test_resolve_roles_independently() {
        let table = make_table();
        let x = resolve_column(&table, Role::X, Some("value")).unwrap();
        let y = resolve_column(&table, Role::Y, None).unwrap();
        assert_eq!(name(x), "value");
        assert_eq!(name(y), "value");
    }

    #[test]
    fn test_resolve_blank_selector_is_omitted() {
        let table = make_table();
        assert_eq!(name(resolve_column(&table, Role::X, Some("  ")).unwrap()), "category");
    }

    #[test]
    fn test_resolve_single_column_reuses_first() {
        let table = Table::new(vec![Column::numeric("only", vec![1.0])]).unwrap();
        assert_eq!(name(resolve_column(&table, Role::Y, None).unwrap()), "only");
        assert_eq!(name(resolve_column(&table, Role::X, None).unwrap()), "only");
    }

    #[test]
    fn test_resolve_anonymous_primary_is_row_index() {
        let table = Table::anonymous(vec![Scalar::Number(1.0), Scalar::Number(2.0)]).unwrap();
        assert!(matches!(
            resolve_column(&table, Role::X, None).unwrap(),
            Source::RowIndex
        ));
        assert_eq!(
            name(resolve_column(&table, Role::Y, None).unwrap()),
            Table::ANONYMOUS_COLUMN
        );
    }

    #[test]
    fn test_distribution_prefers_first_numeric() {
        let table = make_table();
        assert_eq!(resolve_distribution_column(&table, None).unwrap().name, "value");
    }

    #[test]
    fn test_distribution_falls_back_to_first_column() {
        let table = Table::new(vec![
            Column::text("a", vec!["x".into()]),
            Column::text("b", vec!["y".into()]),
        ])
        .unwrap();
        assert_eq!(resolve_distribution_column(&table, None).unwrap().name, "a");
    }

    #[test]
    fn test_distribution_explicit_missing() {
        let table = make_table();
        let err = resolve_distribution_column(&table, Some("nope")).unwrap_err();
        assert!(matches!(err, ChartError::ColumnNotFound { .. }));
    }
}
