//! Explicit named-column table with a declared schema.
//!
//! Every column holds exactly `row_count` cells. A cell is `None` when the
//! source value was empty or could not be coerced to the column type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Float,
    Integer,
    Date,
}

/// Declared column: name as it appears in the header, type, and whether the
/// header must contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.required)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn empty(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Text => Self::Text(Vec::new()),
            ColumnType::Float => Self::Float(Vec::new()),
            ColumnType::Integer => Self::Integer(Vec::new()),
            ColumnType::Date => Self::Date(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Float(_) => ColumnType::Float,
            Self::Integer(_) => ColumnType::Integer,
            Self::Date(_) => ColumnType::Date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Failure to assemble a table whose columns disagree in length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column '{column}' has {actual} cells, expected {expected}")]
pub struct RaggedColumn {
    pub column: String,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, RaggedColumn> {
        let row_count = columns.first().map_or(0, |c| c.data.len());
        if let Some(bad) = columns.iter().find(|c| c.data.len() != row_count) {
            return Err(RaggedColumn {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.data.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Text cells of `name`, or `None` if the column is absent or not text.
    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match &self.column(name)?.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<&[Option<i64>]> {
        match &self.column(name)?.data {
            ColumnData::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<&[Option<NaiveDate>]> {
        match &self.column(name)?.data {
            ColumnData::Date(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column {
                name: "id".into(),
                data: ColumnData::Text(vec![Some("a".into()), Some("b".into())]),
            },
            Column {
                name: "amount".into(),
                data: ColumnData::Float(vec![Some(1.0)]),
            },
        ])
        .unwrap_err();
        assert_eq!(err.column, "amount");
        assert_eq!(err.expected, 2);
        assert_eq!(err.actual, 1);
    }

    #[test]
    fn test_typed_accessors() {
        let table = Table::new(vec![
            Column {
                name: "id".into(),
                data: ColumnData::Text(vec![Some("a".into()), None]),
            },
            Column {
                name: "clicks".into(),
                data: ColumnData::Integer(vec![Some(3), Some(4)]),
            },
        ])
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.integer("clicks"), Some(&[Some(3), Some(4)][..]));
        assert!(table.float("clicks").is_none());
        assert!(table.text("missing").is_none());
        assert_eq!(table.text("id").unwrap()[1], None);
    }

    #[test]
    fn test_empty_table_has_zero_rows() {
        let table = Table::new(Vec::new()).unwrap();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_schema_required_columns() {
        let schema = Schema::new(vec![
            ColumnSpec::required("Customer ID", ColumnType::Text),
            ColumnSpec::optional("Category", ColumnType::Text),
        ]);
        let names: Vec<_> = schema.required_columns().map(|c| c.name).collect();
        assert_eq!(names, vec!["Customer ID"]);
    }
}
