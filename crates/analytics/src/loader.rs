//! Delimited-file loader. Reads a CSV with a header row into a [`Table`]
//! whose columns follow a declared [`Schema`].

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use insights_core::error::LoadError;
use insights_core::table::{Column, ColumnData, ColumnSpec, Schema, Table};
use tracing::{debug, info};

/// Load `path` and coerce its columns to `schema`.
///
/// Missing files, unreadable files, undecodable CSV, and headers lacking a
/// required column are fatal. Cells that fail coercion become null and are
/// dealt with by row validation, as are the missing trailing cells of a short
/// row.
pub fn load_table(path: &Path, schema: &Schema) -> Result<Table, LoadError> {
    info!(path = %path.display(), "Loading data");

    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let table = read_table(file, path, schema)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "Loaded table"
    );
    Ok(table)
}

/// Parse CSV from any reader. `path` is only used in diagnostics.
pub fn read_table<R: Read>(reader: R, path: &Path, schema: &Schema) -> Result<Table, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    // Resolve every declared column to its header position.
    let mut layout: Vec<(usize, &ColumnSpec)> = Vec::new();
    for spec in schema.columns() {
        match headers.iter().position(|h| h == spec.name) {
            Some(idx) => layout.push((idx, spec)),
            None if spec.required => {
                return Err(LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column: spec.name.to_string(),
                })
            }
            None => debug!(column = spec.name, "Optional column absent"),
        }
    }

    let mut data: Vec<ColumnData> = layout
        .iter()
        .map(|(_, spec)| ColumnData::empty(spec.column_type))
        .collect();

    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        for ((idx, _), column) in layout.iter().zip(data.iter_mut()) {
            push_cell(column, record.get(*idx).unwrap_or(""));
        }
    }

    let columns = layout
        .iter()
        .zip(data)
        .map(|((_, spec), data)| Column {
            name: spec.name.to_string(),
            data,
        })
        .collect();

    // Every column received one cell per record, so this cannot be ragged.
    Table::new(columns).map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        line: 0,
        reason: e.to_string(),
    })
}

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    let line = err.position().map_or(0, |p| p.line());
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
        _ => LoadError::Malformed {
            path: path.to_path_buf(),
            line,
            reason,
        },
    }
}

fn push_cell(column: &mut ColumnData, raw: &str) {
    match column {
        ColumnData::Text(v) => v.push(parse_text(raw)),
        ColumnData::Float(v) => v.push(parse_float(raw)),
        ColumnData::Integer(v) => v.push(parse_integer(raw)),
        ColumnData::Date(v) => v.push(parse_date(raw)),
    }
}

pub fn parse_text(raw: &str) -> Option<String> {
    let s = raw.trim();
    (!s.is_empty()).then(|| s.to_string())
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers also accept integral float text such as `"12.0"`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = parse_float(s)?;
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{campaign_schema, transaction_schema};
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_typed_columns() {
        let file = write_csv(
            "Transaction ID,Customer ID,Order Date,Order Amount,Category\n\
             T1,C1,2024-01-02,10.5,Books\n\
             T2,C2,2024-01-03 14:22:00,abc,\n",
        );
        let table = load_table(file.path(), &transaction_schema()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.float("Order Amount").unwrap(), &[Some(10.5), None]);
        assert_eq!(
            table.date("Order Date").unwrap()[1],
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
        assert_eq!(table.text("Category").unwrap()[1], None);
        // Optional column absent from the header is simply not in the table.
        assert!(table.column("Signup Date").is_none());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_table(Path::new("/definitely/not/here.csv"), &transaction_schema())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().contains("here.csv"));
    }

    #[test]
    fn test_missing_required_column() {
        let file = write_csv("Campaign ID,Date,Channel,Spend\nA,2024-01-01,Email,5\n");
        let err = load_table(file.path(), &campaign_schema()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "Impressions"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_excluded_not_fatal() {
        let file = write_csv(
            "Transaction ID,Customer ID,Order Date,Order Amount,Category\n\
             T1,C1,2024-01-02,10.5,Books\n\
             T2,C2\n\
             T3,C3,2024-01-05,7.0,Toys\n",
        );
        let table = load_table(file.path(), &transaction_schema()).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.float("Order Amount").unwrap()[1], None);
        assert_eq!(table.date("Order Date").unwrap()[1], None);

        let validated = crate::validation::validate_transactions(&table).unwrap();
        let ledger = &validated.ledger;
        assert_eq!(ledger.valid_rows(), 2);
        assert_eq!(ledger.excluded_rows(), 1);
        assert_eq!(ledger.valid_rows() + ledger.excluded_rows(), ledger.total_rows());
        assert_eq!(ledger.total_rows(), 3);
        assert_eq!(validated.records.len(), 2);
    }

    #[test]
    fn test_long_row_keeps_declared_columns() {
        let file = write_csv(
            "Transaction ID,Customer ID,Order Date,Order Amount\n\
             T1,C1,2024-01-02,10,extra,cells\n",
        );
        let table = load_table(file.path(), &transaction_schema()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.float("Order Amount").unwrap(), &[Some(10.0)]);
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let file = write_csv("");
        let err = load_table(file.path(), &transaction_schema()).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn test_header_only_file_yields_zero_rows() {
        let file = write_csv("Transaction ID,Customer ID,Order Date,Order Amount\n");
        let table = load_table(file.path(), &transaction_schema()).unwrap();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("12.0"), Some(12));
        assert_eq!(parse_integer("12.5"), None);
        assert_eq!(parse_float(" 3.25 "), Some(3.25));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_text("   "), None);
        assert_eq!(
            parse_date("2024-02-29T08:00:00+00:00"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("29/02/2024"), None);
    }
}
