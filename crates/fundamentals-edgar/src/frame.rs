//! Filing rows from loader DataFrames.
//!
//! Loaders commonly hand back one DataFrame per company with a `cik` column, a
//! `year` column and one numeric column per canonical field. Nulls mark
//! absent values. Any other column type breaks the row contract.

use fundamentals_core::{Cik, FilingRow, FinancialsError, Result, fields};
use polars::prelude::{Column, DataFrame, DataType};
use tracing::debug;

/// Converts a loader DataFrame into filing rows, one per frame row.
///
/// The `cik` and `year` columns become row metadata and must hold whole
/// numbers. Every other column must be numeric (or all-null); a text or
/// temporal column fails with `MalformedRow` instead of being coerced.
pub fn rows_from_frame(df: &DataFrame) -> Result<Vec<FilingRow>> {
    let height = df.height();
    let mut rows = vec![FilingRow::new(); height];

    for column in df.get_columns() {
        let name = column.name().as_str();
        match name {
            fields::CIK_KEY => {
                for (row, value) in rows.iter_mut().zip(integer_values(column)?) {
                    row.cik = value
                        .map(|v| {
                            u64::try_from(v).map(Cik::new).map_err(|_| {
                                FinancialsError::MalformedRow(format!("negative cik {v}"))
                            })
                        })
                        .transpose()?;
                }
            }
            fields::YEAR_KEY => {
                for (row, value) in rows.iter_mut().zip(integer_values(column)?) {
                    row.fiscal_year = value
                        .map(|v| {
                            i32::try_from(v).map_err(|_| {
                                FinancialsError::MalformedRow(format!("year out of range: {v}"))
                            })
                        })
                        .transpose()?;
                }
            }
            _ => {
                for (row, value) in rows.iter_mut().zip(float_values(column)?) {
                    row.values.insert(name.to_string(), value);
                }
            }
        }
    }

    for row in &rows {
        row.validate()?;
    }

    debug!(rows = height, columns = df.width(), "Extracted filing rows from frame");
    Ok(rows)
}

fn ensure_numeric(column: &Column) -> Result<()> {
    match column.dtype() {
        DataType::Float64
        | DataType::Float32
        | DataType::Int64
        | DataType::Int32
        | DataType::UInt64
        | DataType::UInt32
        | DataType::Null => Ok(()),
        other => Err(FinancialsError::MalformedRow(format!(
            "column {} has type {}, expected a number",
            column.name(),
            other
        ))),
    }
}

fn float_values(column: &Column) -> Result<Vec<Option<f64>>> {
    ensure_numeric(column)?;
    let cast = column
        .cast(&DataType::Float64)
        .map_err(|e| FinancialsError::Parse(e.to_string()))?;
    let values = cast
        .f64()
        .map_err(|e| FinancialsError::Parse(e.to_string()))?;
    Ok(values.into_iter().collect())
}

fn integer_values(column: &Column) -> Result<Vec<Option<i64>>> {
    ensure_numeric(column)?;
    if column.dtype().is_float() {
        if let Some(v) = float_values(column)?
            .into_iter()
            .flatten()
            .find(|v| !v.is_finite() || v.fract() != 0.0)
        {
            return Err(FinancialsError::MalformedRow(format!(
                "column {} has non-integer value {v}",
                column.name()
            )));
        }
    }
    let cast = column
        .cast(&DataType::Int64)
        .map_err(|e| FinancialsError::Parse(e.to_string()))?;
    let values = cast
        .i64()
        .map_err(|e| FinancialsError::Parse(e.to_string()))?;
    Ok(values.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_from_frame() {
        let df = DataFrame::new(vec![
            Column::new("cik".into(), vec![320193_i64, 320193]),
            Column::new("year".into(), vec![2022_i32, 2023]),
            Column::new(
                "revenue".into(),
                vec![Some(394_328_000_000.0_f64), None],
            ),
            Column::new("cogs".into(), vec![223_546_000_000.0_f64, 214_137_000_000.0]),
        ])
        .unwrap();

        let rows = rows_from_frame(&df).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].cik, Some(Cik::new(320193)));
        assert_eq!(rows[0].fiscal_year, Some(2022));
        assert_eq!(rows[0].get(fields::REVENUE), Some(394_328_000_000.0));

        assert_eq!(rows[1].fiscal_year, Some(2023));
        assert_eq!(rows[1].values.get(fields::REVENUE), Some(&None));
        assert_eq!(rows[1].get(fields::COGS), Some(214_137_000_000.0));
    }

    #[test]
    fn test_integer_fields_are_widened() {
        let df = DataFrame::new(vec![Column::new(
            "inventory".into(),
            vec![6_331_000_000_i64],
        )])
        .unwrap();

        let rows = rows_from_frame(&df).unwrap();
        assert_eq!(rows[0].get(fields::INVENTORY), Some(6_331_000_000.0));
        assert_eq!(rows[0].cik, None);
    }

    #[test]
    fn test_text_column_is_malformed() {
        let df = DataFrame::new(vec![
            Column::new("year".into(), vec![2023_i32]),
            Column::new("revenue".into(), vec!["383.3B"]),
        ])
        .unwrap();

        let err = rows_from_frame(&df).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));
    }

    #[test]
    fn test_fractional_year_is_malformed() {
        let df = DataFrame::new(vec![
            Column::new("year".into(), vec![2023.5_f64]),
            Column::new("revenue".into(), vec![1.0_f64]),
        ])
        .unwrap();

        let err = rows_from_frame(&df).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));
    }

    #[test]
    fn test_whole_float_metadata_is_accepted() {
        let df = DataFrame::new(vec![
            Column::new("cik".into(), vec![320193.0_f64]),
            Column::new("year".into(), vec![Some(2023.0_f64)]),
        ])
        .unwrap();

        let rows = rows_from_frame(&df).unwrap();
        assert_eq!(rows[0].cik, Some(Cik::new(320193)));
        assert_eq!(rows[0].fiscal_year, Some(2023));
    }

    #[test]
    fn test_nan_is_malformed() {
        let df = DataFrame::new(vec![Column::new("revenue".into(), vec![f64::NAN])]).unwrap();

        let err = rows_from_frame(&df).unwrap_err();
        assert!(matches!(err, FinancialsError::MalformedRow(_)));
    }
}
