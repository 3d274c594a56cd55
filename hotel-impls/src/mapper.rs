use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use hotel_core::{ExecutorError, ExecutorResult, NULL_CELL};
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, Column, Decode, Postgres, Row, Type, TypeInfo};

use crate::IntoExecutorError;

pub(crate) fn column_names(row: &PgRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub(crate) fn decode_row(row: &PgRow) -> ExecutorResult<Vec<String>> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

/// Reads a cell as text, whatever the type of its column
pub(crate) fn decode_cell(row: &PgRow, index: usize) -> ExecutorResult<String> {
    let column = &row.columns()[index];

    match column.type_info().name() {
        "BOOL" => text::<bool>(row, index),
        "INT2" => text::<i16>(row, index),
        "INT4" => text::<i32>(row, index),
        "INT8" => text::<i64>(row, index),
        "FLOAT4" => text::<f32>(row, index),
        "FLOAT8" => text::<f64>(row, index),
        "NUMERIC" => text::<Decimal>(row, index),
        "DATE" => text::<NaiveDate>(row, index),
        "TIME" => text::<NaiveTime>(row, index),
        "TIMESTAMP" => text::<NaiveDateTime>(row, index),
        "TIMESTAMPTZ" => text::<DateTime<Utc>>(row, index),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "UNKNOWN" => text::<String>(row, index),
        other => Err(ExecutorError::UnsupportedColumn {
            column: column.name().to_string(),
            type_name: other.to_string(),
        }),
    }
}

fn text<'r, T>(row: &'r PgRow, index: usize) -> ExecutorResult<String>
where
    T: Decode<'r, Postgres> + Type<Postgres> + ToString,
{
    let value: Option<T> = row.try_get(index).map_err(|e| e.any())?;

    Ok(value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NULL_CELL.to_string()))
}
