//! Column-level cleanup applied between extract and load.
//!
//! Every operation consumes a [`Table`] and hands back the updated table, so
//! steps compose with `?`. A cell that cannot be normalized becomes missing
//! (`None`); only structural problems such as an absent column are errors.

pub mod datetime;
pub mod string_ops;

use crate::{
    data::{Table, Value},
    error::EtlError,
};

pub const NAME_COLUMN: &str = "name";
pub const PRICE_COLUMN: &str = "price";

/// Rewrites each named column as `YYYY-MM-DDTHH:MM:SSZ` text, or missing when unparseable.
pub fn normalize_dates(table: Table, columns: &[&str]) -> Result<Table, EtlError> {
    table.require_columns(columns)?;
    columns.iter().try_fold(table, |table, column| {
        table.map_column(column, |cell| {
            cell.and_then(|value| datetime::normalize_timestamp(&value.as_display()))
                .map(Value::Text)
        })
    })
}

/// Trims and title-cases the `name` column, stringifying non-text values first.
pub fn normalize_product_names(table: Table) -> Result<Table, EtlError> {
    table.map_column(NAME_COLUMN, |cell| {
        cell.map(|value| {
            let text = value.as_display();
            let trimmed = string_ops::trim(&text);
            Value::Text(string_ops::title_case(&trimmed).into_owned())
        })
    })
}

/// Converts `column` to floats; values that are not numbers become missing.
pub fn coerce_numeric(table: Table, column: &str) -> Result<Table, EtlError> {
    table.map_column(column, |cell| match cell? {
        Value::Integer(i) => Some(Value::Float(i as f64)),
        Value::Float(f) if f.is_nan() => None,
        Value::Float(f) => Some(Value::Float(f)),
        Value::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| !parsed.is_nan())
            .map(Value::Float),
    })
}

/// Arithmetic mean of the present values of `column`, or `None` when every value is missing.
pub fn column_mean(table: &Table, column: &str) -> Result<Option<f64>, EtlError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in table.column(column)?.flatten() {
        let number = value.as_f64().ok_or_else(|| {
            EtlError::transform(
                table.name(),
                format!("column '{column}' holds non-numeric value '{value}'"),
            )
        })?;
        sum += number;
        count += 1;
    }
    Ok((count > 0).then(|| sum / count as f64))
}

/// Replaces missing `price` cells with the mean of the present prices.
pub fn fill_empty_prices_with_average(table: Table) -> Result<Table, EtlError> {
    let Some(mean) = column_mean(&table, PRICE_COLUMN)? else {
        return Ok(table);
    };
    table.map_column(PRICE_COLUMN, |cell| cell.or(Some(Value::Float(mean))))
}
