use catalog_loader::data::{Table, Value};
use catalog_loader::transform::datetime::normalize_timestamp;
use catalog_loader::transform::string_ops::title_case;
use catalog_loader::transform::{
    coerce_numeric, fill_empty_prices_with_average, normalize_dates, normalize_product_names,
};
use proptest::prelude::*;

fn single_column(name: &str, cells: Vec<Option<Value>>) -> Table {
    let mut table = Table::new("products", vec![name.to_string()]);
    for cell in cells {
        table.push_row(vec![cell]);
    }
    table
}

fn text(value: &str) -> Option<Value> {
    Some(Value::Text(value.to_string()))
}

fn cells(table: &Table, column: &str) -> Vec<Option<Value>> {
    table.column(column).expect("column").cloned().collect()
}

#[test]
fn name_normalization_is_idempotent() {
    let table = single_column("name", vec![text(" phone "), text(" SHIRT "), text("usb hub")]);
    let once = normalize_product_names(table).unwrap();
    let twice = normalize_product_names(once.clone()).unwrap();
    assert_eq!(cells(&once, "name"), vec![text("Phone"), text("Shirt"), text("Usb Hub")]);
    assert_eq!(once, twice);
}

#[test]
fn price_pipeline_matches_reference_cases() {
    let table = single_column("price", vec![Some(Value::Integer(100)), None]);
    let table = fill_empty_prices_with_average(coerce_numeric(table, "price").unwrap()).unwrap();
    assert_eq!(
        cells(&table, "price"),
        vec![Some(Value::Float(100.0)), Some(Value::Float(100.0))]
    );

    let table = single_column("price", vec![text("not_a_number")]);
    let table = fill_empty_prices_with_average(coerce_numeric(table, "price").unwrap()).unwrap();
    assert_eq!(cells(&table, "price"), vec![None]);
}

#[test]
fn date_normalization_preserves_rows_and_order() {
    let table = single_column(
        "created_at",
        vec![
            text("2024-03-01"),
            text("garbage"),
            text("2024-02-29 23:59:59"),
            Some(Value::Integer(7)),
        ],
    );
    let table = normalize_dates(table, &["created_at"]).unwrap();
    assert_eq!(
        cells(&table, "created_at"),
        vec![text("2024-03-01T00:00:00Z"), None, text("2024-02-29T23:59:59Z"), None]
    );
}

proptest! {
    #[test]
    fn title_case_is_idempotent(input in "[ a-zA-Z0-9'_-]{0,24}") {
        let once = title_case(input.trim()).into_owned();
        let twice = title_case(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn parsed_dates_match_output_shape(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
    ) {
        let inputs = [
            format!("{year:04}-{month:02}-{day:02}"),
            format!("{month:02}/{day:02}/{year:04} {hour:02}:{minute:02}"),
            format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:00+01:00"),
        ];
        let pattern = regex_like_shape();
        for input in &inputs {
            let normalized = normalize_timestamp(input);
            prop_assert!(normalized.is_some(), "{} did not parse", input);
            prop_assert!(pattern(normalized.as_deref().unwrap()), "bad shape for {}", input);
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ`
fn regex_like_shape() -> impl Fn(&str) -> bool {
    |value: &str| {
        let bytes = value.as_bytes();
        bytes.len() == 20
            && bytes.iter().enumerate().all(|(idx, b)| match idx {
                4 | 7 => *b == b'-',
                10 => *b == b'T',
                13 | 16 => *b == b':',
                19 => *b == b'Z',
                _ => b.is_ascii_digit(),
            })
    }
}
