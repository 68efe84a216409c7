//! Extract → transform → load for the catalog and product sources.
//!
//! [`run_etl`] reads both CSV files, normalizes headers, timestamps, product
//! names and prices, then fully replaces the `catalogs` and `products` tables.
//! Each table replace is atomic on its own; the pair is not. If `products`
//! fails after `catalogs` committed, the new catalogs remain.

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::{
    data::Table,
    error::EtlError,
    extract, io_utils,
    logging::EtlLogger,
    store::{self, CATALOGS, PRODUCTS, RecordStore},
    transform::{self, PRICE_COLUMN},
};

pub const DATE_COLUMNS: &[&str] = &["created_at", "updated_at"];

/// Settings for one load run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub database: PathBuf,
    /// Overrides the extension-derived delimiter for both sources.
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            database: PathBuf::from(store::DEFAULT_DATABASE),
            delimiter: None,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub catalogs: usize,
    pub products: usize,
    pub imputed_price: Option<f64>,
    pub unparsed_timestamps: usize,
}

pub fn run_etl(
    catalog_source: &Path,
    product_source: &Path,
    options: &LoadOptions,
    logger: &EtlLogger<'_>,
) -> Result<LoadSummary, EtlError> {
    logger.info(format_args!("Starting ETL process..."));
    match execute(catalog_source, product_source, options, logger) {
        Ok(summary) => {
            logger.info(format_args!(
                "ETL completed successfully: {} catalog(s), {} product(s) written to {:?}",
                summary.catalogs, summary.products, options.database
            ));
            Ok(summary)
        }
        Err(err) => {
            match &err {
                EtlError::SourceNotFound { path, source } => logger.error(format_args!(
                    "[{}] File not found: {path:?}{}",
                    err.stage(),
                    source
                        .as_ref()
                        .map(|io| format!(" ({io})"))
                        .unwrap_or_default()
                )),
                EtlError::EmptySource { path } => logger.error(format_args!(
                    "[{}] CSV file is empty: {path:?}",
                    err.stage()
                )),
                other => logger.error(format_args!(
                    "[{}] Unexpected error during ETL: {}",
                    other.stage(),
                    error_chain(other)
                )),
            }
            Err(err)
        }
    }
}

fn execute(
    catalog_source: &Path,
    product_source: &Path,
    options: &LoadOptions,
    logger: &EtlLogger<'_>,
) -> Result<LoadSummary, EtlError> {
    let catalogs = read(CATALOGS.name, catalog_source, options, logger)?;
    let products = read(PRODUCTS.name, product_source, options, logger)?;

    let catalogs = catalogs.normalize_headers()?;
    let products = products.normalize_headers()?;
    catalogs.require_columns(&CATALOGS.column_names())?;
    products.require_columns(&PRODUCTS.column_names())?;

    let unparsed_before =
        count_missing(&catalogs, DATE_COLUMNS)? + count_missing(&products, DATE_COLUMNS)?;
    let catalogs = transform::normalize_dates(catalogs, DATE_COLUMNS)?;
    let products = transform::normalize_dates(products, DATE_COLUMNS)?;
    let unparsed_timestamps = (count_missing(&catalogs, DATE_COLUMNS)?
        + count_missing(&products, DATE_COLUMNS)?)
    .saturating_sub(unparsed_before);
    if unparsed_timestamps > 0 {
        logger.warn(format_args!(
            "{unparsed_timestamps} timestamp value(s) could not be parsed and were left empty"
        ));
    }

    let products = transform::normalize_product_names(products)?;
    let products = transform::coerce_numeric(products, PRICE_COLUMN)?;
    let imputed_price = transform::column_mean(&products, PRICE_COLUMN)?;
    let missing_prices = products.missing_count(PRICE_COLUMN)?;
    let products = transform::fill_empty_prices_with_average(products)?;
    match imputed_price {
        Some(mean) if missing_prices > 0 => logger.info(format_args!(
            "Filled {missing_prices} missing price(s) with batch average {mean}"
        )),
        None if missing_prices > 0 => logger.warn(format_args!(
            "No valid prices in batch; {missing_prices} price(s) left empty"
        )),
        _ => {}
    }

    let mut store = RecordStore::open(&options.database)?;
    store.ensure_schema()?;
    let catalog_rows = store.replace_table(&CATALOGS, &catalogs)?;
    logger.debug(format_args!("Replaced '{}' with {catalog_rows} row(s)", CATALOGS.name));
    let product_rows = store.replace_table(&PRODUCTS, &products)?;
    logger.debug(format_args!("Replaced '{}' with {product_rows} row(s)", PRODUCTS.name));
    store.close()?;

    Ok(LoadSummary {
        catalogs: catalog_rows,
        products: product_rows,
        imputed_price: imputed_price.filter(|_| missing_prices > 0),
        unparsed_timestamps,
    })
}

fn read(
    name: &str,
    path: &Path,
    options: &LoadOptions,
    logger: &EtlLogger<'_>,
) -> Result<Table, EtlError> {
    logger.info(format_args!("Reading {name} CSV: {}", path.display()));
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let table = extract::read_source(name, path, delimiter, options.encoding)?;
    logger.info(format_args!(
        "Read {} row(s) across {} column(s) from {}",
        table.len(),
        table.headers().len(),
        path.display()
    ));
    Ok(table)
}

fn count_missing(table: &Table, columns: &[&str]) -> Result<usize, EtlError> {
    columns
        .iter()
        .map(|column| table.missing_count(column))
        .sum()
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
