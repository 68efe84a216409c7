//! Canned read queries over the loaded tables.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use log::info;
use serde_json::{Map, Value as JsonValue};

use crate::{
    cli::{OutputFormat, Report, ReportArgs},
    data::Table,
    io_utils,
    store::RecordStore,
    table,
};

impl Report {
    pub fn sql(self) -> &'static str {
        match self {
            Report::Catalogs => "SELECT * FROM catalogs ORDER BY rowid",
            Report::Products => {
                "SELECT p.product_id,
                        p.name AS product_name,
                        p.price,
                        c.name AS catalog_name,
                        p.created_at,
                        p.updated_at
                 FROM products p
                 LEFT JOIN catalogs c ON p.catalog_id = c.catalog_id
                 ORDER BY p.rowid"
            }
        }
    }
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    if !args.database.is_file() {
        bail!(
            "Database {:?} does not exist; run `load` first",
            args.database
        );
    }
    let store = RecordStore::open(&args.database)
        .with_context(|| format!("Opening database {:?}", args.database))?;
    let mut result = run_report(&store, args.report)?;
    if let Some(limit) = args.limit {
        result = truncate(result, limit);
    }
    write_report(&result, args.format, args.output.as_deref())?;
    info!("Report {:?} returned {} row(s)", args.report, result.len());
    Ok(())
}

pub fn run_report(store: &RecordStore, report: Report) -> Result<Table> {
    store
        .query(report.sql())
        .with_context(|| format!("Running {report:?} report"))
}

fn truncate(table: Table, limit: usize) -> Table {
    let mut limited = Table::new(table.name(), table.headers().to_vec());
    for row in table.rows().iter().take(limit) {
        limited.push_row(row.clone());
    }
    limited
}

pub fn write_report(result: &Table, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(output, io_utils::DEFAULT_CSV_DELIMITER)?;
            writer
                .write_record(result.headers())
                .context("Writing report headers")?;
            for row in result.rows() {
                writer
                    .write_record(row.iter().map(|cell| table::cell_display(cell).into_owned()))
                    .context("Writing report row")?;
            }
            writer.flush().context("Flushing report output")?;
        }
        OutputFormat::Table => {
            write_text(output, &table::render_table(result))?;
        }
        OutputFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(&to_json_rows(result))
                .context("Serializing report rows")?;
            rendered.push('\n');
            write_text(output, &rendered)?;
        }
    }
    Ok(())
}

/// One JSON object per row keyed by column name; missing cells become `null`.
pub fn to_json_rows(result: &Table) -> Vec<Map<String, JsonValue>> {
    result
        .rows()
        .iter()
        .map(|row| {
            result
                .headers()
                .iter()
                .cloned()
                .zip(row.iter().map(|cell| {
                    serde_json::to_value(cell).unwrap_or(JsonValue::Null)
                }))
                .collect()
        })
        .collect()
}

fn write_text(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(
                File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
            );
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
        }
        None => print!("{text}"),
    }
    Ok(())
}
