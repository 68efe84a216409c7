pub mod cli;
pub mod data;
pub mod error;
pub mod etl;
pub mod extract;
pub mod io_utils;
pub mod logging;
pub mod report;
pub mod store;
pub mod table;
pub mod transform;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::{
    cli::{Cli, Commands},
    etl::LoadOptions,
    logging::{EtlLogger, init_logging},
};

pub use error::{EtlError, Stage};
pub use etl::{LoadSummary, run_etl};

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => handle_load(&args),
        Commands::Report(args) => report::execute(&args),
    }
}

fn handle_load(args: &cli::LoadArgs) -> Result<()> {
    let options = LoadOptions {
        database: args.database.clone(),
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    let summary = run_etl(
        &args.catalogs,
        &args.products,
        &options,
        &EtlLogger::global(),
    )
    .with_context(|| {
        format!(
            "ETL failed: loading {:?} and {:?} into {:?}",
            args.catalogs, args.products, args.database
        )
    })?;
    info!(
        "Loaded {} catalog(s) and {} product(s)",
        summary.catalogs, summary.products
    );
    Ok(())
}
