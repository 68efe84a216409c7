//! Reads a delimited source file into a [`Table`].
//!
//! Failures are classified so callers can tell a bad path
//! ([`EtlError::SourceNotFound`]) from a file without a header
//! ([`EtlError::EmptySource`]) and from unparseable content
//! ([`EtlError::MalformedSource`]).

use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::Path,
};

use encoding_rs::Encoding;

use crate::{
    data::{Table, infer_column_kind, parse_cell},
    error::EtlError,
    io_utils,
};

pub fn read_source(
    name: &str,
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Table, EtlError> {
    let not_found = |source| EtlError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(|err| not_found(Some(err)))?;
    if !metadata.is_file() {
        return Err(not_found(None));
    }
    let file = File::open(path).map_err(|err| not_found(Some(err)))?;
    let reader = io_utils::open_csv_reader(BufReader::new(file), delimiter);
    read_table(name, path, reader, encoding)
}

/// Builds a table from an already opened reader; `path` only labels errors.
pub fn read_table<R: Read>(
    name: &str,
    path: &Path,
    mut reader: csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Table, EtlError> {
    let malformed = |message: String| EtlError::MalformedSource {
        path: path.to_path_buf(),
        message,
    };

    let header_record = reader
        .byte_headers()
        .map_err(|err| malformed(err.to_string()))?
        .clone();
    let headers = io_utils::decode_record(&header_record, encoding)
        .map_err(|err| malformed(format!("header: {err}")))?;
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(EtlError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let mut raw_rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| malformed(format!("row {}: {err}", idx + 2)))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .map_err(|err| malformed(format!("row {}: {err}", idx + 2)))?;
        raw_rows.push(decoded);
    }

    let kinds = (0..headers.len())
        .map(|col| infer_column_kind(raw_rows.iter().map(|row| row[col].as_str())))
        .collect::<Vec<_>>();

    let mut table = Table::new(name, headers);
    for raw in &raw_rows {
        let cells = raw
            .iter()
            .zip(&kinds)
            .map(|(value, kind)| parse_cell(value, *kind))
            .collect();
        table.push_row(cells);
    }
    Ok(table)
}
