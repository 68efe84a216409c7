//! SQLite-backed record store.
//!
//! The store owns a single [`rusqlite::Connection`]; dropping the store closes
//! it, so every exit path of a load releases the database file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itertools::Itertools;
use rusqlite::{
    Connection, ToSql, params_from_iter,
    types::{ToSqlOutput, ValueRef},
};

use crate::{
    data::{Cell, Table, Value},
    error::EtlError,
};

pub const DEFAULT_DATABASE: &str = "etl_data.db";

/// Declared shape of a destination table.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
    pub constraints: &'static [&'static str],
}

// Ids are declared `INT` rather than `INTEGER` so they do not alias the rowid
// and a missing id is stored as NULL.
pub const CATALOGS: TableDef = TableDef {
    name: "catalogs",
    columns: &[
        ("catalog_id", "INT PRIMARY KEY"),
        ("name", "TEXT"),
        ("created_at", "TEXT"),
        ("updated_at", "TEXT"),
    ],
    constraints: &[],
};

pub const PRODUCTS: TableDef = TableDef {
    name: "products",
    columns: &[
        ("product_id", "INT PRIMARY KEY"),
        ("name", "TEXT"),
        ("price", "REAL"),
        ("catalog_id", "INTEGER"),
        ("created_at", "TEXT"),
        ("updated_at", "TEXT"),
    ],
    constraints: &["FOREIGN KEY (catalog_id) REFERENCES catalogs (catalog_id)"],
};

impl TableDef {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    fn declared_type(&self, column: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, ty)| *ty)
    }

    fn create_sql(&self) -> String {
        let columns = self.columns.iter().map(|(name, ty)| (*name, *ty));
        create_table_sql(self.name, columns, self.constraints)
    }

    /// DDL for a table holding `table`'s columns: declared types for known
    /// columns, inferred types for pass-through ones.
    fn create_sql_for(&self, table: &Table) -> String {
        let columns = table.headers().iter().enumerate().map(|(idx, header)| {
            let ty = self
                .declared_type(header)
                .unwrap_or_else(|| table.column_kind(idx).sql_type());
            (header.as_str(), ty)
        });
        create_table_sql(self.name, columns, self.constraints)
    }
}

fn create_table_sql<'a>(
    name: &str,
    columns: impl Iterator<Item = (&'a str, &'a str)>,
    constraints: &[&str],
) -> String {
    let body = columns
        .map(|(column, ty)| format!("{} {ty}", quote_ident(column)))
        .chain(constraints.iter().map(|c| c.to_string()))
        .join(",\n    ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {body}\n)",
        quote_ident(name)
    )
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
        })
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(Value::Integer(i)),
        ValueRef::Real(f) => Some(Value::Float(f)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(Value::Text(String::from_utf8_lossy(bytes).into_owned()))
        }
    }
}

/// `products.catalog_id` is a soft reference: enforcement stays off so either
/// table can be replaced on its own.
fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = OFF;")
}

#[derive(Debug)]
pub struct RecordStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl RecordStore {
    pub fn open(path: &Path) -> Result<Self, EtlError> {
        let target = path.display().to_string();
        let conn = Connection::open(path).map_err(|err| EtlError::load(&target, err))?;
        apply_pragmas(&conn).map_err(|err| EtlError::load(&target, err))?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, EtlError> {
        let conn = Connection::open_in_memory().map_err(|err| EtlError::load(":memory:", err))?;
        apply_pragmas(&conn).map_err(|err| EtlError::load(":memory:", err))?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the destination tables when they do not exist yet.
    pub fn ensure_schema(&self) -> Result<(), EtlError> {
        for def in [&CATALOGS, &PRODUCTS] {
            self.conn
                .execute_batch(&def.create_sql())
                .map_err(|err| EtlError::load(def.name, err))?;
        }
        Ok(())
    }

    /// Swaps the whole content of `def.name` for `table` inside one transaction.
    ///
    /// The destination is dropped and recreated so pass-through columns of the
    /// source survive. On error the transaction rolls back and the previous
    /// content stays in place.
    pub fn replace_table(&mut self, def: &TableDef, table: &Table) -> Result<usize, EtlError> {
        let fail = |err| EtlError::load(def.name, err);
        let tx = self.conn.transaction().map_err(fail)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(def.name)))
            .map_err(fail)?;
        tx.execute_batch(&def.create_sql_for(table)).map_err(fail)?;
        {
            let columns = table.headers().iter().map(|h| quote_ident(h)).join(", ");
            let placeholders = (1..=table.headers().len())
                .map(|idx| format!("?{idx}"))
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({columns}) VALUES ({placeholders})",
                quote_ident(def.name)
            );
            let mut stmt = tx.prepare(&sql).map_err(fail)?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter())).map_err(fail)?;
            }
        }
        tx.commit().map_err(fail)?;
        Ok(table.len())
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Counting rows of '{table}'"))?;
        Ok(count as usize)
    }

    /// Runs a read query and collects its result set as a [`Table`].
    pub fn query(&self, sql: &str) -> Result<Table> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Preparing query {sql:?}"))?;
        let headers = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = headers.len();
        let mut table = Table::new("query", headers);
        let mut rows = stmt.query([]).context("Running query")?;
        while let Some(row) = rows.next().context("Reading query row")? {
            let cells = (0..width)
                .map(|idx| row.get_ref(idx).map(cell_from_sql))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            table.push_row(cells);
        }
        Ok(table)
    }

    /// Closes the connection, surfacing any error the implicit drop would swallow.
    pub fn close(self) -> Result<(), EtlError> {
        let target = self
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        self.conn
            .close()
            .map_err(|(_, err)| EtlError::load(&target, err))
    }
}
