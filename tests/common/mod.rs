#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{Level, Log, Metadata, Record};
use tempfile::{TempDir, tempdir};

pub const CATALOGS_CSV: &str = "\
catalog_id,name,created_at,updated_at
1,electronics,2024-01-01,2024-01-03
2,clothing,2024-01-02,2024-01-04
";

pub const PRODUCTS_CSV: &str = "\
product_id,name,price,catalog_id,created_at,updated_at
10, phone ,100,1,2024-01-05,2024-01-07
11, SHIRT ,,2,2024-01-06,2024-01-08
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Database path inside the workspace; the file is created by the first load.
    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("etl_data.db")
    }
}

/// Logger that keeps every record for later assertions.
#[derive(Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl CapturingLogger {
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().expect("log lock").clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .expect("log lock")
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
