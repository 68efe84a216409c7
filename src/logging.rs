//! Logger setup and the handle the load pipeline writes through.
//!
//! The process installs `env_logger` once via [`init_logging`]. Library code
//! does not reach for the global logger itself: callers hand an [`EtlLogger`]
//! to [`crate::etl::run_etl`], which lets tests capture records directly.

use std::{env, fmt, sync::OnceLock};

use log::{Level, LevelFilter, Log, Record};

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("catalog_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub const DEFAULT_TARGET: &str = "catalog_loader::etl";

#[derive(Clone, Copy)]
pub struct EtlLogger<'a> {
    sink: &'a dyn Log,
    target: &'a str,
}

impl fmt::Debug for EtlLogger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtlLogger")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<'a> EtlLogger<'a> {
    pub fn new(sink: &'a dyn Log) -> Self {
        Self {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// Handle over whatever logger the process installed.
    pub fn global() -> EtlLogger<'static> {
        EtlLogger::new(log::logger())
    }

    pub fn with_target(self, target: &'a str) -> Self {
        Self { target, ..self }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        self.sink.log(
            &Record::builder()
                .level(level)
                .target(self.target)
                .module_path_static(Some(module_path!()))
                .args(args)
                .build(),
        );
    }
}
