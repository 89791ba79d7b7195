//! Timestamped logging to stdout with an optional file mirror.
//!
//! [`Notifier`] owns an `env_logger::Logger` that is built but never installed as the
//! global `log` backend. It is created once in `main` and handed by reference to
//! everything that needs to report progress.
//!
//! Every record is rendered as `<YYYY-mm-dd HH:MM:SS> - <LEVEL> - <message>` and written
//! to a single sink. When a log file is given the sink tees each line to stdout and the
//! file, so both see the same lines in the same order.
//!
//! Verbosity maps to the default filter level:
//! - `0` → [`LevelFilter::Info`]
//! - `1` → [`LevelFilter::Debug`]
//! - `2+` → [`LevelFilter::Trace`]
//!
//! `RUST_LOG` is still honoured for anything the verbosity flag does not override.

use anyhow::{Context, Result};
use env_logger::{Env, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerbosityLevel {
    Info = 0,
    Debug = 1,
    Trace = 2,
}

impl From<u8> for VerbosityLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => VerbosityLevel::Info,
            1 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }
}

impl VerbosityLevel {
    fn to_log_level(self) -> LevelFilter {
        match self {
            VerbosityLevel::Info => LevelFilter::Info,
            VerbosityLevel::Debug => LevelFilter::Debug,
            VerbosityLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Writes every formatted line to the console and, if present, the log file.
struct TeeSink<W: Write> {
    console: W,
    file: Option<File>,
}

impl<W: Write> Write for TeeSink<W> {
    // The file gets every line even when stdout is gone (e.g. EPIPE)
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let console = self.console.write_all(buf);
        let file = match self.file.as_mut() {
            Some(file) => file.write_all(buf),
            None => Ok(()),
        };
        console.and(file)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let console = self.console.flush();
        let file = match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        };
        console.and(file)
    }
}

pub struct Notifier {
    verbosity: VerbosityLevel,
    logger: env_logger::Logger,
}

impl Notifier {
    /// Logs to stdout, and additionally appends to `log_file` when one is given.
    pub fn new(verbosity_level: u8, log_file: Option<&Path>) -> Result<Self> {
        let file = match log_file {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?,
            ),
            None => None,
        };

        let sink = TeeSink {
            console: io::stdout(),
            file,
        };
        let notifier = Self::with_writer(verbosity_level, Box::new(sink));

        if let Some(path) = log_file {
            notifier.info(&format!("Logs are also written to {}", path.display()));
        }

        Ok(notifier)
    }

    /// Logs to an arbitrary writer instead of stdout.
    pub fn with_writer(verbosity_level: u8, writer: Box<dyn Write + Send + 'static>) -> Self {
        let verbosity = VerbosityLevel::from(verbosity_level);

        let logger = env_logger::Builder::from_env(Env::default())
            .filter_level(verbosity.to_log_level())
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    chrono::Local::now().format(TIMESTAMP_FORMAT),
                    record.level(),
                    record.args()
                )
            })
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(writer))
            .build();

        Self { verbosity, logger }
    }

    fn emit(&self, level: Level, message: &str) {
        self.logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target(module_path!())
                .build(),
        );
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.emit(Level::Trace, message);
    }

    pub fn verbosity_level(&self) -> VerbosityLevel {
        self.verbosity
    }
}
