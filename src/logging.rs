use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Timestamped log lines to stdout and, optionally, a log file.
pub struct Logger {
    file: Option<File>,
}

impl Logger {
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?,
            ),
            None => None,
        };
        Ok(Logger { file })
    }

    pub fn line(&mut self, msg: &str) -> Result<()> {
        let line = format_line(msg);
        print!("{}", line);
        if let Some(file) = self.file.as_mut() {
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

fn format_line(msg: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}\n", timestamp, msg)
}

macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        $logger.line(&format!($($arg)*))?
    };
}

pub(crate) use log;
