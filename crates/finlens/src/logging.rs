use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::prelude::*;

/// Initialize `env_logger`. `RUST_LOG` overrides `default_level`.
///
/// When `log_file` is set every line is written to stderr and appended to the
/// file.
pub fn init(default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(Tee::new(io::stderr(), file))));
    }

    builder
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logger: {e}"))
}

/// Writer that duplicates every write to two sinks.
struct Tee<A, B> {
    primary: A,
    secondary: B,
}

impl<A, B> Tee<A, B> {
    fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}
