//! Tracing setup. The filter comes from `MULTIPICK_LOG` (default `warn`).
//!
//! Stderr output can be held back while the terminal is in raw mode and is
//! written out once it is released.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MULTIPICK_LOG";

static HELD: AtomicBool = AtomicBool::new(false);
static BACKLOG: Mutex<Vec<u8>> = Mutex::new(Vec::new());

/// Stderr writer that buffers while [`hold_stderr`] is in effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrWriter;

impl Write for StderrWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if HELD.load(Ordering::Acquire) {
            if let Ok(mut backlog) = BACKLOG.lock() {
                backlog.extend_from_slice(buf);
            }
            return Ok(buf.len());
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if HELD.load(Ordering::Acquire) {
            return Ok(());
        }
        io::stderr().flush()
    }
}

/// Buffer log lines instead of writing them to stderr.
pub fn hold_stderr() {
    HELD.store(true, Ordering::Release);
}

/// Stop buffering and write out what was held. Returns the number of bytes
/// written.
pub fn release_stderr() -> io::Result<usize> {
    HELD.store(false, Ordering::Release);
    let backlog = match BACKLOG.lock() {
        Ok(mut backlog) => std::mem::take(&mut *backlog),
        Err(_) => return Ok(0),
    };
    if !backlog.is_empty() {
        let mut err = io::stderr();
        err.write_all(&backlog)?;
        err.flush()?;
    }
    Ok(backlog.len())
}

/// Install the global subscriber, writing to `log_file` if given or stderr.
///
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(|| StderrWriter)
            .try_init(),
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
    Ok(())
}
