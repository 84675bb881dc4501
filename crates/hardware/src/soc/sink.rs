//! Byte output sinks.
//!
//! The UART emits transmitted bytes through an injected [`ByteSink`] rather than
//! a global stream handle. Sinks flush after every byte and swallow I/O errors:
//! the transmit path treats emission as always succeeding.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::OutputTarget;

/// Capability to emit transmitted bytes.
pub trait ByteSink: Send + Sync {
    /// Emits one byte and flushes it.
    fn write_byte(&mut self, byte: u8);
}

/// Writes to the process's standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl ByteSink for StdoutSink {
    fn write_byte(&mut self, byte: u8) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(&[byte]);
        let _ = out.flush();
    }
}

/// Writes to the process's standard error (for visibility when stdout is captured).
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl ByteSink for StderrSink {
    fn write_byte(&mut self, byte: u8) {
        let mut out = io::stderr().lock();
        let _ = out.write_all(&[byte]);
        let _ = out.flush();
    }
}

/// Discards every byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ByteSink for NullSink {
    fn write_byte(&mut self, _byte: u8) {}
}

/// Collects bytes in shared memory.
///
/// Clones share the same buffer, so a clone kept by the caller observes
/// everything written through the clone handed to a device.
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    /// Creates an empty buffer sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the written bytes decoded lossily as UTF-8.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ByteSink for BufferSink {
    fn write_byte(&mut self, byte: u8) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(byte);
    }
}

/// Builds the sink selected by configuration.
pub fn for_target(target: OutputTarget) -> Box<dyn ByteSink> {
    match target {
        OutputTarget::Stdout => Box::new(StdoutSink),
        OutputTarget::Stderr => Box::new(StderrSink),
        OutputTarget::Null => Box::new(NullSink),
    }
}
