//! Protocol writer
//!
//! Serializes [`ProtocolEvent`]s to the outbound channel, one ASCII line
//! per event, in the order they are handed over.

use crate::common::{FlushMode, ProtocolEvent, Result};
use std::io::Write;

/// Writes protocol lines to any [`Write`] sink.
///
/// In [`FlushMode::Line`] every line is handed to the sink and flushed as
/// soon as it is written. In [`FlushMode::Transaction`] lines are held
/// until COMMIT and then written in one piece, so a consumer sees whole
/// transactions at a time whatever their size.
pub struct ProtocolWriter<W: Write> {
    out: W,
    pending: Vec<u8>,
    flush_mode: FlushMode,
    lines_written: u64,
}

impl<W: Write> ProtocolWriter<W> {
    pub fn new(out: W, flush_mode: FlushMode) -> Self {
        Self {
            out,
            pending: Vec::new(),
            flush_mode,
            lines_written: 0,
        }
    }

    /// Append one event as a newline-terminated line.
    pub fn write(&mut self, event: &ProtocolEvent) -> Result<()> {
        writeln!(self.pending, "{}", event)?;
        self.lines_written += 1;

        let flush = match self.flush_mode {
            FlushMode::Line => true,
            FlushMode::Transaction => matches!(event, ProtocolEvent::Commit),
        };
        if flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Write out anything held back and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.out.write_all(&self.pending)?;
            self.pending.clear();
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }

    /// Switch flush policy, flushing whatever is held back first.
    pub fn set_flush_mode(&mut self, mode: FlushMode) -> Result<()> {
        self.flush()?;
        self.flush_mode = mode;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Bytes written but not yet handed to the sink.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.out)
    }
}
