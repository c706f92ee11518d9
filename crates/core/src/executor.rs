//! Recording executor - captures generated SQL text into an output writer
//!
//! One executor is bound per directory bucket and dropped with it, so a
//! bucket's writer is never held while another bucket is processed.

use std::io::Write;

use crate::error::SiltResult;

/// Receives the SQL text produced while visiting changesets and records
/// it into the writer it was bound to.
pub struct RecordingExecutor {
    output: Box<dyn Write>,
}

impl RecordingExecutor {
    /// Bind a new executor to an output writer
    pub fn new(output: impl Write + 'static) -> Self {
        Self {
            output: Box::new(output),
        }
    }

    /// Record an SQL comment. Multi-line text becomes one comment per line.
    pub fn comment(&mut self, text: &str) -> SiltResult<()> {
        for line in text.lines() {
            writeln!(self.output, "-- {}", line)?;
        }
        Ok(())
    }

    /// Record one SQL statement, normalized to end with `;` and a blank line
    pub fn execute(&mut self, sql: &str) -> SiltResult<()> {
        let sql = sql.trim_end();
        if sql.is_empty() {
            return Ok(());
        }
        if sql.ends_with(';') {
            writeln!(self.output, "{}\n", sql)?;
        } else {
            writeln!(self.output, "{};\n", sql)?;
        }
        Ok(())
    }

    /// Flush buffered writes to the underlying resource
    pub fn flush(&mut self) -> SiltResult<()> {
        self.output.flush()?;
        Ok(())
    }
}
