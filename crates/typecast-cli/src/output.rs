//! Output formatting and writing utilities
//!
//! Reports (run summaries, output schemas) are written in the format chosen
//! with `--format`. Records never go through this module; they are written
//! by the run handler directly.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;
use typecast_core::StatsSnapshot;

/// Formatting of serializable reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the counters of a finished run
    fn format_stats(&self, stats: &StatsSnapshot) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_stats(&self, stats: &StatsSnapshot) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format!(
                "Records: {}\nNulled columns: {}\nMissing paths: {}",
                stats.records, stats.nulled_columns, stats.missing_paths
            )),
            _ => self.format(stats),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Writer for reports that must stay off stdout, which carries records
    pub fn stderr(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stderr()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message, even in quiet mode
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!("Outputting {} bytes of data", formatted.len());
        self.writeln(formatted.trim_end())
    }

    /// Write run counters in the configured format
    pub fn stats(&mut self, stats: &StatsSnapshot) -> Result<()> {
        if self.quiet && self.format == OutputFormat::Human {
            return Ok(());
        }
        let formatted = self.format.format_stats(stats)?;
        self.writeln(formatted.trim_end())
    }

    /// Write an aligned table; human format only
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = render_row(headers.iter().copied(), &widths);
        if self.use_color {
            self.writeln(&header.bold().to_string())?;
        } else {
            self.writeln(&header)?;
        }
        for row in rows {
            let line = render_row(row.iter().map(String::as_str), &widths);
            self.writeln(&line)?;
        }
        Ok(())
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Cloneable in-memory sink for inspecting writer output
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let output = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
        (output, buffer)
    }

    fn stats() -> StatsSnapshot {
        StatsSnapshot {
            records: 3,
            nulled_columns: 1,
            missing_paths: 2,
        }
    }

    #[test]
    fn test_human_messages() {
        let (mut output, buffer) = writer(OutputFormat::Human, false);
        output.info("loading").unwrap();
        output.warning("careful").unwrap();
        output.section("Schema").unwrap();
        assert_eq!(buffer.contents(), "INFO: loading\nWARNING: careful\n\n=== Schema ===\n");
    }

    #[test]
    fn test_quiet_keeps_warnings() {
        let (mut output, buffer) = writer(OutputFormat::Human, true);
        output.info("loading").unwrap();
        output.success("done").unwrap();
        output.warning("careful").unwrap();
        assert_eq!(buffer.contents(), "WARNING: careful\n");
    }

    #[test]
    fn test_machine_formats_skip_messages() {
        let (mut output, buffer) = writer(OutputFormat::Json, false);
        output.info("loading").unwrap();
        output.stats(&stats()).unwrap();
        assert_eq!(
            buffer.contents(),
            "{\"records\":3,\"nulled_columns\":1,\"missing_paths\":2}\n"
        );
    }

    #[test]
    fn test_human_stats() {
        let (mut output, buffer) = writer(OutputFormat::Human, false);
        output.stats(&stats()).unwrap();
        assert_eq!(buffer.contents(), "Records: 3\nNulled columns: 1\nMissing paths: 2\n");
    }

    #[test]
    fn test_yaml_data() {
        let (mut output, buffer) = writer(OutputFormat::Yaml, false);
        output.data(&serde_json::json!({"name": "id"})).unwrap();
        assert_eq!(buffer.contents(), "name: id\n");
    }

    #[test]
    fn test_table_alignment() {
        let (mut output, buffer) = writer(OutputFormat::Human, false);
        output
            .table(
                &["#", "NAME", "TYPE"],
                &[
                    vec!["0".to_string(), "id".to_string(), "long".to_string()],
                    vec!["1".to_string(), "payload".to_string(), "json".to_string()],
                ],
            )
            .unwrap();
        assert_eq!(
            buffer.contents(),
            "#  NAME     TYPE\n0  id       long\n1  payload  json\n"
        );
    }
}
