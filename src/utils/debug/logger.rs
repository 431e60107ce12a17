/*
 * Simulator Logging System
 *
 * This module implements the `log` backend of the simulator. Records are
 * formatted into a fixed-capacity line (no heap allocation per record) and
 * appended to the global log buffer, from which the host drains them.
 *
 * Overlong records are cut and marked with "..".
 */

use core::fmt::{self, Write};

use heapless::String;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

use super::log_buffer::{self, LINE_CAPACITY};

/// Logger that writes into the in-memory log buffer
struct SimLogger;

impl log::Log for SimLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            log_buffer::write_log(&format_line(record));
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimLogger = SimLogger;

/// Fixed-capacity line that keeps as much of the record as fits
struct LineWriter {
    line: String<LINE_CAPACITY>,
    overflow: bool,
}

impl Write for LineWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.line.push(ch).is_err() {
                self.overflow = true;
                break;
            }
        }
        Ok(())
    }
}

/// Format a record as "[LEVEL] message\n", truncated to LINE_CAPACITY
fn format_line(record: &Record) -> String<LINE_CAPACITY> {
    let mut writer = LineWriter {
        line: String::new(),
        overflow: false,
    };
    let _ = write!(writer, "[{}] {}", record.level(), record.args());

    let mut line = writer.line;
    if writer.overflow || line.len() > LINE_CAPACITY - 1 {
        while line.len() > LINE_CAPACITY - 3 {
            line.pop();
        }
        let _ = line.push_str("..");
    }
    let _ = line.push('\n');
    line
}

/// Install the logger with the given maximum level
///
/// Fails if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
