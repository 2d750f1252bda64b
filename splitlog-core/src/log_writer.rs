use std::io::{self, Stdout, Write};

use colored::{ColoredString, Colorize};

use crate::{Level, LogRecord};

/// Destination that receives formatted records.
pub trait LogWriter {
    fn write(&mut self, record: &LogRecord);
    fn flush(&mut self);
}

fn colored_label(level: Level) -> ColoredString {
    let label = level.label();
    match level {
        Level::Fatal => label.red().bold(),
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Trace => label.purple(),
        Level::Debug => label.blue(),
    }
}

/// Synchronous writer for the console sink.
///
/// Errors are ignored: console output is best-effort.
#[derive(Debug)]
pub struct ConsoleWriter<W: Write = Stdout> {
    out: W,
}

impl Default for ConsoleWriter<Stdout> {
    fn default() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LogWriter for ConsoleWriter<W> {
    fn write(&mut self, record: &LogRecord) {
        let line = record.line_with_level(colored_label(record.level));
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}
