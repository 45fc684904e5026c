//! Buildpack build log
//!
//! User-facing build output follows the buildpack convention: headline
//! lines start with a red `----->` arrow, detail lines are indented to line
//! up beneath the headline text. Diagnostics go through `tracing` instead.

use console::{style, StyledObject};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

const ARROW: &str = "----->";

/// Indentation for detail lines, the width of the arrow plus one space
pub const INDENT: &str = "       ";

/// Line-oriented writer for build output
#[derive(Clone)]
pub struct Logger {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    colors: bool,
}

impl Logger {
    /// Log to an arbitrary writer
    pub fn new(writer: impl Write + Send + 'static, colors: bool) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
            colors,
        }
    }

    /// Log to standard output
    pub fn stdout(colors: bool) -> Self {
        Self::new(io::stdout(), colors)
    }

    /// Discard all output
    pub fn sink() -> Self {
        Self::new(io::sink(), false)
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    /// Style a value, honouring this logger's colour setting
    pub fn style<D>(&self, value: D) -> StyledObject<D> {
        style(value).force_styling(self.colors)
    }

    /// Headline line: `-----> message`
    pub fn first_line(&self, message: impl fmt::Display) {
        let arrow = self.style(ARROW).red().bold();
        self.line(format_args!("{} {}", arrow, message));
    }

    /// Detail line, indented beneath the headline text
    pub fn sub_line(&self, message: impl fmt::Display) {
        self.line(format_args!("{}{}", INDENT, message));
    }

    /// Write a pre-formatted line
    pub fn line(&self, line: impl fmt::Display) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => {
                warn!("Build log writer was poisoned, continuing");
                poisoned.into_inner()
            }
        };
        let written = writeln!(out, "{}", line);
        if let Err(e) = written.and_then(|()| out.flush()) {
            warn!("Failed to write build log: {}", e);
        }
    }

    /// Render `name version` the way dependency headlines show it
    pub fn pretty_version(&self, name: &str, version: &str) -> String {
        format!(
            "{} {}",
            self.style(name).blue().bold(),
            self.style(version).blue()
        )
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

/// In-memory writer for capturing log output in tests
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Capture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[cfg(test)]
impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
