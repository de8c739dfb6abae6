//! Memory-access trace reading.
//!
//! A trace is plain text with one memory reference per line. Fields are
//! separated by whitespace and the second field is the referenced address in
//! hexadecimal (`0x` prefix optional):
//!
//! ```text
//! l 0x1fffff50 1
//! s 1fffff58 4
//! ```
//!
//! Every other field is ignored and blank lines are skipped. This module
//! provides:
//! 1. **Record Parsing:** `parse_record` for a single line.
//! 2. **Streaming:** `TraceReader`, an iterator over any `BufRead`.
//! 3. **Loading:** `Trace`, a named, fully parsed trace held in memory so it
//!    can be replayed against many cache configurations.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::common::{Address, SimError, TraceErrorKind, TraceFormatError};

/// Zero-based position of the address among a record's fields.
pub const ADDRESS_FIELD: usize = 1;

/// Parses one trace line.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Fails when the line has no address field, the field is not hexadecimal,
/// or the address does not fit in 32 bits.
pub fn parse_record(line: &str) -> Result<Option<Address>, TraceErrorKind> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let field = line
        .split_whitespace()
        .nth(ADDRESS_FIELD)
        .ok_or(TraceErrorKind::MissingAddress)?;
    Address::from_hex(field).map(Some)
}

/// Name a trace file is reported under: its file name, else the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Streams addresses out of a trace.
///
/// Yields one item per non-blank line. Errors carry the 1-based line number.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    source: String,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader; `source` names it in I/O errors.
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            source: source.into(),
        }
    }
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Address, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(SimError::Io {
                        path: self.source.clone().into(),
                        source,
                    }));
                }
            };
            self.line_no += 1;

            match parse_record(&line) {
                Ok(Some(address)) => return Some(Ok(address)),
                Ok(None) => {}
                Err(kind) => {
                    return Some(Err(TraceFormatError {
                        line: self.line_no,
                        kind,
                    }
                    .into()));
                }
            }
        }
    }
}

/// A fully parsed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    name: String,
    addresses: Vec<Address>,
}

impl Trace {
    /// Builds a trace from already decoded addresses.
    pub fn new(name: impl Into<String>, addresses: Vec<Address>) -> Self {
        Self {
            name: name.into(),
            addresses,
        }
    }

    /// Parses trace text held in memory.
    ///
    /// # Errors
    ///
    /// Returns the first malformed record.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, TraceFormatError> {
        let addresses = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| match parse_record(line) {
                Ok(Some(address)) => Some(Ok(address)),
                Ok(None) => None,
                Err(kind) => Some(Err(TraceFormatError { line: i + 1, kind })),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, addresses))
    }

    /// Reads and parses every record from `reader`.
    ///
    /// # Errors
    ///
    /// Returns the first read failure or malformed record.
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead) -> Result<Self, SimError> {
        let name = name.into();
        let addresses = TraceReader::new(reader, name.clone()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, addresses))
    }

    /// Loads a trace file; the trace is named after the file name.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] or [`SimError::Trace`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let name = display_name(path);
        let addresses = TraceReader::open(path)?.collect::<Result<Vec<_>, _>>()?;
        debug!(trace = %name, records = addresses.len(), "trace loaded");
        Ok(Self::new(name, addresses))
    }

    /// Name used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Addresses in reference order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the trace holds no references.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
