//! Trace file parsing.
//!
//! Traces are plain text, one request per line: an operation letter (`r`
//! or `w`) followed by whitespace and a hexadecimal byte address, with or
//! without a `0x` prefix. Blank lines are skipped; anything after the
//! address is ignored.

use std::io::BufRead;

use crate::cache::Access;
use crate::common::error::TraceError;

/// One parsed trace line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRequest {
    /// Read or write.
    pub access: Access,
    /// Byte address of the request.
    pub addr: u32,
}

/// Parses one nonblank trace line. `line_no` is 1-based and used only for
/// error reporting.
fn parse_line(line_no: usize, line: &str) -> Result<TraceRequest, TraceError> {
    let mut fields = line.split_whitespace();
    // Callers skip blank lines, so the first field is present.
    let op = fields.next().unwrap_or("");
    let access = match op {
        "r" => Access::Read,
        "w" => Access::Write,
        other => {
            return Err(TraceError::UnknownOp {
                line: line_no,
                op: other.to_owned(),
            });
        }
    };
    let text = fields
        .next()
        .ok_or(TraceError::MissingAddress { line: line_no })?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let addr = u32::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line: line_no,
        text: text.to_owned(),
    })?;
    Ok(TraceRequest { access, addr })
}

/// Streams [`TraceRequest`]s out of a buffered reader.
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a reader positioned at the start of a trace.
    pub const fn new(reader: R) -> Self {
        Self { reader, line_no: 0 }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRequest, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut line = String::new();
            self.line_no += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_line(self.line_no, &line));
                }
                Err(err) => return Some(Err(TraceError::Io(err))),
            }
        }
    }
}
