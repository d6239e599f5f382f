//! The lazy Turtle-line triple source.
//!
//! The accepted format is one triple per statement: three
//! whitespace-separated resources terminated by `.`. A resource is
//! `<...>` (IRI) or `"..."` (literal); the payload is the raw bytes
//! between the delimiters, with no escape processing, prefixes, blank
//! nodes or datatypes. Whitespace and newlines between tokens are
//! skipped.

use std::io::BufRead;

use triad_core::{Resource, Triple};

use crate::error::{Result, TurtleError};

/// A minimal pull scanner over a byte stream: one byte of lookahead and
/// a running offset for diagnostics.
struct ByteScanner<R> {
    inner: R,
    peeked: Option<u8>,
    position: u64,
}

impl<R: BufRead> ByteScanner<R> {
    fn new(inner: R) -> Self {
        ByteScanner {
            inner,
            peeked: None,
            position: 0,
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            let position = self.position;
            let byte = match self.inner.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(source) => return Err(TurtleError::Io { position, source }),
            };
            if byte.is_some() {
                self.inner.consume(1);
            }
            self.peeked = byte;
        }
        Ok(self.peeked)
    }

    fn bump(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.peeked = None;
            self.position += 1;
        }
        Ok(byte)
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() {
                self.bump()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Read one resource: `<...>` or `"..."`. Any other start byte, or
    /// EOF before the closing delimiter, is malformed.
    fn read_resource(&mut self, part: &'static str) -> Result<Resource> {
        self.skip_whitespace()?;

        let malformed = |position| TurtleError::Malformed { part, position };

        let open = self.bump()?.ok_or(malformed(self.position))?;
        let close = match open {
            b'<' => b'>',
            b'"' => b'"',
            _ => return Err(malformed(self.position)),
        };

        let mut payload = Vec::new();
        loop {
            match self.bump()? {
                Some(b) if b == close => break,
                Some(b) => payload.push(b),
                None => return Err(malformed(self.position)),
            }
        }

        let payload = String::from_utf8_lossy(&payload);
        Ok(match open {
            b'<' => Resource::iri(payload),
            _ => Resource::literal(payload),
        })
    }
}

/// A lazy, fused sequence of parsed triples over a byte stream.
///
/// Each triple is parsed and yielded before its terminating `.` is
/// validated; the delimiter is only read on the next pull, together
/// with the following triple. A triple with a bad or missing full stop
/// is therefore still yielded once, and the error surfaces afterwards.
///
/// The first malformed token yields one positioned [`TurtleError`], after
/// which the source is exhausted — exactly as it is at EOF. Triples
/// already yielded stay with the caller.
pub struct TurtleSource<R> {
    scan: ByteScanner<R>,
    failed: bool,
    pending_delimiter: bool,
}

impl<R: BufRead> TurtleSource<R> {
    pub fn new(inner: R) -> Self {
        TurtleSource {
            scan: ByteScanner::new(inner),
            failed: false,
            pending_delimiter: false,
        }
    }

    /// Finish off the previous triple: consume its full stop.
    fn read_end(&mut self) -> Result<()> {
        self.scan.skip_whitespace()?;
        match self.scan.bump()? {
            Some(b'.') => Ok(()),
            _ => Err(TurtleError::Malformed {
                part: "triple delimiter",
                position: self.scan.position,
            }),
        }
    }

    /// Parse the subject, predicate and object of the next triple.
    fn read_triple(&mut self) -> Result<Option<Triple>> {
        self.scan.skip_whitespace()?;
        if self.scan.peek()?.is_none() {
            return Ok(None);
        }

        let s = self.scan.read_resource("subject")?;
        let p = self.scan.read_resource("predicate")?;
        let o = self.scan.read_resource("object")?;
        Ok(Some(Triple::new(s, p, o)))
    }

    fn step(&mut self) -> Result<Option<Triple>> {
        if self.pending_delimiter {
            self.pending_delimiter = false;
            self.read_end()?;
        }

        let triple = self.read_triple()?;
        self.pending_delimiter = triple.is_some();
        Ok(triple)
    }
}

impl<R: BufRead> Iterator for TurtleSource<R> {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(Some(t)) => Some(Ok(t)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
