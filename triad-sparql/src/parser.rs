//! Incremental parser for the query language.
//!
//! Grammar (whitespace-delimited tokens):
//!
//! ```text
//! query  := "QUIT" | "LOAD" <filename-rest-of-line>
//!         | "SELECT" <var>* "WHERE" "{" triples "}"
//!         | "COUNT" "WHERE" "{" triples "}"
//! triples := (triple ".")* triple? (".")?
//! triple  := term term term
//! term    := "?" <identifier> | "<" ... ">" | "\"" ... "\""
//! ```
//!
//! [`QueryReader`] consumes one query per call directly off a
//! [`BufRead`], so a single stream — stdin, an `-i` string, a query file
//! — can carry any number of queries, and interactive input parses as it
//! arrives.

use std::io::BufRead;

use triad_core::{Resource, Term, TriplePattern, Variable};

use crate::error::{ParseError, Result};

/// A parsed query.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    Quit,
    /// Load the Turtle file at the given path.
    Load(String),
    Select {
        projection: Vec<Variable>,
        patterns: Vec<TriplePattern>,
    },
    Count {
        patterns: Vec<TriplePattern>,
    },
    /// Blank input, or end of the stream.
    Empty,
}

/// One byte of lookahead over a byte stream.
struct ByteScanner<R> {
    inner: R,
    peeked: Option<u8>,
}

impl<R: BufRead> ByteScanner<R> {
    fn new(inner: R) -> Self {
        ByteScanner {
            inner,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            let byte = self.inner.fill_buf()?.first().copied();
            if byte.is_some() {
                self.inner.consume(1);
            }
            self.peeked = byte;
        }
        Ok(self.peeked)
    }

    fn bump(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        self.peeked = None;
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

    /// Skip whitespace, then read a maximal run of non-whitespace bytes.
    /// Empty at end of stream.
    fn read_word(&mut self) -> Result<String> {
        self.skip_whitespace()?;
        let mut word = Vec::new();
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() {
                break;
            }
            word.push(b);
            self.bump()?;
        }
        Ok(String::from_utf8_lossy(&word).into_owned())
    }

    /// Read the rest of the current line, consuming the newline.
    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        while let Some(b) = self.bump()? {
            if b == b'\n' {
                break;
            }
            line.push(b);
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Reads queries one at a time off a byte stream.
pub struct QueryReader<R> {
    scan: ByteScanner<R>,
}

impl<R: BufRead> QueryReader<R> {
    pub fn new(inner: R) -> Self {
        QueryReader {
            scan: ByteScanner::new(inner),
        }
    }

    /// Parse the next query. Returns [`Query::Empty`] once the stream is
    /// exhausted.
    pub fn next_query(&mut self) -> Result<Query> {
        let first = self.scan.read_word()?;
        if first.is_empty() {
            return Ok(Query::Empty);
        }

        match first.as_str() {
            "QUIT" => Ok(Query::Quit),
            "LOAD" => {
                self.scan.skip_whitespace()?;
                let filename = self.scan.read_line()?;
                Ok(Query::Load(filename.trim_end().to_string()))
            }
            "SELECT" => self.parse_match(true),
            "COUNT" => self.parse_match(false),
            other => Err(ParseError::InvalidCommand(other.to_string())),
        }
    }

    /// Resynchronize after a parse error by discarding the rest of the
    /// current line. Interactive-driver convenience.
    pub fn recover(&mut self) -> Result<()> {
        self.scan.read_line()?;
        Ok(())
    }

    fn parse_match(&mut self, is_select: bool) -> Result<Query> {
        // Projection variables, up to the WHERE keyword.
        let mut projection = Vec::new();
        loop {
            let word = self.scan.read_word()?;
            if word.is_empty() {
                return Err(ParseError::MissingOpenBracket);
            }
            if word == "WHERE" {
                break;
            }
            match word.strip_prefix('?') {
                Some(name) => projection.push(Variable::new(name)),
                None => return Err(ParseError::BadProjectionVariable(word)),
            }
        }

        self.scan.skip_whitespace()?;
        if self.scan.bump()? != Some(b'{') {
            return Err(ParseError::MissingOpenBracket);
        }

        let mut patterns = Vec::new();
        loop {
            // Peeking for the bracket permits both empty WHERE clauses
            // and an optional full stop after the final pattern.
            self.scan.skip_whitespace()?;
            match self.scan.peek()? {
                None => return Err(ParseError::MissingCloseBracket),
                Some(b'}') => {
                    self.scan.bump()?;
                    break;
                }
                Some(_) => {}
            }

            let s = self.read_term("subject", patterns.len())?;
            let p = self.read_term("predicate", patterns.len())?;
            let o = self.read_term("object", patterns.len())?;
            patterns.push(TriplePattern::new(s, p, o));

            self.scan.skip_whitespace()?;
            match self.scan.bump()? {
                Some(b'.') => {}
                Some(b'}') => break,
                Some(b) => return Err(ParseError::BadDelimiter(b as char)),
                None => return Err(ParseError::MissingCloseBracket),
            }
        }

        if is_select {
            Ok(Query::Select {
                projection,
                patterns,
            })
        } else {
            Ok(Query::Count { patterns })
        }
    }

    fn read_term(&mut self, role: &'static str, index: usize) -> Result<Term> {
        self.scan.skip_whitespace()?;

        let bad = ParseError::BadTerm { role, index };

        match self.scan.peek()? {
            Some(b'?') => {
                self.scan.bump()?;
                let name = self.scan.read_word()?;
                if name.is_empty() {
                    return Err(bad);
                }
                Ok(Term::Var(Variable::new(name)))
            }
            Some(open @ (b'<' | b'"')) => {
                self.scan.bump()?;
                let close = if open == b'<' { b'>' } else { b'"' };
                let mut payload = Vec::new();
                loop {
                    match self.scan.bump()? {
                        Some(b) if b == close => break,
                        Some(b) => payload.push(b),
                        None => return Err(bad),
                    }
                }
                let payload = String::from_utf8_lossy(&payload);
                Ok(Term::Res(if open == b'<' {
                    Resource::iri(payload)
                } else {
                    Resource::literal(payload)
                }))
            }
            _ => Err(bad),
        }
    }
}

/// Parse a single query from a string. Convenience for tests and inline
/// callers; trailing text after the first query is ignored.
pub fn parse_query(input: &str) -> Result<Query> {
    QueryReader::new(std::io::Cursor::new(input)).next_query()
}
