//! # Triad SPARQL
//!
//! Parser for the query subset the Triad store evaluates: `QUIT`,
//! `LOAD <path>`, `SELECT ?v… WHERE { … }` and `COUNT WHERE { … }`.
//!
//! Parsing is incremental: [`QueryReader`] pulls bytes off any
//! [`BufRead`](std::io::BufRead) and returns one tagged [`Query`] per
//! call, which is what lets the driver serve interactive stdin, inline
//! strings and query files with the same code path.

pub mod error;
pub mod parser;

pub use error::{ParseError, Result};
pub use parser::{parse_query, Query, QueryReader};
