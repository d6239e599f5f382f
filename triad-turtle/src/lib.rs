//! # Triad Turtle
//!
//! A lazy triple source over Turtle-line data for the Triad triple store.
//!
//! [`TurtleSource`] wraps any [`BufRead`](std::io::BufRead) and yields
//! parsed [`Triple`](triad_core::Triple)s on demand. It recognizes only
//! the line-oriented subset the store loads: `<iri>` and `"literal"`
//! resources, three per triple, `.`-terminated. A parse failure ends the
//! sequence with a single positioned error.

pub mod error;
pub mod source;

pub use error::{Result, TurtleError};
pub use source::TurtleSource;
