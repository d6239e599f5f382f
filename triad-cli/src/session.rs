//! The query driver: owns the dictionary and index, dispatches parsed
//! queries, and renders results.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::time::Instant;

use triad_core::{Cursor, Dictionary, RdfIndex, TriplePattern, Variable};
use triad_query::{order_patterns, plan_shapes, NestedLoopJoin, Policy};
use triad_sparql::{Query, QueryReader};
use triad_turtle::TurtleSource;

use crate::error::{report, CliError, CliResult};

/// What the driver loop should do after a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// A query session over one store.
///
/// Generic over the output sink so tests can capture what would reach
/// stdout; diagnostics go to stderr unconditionally.
pub struct Session<W> {
    dict: Dictionary,
    index: RdfIndex,
    policy: Policy,
    log_plans: bool,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(log_plans: bool, out: W) -> Self {
        Session {
            dict: Dictionary::new(),
            index: RdfIndex::new(),
            policy: Policy::default(),
            log_plans,
            out,
        }
    }

    /// Number of stored triples.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The output sink. Test observability.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Run every query from `reader` until `QUIT` or end of stream.
    ///
    /// Malformed queries print one diagnostic; interactively the reader
    /// resynchronizes at the next line, otherwise the rest of the stream
    /// is abandoned (errors are contained to one query source).
    pub fn run<R: BufRead>(&mut self, reader: R, interactive: bool) -> CliResult<Outcome> {
        let mut queries = QueryReader::new(reader);
        loop {
            match queries.next_query() {
                Ok(Query::Empty) => return Ok(Outcome::Continue),
                Ok(query) => {
                    if self.execute(query)? == Outcome::Quit {
                        return Ok(Outcome::Quit);
                    }
                }
                Err(e) => {
                    report(&CliError::Query(e));
                    if !interactive {
                        return Ok(Outcome::Continue);
                    }
                    queries.recover()?;
                }
            }
        }
    }

    /// Execute one parsed query.
    pub fn execute(&mut self, query: Query) -> CliResult<Outcome> {
        match query {
            Query::Quit => return Ok(Outcome::Quit),
            Query::Empty => {}
            Query::Load(path) => self.load(&path),
            Query::Select {
                projection,
                patterns,
            } => self.select(&projection, &patterns)?,
            Query::Count { patterns } => self.count(&patterns)?,
        }
        Ok(Outcome::Continue)
    }

    /// Stream a Turtle file into the store.
    ///
    /// A missing file or a mid-stream parse error is one diagnostic;
    /// triples inserted before the failure stay in the store.
    fn load(&mut self, path: &str) {
        let started = Instant::now();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                report(&CliError::UnreadableFile {
                    path: path.to_string(),
                    source,
                });
                return;
            }
        };

        let mut loaded = 0usize;
        for item in TurtleSource::new(BufReader::new(file)) {
            match item {
                Ok(triple) => {
                    let coded = self.dict.encode_triple(&triple);
                    self.index.add(coded);
                    loaded += 1;
                }
                Err(e) => {
                    report(&CliError::Input(format!("{path}: {e}")));
                    break;
                }
            }
        }

        tracing::info!(
            path,
            triples = loaded,
            total = self.index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "load finished"
        );
    }

    fn select(
        &mut self,
        projection: &[Variable],
        patterns: &[TriplePattern],
    ) -> CliResult<()> {
        let started = Instant::now();

        // With no patterns, every stored row projects to the empty
        // tuple; the projection variables are all unbound.
        if patterns.is_empty() {
            let row = projection
                .iter()
                .map(Variable::to_string)
                .collect::<Vec<_>>()
                .join("\t");
            for _ in 0..self.index.len() {
                writeln!(self.out, "{row}")?;
            }
            return Ok(());
        }

        let coded = self.plan(patterns);
        let mut join = NestedLoopJoin::new(&self.index, coded);
        join.start();

        let mut answers = 0usize;
        while join.valid() {
            let vm = join.current();
            let mut row = String::new();
            for (i, var) in projection.iter().enumerate() {
                if i > 0 {
                    row.push('\t');
                }
                // An unprojected variable prints as its own name.
                match vm.get(var) {
                    Some(code) => row.push_str(&self.dict.decode(*code).to_string()),
                    None => row.push_str(&var.to_string()),
                }
            }
            writeln!(self.out, "{row}")?;
            answers += 1;
            join.next();
        }

        tracing::debug!(
            answers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "select evaluated"
        );
        Ok(())
    }

    fn count(&mut self, patterns: &[TriplePattern]) -> CliResult<()> {
        let started = Instant::now();

        let total = if patterns.is_empty() {
            self.index.len()
        } else {
            let coded = self.plan(patterns);
            let mut join = NestedLoopJoin::new(&self.index, coded);
            join.start();
            let mut total = 0usize;
            while join.valid() {
                total += 1;
                join.next();
            }
            total
        };

        writeln!(self.out, "{total}")?;
        tracing::debug!(
            total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "count evaluated"
        );
        Ok(())
    }

    /// Encode and order a pattern list for execution.
    fn plan(&mut self, patterns: &[TriplePattern]) -> Vec<triad_core::CodedTriplePattern> {
        let mut coded: Vec<_> = patterns
            .iter()
            .map(|p| self.dict.encode_pattern(p))
            .collect();
        order_patterns(self.policy, &mut coded);
        if self.log_plans {
            eprintln!("plan: {}", plan_shapes(&coded));
        }
        coded
    }
}
