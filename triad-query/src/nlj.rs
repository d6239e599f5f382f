//! Nested-loop index join over per-pattern scans.

use triad_core::cursor::Cursor;
use triad_core::pattern::{merge, substitute};
use triad_core::{CodedTriplePattern, CodedVarMap, PatternScan, RdfIndex};

/// A depth-first nested-loop join over an ordered, non-empty list of
/// coded triple patterns.
///
/// Iteration order is exactly the pattern order: the scan for
/// `patterns[0]` is the outermost loop; each deeper pattern has the
/// bindings of all outer scans substituted into it before evaluation.
///
/// The stack invariants: every stacked scan is valid; the stack is empty
/// iff the join is exhausted; a non-empty stack has exactly one scan per
/// pattern (an answer is available).
pub struct NestedLoopJoin<'a> {
    index: &'a RdfIndex,
    patterns: Vec<CodedTriplePattern>,
    depth: Vec<PatternScan<'a>>,
}

impl<'a> NestedLoopJoin<'a> {
    pub fn new(index: &'a RdfIndex, patterns: Vec<CodedTriplePattern>) -> Self {
        debug_assert!(!patterns.is_empty());
        NestedLoopJoin {
            index,
            patterns,
            depth: Vec::new(),
        }
    }

    /// Union of the bindings of every live scan, including partial
    /// stacks (used to condition the next pattern while extending).
    fn joined(&self) -> CodedVarMap {
        let mut vm = CodedVarMap::new();
        for scan in &self.depth {
            debug_assert!(scan.valid());
            let ok = merge(&mut vm, &scan.current());
            // A conflict here means a scan reported a row that disagrees
            // with the substitution it was built from.
            debug_assert!(ok, "per-pattern scan failed to apply its selections");
        }
        vm
    }

    /// Restore the stack invariants: pop exhausted scans (advancing the
    /// loop above each), then grow back to full depth.
    fn extend(&mut self) {
        while self
            .depth
            .last()
            .is_some_and(|top| !top.valid() || self.depth.len() < self.patterns.len())
        {
            while self.depth.last().is_some_and(|top| !top.valid()) {
                self.depth.pop();
                if let Some(top) = self.depth.last_mut() {
                    top.next();
                }
            }

            // Grow one scan at a time: a freshly started scan may itself
            // be exhausted, and the outer loop must unwind it first.
            if !self.depth.is_empty() && self.depth.len() < self.patterns.len() {
                let next = self.patterns[self.depth.len()].clone();
                let mut scan = self.index.evaluate(substitute(&self.joined(), next));
                scan.start();
                self.depth.push(scan);
            }
        }

        debug_assert!(self.depth.is_empty() || self.depth.len() == self.patterns.len());
    }
}

impl Cursor for NestedLoopJoin<'_> {
    type Item = CodedVarMap;

    fn start(&mut self) {
        self.depth.clear();
        let mut outer = self.index.evaluate(self.patterns[0].clone());
        outer.start();
        self.depth.push(outer);
        self.extend();
    }

    fn valid(&self) -> bool {
        !self.depth.is_empty()
    }

    fn current(&self) -> CodedVarMap {
        debug_assert!(self.valid());
        self.joined()
    }

    fn next(&mut self) {
        debug_assert!(self.valid());
        self.depth
            .last_mut()
            .expect("valid join has a non-empty stack")
            .next();
        self.extend();
    }
}
