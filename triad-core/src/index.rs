//! The in-memory RDF index: an append-only triple table with intrusive
//! per-predicate linked chains and hash indices for O(1) scan entry.
//!
//! The layout follows Motik et al., "Parallel Materialisation of Datalog
//! Programs in Centralised, Main-Memory RDF Systems" (AAAI 2014). Each
//! table row stores a coded triple plus three link fields:
//!
//! - `n_p`: offset of the previous row (in insertion order) with the same
//!   predicate, or [`TABLE_END`];
//! - `n_sp`: a two-variant pointer — either a direct offset of another row
//!   with the same `(subject, predicate)`, or the key of a *different*
//!   `(subject, predicate')` group whose current head is resolved through
//!   the live SP index at advance time;
//! - `n_op`: the analogous pointer for `(object, predicate)`.
//!
//! The group-key form is what makes insertion O(1): when a new row becomes
//! the head of an `(s, p')` group, rows pointing at that group through a
//! group key pick up the new head automatically, with no row rewriting.

use hashbrown::HashMap;

use crate::cursor::Cursor;
use crate::pattern::bind;
use crate::term::{Code, CodedTriple, CodedTriplePattern, CodedTerm, CodedVarMap, Shape, Term};

/// A table offset. Plain offsets are used instead of references because
/// the table vector reallocates as it grows.
pub type TableOffset = usize;

/// The distinguished end-of-chain offset.
pub const TABLE_END: TableOffset = usize::MAX;

/// A two-variant link pointer (see module docs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    /// Another row in the same pair group, or [`TABLE_END`].
    Row(TableOffset),
    /// The continuation lives at the current head of this other pair
    /// group; resolved through the live pair index when followed.
    Group(Code, Code),
}

#[derive(Clone, Debug)]
struct TableRow {
    t: CodedTriple,
    n_sp: Link,
    n_op: Link,
    n_p: TableOffset,
}

/// Scalar-index entry: the head of the value's chain and the exact number
/// of rows carrying the value in that position.
///
/// Invariant: `count == 0` iff `head == TABLE_END`.
#[derive(Clone, Copy, Debug)]
struct ScalarEntry {
    head: TableOffset,
    count: usize,
}

impl Default for ScalarEntry {
    fn default() -> Self {
        ScalarEntry {
            head: TABLE_END,
            count: 0,
        }
    }
}

/// Which index supplies the scan entry point for a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexChoice {
    None,
    Subject,
    Predicate,
    Object,
    SubjectPredicate,
    ObjectPredicate,
    Triple,
}

/// Which link a [`PatternScan`] follows when advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// Single row (or nothing): advancing ends the scan.
    None,
    /// Advance linearly over the whole table.
    All,
    /// Follow `n_p`.
    Pred,
    /// Follow `n_sp` (preserves the subject across group crossings).
    SubPred,
    /// Follow `n_op` (preserves the object across group crossings).
    ObjPred,
}

/// The indexed triple store.
///
/// Rows are immortal once appended and duplicates are dropped, so the
/// table and every index grow monotonically. `add` invalidates any
/// outstanding scan — encoded here as `&mut self` against the scans'
/// shared borrows.
#[derive(Debug, Default)]
pub struct RdfIndex {
    table: Vec<TableRow>,
    s_index: HashMap<Code, ScalarEntry>,
    p_index: HashMap<Code, ScalarEntry>,
    o_index: HashMap<Code, ScalarEntry>,
    sp_index: HashMap<(Code, Code), TableOffset>,
    op_index: HashMap<(Code, Code), TableOffset>,
    spo_index: HashMap<CodedTriple, TableOffset>,
}

impl RdfIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored triples.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Append `t` unless it is already stored.
    pub fn add(&mut self, t: CodedTriple) {
        if self.spo_index.contains_key(&t) {
            return;
        }

        self.s_index.entry(t.s).or_default();
        self.p_index.entry(t.p).or_default();
        self.o_index.entry(t.o).or_default();

        let new_off = self.table.len();
        let sp_head = self.sp_index.get(&(t.s, t.p)).copied();
        let op_head = self.op_index.get(&(t.o, t.p)).copied();
        let s_head = self.s_index[&t.s].head;
        let o_head = self.o_index[&t.o].head;

        // A missing (s,p) pair with a live subject head means that head
        // belongs to a different predicate group of the same subject.
        debug_assert!(s_head == TABLE_END || sp_head.is_some() || self.table[s_head].t.p != t.p);
        debug_assert!(o_head == TABLE_END || op_head.is_some() || self.table[o_head].t.p != t.p);

        let n_sp = match sp_head {
            Some(off) => Link::Row(off),
            None if s_head == TABLE_END => Link::Row(TABLE_END),
            None => {
                // Cross to the subject's current front group. The key is
                // resolved through the live SP index at advance time, so
                // later head changes of that group need no fix-up here.
                let other = self.table[s_head].t;
                Link::Group(other.s, other.p)
            }
        };
        let n_op = match op_head {
            Some(off) => Link::Row(off),
            None if o_head == TABLE_END => Link::Row(TABLE_END),
            None => {
                let other = self.table[o_head].t;
                Link::Group(other.o, other.p)
            }
        };
        let n_p = self.p_index[&t.p].head;

        // The scalar head must stay a *group* head: move it to the new
        // row only when the row opens a new predicate group for the
        // value, or extends the group currently at the front.
        let move_s_head = sp_head.is_none() || self.table[s_head].t.p == t.p;
        let move_o_head = op_head.is_none() || self.table[o_head].t.p == t.p;

        self.table.push(TableRow { t, n_sp, n_op, n_p });

        let s_entry = self.s_index.get_mut(&t.s).expect("s entry inserted above");
        if move_s_head {
            s_entry.head = new_off;
        }
        s_entry.count += 1;

        let o_entry = self.o_index.get_mut(&t.o).expect("o entry inserted above");
        if move_o_head {
            o_entry.head = new_off;
        }
        o_entry.count += 1;

        let p_entry = self.p_index.get_mut(&t.p).expect("p entry inserted above");
        p_entry.head = new_off;
        p_entry.count += 1;

        self.sp_index.insert((t.s, t.p), new_off);
        self.op_index.insert((t.o, t.p), new_off);
        self.spo_index.insert(t, new_off);
    }

    /// Pick the `(index, link)` pair for a pattern.
    ///
    /// Exposed so the SVO selectivity decision is observable; `evaluate`
    /// uses this internally.
    pub fn plan(&self, pattern: &CodedTriplePattern) -> (IndexChoice, LinkKind) {
        match pattern.shape() {
            Shape::Vvv => (IndexChoice::None, LinkKind::All),
            Shape::Vvo => (IndexChoice::Object, LinkKind::ObjPred),
            Shape::Vpv => (IndexChoice::Predicate, LinkKind::Pred),
            Shape::Vpo => (IndexChoice::ObjectPredicate, LinkKind::ObjPred),
            Shape::Svv => (IndexChoice::Subject, LinkKind::SubPred),
            Shape::Spv => (IndexChoice::SubjectPredicate, LinkKind::SubPred),
            Shape::Spo => (IndexChoice::Triple, LinkKind::None),
            Shape::Svo => {
                // Choose the more selective side by exact scalar counts.
                let s = self.s_index.get(&bound(&pattern.s));
                let o = self.o_index.get(&bound(&pattern.o));
                match (s, o) {
                    // A missing side means no match; an empty scan is the
                    // cheapest way to guarantee that.
                    (None, _) | (_, None) => (IndexChoice::None, LinkKind::None),
                    (Some(s), Some(o)) if s.count < o.count => {
                        (IndexChoice::Subject, LinkKind::SubPred)
                    }
                    _ => (IndexChoice::Object, LinkKind::ObjPred),
                }
            }
        }
    }

    /// Evaluate a pattern: a restartable cursor over exactly the variable
    /// bindings `vm` such that `substitute(vm, pattern)` is a stored row.
    pub fn evaluate(&self, pattern: CodedTriplePattern) -> PatternScan<'_> {
        let (index, link) = self.plan(&pattern);

        let start = match index {
            IndexChoice::None => {
                // Offset 0 is only acceptable when the table is non-empty.
                if self.table.is_empty() {
                    TABLE_END
                } else {
                    0
                }
            }
            IndexChoice::Subject => self.scalar_head(&self.s_index, &pattern.s),
            IndexChoice::Predicate => self.scalar_head(&self.p_index, &pattern.p),
            IndexChoice::Object => self.scalar_head(&self.o_index, &pattern.o),
            IndexChoice::SubjectPredicate => {
                let key = (bound(&pattern.s), bound(&pattern.p));
                self.sp_index.get(&key).copied().unwrap_or(TABLE_END)
            }
            IndexChoice::ObjectPredicate => {
                let key = (bound(&pattern.o), bound(&pattern.p));
                self.op_index.get(&key).copied().unwrap_or(TABLE_END)
            }
            IndexChoice::Triple => {
                let t = CodedTriple {
                    s: bound(&pattern.s),
                    p: bound(&pattern.p),
                    o: bound(&pattern.o),
                };
                self.spo_index.get(&t).copied().unwrap_or(TABLE_END)
            }
        };

        debug_assert!(start < self.table.len() || start == TABLE_END);

        PatternScan {
            idx: self,
            pattern,
            start,
            link,
            cur: TABLE_END,
            cur_map: None,
        }
    }

    /// Every stored triple exactly once, in insertion order.
    pub fn full_scan(&self) -> FullScan<'_> {
        FullScan {
            idx: self,
            cur: 0,
        }
    }

    fn scalar_head(&self, index: &HashMap<Code, ScalarEntry>, term: &CodedTerm) -> TableOffset {
        index
            .get(&bound(term))
            .map(|e| e.head)
            .unwrap_or(TABLE_END)
    }

    /// Resolve an `n_sp` link to a table offset, crossing group
    /// boundaries through the live SP index.
    fn follow_sp(&self, link: Link) -> TableOffset {
        match link {
            Link::Row(off) => off,
            Link::Group(s, p) => {
                debug_assert!(self.sp_index.contains_key(&(s, p)));
                self.sp_index.get(&(s, p)).copied().unwrap_or(TABLE_END)
            }
        }
    }

    fn follow_op(&self, link: Link) -> TableOffset {
        match link {
            Link::Row(off) => off,
            Link::Group(o, p) => {
                debug_assert!(self.op_index.contains_key(&(o, p)));
                self.op_index.get(&(o, p)).copied().unwrap_or(TABLE_END)
            }
        }
    }
}

/// Extract the code of a bound position. The planner never selects an
/// index over an unbound position.
fn bound(term: &CodedTerm) -> Code {
    match term {
        Term::Res(c) => *c,
        Term::Var(v) => panic!("planner invariant violated: position ?{} is unbound", v.name()),
    }
}

/// A restartable cursor over the bindings of one pattern.
///
/// Link chains are grouped by a single coordinate (e.g. subject and
/// predicate), so rows on the chain can still disagree with other bound
/// positions of the pattern; the scan filters by re-binding each row and
/// skipping rows that do not bind.
#[derive(Debug)]
pub struct PatternScan<'a> {
    idx: &'a RdfIndex,
    pattern: CodedTriplePattern,
    start: TableOffset,
    link: LinkKind,
    cur: TableOffset,
    cur_map: Option<CodedVarMap>,
}

impl PatternScan<'_> {
    /// The link kind this scan follows. Observable for planner tests.
    pub fn link_kind(&self) -> LinkKind {
        self.link
    }

    /// One step along the link chain, rebinding the new row.
    fn advance(&mut self) {
        #[cfg(debug_assertions)]
        let prev = self.idx.table[self.cur].t;

        self.cur = match self.link {
            LinkKind::None => TABLE_END,
            LinkKind::All => {
                let next = self.cur + 1;
                if next >= self.idx.table.len() {
                    TABLE_END
                } else {
                    next
                }
            }
            LinkKind::Pred => self.idx.table[self.cur].n_p,
            LinkKind::SubPred => self.idx.follow_sp(self.idx.table[self.cur].n_sp),
            LinkKind::ObjPred => self.idx.follow_op(self.idx.table[self.cur].n_op),
        };

        #[cfg(debug_assertions)]
        if self.cur != TABLE_END {
            let now = self.idx.table[self.cur].t;
            match self.link {
                LinkKind::Pred => debug_assert_eq!(prev.p, now.p),
                LinkKind::SubPred => debug_assert_eq!(prev.s, now.s),
                LinkKind::ObjPred => debug_assert_eq!(prev.o, now.o),
                LinkKind::None | LinkKind::All => {}
            }
        }

        self.cur_map = if self.cur == TABLE_END {
            None
        } else {
            bind(&self.pattern, &self.idx.table[self.cur].t)
        };
    }

    /// Skip chain rows whose remaining coordinates disagree with the
    /// pattern's bound positions.
    fn skip_unmatched(&mut self) {
        while self.valid() && self.cur_map.is_none() {
            self.advance();
        }
    }
}

impl Cursor for PatternScan<'_> {
    type Item = CodedVarMap;

    fn start(&mut self) {
        self.cur = self.start;
        self.cur_map = if self.cur == TABLE_END {
            None
        } else {
            bind(&self.pattern, &self.idx.table[self.cur].t)
        };
        self.skip_unmatched();
    }

    fn valid(&self) -> bool {
        debug_assert!(self.cur < self.idx.table.len() || self.cur == TABLE_END);
        self.cur != TABLE_END
    }

    fn current(&self) -> CodedVarMap {
        debug_assert!(self.valid());
        self.cur_map
            .clone()
            .expect("scan invariant: a valid scan caches its binding")
    }

    fn next(&mut self) {
        debug_assert!(self.valid());
        self.advance();
        self.skip_unmatched();
    }
}

/// Linear walk over the whole table in insertion order.
#[derive(Debug)]
pub struct FullScan<'a> {
    idx: &'a RdfIndex,
    cur: usize,
}

impl Cursor for FullScan<'_> {
    type Item = CodedTriple;

    fn start(&mut self) {
        self.cur = 0;
    }

    fn valid(&self) -> bool {
        self.cur < self.idx.table.len()
    }

    fn current(&self) -> CodedTriple {
        debug_assert!(self.valid());
        self.idx.table[self.cur].t
    }

    fn next(&mut self) {
        debug_assert!(self.valid());
        self.cur += 1;
    }
}

#[cfg(any(test, debug_assertions))]
impl RdfIndex {
    /// Walk every index-backed chain and verify completeness, exclusivity
    /// and the absence of cycles. Expensive; test use only.
    pub fn check_integrity(&self) {
        use std::collections::HashSet;

        // Triple index: one entry per row, pointing back at it.
        assert_eq!(self.table.len(), self.spo_index.len());
        for (t, &off) in &self.spo_index {
            assert_eq!(self.table[off].t, *t);
        }

        // Row-local link guarantees: each pointer stays within its
        // coordinate.
        for (i, row) in self.table.iter().enumerate() {
            let n_sp = self.follow_sp(row.n_sp);
            let n_op = self.follow_op(row.n_op);
            assert!(n_sp == TABLE_END || self.table[n_sp].t.s == self.table[i].t.s);
            assert!(n_op == TABLE_END || self.table[n_op].t.o == self.table[i].t.o);
            assert!(row.n_p == TABLE_END || self.table[row.n_p].t.p == self.table[i].t.p);
        }

        // Pair chains: starting from the index head, a chain visits every
        // row with that exact pair, only such rows, without repetition,
        // and stops at the first group crossing.
        for (&(s, p), &head) in &self.sp_index {
            let mut found = HashSet::new();
            let mut off = head;
            found.insert(off);
            for _ in 0..self.table.len() {
                assert_eq!(self.table[off].t.s, s);
                assert_eq!(self.table[off].t.p, p);
                match self.table[off].n_sp {
                    Link::Group(..) => break,
                    Link::Row(next) => off = next,
                }
                if off == TABLE_END {
                    break;
                }
                assert!(found.insert(off), "cycle in SP chain");
            }
            for (i, row) in self.table.iter().enumerate() {
                if row.t.s == s && row.t.p == p {
                    assert!(found.contains(&i));
                }
            }
        }
        for (&(o, p), &head) in &self.op_index {
            let mut found = HashSet::new();
            let mut off = head;
            found.insert(off);
            for _ in 0..self.table.len() {
                assert_eq!(self.table[off].t.o, o);
                assert_eq!(self.table[off].t.p, p);
                match self.table[off].n_op {
                    Link::Group(..) => break,
                    Link::Row(next) => off = next,
                }
                if off == TABLE_END {
                    break;
                }
                assert!(found.insert(off), "cycle in OP chain");
            }
            for (i, row) in self.table.iter().enumerate() {
                if row.t.o == o && row.t.p == p {
                    assert!(found.contains(&i));
                }
            }
        }

        // Scalar chains: following the grouped pointer from the scalar
        // head visits exactly the rows with the value in that position,
        // and the recorded count agrees.
        for (&s, entry) in &self.s_index {
            let mut found = HashSet::new();
            let mut off = entry.head;
            found.insert(off);
            for _ in 0..self.table.len() {
                assert_eq!(self.table[off].t.s, s);
                off = self.follow_sp(self.table[off].n_sp);
                if off == TABLE_END {
                    break;
                }
                assert!(found.insert(off), "cycle in subject chain");
            }
            for (i, row) in self.table.iter().enumerate() {
                if row.t.s == s {
                    assert!(found.contains(&i));
                }
            }
            assert_eq!(found.len(), entry.count);
        }
        for (&o, entry) in &self.o_index {
            let mut found = HashSet::new();
            let mut off = entry.head;
            found.insert(off);
            for _ in 0..self.table.len() {
                assert_eq!(self.table[off].t.o, o);
                off = self.follow_op(self.table[off].n_op);
                if off == TABLE_END {
                    break;
                }
                assert!(found.insert(off), "cycle in object chain");
            }
            for (i, row) in self.table.iter().enumerate() {
                if row.t.o == o {
                    assert!(found.contains(&i));
                }
            }
            assert_eq!(found.len(), entry.count);
        }
        for (&p, entry) in &self.p_index {
            let mut found = HashSet::new();
            let mut off = entry.head;
            found.insert(off);
            for _ in 0..self.table.len() {
                assert_eq!(self.table[off].t.p, p);
                off = self.table[off].n_p;
                if off == TABLE_END {
                    break;
                }
                assert!(found.insert(off), "cycle in predicate chain");
            }
            for (i, row) in self.table.iter().enumerate() {
                if row.t.p == p {
                    assert!(found.contains(&i));
                }
            }
            assert_eq!(found.len(), entry.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::collect;
    use crate::pattern;
    use crate::term::{TriplePattern, Variable};

    fn t(s: u64, p: u64, o: u64) -> CodedTriple {
        CodedTriple {
            s: Code(s),
            p: Code(p),
            o: Code(o),
        }
    }

    fn var(name: &str) -> CodedTerm {
        Term::Var(Variable::new(name))
    }

    fn res(c: u64) -> CodedTerm {
        Term::Res(Code(c))
    }

    fn pat(s: CodedTerm, p: CodedTerm, o: CodedTerm) -> CodedTriplePattern {
        TriplePattern::new(s, p, o)
    }

    #[test]
    fn test_add_deduplicates() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 1, 2));
        idx.add(t(0, 1, 2));
        idx.add(t(0, 1, 2));
        assert_eq!(idx.len(), 1);
        idx.check_integrity();
    }

    #[test]
    fn test_evaluate_fully_bound() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 1, 2));
        idx.add(t(0, 1, 3));

        let hits = collect(&mut idx.evaluate(pat(res(0), res(1), res(2))));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_empty());

        let misses = collect(&mut idx.evaluate(pat(res(0), res(1), res(9))));
        assert!(misses.is_empty());
    }

    #[test]
    fn test_evaluate_on_empty_store() {
        let idx = RdfIndex::new();
        let all = collect(&mut idx.evaluate(pat(var("x"), var("y"), var("z"))));
        assert!(all.is_empty());
    }

    #[test]
    fn test_predicate_chain() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 10, 1));
        idx.add(t(2, 10, 3));
        idx.add(t(4, 11, 5));

        let hits = collect(&mut idx.evaluate(pat(var("x"), res(10), var("y"))));
        assert_eq!(hits.len(), 2);
        let bound: std::collections::HashSet<(Code, Code)> = hits
            .iter()
            .map(|vm| (vm[&Variable::new("x")], vm[&Variable::new("y")]))
            .collect();
        assert!(bound.contains(&(Code(0), Code(1))));
        assert!(bound.contains(&(Code(2), Code(3))));
    }

    #[test]
    fn test_subject_chain_crosses_predicate_groups() {
        let mut idx = RdfIndex::new();
        // Same subject under three predicates, interleaved with noise.
        idx.add(t(0, 1, 2));
        idx.add(t(9, 1, 2));
        idx.add(t(0, 3, 4));
        idx.add(t(0, 1, 5));
        idx.add(t(0, 6, 7));

        let hits = collect(&mut idx.evaluate(pat(res(0), var("p"), var("o"))));
        assert_eq!(hits.len(), 4);
        idx.check_integrity();
    }

    #[test]
    fn test_object_chain_crosses_predicate_groups() {
        let mut idx = RdfIndex::new();
        idx.add(t(1, 2, 0));
        idx.add(t(3, 4, 0));
        idx.add(t(5, 2, 0));
        idx.add(t(5, 2, 9));

        let hits = collect(&mut idx.evaluate(pat(var("s"), var("p"), res(0))));
        assert_eq!(hits.len(), 3);
        idx.check_integrity();
    }

    #[test]
    fn test_svo_picks_more_selective_side() {
        let mut idx = RdfIndex::new();
        // Subject 0 occurs three times; object 7 once.
        idx.add(t(0, 1, 2));
        idx.add(t(0, 2, 3));
        idx.add(t(0, 3, 7));

        let svo = pat(res(0), var("p"), res(7));
        let (index, link) = idx.plan(&svo);
        assert_eq!(index, IndexChoice::Object);
        assert_eq!(link, LinkKind::ObjPred);

        // Same cardinality regardless of the chosen side.
        assert_eq!(collect(&mut idx.evaluate(svo)).len(), 1);

        // Flip the selectivity: object 2 occurs twice, subject 4 once.
        idx.add(t(4, 5, 2));
        let svo2 = pat(res(4), var("p"), res(2));
        let (index, link) = idx.plan(&svo2);
        assert_eq!(index, IndexChoice::Subject);
        assert_eq!(link, LinkKind::SubPred);
        assert_eq!(collect(&mut idx.evaluate(svo2)).len(), 1);
    }

    #[test]
    fn test_svo_with_unknown_resource_is_empty() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 1, 2));

        let (index, link) = idx.plan(&pat(res(42), var("p"), res(2)));
        assert_eq!(index, IndexChoice::None);
        assert_eq!(link, LinkKind::None);
        assert!(collect(&mut idx.evaluate(pat(res(42), var("p"), res(2)))).is_empty());
    }

    #[test]
    fn test_repeated_variable_filters_chain_rows() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 1, 0));
        idx.add(t(0, 1, 2));

        // ?x <1> ?x only matches the row whose object equals its subject.
        let hits = collect(&mut idx.evaluate(pat(var("x"), res(1), var("x"))));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0][&Variable::new("x")], Code(0));
    }

    #[test]
    fn test_evaluate_agrees_with_matches_for_every_shape() {
        let mut idx = RdfIndex::new();
        let data = [
            t(0, 1, 2),
            t(0, 1, 3),
            t(0, 4, 2),
            t(5, 1, 2),
            t(5, 4, 3),
            t(2, 1, 0),
        ];
        for row in data {
            idx.add(row);
        }

        let terms_s = [res(0), var("s")];
        let terms_p = [res(1), var("p")];
        let terms_o = [res(2), var("o")];
        for s in &terms_s {
            for p in &terms_p {
                for o in &terms_o {
                    let pattern = pat(s.clone(), p.clone(), o.clone());
                    let got = collect(&mut idx.evaluate(pattern.clone()));
                    let expected: Vec<CodedVarMap> = data
                        .iter()
                        .filter_map(|row| pattern::bind(&pattern, row))
                        .collect();
                    assert_eq!(
                        got.len(),
                        expected.len(),
                        "cardinality mismatch for {pattern}",
                    );
                    for vm in &expected {
                        assert!(got.contains(vm), "missing {vm:?} for {pattern}");
                    }
                    // No duplicates.
                    for (i, vm) in got.iter().enumerate() {
                        assert!(!got[i + 1..].contains(vm), "duplicate answer for {pattern}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_scan_restart_yields_same_sequence() {
        let mut idx = RdfIndex::new();
        idx.add(t(0, 1, 2));
        idx.add(t(3, 1, 4));
        idx.add(t(5, 1, 6));

        let mut scan = idx.evaluate(pat(var("x"), res(1), var("y")));
        let first = collect(&mut scan);
        let second = collect(&mut scan);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_full_scan_insertion_order() {
        let mut idx = RdfIndex::new();
        let data = [t(0, 1, 2), t(3, 4, 5), t(6, 7, 8)];
        for row in data {
            idx.add(row);
        }
        assert_eq!(collect(&mut idx.full_scan()), data.to_vec());
    }

    #[test]
    fn test_integrity_after_interleaved_groups() {
        let mut idx = RdfIndex::new();
        // Exercise every head-update path: new subject, new group for an
        // existing subject, extension of a non-front group.
        idx.add(t(0, 1, 2));
        idx.add(t(0, 2, 2));
        idx.add(t(0, 1, 3));
        idx.add(t(0, 2, 4));
        idx.add(t(0, 3, 2));
        idx.add(t(1, 1, 0));
        idx.add(t(1, 2, 0));
        idx.add(t(1, 1, 2));
        idx.check_integrity();

        let all = collect(&mut idx.evaluate(pat(var("s"), var("p"), var("o"))));
        assert_eq!(all.len(), idx.len());
    }
}
