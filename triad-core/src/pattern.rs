//! Pattern matching, binding, substitution and variable-map merging.
//!
//! Everything here is generic over the resource representation, so the
//! same functions serve decoded [`Resource`](crate::term::Resource) data
//! and dictionary-coded data.

use std::collections::btree_map::Entry;

use crate::term::{Code, CodedVarMap, Term, Triple, TriplePattern, VarMap};

/// True iff some substitution of the pattern's variables makes it equal
/// to the triple. Repeated variables must bind consistently, so this is
/// exactly "a binding exists".
pub fn matches<R: Clone + Eq>(pat: &TriplePattern<R>, t: &Triple<R>) -> bool {
    bind(pat, t).is_some()
}

/// The unique minimal variable map making `pat` equal to `t`, or `None`
/// if no consistent binding exists.
pub fn bind<R: Clone + Eq>(pat: &TriplePattern<R>, t: &Triple<R>) -> Option<VarMap<R>> {
    let mut vm = bind_term(&pat.s, &t.s)?;
    if !merge(&mut vm, &bind_term(&pat.p, &t.p)?) {
        return None;
    }
    if !merge(&mut vm, &bind_term(&pat.o, &t.o)?) {
        return None;
    }
    Some(vm)
}

/// Bind a single term against a single resource: a singleton map for a
/// variable, an empty map for an equal resource, `None` on mismatch.
fn bind_term<R: Clone + Eq>(term: &Term<R>, r: &R) -> Option<VarMap<R>> {
    match term {
        Term::Var(v) => {
            let mut vm = VarMap::new();
            vm.insert(v.clone(), r.clone());
            Some(vm)
        }
        Term::Res(bound) => (bound == r).then(VarMap::new),
    }
}

/// Replace any variable present in `vm` by its mapped resource;
/// variables absent from `vm` are preserved.
pub fn substitute_term<R: Clone>(vm: &VarMap<R>, term: Term<R>) -> Term<R> {
    match term {
        Term::Var(v) => match vm.get(&v) {
            Some(r) => Term::Res(r.clone()),
            None => Term::Var(v),
        },
        bound => bound,
    }
}

/// Apply [`substitute_term`] to each position of a pattern.
pub fn substitute<R: Clone>(vm: &VarMap<R>, pat: TriplePattern<R>) -> TriplePattern<R> {
    TriplePattern {
        s: substitute_term(vm, pat.s),
        p: substitute_term(vm, pat.p),
        o: substitute_term(vm, pat.o),
    }
}

/// Merge `input` into `out`.
///
/// Returns `false` iff some key is bound to different values in the two
/// maps; in that case `out` is left in an unspecified but well-formed
/// state and callers must not rely on its contents.
pub fn merge<R: Clone + Eq>(out: &mut VarMap<R>, input: &VarMap<R>) -> bool {
    for (var, val) in input {
        match out.entry(var.clone()) {
            Entry::Occupied(e) => {
                if e.get() != val {
                    return false;
                }
            }
            Entry::Vacant(e) => {
                e.insert(val.clone());
            }
        }
    }
    true
}

/// The variables of `pat`, mapped to an arbitrary sentinel code.
///
/// Only the key set is meaningful; the planner substitutes these maps
/// into patterns to condition their shapes for scoring.
pub fn variable_map<R>(pat: &TriplePattern<R>) -> CodedVarMap {
    let mut vm = CodedVarMap::new();
    for term in [&pat.s, &pat.p, &pat.o] {
        if let Term::Var(v) = term {
            vm.insert(v.clone(), Code(0));
        }
    }
    vm
}

/// True iff the two maps share no keys. Linear two-pointer sweep over
/// the ordered keys.
pub fn disjoint<A, B>(a: &VarMap<A>, b: &VarMap<B>) -> bool {
    let mut left = a.keys().peekable();
    let mut right = b.keys().peekable();
    while let (Some(&l), Some(&r)) = (left.peek(), right.peek()) {
        match l.cmp(r) {
            std::cmp::Ordering::Less => {
                left.next();
            }
            std::cmp::Ordering::Greater => {
                right.next();
            }
            std::cmp::Ordering::Equal => return false,
        }
    }
    true
}

/// True iff every key of `a` is a key of `b`.
pub fn key_subset<A, B>(a: &VarMap<A>, b: &VarMap<B>) -> bool {
    a.keys().all(|k| b.contains_key(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Resource, Variable};

    fn var(name: &str) -> Term {
        Term::Var(Variable::new(name))
    }

    fn iri(s: &str) -> Term {
        Term::Res(Resource::iri(s))
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Resource::iri(s), Resource::iri(p), Resource::iri(o))
    }

    #[test]
    fn test_matches_fully_bound() {
        let pat = TriplePattern::new(iri("a"), iri("p"), iri("b"));
        assert!(matches(&pat, &triple("a", "p", "b")));
        assert!(!matches(&pat, &triple("a", "p", "c")));
    }

    #[test]
    fn test_matches_with_variables() {
        let pat = TriplePattern::new(var("x"), iri("p"), var("y"));
        assert!(matches(&pat, &triple("a", "p", "b")));
        assert!(!matches(&pat, &triple("a", "q", "b")));
    }

    #[test]
    fn test_matches_repeated_variable_consistency() {
        let pat = TriplePattern::new(var("x"), iri("p"), var("x"));
        assert!(matches(&pat, &triple("a", "p", "a")));
        assert!(!matches(&pat, &triple("a", "p", "b")));
    }

    #[test]
    fn test_bind_minimal_map() {
        let pat = TriplePattern::new(var("x"), iri("p"), iri("b"));
        let vm = bind(&pat, &triple("a", "p", "b")).unwrap();
        assert_eq!(vm.len(), 1);
        assert_eq!(vm[&Variable::new("x")], Resource::iri("a"));
    }

    #[test]
    fn test_bind_conflicting_repeat_fails() {
        let pat = TriplePattern::new(var("x"), var("x"), iri("b"));
        assert!(bind(&pat, &triple("a", "p", "b")).is_none());
        assert!(bind(&pat, &triple("p", "p", "b")).is_some());
    }

    #[test]
    fn test_substitute_replaces_only_mapped_vars() {
        let mut vm = VarMap::new();
        vm.insert(Variable::new("x"), Resource::iri("a"));

        let pat = TriplePattern::new(var("x"), iri("p"), var("y"));
        let out = substitute(&vm, pat);
        assert_eq!(out.s, iri("a"));
        assert_eq!(out.o, var("y"));
    }

    #[test]
    fn test_merge_success_union() {
        let mut out = VarMap::new();
        out.insert(Variable::new("x"), Resource::iri("a"));
        let mut input = VarMap::new();
        input.insert(Variable::new("x"), Resource::iri("a"));
        input.insert(Variable::new("y"), Resource::iri("b"));

        assert!(merge(&mut out, &input));
        assert_eq!(out.len(), 2);
        assert_eq!(out[&Variable::new("y")], Resource::iri("b"));
    }

    #[test]
    fn test_merge_conflict_fails() {
        let mut out = VarMap::new();
        out.insert(Variable::new("x"), Resource::iri("a"));
        let mut input = VarMap::new();
        input.insert(Variable::new("x"), Resource::iri("b"));

        assert!(!merge(&mut out, &input));
    }

    #[test]
    fn test_variable_map_collects_distinct_vars() {
        let pat = TriplePattern::new(var("x"), iri("p"), var("x"));
        let vm = variable_map(&pat);
        assert_eq!(vm.len(), 1);
        assert!(vm.contains_key(&Variable::new("x")));
    }

    #[test]
    fn test_disjoint() {
        let mut a = CodedVarMap::new();
        a.insert(Variable::new("x"), Code(0));
        a.insert(Variable::new("y"), Code(0));
        let mut b = CodedVarMap::new();
        b.insert(Variable::new("z"), Code(0));
        assert!(disjoint(&a, &b));
        b.insert(Variable::new("y"), Code(0));
        assert!(!disjoint(&a, &b));
    }

    #[test]
    fn test_key_subset() {
        let mut a = CodedVarMap::new();
        a.insert(Variable::new("x"), Code(0));
        let mut b = CodedVarMap::new();
        b.insert(Variable::new("x"), Code(0));
        b.insert(Variable::new("y"), Code(0));
        assert!(key_subset(&a, &b));
        assert!(!key_subset(&b, &a));
        assert!(key_subset(&CodedVarMap::new(), &a));
    }
}
