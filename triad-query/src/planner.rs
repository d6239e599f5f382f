//! Heuristic join-order planning.
//!
//! Both policies follow Tsialiamanis et al., "Heuristics-based query
//! optimisation for SPARQL" (EDBT 2012): selectivity is estimated purely
//! from pattern shapes, conditioned on the variables already bound by
//! outer patterns. The produced order is execution order — the first
//! pattern becomes the outermost loop of the nested-loop join.

use triad_core::pattern::{disjoint, key_subset, merge, substitute, variable_map};
use triad_core::{CodedTriplePattern, CodedVarMap, Shape};

/// Join-order policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Lowest conditioned shape score first, with a cross-product guard.
    Greedy,
    /// SPO promotion plus variable-centrality selection.
    #[default]
    Smart,
}

/// Reorder `patterns` in place into a (hopefully) cheaper join order.
pub fn order_patterns(policy: Policy, patterns: &mut [CodedTriplePattern]) {
    match policy {
        Policy::Greedy => greedy_order(patterns),
        Policy::Smart => smart_order(patterns),
    }
    tracing::debug!(?policy, plan = %plan_shapes(patterns), "join order selected");
}

/// The shape sequence of a pattern list, e.g. `"SPO VPV VVV"`.
pub fn plan_shapes(patterns: &[CodedTriplePattern]) -> String {
    patterns
        .iter()
        .map(|p| p.shape().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Repeatedly pick the not-yet-scheduled pattern with the lowest shape
/// score under the substitutions accumulated from scheduled patterns.
///
/// A pattern is only eligible if it cannot create a fresh cross product:
/// its variable set must be empty (a pure index lookup) or intersect the
/// accumulated variable set. When every remaining pattern would cross,
/// the one in index order is taken.
fn greedy_order(patterns: &mut [CodedTriplePattern]) {
    let mut acc = CodedVarMap::new();

    for cur in 0..patterns.len() {
        let mut best: Option<usize> = None;
        let mut best_score = u8::MAX;
        let mut best_vars = CodedVarMap::new();

        for i in cur..patterns.len() {
            let vars = variable_map(&patterns[i]);
            let score = substitute(&acc, patterns[i].clone()).shape().score();

            if score < best_score && (vars.is_empty() || !disjoint(&acc, &vars)) {
                best = Some(i);
                best_score = score;
                best_vars = vars;
            } else if best.is_none() {
                // Every candidate so far would cross-product; fall back
                // to index order. A connected pattern found later still
                // wins (best_score is untouched here).
                debug_assert_eq!(i, cur);
                best = Some(i);
                best_vars = vars;
            }
        }

        let best = best.expect("candidate range is non-empty");
        patterns.swap(cur, best);

        let ok = merge(&mut acc, &best_vars);
        debug_assert!(ok, "sentinel variable maps cannot conflict");
    }
}

/// For each output position: promote the first remaining pattern whose
/// conditioned shape is SPO; otherwise pick the pattern with the highest
/// *centrality* — the number of other remaining patterns whose variable
/// set is a subset of its own — breaking ties by ascending shape score.
/// The chosen pattern's variables are then fixed in the remaining
/// patterns, for scoring only.
fn smart_order(patterns: &mut [CodedTriplePattern]) {
    let n = patterns.len();
    let mut conditioned: Vec<CodedTriplePattern> = patterns.to_vec();

    for cur in 0..n {
        let mut pick = (cur..n).find(|&i| conditioned[i].shape() == Shape::Spo);

        if pick.is_none() {
            let mut best = cur;
            let mut best_centrality = 0;
            let mut best_score = u8::MAX;
            let mut any = false;

            for i in cur..n {
                let vars = variable_map(&conditioned[i]);
                let centrality = (cur..n)
                    .filter(|&j| j != i)
                    .filter(|&j| key_subset(&variable_map(&conditioned[j]), &vars))
                    .count();
                let score = conditioned[i].shape().score();

                if !any
                    || centrality > best_centrality
                    || (centrality == best_centrality && score < best_score)
                {
                    best = i;
                    best_centrality = centrality;
                    best_score = score;
                    any = true;
                }
            }

            pick = Some(best);
        }

        let pick = pick.expect("candidate range is non-empty");
        patterns.swap(cur, pick);
        conditioned.swap(cur, pick);

        let fixed = variable_map(&conditioned[cur]);
        for later in conditioned.iter_mut().skip(cur + 1) {
            *later = substitute(&fixed, later.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_core::{Code, Term, TriplePattern, Variable};

    fn var(name: &str) -> Term<Code> {
        Term::Var(Variable::new(name))
    }

    fn res(c: u64) -> Term<Code> {
        Term::Res(Code(c))
    }

    fn shapes(patterns: &[CodedTriplePattern]) -> Vec<Shape> {
        patterns.iter().map(|p| p.shape()).collect()
    }

    #[test]
    fn test_greedy_promotes_fully_bound_pattern() {
        let mut patterns = vec![
            TriplePattern::new(var("x"), var("y"), var("z")),
            TriplePattern::new(res(0), res(1), res(2)),
        ];
        greedy_order(&mut patterns);
        assert_eq!(shapes(&patterns), vec![Shape::Spo, Shape::Vvv]);
    }

    #[test]
    fn test_greedy_avoids_cross_product() {
        // After picking the VPO pattern, the disconnected SPV pattern
        // must lose to the connected (but worse-scored) VPV pattern.
        let mut patterns = vec![
            TriplePattern::new(var("x"), res(1), res(2)), // VPO, vars {x}
            TriplePattern::new(res(3), res(4), var("y")), // SPV, vars {y}
            TriplePattern::new(var("x"), res(5), var("w")), // VPV, vars {x, w}
        ];
        greedy_order(&mut patterns);
        assert_eq!(shapes(&patterns), vec![Shape::Vpo, Shape::Vpv, Shape::Spv]);
    }

    #[test]
    fn test_greedy_conditions_scores_on_bound_vars() {
        // (?x 1 2) binds ?x, turning (?x 3 ?y) into an effective SPV,
        // which then beats the untouched (?z 4 ?w).
        let mut patterns = vec![
            TriplePattern::new(var("x"), res(1), res(2)),
            TriplePattern::new(var("z"), res(4), var("w")),
            TriplePattern::new(var("x"), res(3), var("y")),
        ];
        greedy_order(&mut patterns);
        assert_eq!(
            shapes(&patterns),
            vec![Shape::Vpo, Shape::Vpv, Shape::Vpv]
        );
        // The connected pattern ran second.
        assert_eq!(patterns[1].s, var("x"));
    }

    #[test]
    fn test_smart_promotes_spo_first() {
        let mut patterns = vec![
            TriplePattern::new(var("x"), res(1), res(2)),
            TriplePattern::new(res(0), res(1), res(2)),
        ];
        smart_order(&mut patterns);
        assert_eq!(shapes(&patterns), vec![Shape::Spo, Shape::Vpo]);
    }

    #[test]
    fn test_smart_promotes_conditioned_spo() {
        // VPO beats SPV on the score tie-break; binding ?x then turns
        // the SPV-shaped pattern... rather, the remaining pattern with
        // only ?x left becomes SPO and is promoted immediately.
        let mut patterns = vec![
            TriplePattern::new(res(7), res(8), var("x")), // SPV, vars {x}
            TriplePattern::new(var("x"), res(1), res(2)), // VPO, vars {x}
        ];
        smart_order(&mut patterns);
        assert_eq!(shapes(&patterns), vec![Shape::Vpo, Shape::Spv]);
    }

    #[test]
    fn test_smart_prefers_central_pattern() {
        // The star centre's variable set {x, y} covers both satellites'
        // sets {x} and {y}, so it is scheduled first despite its shape.
        let mut patterns = vec![
            TriplePattern::new(var("x"), res(1), res(2)), // VPO, vars {x}
            TriplePattern::new(var("x"), res(3), var("y")), // VPV, vars {x, y}
            TriplePattern::new(var("y"), res(4), res(5)), // VPO, vars {y}
        ];
        smart_order(&mut patterns);
        assert_eq!(patterns[0].shape(), Shape::Vpv);
    }

    #[test]
    fn test_order_patterns_dispatches() {
        for policy in [Policy::Greedy, Policy::Smart] {
            let mut patterns = vec![
                TriplePattern::new(var("x"), var("y"), var("z")),
                TriplePattern::new(res(0), res(1), res(2)),
            ];
            order_patterns(policy, &mut patterns);
            assert_eq!(patterns[0].shape(), Shape::Spo);
        }
    }

    #[test]
    fn test_plan_shapes_format() {
        let patterns = vec![
            TriplePattern::new(res(0), res(1), res(2)),
            TriplePattern::new(var("x"), res(1), var("y")),
        ];
        assert_eq!(plan_shapes(&patterns), "SPO VPV");
    }
}
