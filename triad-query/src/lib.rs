//! # Triad Query
//!
//! Conjunctive-query evaluation for the Triad triple store: a depth-first
//! [`NestedLoopJoin`] composing the index's per-pattern scans, and the
//! heuristic join-order [`planner`].
//!
//! The caller encodes its patterns, orders them with
//! [`planner::order_patterns`], and drives the join through the
//! [`Cursor`] protocol. The join holds a shared borrow of the index for
//! its whole lifetime, so inserts while a join is live do not compile.

pub mod nlj;
pub mod planner;

pub use nlj::NestedLoopJoin;
pub use planner::{order_patterns, plan_shapes, Policy};
pub use triad_core::cursor::Cursor;
