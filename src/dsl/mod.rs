//! Small DSLs built on the synthesizer: integer arithmetic with a full
//! evaluator, and a query pipeline grammar for inspection.

pub mod arith;
pub mod query;
