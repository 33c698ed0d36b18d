//! Grammar-guided enumerative program synthesis.
//!
//! A [`Grammar`] describes a small DSL. The [`Synthesizer`] walks the
//! programs it derives in breadth-first order, fills terminal holes with
//! literals from a [`Filler`], runs each complete candidate through an
//! [`Evaluator`] and stops at the first one that reproduces the [`Example`].

pub mod dsl;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod search;
pub mod synth;
pub mod tree;

pub use error::{EvalError, GrammarError, SynthError};
pub use eval::{Env, EvalResult, Evaluator};
pub use grammar::{Grammar, Symbol};
pub use search::{Search, SearchStep, Synthesizer};
pub use synth::{
    CancelToken, Example, ExhaustReason, Filler, SearchBudget, SearchOutcome, DEFAULT_SKETCH_LIMIT,
};
pub use tree::ProgramTree;
