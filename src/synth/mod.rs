pub mod product;
pub mod sketch_enum;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::grammar::Symbol;
use crate::tree::ProgramTree;

/// Upper bound on dequeued sketches when the caller does not pick one.
pub const DEFAULT_SKETCH_LIMIT: usize = 400_000;

/// The behaviour to synthesize: one expected output for one list of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<V> {
    output: V,
    inputs: Vec<V>,
}

impl<V> Example<V> {
    pub fn new(output: V, inputs: impl IntoIterator<Item = V>) -> Self {
        Self {
            output,
            inputs: inputs.into_iter().collect(),
        }
    }

    pub fn output(&self) -> &V {
        &self.output
    }

    pub fn inputs(&self) -> &[V] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<&V> {
        self.inputs.get(index)
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// Supplies literal candidates for terminal leaves of a structurally complete
/// sketch. Symbols that are not holes get an empty list.
///
/// Every hole multiplies the number of candidates, so keep the lists short.
pub trait Filler<V> {
    fn candidates(&self, symbol: Symbol, example: &Example<V>) -> Vec<V>;
}

impl<V, F> Filler<V> for F
where
    F: Fn(Symbol, &Example<V>) -> Vec<V>,
{
    fn candidates(&self, symbol: Symbol, example: &Example<V>) -> Vec<V> {
        self(symbol, example)
    }
}

/// Cooperative stop signal, checked once per dequeued sketch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How far a search may go.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    /// At most this many sketches are dequeued.
    pub max_sketches: usize,
    pub cancel: Option<CancelToken>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::new(DEFAULT_SKETCH_LIMIT)
    }
}

impl SearchBudget {
    pub fn new(max_sketches: usize) -> Self {
        Self {
            max_sketches,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Why no further sketch may be dequeued, if there is a reason.
    pub fn stop_reason(&self, explored: usize) -> Option<ExhaustReason> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(ExhaustReason::Cancelled);
        }
        if explored >= self.max_sketches {
            return Some(ExhaustReason::BudgetSpent);
        }
        None
    }

    pub fn remaining(&self, explored: usize) -> usize {
        self.max_sketches.saturating_sub(explored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// Every derivation was explored.
    FrontierEmpty,
    BudgetSpent,
    Cancelled,
}

/// Result of a synthesis run. Running out of candidates is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<V> {
    Found {
        program: ProgramTree<V>,
        /// Sketches dequeued, including the one the program was completed from.
        explored: usize,
    },
    Exhausted {
        explored: usize,
        reason: ExhaustReason,
    },
}

impl<V> SearchOutcome<V> {
    pub fn program(&self) -> Option<&ProgramTree<V>> {
        match self {
            SearchOutcome::Found { program, .. } => Some(program),
            SearchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn into_program(self) -> Option<ProgramTree<V>> {
        match self {
            SearchOutcome::Found { program, .. } => Some(program),
            SearchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn explored(&self) -> usize {
        match self {
            SearchOutcome::Found { explored, .. } | SearchOutcome::Exhausted { explored, .. } => {
                *explored
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}
