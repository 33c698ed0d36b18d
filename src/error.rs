use thiserror::Error;

/// A grammar that cannot drive a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The start symbol has no production, so every branch is stuck at the root.
    #[error("nonterminal `{0}` has no productions")]
    NoProductions(String),

    /// No derivation from the start symbol ever reaches a sketch without
    /// nonterminal leaves.
    #[error("nonterminal `{0}` cannot derive a complete program")]
    Unproductive(String),

    /// A rule mentions a symbol minted by a different grammar.
    #[error("rule for `{lhs}` mentions a symbol of another grammar")]
    ForeignSymbol { lhs: String },
}

/// Failure while evaluating a program tree.
///
/// Evaluating a tree that is not fully expanded is not an error: evaluators
/// answer `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A leaf that needs a literal has none. This is a setup mistake (usually
    /// a filler that returns nothing for a literal symbol).
    #[error("`{symbol}` leaf has no literal attached")]
    MissingLiteral { symbol: String },

    #[error("parameter {index} is out of range for {len} argument(s)")]
    ParamOutOfRange { index: usize, len: usize },

    /// The candidate itself faulted (overflow, bad operand...). Only the
    /// candidate is rejected.
    #[error("{0}")]
    Fault(String),
}

impl EvalError {
    /// Fatal errors abort a search; the others merely disqualify a candidate.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EvalError::Fault(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("malformed grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
}
