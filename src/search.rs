use std::fmt;

use log::{debug, trace};

use crate::error::SynthError;
use crate::eval::{Env, Evaluator};
use crate::grammar::Grammar;
use crate::synth::sketch_enum::SketchEnum;
use crate::synth::{Example, ExhaustReason, Filler, SearchBudget, SearchOutcome};
use crate::tree::ProgramTree;

#[derive(Clone, Debug, PartialEq)]
pub enum SearchStep<V> {
    IncorrectSample {
        cand: ProgramTree<V>,
        /// `None` when the candidate could not be evaluated to a value.
        got: Option<V>,
    },
    CorrectSample {
        cand: ProgramTree<V>,
    },
}

/// Example-driven synthesizer over a grammar.
///
/// The grammar is validated once, on construction. Evaluator and filler are
/// borrowed for the synthesizer's lifetime and never mutated.
pub struct Synthesizer<'s, E, F> {
    grammar: &'s Grammar,
    evaluator: &'s E,
    filler: &'s F,
    budget: SearchBudget,
}

impl<'s, E, F> Synthesizer<'s, E, F> {
    pub fn new(grammar: &'s Grammar, evaluator: &'s E, filler: &'s F) -> Result<Self, SynthError> {
        grammar.validate()?;

        Ok(Self {
            grammar,
            evaluator,
            filler,
            budget: SearchBudget::default(),
        })
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn grammar(&self) -> &'s Grammar {
        self.grammar
    }

    /// Looks for a program whose value on `example`'s inputs equals its
    /// output. The first match in search order wins.
    pub fn synthesize<V>(&self, example: &Example<V>) -> Result<SearchOutcome<V>, SynthError>
    where
        V: Clone + PartialEq + fmt::Debug,
        E: Evaluator<V>,
        F: Filler<V>,
    {
        let mut search = self.search(example);

        while let Some(step) = search.step()? {
            if let SearchStep::CorrectSample { cand } = step {
                let explored = search.explored();
                debug!(
                    "Found after {explored} sketch(es): {}",
                    cand.display(self.grammar)
                );

                return Ok(SearchOutcome::Found {
                    program: cand,
                    explored,
                });
            }
        }

        let explored = search.explored();
        let reason = search.exhausted().unwrap_or(ExhaustReason::FrontierEmpty);
        debug!("No program after {explored} sketch(es): {reason:?}");

        Ok(SearchOutcome::Exhausted { explored, reason })
    }

    /// Step-by-step form of [`synthesize`](Self::synthesize).
    pub fn search<'a, V>(&'a self, example: &'a Example<V>) -> Search<'a, V, E, F>
    where
        V: Clone + PartialEq + fmt::Debug,
        E: Evaluator<V>,
        F: Filler<V>,
    {
        Search {
            grammar: self.grammar,
            evaluator: self.evaluator,
            example,
            sketches: SketchEnum::new(self.grammar, self.filler, example, self.budget.clone()),
        }
    }

    /// Diagnostic mode: every complete candidate in search order, nothing
    /// evaluated. The example is only shown to the filler.
    pub fn enumerate<'a, V>(&'a self, example: &'a Example<V>) -> SketchEnum<'a, V, F>
    where
        V: Clone + fmt::Debug,
        F: Filler<V>,
    {
        SketchEnum::new(self.grammar, self.filler, example, self.budget.clone())
    }
}

/// A running search. Each [`step`](Self::step) evaluates one candidate.
pub struct Search<'a, V, E, F> {
    grammar: &'a Grammar,
    evaluator: &'a E,
    example: &'a Example<V>,
    sketches: SketchEnum<'a, V, F>,
}

impl<V, E, F> Search<'_, V, E, F>
where
    V: Clone + PartialEq + fmt::Debug,
    E: Evaluator<V>,
    F: Filler<V>,
{
    /// Evaluates the next candidate against the example. `Ok(None)` once
    /// the enumeration is exhausted.
    pub fn step(&mut self) -> Result<Option<SearchStep<V>>, SynthError> {
        let Some(cand) = self.sketches.next_candidate() else {
            return Ok(None);
        };

        let env = Env::new(self.example.inputs().iter().cloned());
        let got = match self.evaluator.eval(&cand, &env) {
            Ok(got) => got,
            Err(e) if !e.is_fatal() => {
                trace!("Candidate faulted ({e}): {}", cand.display(self.grammar));
                None
            }
            Err(e) => return Err(e.into()),
        };

        trace!("Try: {} => {got:?}", cand.display(self.grammar));

        Ok(Some(match got {
            Some(v) if v == *self.example.output() => SearchStep::CorrectSample { cand },
            got => SearchStep::IncorrectSample { cand, got },
        }))
    }

    pub fn explored(&self) -> usize {
        self.sketches.explored()
    }

    pub fn frontier_len(&self) -> usize {
        self.sketches.frontier_len()
    }

    pub fn exhausted(&self) -> Option<ExhaustReason> {
        self.sketches.exhausted()
    }
}
