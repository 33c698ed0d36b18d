use std::collections::VecDeque;
use std::fmt;

use log::trace;

use crate::grammar::Grammar;
use crate::tree::ProgramTree;

use super::product::Odometer;
use super::{Example, ExhaustReason, Filler, SearchBudget};

/// Completes one structurally complete sketch: every combination of hole
/// literals, first hole turning fastest.
struct HoleFill<V> {
    sketch: ProgramTree<V>,
    holes: Vec<(Vec<usize>, Vec<V>)>,
    odometer: Odometer,
}

impl<V: Clone> HoleFill<V> {
    fn new<F: Filler<V>>(sketch: ProgramTree<V>, filler: &F, example: &Example<V>) -> Self {
        let holes = sketch
            .leaf_paths()
            .into_iter()
            .filter_map(|path| {
                let leaf = sketch.descendant(&path)?;
                let values = filler.candidates(leaf.symbol(), example);
                (!values.is_empty()).then_some((path, values))
            })
            .collect::<Vec<_>>();
        let odometer = Odometer::new(holes.iter().map(|(_, values)| values.len()).collect());

        Self {
            sketch,
            holes,
            odometer,
        }
    }

    fn next_program(&mut self) -> Option<ProgramTree<V>> {
        let digits = self.odometer.next()?;
        let mut program = self.sketch.clone();

        for ((path, values), digit) in self.holes.iter().zip(digits) {
            // Paths were taken from `sketch`, which the clone mirrors.
            if let Some(leaf) = program.descendant_mut(path) {
                leaf.set_value(values[digit].clone());
            }
        }

        Some(program)
    }
}

/// Breadth-first enumeration of the programs a grammar derives.
///
/// Sketches sit in a FIFO worklist seeded with the start symbol. A dequeued
/// sketch with nonterminal leaves is expanded: for every such leaf, left to
/// right, and every alternative of its symbol, in registration order, a copy
/// with that leaf expanded is enqueued. A sketch without nonterminal leaves
/// is completed with the literals of the [`Filler`] instead, and each
/// completion is handed out as a candidate.
///
/// Nothing is evaluated here; see [`crate::search`] for that.
pub struct SketchEnum<'s, V, F> {
    grammar: &'s Grammar,
    filler: &'s F,
    example: &'s Example<V>,
    budget: SearchBudget,
    worklist: VecDeque<ProgramTree<V>>,
    filling: Option<HoleFill<V>>,
    explored: usize,
    exhausted: Option<ExhaustReason>,
}

impl<'s, V, F> SketchEnum<'s, V, F>
where
    V: Clone + fmt::Debug,
    F: Filler<V>,
{
    pub fn new(
        grammar: &'s Grammar,
        filler: &'s F,
        example: &'s Example<V>,
        budget: SearchBudget,
    ) -> Self {
        Self {
            grammar,
            filler,
            example,
            budget,
            worklist: VecDeque::from([ProgramTree::new(grammar.start())]),
            filling: None,
            explored: 0,
            exhausted: None,
        }
    }

    /// Number of sketches dequeued so far.
    pub fn explored(&self) -> usize {
        self.explored
    }

    /// Sketches waiting in the worklist.
    pub fn frontier_len(&self) -> usize {
        self.worklist.len()
    }

    /// Set once the enumeration has run dry.
    pub fn exhausted(&self) -> Option<ExhaustReason> {
        self.exhausted
    }

    pub fn budget(&self) -> &SearchBudget {
        &self.budget
    }

    /// The next complete candidate program, or `None` once the frontier or
    /// the budget is used up.
    pub fn next_candidate(&mut self) -> Option<ProgramTree<V>> {
        loop {
            if let Some(filling) = &mut self.filling {
                if let Some(program) = filling.next_program() {
                    return Some(program);
                }
                self.filling = None;
            }

            if self.exhausted.is_some() {
                return None;
            }

            let reason = if self.worklist.is_empty() {
                Some(ExhaustReason::FrontierEmpty)
            } else {
                self.budget.stop_reason(self.explored)
            };
            if let Some(reason) = reason {
                self.exhausted = Some(reason);
                return None;
            }

            // Dequeued sketches are dropped once handled.
            let Some(sketch) = self.worklist.pop_front() else {
                continue;
            };
            self.explored += 1;
            trace!("Sketch #{}: {}", self.explored, sketch.display(self.grammar));

            let holes = sketch.non_terminal_leaf_paths(self.grammar);
            if holes.is_empty() {
                self.filling = Some(HoleFill::new(sketch, self.filler, self.example));
            } else {
                self.expand(&sketch, &holes);
            }
        }
    }

    fn expand(&mut self, sketch: &ProgramTree<V>, holes: &[Vec<usize>]) {
        for path in holes {
            let Some(symbol) = sketch.descendant(path).map(ProgramTree::symbol) else {
                continue;
            };

            for seq in self.grammar.rhs(symbol) {
                let mut copy = sketch.clone();
                if let Some(node) = copy.descendant_mut(path) {
                    node.add_children(seq.iter().copied().map(ProgramTree::new));
                }
                self.worklist.push_back(copy);
            }
        }
    }
}

impl<V, F> Iterator for SketchEnum<'_, V, F>
where
    V: Clone + fmt::Debug,
    F: Filler<V>,
{
    type Item = ProgramTree<V>;

    fn next(&mut self) -> Option<ProgramTree<V>> {
        self.next_candidate()
    }
}
