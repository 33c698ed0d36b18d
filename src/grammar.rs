use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use itertools::Itertools;
use log::warn;

use crate::error::GrammarError;

static NEXT_GRAMMAR_ID: AtomicU32 = AtomicU32::new(0);

/// A grammar symbol.
///
/// Symbols are handles minted by [`Grammar::symbol`]. Two symbols minted with
/// the same textual id are still different symbols. Whether a symbol is
/// terminal is a property of the grammar that minted it, see
/// [`Grammar::is_terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    grammar: u32,
    idx: u32,
}

impl Symbol {
    pub(crate) fn index(self) -> usize {
        self.idx as usize
    }
}

/// A context-free grammar over [`Symbol`]s.
///
/// The grammar only grows: rules are appended and never removed, so a symbol
/// that became nonterminal stays nonterminal.
#[derive(Debug, Clone)]
pub struct Grammar {
    id: u32,
    start: Symbol,
    names: Vec<String>,
    /// Indexed by symbol. Symbols never used in a rule are not "known".
    known: Vec<bool>,
    /// Indexed by symbol, alternatives in registration order.
    rules: Vec<Vec<Vec<Symbol>>>,
    /// Left-hand sides in order of first registration.
    lhs_order: Vec<Symbol>,
    /// Rules whose left-hand side was minted by another grammar.
    foreign_lhs: usize,
}

impl Grammar {
    /// Creates a grammar together with its start symbol.
    pub fn new(start: impl Into<String>) -> Self {
        let id = NEXT_GRAMMAR_ID.fetch_add(1, Ordering::Relaxed);
        let mut res = Self {
            id,
            start: Symbol { grammar: id, idx: 0 },
            names: Vec::new(),
            known: Vec::new(),
            rules: Vec::new(),
            lhs_order: Vec::new(),
            foreign_lhs: 0,
        };

        res.start = res.symbol(start);
        res.known[res.start.index()] = true;

        res
    }

    /// Mints a fresh symbol. It stays terminal until it appears on the left
    /// of a rule.
    pub fn symbol(&mut self, id: impl Into<String>) -> Symbol {
        let idx = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        self.names.push(id.into());
        self.known.push(false);
        self.rules.push(Vec::new());

        Symbol { grammar: self.id, idx }
    }

    /// Registers the production `left -> right...`. Registering the same
    /// left-hand side again adds an alternative.
    pub fn add_rule(&mut self, left: Symbol, right: impl IntoIterator<Item = Symbol>) {
        let right = right.into_iter().collect::<Vec<_>>();

        for s in std::iter::once(&left).chain(&right) {
            if let Some(known) = self.own(*s).and_then(|idx| self.known.get_mut(idx)) {
                *known = true;
            }
        }

        // Foreign left-hand sides get no slot, `validate` reports them.
        let Some(idx) = self.own(left) else {
            self.foreign_lhs += 1;
            return;
        };
        if !self.lhs_order.contains(&left) {
            self.lhs_order.push(left);
        }
        self.rules[idx].push(right);
    }

    /// All alternatives registered for `symbol`, in registration order.
    /// Terminals have none.
    pub fn rhs(&self, symbol: Symbol) -> &[Vec<Symbol>] {
        self.own(symbol)
            .map(|idx| self.rules[idx].as_slice())
            .unwrap_or(&[])
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        symbol != self.start && self.rhs(symbol).is_empty()
    }

    pub fn is_nonterminal(&self, symbol: Symbol) -> bool {
        !self.is_terminal(symbol)
    }

    /// The textual id a symbol was minted with.
    pub fn name(&self, symbol: Symbol) -> &str {
        self.own(symbol)
            .map(|idx| self.names[idx].as_str())
            .unwrap_or("<foreign>")
    }

    /// Symbols mentioned by some rule, plus the start symbol, in minting order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.known
            .iter()
            .enumerate()
            .filter(|(_, known)| **known)
            .map(|(idx, _)| Symbol { grammar: self.id, idx: idx as u32 })
    }

    /// Checks that the grammar can drive a search: every rule only mentions
    /// symbols of this grammar, and the start symbol has productions that can
    /// eventually bottom out in terminals.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.foreign_lhs > 0 {
            return Err(GrammarError::ForeignSymbol {
                lhs: "<foreign>".to_string(),
            });
        }

        for lhs in &self.lhs_order {
            let foreign = self.rhs(*lhs).iter().flatten().any(|s| self.own(*s).is_none());
            if foreign {
                return Err(GrammarError::ForeignSymbol {
                    lhs: self.name(*lhs).to_string(),
                });
            }
        }

        if self.rhs(self.start).is_empty() {
            return Err(GrammarError::NoProductions(self.name(self.start).to_string()));
        }

        let productive = self.productive();
        if !productive[self.start.index()] {
            return Err(GrammarError::Unproductive(self.name(self.start).to_string()));
        }

        for lhs in &self.lhs_order {
            if !productive[lhs.index()] {
                warn!("Nonterminal `{}` never derives a complete program", self.name(*lhs));
            }
        }

        Ok(())
    }

    fn own(&self, symbol: Symbol) -> Option<usize> {
        (symbol.grammar == self.id).then_some(symbol.index())
    }

    /// Fixpoint: terminals are productive, a nonterminal is productive once
    /// one of its alternatives is non-empty and made of productive symbols.
    /// An empty alternative leaves a childless nonterminal leaf behind, so it
    /// never completes a sketch.
    fn productive(&self) -> Vec<bool> {
        let mut productive = (0..self.names.len())
            .map(|idx| {
                let s = Symbol { grammar: self.id, idx: idx as u32 };
                self.is_terminal(s)
            })
            .collect::<Vec<_>>();

        let mut changed = true;
        while changed {
            changed = false;
            for lhs in &self.lhs_order {
                if productive[lhs.index()] {
                    continue;
                }

                let done = self.rhs(*lhs).iter().any(|seq| {
                    !seq.is_empty() && seq.iter().all(|s| productive[s.index()])
                });
                if done {
                    productive[lhs.index()] = true;
                    changed = true;
                }
            }
        }

        productive
    }

    pub(crate) fn symbol_label(&self, symbol: Symbol) -> SymbolLabel<'_> {
        SymbolLabel { grammar: self, symbol }
    }
}

/// Renders a symbol the way grammars and trees print it: terminals are quoted.
pub(crate) struct SymbolLabel<'g> {
    grammar: &'g Grammar,
    symbol: Symbol,
}

impl fmt::Display for SymbolLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.grammar.name(self.symbol);
        if self.grammar.is_terminal(self.symbol) {
            write!(f, "\"{name}\"")
        } else {
            f.write_str(name)
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start: {}", self.symbol_label(self.start))?;

        for lhs in &self.lhs_order {
            let alternatives = self.rhs(*lhs).iter().map(|seq| {
                if seq.is_empty() {
                    "ε".to_string()
                } else {
                    seq.iter().map(|s| self.symbol_label(*s)).join(" ")
                }
            });

            write!(
                f,
                "\n{} -> {}",
                self.symbol_label(*lhs),
                alternatives.format(" | ")
            )?;
        }

        write!(
            f,
            "\nsymbols: {}",
            self.symbols().map(|s| self.symbol_label(s)).format(" ")
        )
    }
}
