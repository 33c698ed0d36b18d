use std::collections::HashMap;

use crate::error::EvalError;
use crate::eval::{Env, EvalResult, Evaluator};
use crate::grammar::{Grammar, Symbol};
use crate::synth::{Example, Filler};
use crate::tree::ProgramTree;

pub type Num = i64;

/// What a symbol of the arithmetic DSL means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `S` and `exp`: the value of the only child.
    Wrapper,
    Add,
    Minus,
    Mult,
    Const,
    /// Argument lookup, the literal is the argument index.
    Param,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithSymbols {
    pub start: Symbol,
    pub exp: Symbol,
    pub add: Symbol,
    pub minus: Symbol,
    pub mult: Symbol,
    pub cnst: Symbol,
    pub param: Symbol,
}

/// Integer arithmetic:
///
/// ```text
/// S     -> exp
/// exp   -> add | minus | mult | const [| param]
/// add   -> exp exp
/// minus -> exp exp
/// mult  -> exp exp
/// ```
///
/// Constants are filled from a fixed list, parameters from the indices of the
/// example's inputs.
pub struct Arith {
    grammar: Grammar,
    symbols: ArithSymbols,
    ops: HashMap<Symbol, Op>,
    constants: Vec<Num>,
}

impl Arith {
    /// `with_params` adds the `exp -> param` alternative. Leave it off for
    /// examples without inputs, a `param` leaf could not be filled then.
    pub fn new(constants: impl IntoIterator<Item = Num>, with_params: bool) -> Self {
        let mut grammar = Grammar::new("S");
        let symbols = ArithSymbols {
            start: grammar.start(),
            exp: grammar.symbol("exp"),
            add: grammar.symbol("add"),
            minus: grammar.symbol("minus"),
            mult: grammar.symbol("mult"),
            cnst: grammar.symbol("const"),
            param: grammar.symbol("param"),
        };

        let ArithSymbols { start, exp, add, minus, mult, cnst, param } = symbols;
        grammar.add_rule(start, [exp]);
        grammar.add_rule(exp, [add]);
        grammar.add_rule(exp, [minus]);
        grammar.add_rule(exp, [mult]);
        grammar.add_rule(exp, [cnst]);
        if with_params {
            grammar.add_rule(exp, [param]);
        }
        grammar.add_rule(add, [exp, exp]);
        grammar.add_rule(minus, [exp, exp]);
        grammar.add_rule(mult, [exp, exp]);

        let ops = HashMap::from([
            (start, Op::Wrapper),
            (exp, Op::Wrapper),
            (add, Op::Add),
            (minus, Op::Minus),
            (mult, Op::Mult),
            (cnst, Op::Const),
            (param, Op::Param),
        ]);

        Self {
            grammar,
            symbols,
            ops,
            constants: constants.into_iter().collect(),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn symbols(&self) -> ArithSymbols {
        self.symbols
    }

    pub fn op(&self, symbol: Symbol) -> Option<Op> {
        self.ops.get(&symbol).copied()
    }

    fn literal(&self, node: &ProgramTree<Num>) -> Result<Num, EvalError> {
        node.value().copied().ok_or_else(|| EvalError::MissingLiteral {
            symbol: self.grammar.name(node.symbol()).to_string(),
        })
    }

    fn binop(&self, op: Op, node: &ProgramTree<Num>, env: &Env<Num>) -> EvalResult<Num> {
        let [l, r] = node.children() else {
            return Ok(None);
        };
        let Some(l) = self.eval(l, env)? else {
            return Ok(None);
        };
        let Some(r) = self.eval(r, env)? else {
            return Ok(None);
        };

        let res = match op {
            Op::Add => l.checked_add(r),
            Op::Minus => l.checked_sub(r),
            Op::Mult => l.checked_mul(r),
            Op::Wrapper | Op::Const | Op::Param => None,
        };

        res.map(Some)
            .ok_or_else(|| EvalError::Fault(format!("{op:?} overflows on {l} and {r}")))
    }
}

impl Evaluator<Num> for Arith {
    fn eval(&self, node: &ProgramTree<Num>, env: &Env<Num>) -> EvalResult<Num> {
        let Some(op) = self.op(node.symbol()) else {
            return Err(EvalError::Fault(format!(
                "`{}` is not an arithmetic symbol",
                self.grammar.name(node.symbol())
            )));
        };

        match op {
            Op::Wrapper => match node.children() {
                [] => Ok(None),
                [child] => self.eval(child, env),
                children => Err(EvalError::Fault(format!(
                    "`{}` wraps {} children",
                    self.grammar.name(node.symbol()),
                    children.len()
                ))),
            },
            Op::Add | Op::Minus | Op::Mult => self.binop(op, node, env),
            Op::Const => self.literal(node).map(Some),
            Op::Param => {
                let raw = self.literal(node)?;
                let index = usize::try_from(raw)
                    .map_err(|_| EvalError::Fault(format!("negative parameter index {raw}")))?;

                env.get(index).map(|v| Some(*v))
            }
        }
    }
}

impl Filler<Num> for Arith {
    fn candidates(&self, symbol: Symbol, example: &Example<Num>) -> Vec<Num> {
        match self.op(symbol) {
            Some(Op::Const) => self.constants.clone(),
            Some(Op::Param) => (0..example.input_count())
                .filter_map(|i| Num::try_from(i).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}
