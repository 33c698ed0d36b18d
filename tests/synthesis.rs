use sketchsynth::dsl::arith::{Arith, Num};
use sketchsynth::{
    CancelToken, Env, EvalError, EvalResult, Evaluator, Example, ExhaustReason, Grammar,
    GrammarError, ProgramTree, SearchBudget, SearchOutcome, SearchStep, Symbol, SynthError,
    Synthesizer,
};

fn init_logs() {
    let _ = colog::default_builder()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// `exp -> add | mult | const`, `add -> exp exp`, `mult -> exp exp`, with
/// `const` filled from `[1, 2, 3, 4]`.
struct ExpGrammar {
    gram: Grammar,
    add: Symbol,
    mult: Symbol,
    cnst: Symbol,
}

impl ExpGrammar {
    fn new() -> Self {
        let mut gram = Grammar::new("exp");
        let exp = gram.start();
        let add = gram.symbol("add");
        let mult = gram.symbol("mult");
        let cnst = gram.symbol("const");

        gram.add_rule(exp, [add]);
        gram.add_rule(exp, [mult]);
        gram.add_rule(exp, [cnst]);
        gram.add_rule(add, [exp, exp]);
        gram.add_rule(mult, [exp, exp]);

        Self { gram, add, mult, cnst }
    }

    fn eval(&self, node: &ProgramTree<Num>, env: &Env<Num>) -> EvalResult<Num> {
        let s = node.symbol();
        if s == self.cnst {
            return node
                .value()
                .map(|v| Some(*v))
                .ok_or(EvalError::MissingLiteral { symbol: "const".into() });
        }

        let values = node
            .children()
            .iter()
            .map(|c| self.eval(c, env))
            .collect::<Result<Option<Vec<_>>, _>>()?;
        let Some(values) = values else {
            return Ok(None);
        };

        Ok(match values.as_slice() {
            [l, r] if s == self.add => Some(l + r),
            [l, r] if s == self.mult => Some(l * r),
            [v] => Some(*v),
            _ => None,
        })
    }

    fn fill(&self, symbol: Symbol) -> Vec<Num> {
        if symbol == self.cnst {
            vec![1, 2, 3, 4]
        } else {
            Vec::new()
        }
    }
}

struct ExpEval<'a>(&'a ExpGrammar);

impl Evaluator<Num> for ExpEval<'_> {
    fn eval(&self, node: &ProgramTree<Num>, env: &Env<Num>) -> EvalResult<Num> {
        self.0.eval(node, env)
    }
}

#[test]
fn finds_fifteen() {
    init_logs();

    let exp = ExpGrammar::new();
    let eval = ExpEval(&exp);
    let fill = |s: Symbol, _: &Example<Num>| -> Vec<Num> { exp.fill(s) };
    let synth = Synthesizer::new(&exp.gram, &eval, &fill).unwrap();
    let example = Example::<Num>::new(15, []);

    let outcome = synth.synthesize(&example).unwrap();
    let SearchOutcome::Found { program, explored } = &outcome else {
        panic!("no program: {outcome:?}");
    };

    assert_eq!(eval.eval(program, &Env::default()), Ok(Some(15)));
    assert_eq!(
        program.display(&exp.gram).to_string(),
        r#"exp[add[exp[mult[exp["const"(4)],exp["const"(3)]]],exp["const"(3)]]]"#
    );
    assert_eq!(*explored, 1561);

    // Same grammar, filler and example: same answer.
    assert_eq!(synth.synthesize(&example).unwrap(), outcome);

    let leaves = program.leaves();
    assert!(leaves.iter().all(|l| l.symbol() == exp.cnst));
    assert!(program.non_terminal_leaves(&exp.gram).is_empty());
    assert_eq!(program.children()[0].symbol(), exp.add);
    assert_eq!(program.children()[0].children()[0].children()[0].symbol(), exp.mult);
}

#[test]
fn budget_boundary() {
    let exp = ExpGrammar::new();
    let eval = ExpEval(&exp);
    let fill = |s: Symbol, _: &Example<Num>| -> Vec<Num> { exp.fill(s) };
    let example = Example::<Num>::new(15, []);

    let tight = Synthesizer::new(&exp.gram, &eval, &fill)
        .unwrap()
        .with_budget(SearchBudget::new(1561));
    assert!(tight.synthesize(&example).unwrap().is_found());

    let short = Synthesizer::new(&exp.gram, &eval, &fill)
        .unwrap()
        .with_budget(SearchBudget::new(1560));
    assert_eq!(
        short.synthesize(&example).unwrap(),
        SearchOutcome::Exhausted {
            explored: 1560,
            reason: ExhaustReason::BudgetSpent,
        }
    );
}

#[test]
fn cancelled_before_start() {
    let exp = ExpGrammar::new();
    let eval = ExpEval(&exp);
    let fill = |s: Symbol, _: &Example<Num>| -> Vec<Num> { exp.fill(s) };

    let token = CancelToken::new();
    token.cancel();
    let synth = Synthesizer::new(&exp.gram, &eval, &fill)
        .unwrap()
        .with_budget(SearchBudget::default().with_cancel(token));

    assert_eq!(
        synth.synthesize(&Example::<Num>::new(15, [])).unwrap(),
        SearchOutcome::Exhausted {
            explored: 0,
            reason: ExhaustReason::Cancelled,
        }
    );
}

#[test]
fn finite_grammar_runs_dry() {
    let mut gram = Grammar::new("e");
    let c = gram.symbol("c");
    gram.add_rule(gram.start(), [c]);

    let eval = |node: &ProgramTree<Num>, _: &Env<Num>| -> EvalResult<Num> {
        Ok(node.children().first().and_then(|c| c.value().copied()))
    };
    let fill = |_: Symbol, _: &Example<Num>| -> Vec<Num> { vec![1, 2] };
    let synth = Synthesizer::new(&gram, &eval, &fill).unwrap();

    assert!(synth.synthesize(&Example::<Num>::new(2, [])).unwrap().is_found());
    assert_eq!(
        synth.synthesize(&Example::<Num>::new(3, [])).unwrap(),
        SearchOutcome::Exhausted {
            explored: 2,
            reason: ExhaustReason::FrontierEmpty,
        }
    );
}

#[test]
fn missing_literal_is_reported() {
    let mut gram = Grammar::new("e");
    let c = gram.symbol("c");
    gram.add_rule(gram.start(), [c]);

    let eval = |node: &ProgramTree<Num>, _: &Env<Num>| -> EvalResult<Num> {
        match node.children().first() {
            Some(c) => c
                .value()
                .map(|v| Some(*v))
                .ok_or(EvalError::MissingLiteral { symbol: "c".into() }),
            None => Ok(None),
        }
    };
    // Nothing fills `c`.
    let fill = |_: Symbol, _: &Example<Num>| -> Vec<Num> { Vec::new() };
    let synth = Synthesizer::new(&gram, &eval, &fill).unwrap();

    assert_eq!(
        synth.synthesize(&Example::<Num>::new(1, [])),
        Err(SynthError::Eval(EvalError::MissingLiteral { symbol: "c".into() }))
    );
}

#[test]
fn malformed_grammar_is_rejected() {
    let gram = Grammar::new("S");
    let eval = |_: &ProgramTree<Num>, _: &Env<Num>| -> EvalResult<Num> { Ok(None) };
    let fill = |_: Symbol, _: &Example<Num>| -> Vec<Num> { Vec::new() };

    assert!(matches!(
        Synthesizer::new(&gram, &eval, &fill),
        Err(SynthError::Grammar(GrammarError::NoProductions(name))) if name == "S"
    ));
}

#[test]
fn arith_uses_parameters() {
    init_logs();

    let arith = Arith::new([0, 1, 2], true);
    let synth = Synthesizer::new(arith.grammar(), &arith, &arith).unwrap();
    let example = Example::<Num>::new(10, [5]);

    let outcome = synth.synthesize(&example).unwrap();
    let program = outcome.program().unwrap();

    assert_eq!(outcome.explored(), 68);
    assert_eq!(
        program.display(arith.grammar()).to_string(),
        r#"S[exp[add[exp["param"(0)],exp["param"(0)]]]]"#
    );
    assert_eq!(arith.eval(program, &Env::new([5])), Ok(Some(10)));
    assert_eq!(arith.eval(program, &Env::new([7])), Ok(Some(14)));
}

#[test]
fn arith_constants_only() {
    let arith = Arith::new([0, 1, 2], false);
    let synth = Synthesizer::new(arith.grammar(), &arith, &arith).unwrap();

    let outcome = synth.synthesize(&Example::<Num>::new(4, [])).unwrap();

    assert_eq!(outcome.explored(), 52);
    assert_eq!(
        outcome.program().map(|p| p.display(arith.grammar()).to_string()),
        Some(r#"S[exp[add[exp["const"(2)],exp["const"(2)]]]]"#.to_string())
    );
}

#[test]
fn stepping_reports_each_candidate() {
    let exp = ExpGrammar::new();
    let eval = ExpEval(&exp);
    let fill = |s: Symbol, _: &Example<Num>| -> Vec<Num> { exp.fill(s) };
    let synth = Synthesizer::new(&exp.gram, &eval, &fill).unwrap();
    let example = Example::<Num>::new(3, []);

    let mut search = synth.search(&example);
    let mut got = Vec::new();
    while let Some(step) = search.step().unwrap() {
        match step {
            SearchStep::IncorrectSample { got: value, .. } => got.push(value),
            SearchStep::CorrectSample { cand } => {
                assert_eq!(cand.leaves()[0].value(), Some(&3));
                break;
            }
        }
    }

    assert_eq!(got, vec![Some(1), Some(2)]);
    assert_eq!(search.explored(), 4);
    assert_eq!(search.exhausted(), None);
}

#[test]
fn enumeration_does_not_evaluate() {
    let exp = ExpGrammar::new();
    let eval = |_: &ProgramTree<Num>, _: &Env<Num>| -> EvalResult<Num> {
        panic!("diagnostic enumeration must not evaluate")
    };
    let fill = |s: Symbol, _: &Example<Num>| -> Vec<Num> { exp.fill(s) };
    let synth = Synthesizer::new(&exp.gram, &eval, &fill).unwrap();
    let example = Example::<Num>::new(0, []);

    let mut cands = synth.enumerate(&example);
    let first = cands
        .by_ref()
        .take(6)
        .map(|p| p.display(&exp.gram).to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        first,
        [
            r#"exp["const"(1)]"#,
            r#"exp["const"(2)]"#,
            r#"exp["const"(3)]"#,
            r#"exp["const"(4)]"#,
            r#"exp[add[exp["const"(1)],exp["const"(1)]]]"#,
            r#"exp[add[exp["const"(2)],exp["const"(1)]]]"#,
        ]
    );
    assert_eq!(cands.explored(), 29);
}
