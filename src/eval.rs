use crate::error::EvalError;
use crate::tree::ProgramTree;

/// `Ok(None)` means the tree is not fully expanded yet.
pub type EvalResult<V> = Result<Option<V>, EvalError>;

/// Positional arguments visible to parameter leaves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Env<V> {
    args: Vec<V>,
}

impl<V> Env<V> {
    pub fn new(args: impl IntoIterator<Item = V>) -> Self {
        Self {
            args: args.into_iter().collect(),
        }
    }

    pub fn add_args(&mut self, args: impl IntoIterator<Item = V>) {
        self.args.extend(args);
    }

    pub fn get(&self, index: usize) -> Result<&V, EvalError> {
        self.args.get(index).ok_or(EvalError::ParamOutOfRange {
            index,
            len: self.args.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A tree-walking interpreter for some DSL.
///
/// Implementations must answer `Ok(None)` for trees that still contain an
/// unexpanded nonterminal leaf, and [`EvalError::MissingLiteral`] for leaves
/// that need a literal but have none.
pub trait Evaluator<V> {
    fn eval(&self, node: &ProgramTree<V>, env: &Env<V>) -> EvalResult<V>;
}

impl<V, F> Evaluator<V> for F
where
    F: Fn(&ProgramTree<V>, &Env<V>) -> EvalResult<V>,
{
    fn eval(&self, node: &ProgramTree<V>, env: &Env<V>) -> EvalResult<V> {
        self(node, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    #[test]
    fn positional_lookup() {
        let mut env = Env::new([100, 200]);
        assert_eq!(env.get(1), Ok(&200));
        assert_eq!(env.get(2), Err(EvalError::ParamOutOfRange { index: 2, len: 2 }));

        env.add_args([300]);
        assert_eq!(env.len(), 3);
        assert_eq!(env.get(2), Ok(&300));
        assert!(Env::<i64>::default().is_empty());
    }

    fn first_child_or_value(node: &ProgramTree<i64>, env: &Env<i64>) -> EvalResult<i64> {
        match node.children() {
            [] => Ok(node.value().copied()),
            [child, ..] => first_child_or_value(child, env),
        }
    }

    #[test]
    fn functions_are_evaluators() {
        let mut gram = Grammar::new("S");
        let leaf = gram.symbol("leaf");
        let mut tree = ProgramTree::new(gram.start());
        tree.add_children([ProgramTree::new(leaf).with(5)]);

        let env = Env::default();
        assert_eq!(first_child_or_value.eval(&tree, &env), Ok(Some(5)));
        assert_eq!(
            first_child_or_value.eval(&ProgramTree::new(leaf), &env),
            Ok(None)
        );
    }
}
