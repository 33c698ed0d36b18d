use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::grammar::{Grammar, Symbol};

/// A node of a (possibly partial) program.
///
/// The same type serves as a sketch with unexpanded nonterminal leaves, a
/// structurally complete sketch whose terminal leaves still lack literals, and
/// a complete program. Children are shared copy-on-write: [`Clone`] is cheap
/// and every mutating accessor unshares the path it walks, so a clone never
/// observes mutations of the original and vice versa.
///
/// Only leaves carry literals: a node that gains children loses its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramTree<V> {
    symbol: Symbol,
    children: Vec<Rc<ProgramTree<V>>>,
    value: Option<V>,
}

impl<V: Clone> ProgramTree<V> {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            children: Vec::new(),
            value: None,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn children(&self) -> &[Rc<ProgramTree<V>>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Appends children in order. The tree takes ownership of them.
    pub fn add_children(&mut self, children: impl IntoIterator<Item = ProgramTree<V>>) {
        self.children.extend(children.into_iter().map(Rc::new));
        if !self.children.is_empty() {
            self.value = None;
        }
    }

    /// Attaches a literal, builder style. See [`set_value`](Self::set_value).
    pub fn with(mut self, value: V) -> Self {
        self.set_value(value);
        self
    }

    /// Attaches a literal to a leaf. Nodes with children keep no value.
    pub fn set_value(&mut self, value: V) {
        if self.children.is_empty() {
            self.value = Some(value);
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Childless nodes, left to right, depth first.
    pub fn leaves(&self) -> Vec<&ProgramTree<V>> {
        let mut res = Vec::new();
        self.collect_leaves(&mut res);
        res
    }

    /// The leaves the grammar can still expand.
    pub fn non_terminal_leaves(&self, grammar: &Grammar) -> Vec<&ProgramTree<V>> {
        self.leaves()
            .into_iter()
            .filter(|leaf| grammar.is_nonterminal(leaf.symbol))
            .collect()
    }

    /// Child-index paths of every leaf, in [`leaves`](Self::leaves) order.
    pub fn leaf_paths(&self) -> Vec<Vec<usize>> {
        let mut res = Vec::new();
        self.collect_leaf_paths(&mut |_| true, &mut Vec::new(), &mut res);
        res
    }

    /// Child-index paths of every nonterminal leaf, in
    /// [`non_terminal_leaves`](Self::non_terminal_leaves) order.
    pub fn non_terminal_leaf_paths(&self, grammar: &Grammar) -> Vec<Vec<usize>> {
        let mut res = Vec::new();
        self.collect_leaf_paths(
            &mut |leaf| grammar.is_nonterminal(leaf.symbol),
            &mut Vec::new(),
            &mut res,
        );
        res
    }

    /// The node reached by following `path` from the root.
    pub fn descendant(&self, path: &[usize]) -> Option<&ProgramTree<V>> {
        let mut node = self;
        for &idx in path {
            node = Rc::as_ref(node.children.get(idx)?);
        }
        Some(node)
    }

    /// Mutable access to the node at `path`. Shared nodes along the way are
    /// copied first.
    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut ProgramTree<V>> {
        let mut node = self;
        for &idx in path {
            node = Rc::make_mut(node.children.get_mut(idx)?);
        }
        Some(node)
    }

    pub fn leaf_mut(&mut self, n: usize) -> Option<&mut ProgramTree<V>> {
        let path = self.leaf_paths().into_iter().nth(n)?;
        self.descendant_mut(&path)
    }

    pub fn non_terminal_leaf_mut(
        &mut self,
        n: usize,
        grammar: &Grammar,
    ) -> Option<&mut ProgramTree<V>> {
        let path = self.non_terminal_leaf_paths(grammar).into_iter().nth(n)?;
        self.descendant_mut(&path)
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }

    /// Renders the tree with the symbol names of `grammar`.
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> TreeDisplay<'a, V> {
        TreeDisplay {
            tree: self,
            grammar,
            indented: false,
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ProgramTree<V>>) {
        if self.children.is_empty() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    fn collect_leaf_paths(
        &self,
        pred: &mut impl FnMut(&ProgramTree<V>) -> bool,
        path: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if self.children.is_empty() {
            if pred(self) {
                out.push(path.clone());
            }
            return;
        }

        for (idx, child) in self.children.iter().enumerate() {
            path.push(idx);
            child.collect_leaf_paths(pred, path, out);
            path.pop();
        }
    }
}

/// Textual form of a [`ProgramTree`].
///
/// The compact form reads `mult[add["const"(1),"const"(4)],"const"(3)]`;
/// [`indented`](Self::indented) puts one node per line.
pub struct TreeDisplay<'a, V> {
    tree: &'a ProgramTree<V>,
    grammar: &'a Grammar,
    indented: bool,
}

impl<V> TreeDisplay<'_, V> {
    pub fn indented(mut self) -> Self {
        self.indented = true;
        self
    }
}

impl<V: fmt::Debug> TreeDisplay<'_, V> {
    fn write_label(&self, f: &mut fmt::Formatter<'_>, node: &ProgramTree<V>) -> fmt::Result {
        write!(f, "{}", self.grammar.symbol_label(node.symbol))?;
        if let Some(value) = &node.value {
            write!(f, "({value:?})")?;
        }
        Ok(())
    }

    fn write_compact(&self, f: &mut fmt::Formatter<'_>, node: &ProgramTree<V>) -> fmt::Result {
        self.write_label(f, node)?;
        if node.children.is_empty() {
            return Ok(());
        }

        let children = node.children.iter().map(|child| TreeDisplay {
            tree: child.as_ref(),
            grammar: self.grammar,
            indented: false,
        });
        write!(f, "[{}]", children.format(","))
    }

    fn write_indented(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &ProgramTree<V>,
        depth: usize,
    ) -> fmt::Result {
        self.write_label(f, node)?;
        for child in &node.children {
            write!(f, "\n{}---", "   ".repeat(depth))?;
            self.write_indented(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl<V: fmt::Debug> fmt::Display for TreeDisplay<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indented {
            self.write_indented(f, self.tree, 0)
        } else {
            self.write_compact(f, self.tree)
        }
    }
}
