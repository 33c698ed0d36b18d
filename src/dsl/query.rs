use crate::grammar::Grammar;

/// Grammar of relational query pipelines:
/// `select (sort | filter) cols`, where a sort orders a filter, a filter
/// works on a grouping, and a grouping works on a join of tables.
///
/// Only the grammar is provided; there is no evaluator for it.
pub fn grammar() -> Grammar {
    let mut gram = Grammar::new("S");
    let s = gram.start();

    let sel = gram.symbol("select");
    let sort = gram.symbol("sort");
    let fil = gram.symbol("filter");
    let grp = gram.symbol("groupby");
    let join = gram.symbol("join");
    let tbls = gram.symbol("tbls");

    let cols = gram.symbol("cols");
    let desc = gram.symbol("desc");
    let pred = gram.symbol("pred");
    let grpkey = gram.symbol("grpkey");
    let join_keys = gram.symbol("keyPairs");

    gram.add_rule(s, [sel]);
    gram.add_rule(sel, [sort, cols]);
    gram.add_rule(sel, [fil, cols]);
    gram.add_rule(sort, [fil, desc]);
    gram.add_rule(fil, [grp, pred]);
    gram.add_rule(grp, [join, grpkey]);
    gram.add_rule(join, [tbls, join_keys]);

    gram
}
