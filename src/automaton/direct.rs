//! Direct DFA construction from followpos.
//!
//! DFA states are sets of tree positions, starting from `firstpos(root)`.
//! On symbol `s` a set moves to the union of `followpos(p)` over its
//! positions `p` labelled `s`. A state is terminal when it holds the end
//! marker's position.

use log::debug;

use super::dfa::{explore_subsets, Dfa, Subset};
use crate::regexp::{AttributedTree, Leaf, PositionSet};
use crate::ConstructionError;

pub fn build(tree: &AttributedTree) -> Result<Dfa, ConstructionError> {
    let attrs = tree.attributes();
    let syntax = tree.tree();
    let end_marker = attrs.end_marker();

    let start = attrs.firstpos(syntax.root()).clone();
    let dfa = explore_subsets(
        syntax.alphabet(),
        start,
        |positions, symbol| {
            let mut next = PositionSet::new();
            for &p in positions {
                match attrs.leaf_at(p) {
                    Some(Leaf::Symbol(c)) if c == symbol => {
                        let follow = attrs
                            .followpos(p)
                            .ok_or(ConstructionError::UnknownPosition(p))?;
                        next.extend(follow.iter().copied());
                    }
                    Some(_) => {}
                    None => return Err(ConstructionError::UnknownPosition(p)),
                }
            }
            Ok(next)
        },
        |positions| positions.contains(&end_marker),
        Subset::Positions,
    )?;

    debug!(
        "direct DFA: {} states from {} positions, {} transitions",
        dfa.states.len(),
        attrs.positions(),
        dfa.transition_count()
    );
    Ok(dfa)
}
