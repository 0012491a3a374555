//! Subset construction: DFA states are epsilon-closed sets of NFA states.

use log::debug;

use super::dfa::{explore_subsets, Dfa, Subset};
use super::nfa::Nfa;
use crate::ConstructionError;

pub fn build(nfa: &Nfa) -> Result<Dfa, ConstructionError> {
    let start = nfa.epsilon_closure([nfa.initial]);
    let dfa = explore_subsets(
        &nfa.alphabet,
        start,
        |states, symbol| Ok(nfa.epsilon_closure(nfa.move_on(states, symbol))),
        |states| states.iter().any(|s| nfa.terminals.contains(s)),
        Subset::States,
    )?;

    debug!(
        "subset DFA: {} states from {} NFA states, {} transitions",
        dfa.states.len(),
        nfa.states.len(),
        dfa.transition_count()
    );
    Ok(dfa)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::automaton::{Automaton, StateId};
    use crate::config::Config;
    use crate::regexp::SyntaxTree;

    fn nfa(regex: &str) -> Nfa {
        let tree = SyntaxTree::parse(&Config::default(), regex).unwrap();
        Nfa::from_tree(&tree).unwrap()
    }

    fn nfa_states(dfa: &Dfa, state: StateId) -> &BTreeSet<StateId> {
        match dfa.subset(state) {
            Some(Subset::States(states)) => states,
            other => panic!("expected NFA states, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_subset_is_closure_of_nfa_initial() {
        let nfa = nfa("a*b");
        let dfa = build(&nfa).unwrap();
        assert_eq!(
            nfa_states(&dfa, dfa.initial),
            &nfa.epsilon_closure([nfa.initial])
        );
    }

    #[test]
    fn test_subsets_are_epsilon_closed() {
        let nfa = nfa("(a|b)*abb");
        let dfa = build(&nfa).unwrap();
        for &state in dfa.states() {
            let subset = nfa_states(&dfa, state);
            assert_eq!(&nfa.epsilon_closure(subset.iter().copied()), subset);
        }
    }

    #[test]
    fn test_textbook_state_count() {
        // the classic Dragon book result before minimization
        let dfa = build(&nfa("(a|b)*abb")).unwrap();
        assert_eq!(dfa.states().len(), 5);
        assert_eq!(dfa.terminals().len(), 1);
        assert_eq!(dfa.transition_count(), 10);
    }

    #[test]
    fn test_terminal_iff_subset_holds_nfa_terminal() {
        let nfa = nfa("ab|a");
        let dfa = build(&nfa).unwrap();
        for &state in dfa.states() {
            let holds = nfa_states(&dfa, state)
                .iter()
                .any(|s| nfa.terminals().contains(s));
            assert_eq!(dfa.is_terminal(state), holds);
        }
    }

    #[test]
    fn test_dead_moves_are_absent() {
        let dfa = build(&nfa("ab")).unwrap();
        assert_eq!(dfa.step(dfa.initial, 'b'), None);
        assert_eq!(dfa.transition_count(), 2);
    }
}
