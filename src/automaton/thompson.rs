//! Thompson's construction: one NFA fragment per syntax tree node.
//!
//! Fragments are combined on a stack while walking the tree in postorder.
//! Every fragment has exactly one terminal state, and no transition leaves
//! it or enters its initial state.
//!
//! ```text
//! SYMBOL(a)   i --a--> t
//! CONCAT(A,B) A.i ... m ... B.t        (A.t and B.i merged into m)
//! UNION(A,B)  i -ε-> A.i, B.i;  A.t, B.t -ε-> t
//! STAR(A)     i -ε-> t, A.i;    A.t -ε-> t, A.i
//! PLUS(A)     CONCAT(A, STAR(A renamed))
//! ```
//!
//! Combining never rebuilds a fragment. A fragment remembers the edges
//! entering its terminal and the labels leaving its initial state, so a
//! merge rewrites only those, and the smaller transition table is moved
//! into the larger one.

use std::collections::BTreeSet;

use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use super::nfa::Nfa;
use super::state::{StateId, StateIds};
use super::Label;
use crate::regexp::{Leaf, Node, SyntaxTree};
use crate::ConstructionError;

/// Build an NFA from a (non-augmented) syntax tree.
pub fn build(tree: &SyntaxTree) -> Result<Nfa, ConstructionError> {
    let mut builder = Thompson::default();
    let mut fragments: Vec<Fragment> = Vec::new();

    for id in tree.postorder() {
        let fragment = match tree.node(id) {
            Node::Leaf(Leaf::Symbol(c)) => builder.symbol(Label::Symbol(c)),
            Node::Leaf(Leaf::Epsilon) => builder.symbol(Label::Epsilon),
            Node::Leaf(Leaf::EndMarker) => return Err(ConstructionError::UnexpectedEndMarker),
            Node::Union(..) => {
                let b = pop(&mut fragments)?;
                let a = pop(&mut fragments)?;
                builder.union(a, b)
            }
            Node::Concat(..) => {
                let b = pop(&mut fragments)?;
                let a = pop(&mut fragments)?;
                builder.concat(a, b)
            }
            Node::Star(_) => {
                let a = pop(&mut fragments)?;
                builder.star(a)
            }
            Node::Plus(_) => {
                let a = pop(&mut fragments)?;
                let copy = builder.renamed(&a);
                let repeat = builder.star(copy);
                builder.concat(a, repeat)
            }
        };
        fragments.push(fragment);
    }

    let nfa = pop(&mut fragments)?.nfa;
    if !fragments.is_empty() {
        return Err(ConstructionError::DanglingFragments(fragments.len()));
    }
    nfa.validate()?;

    debug!(
        "thompson NFA: {} states, {} transitions, alphabet {:?}",
        nfa.states.len(),
        nfa.transition_count(),
        nfa.alphabet
    );
    Ok(nfa)
}

fn pop(fragments: &mut Vec<Fragment>) -> Result<Fragment, ConstructionError> {
    fragments.pop().ok_or(ConstructionError::MissingFragment)
}

/// A partial NFA with a single terminal state.
#[derive(Debug)]
struct Fragment {
    nfa: Nfa,
    terminal: StateId,
    /// `(source, label)` keys whose targets include `terminal`.
    entering: SmallVec<[(StateId, Label); 2]>,
    /// Labels of the transitions leaving the initial state.
    leaving: SmallVec<[Label; 2]>,
}

impl Fragment {
    #[inline]
    fn initial(&self) -> StateId {
        self.nfa.initial
    }

    fn finish(mut self) -> Self {
        self.nfa.terminals = BTreeSet::from([self.terminal]);
        self
    }
}

/// Fragment combinators sharing one state allocator.
#[derive(Default)]
struct Thompson {
    ids: StateIds,
}

impl Thompson {
    fn symbol(&mut self, label: Label) -> Fragment {
        let i = self.ids.fresh();
        let t = self.ids.fresh();
        let mut nfa = Nfa::empty(i);
        nfa.states.insert(t);
        if let Label::Symbol(c) = label {
            nfa.alphabet.insert(c);
        }
        nfa.add_transition(i, label, t);
        trace!("SYMBOL {} -{}-> {}", i, label, t);
        Fragment {
            nfa,
            terminal: t,
            entering: smallvec![(i, label)],
            leaving: smallvec![label],
        }
        .finish()
    }

    fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let merged = self.ids.fresh();
        let (a_initial, a_terminal, a_leaving) = (a.initial(), a.terminal, a.leaving);
        let (b_initial, b_terminal) = (b.initial(), b.terminal);

        // A's terminal has no outgoing edges: retarget the edges entering it
        let mut a_nfa = a.nfa;
        for key in &a.entering {
            if let Some(targets) = a_nfa.transitions.get_mut(key) {
                targets.remove(&a_terminal);
                targets.insert(merged);
            }
        }
        a_nfa.states.remove(&a_terminal);

        // B's initial has no incoming edges: move the edges leaving it
        let mut b_nfa = b.nfa;
        for &label in &b.leaving {
            if let Some(targets) = b_nfa.transitions.remove(&(b_initial, label)) {
                b_nfa.transitions.insert((merged, label), targets);
            }
        }
        b_nfa.states.remove(&b_initial);
        let entering = b
            .entering
            .into_iter()
            .map(|(from, label)| (if from == b_initial { merged } else { from }, label))
            .collect();

        let mut nfa = merge(a_nfa, b_nfa);
        nfa.states.insert(merged);
        nfa.initial = a_initial;

        trace!("CONCAT {} .. {} .. {}", a_initial, merged, b_terminal);
        Fragment {
            nfa,
            terminal: b_terminal,
            entering,
            leaving: a_leaving,
        }
        .finish()
    }

    fn union(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let i = self.ids.fresh();
        let t = self.ids.fresh();
        let (a_initial, a_terminal) = (a.initial(), a.terminal);
        let (b_initial, b_terminal) = (b.initial(), b.terminal);

        let mut nfa = merge(a.nfa, b.nfa);
        nfa.states.extend([i, t]);
        nfa.initial = i;
        nfa.add_transition(i, Label::Epsilon, a_initial);
        nfa.add_transition(i, Label::Epsilon, b_initial);
        nfa.add_transition(a_terminal, Label::Epsilon, t);
        nfa.add_transition(b_terminal, Label::Epsilon, t);

        trace!("UNION {} .. {}", i, t);
        Fragment {
            nfa,
            terminal: t,
            entering: smallvec![(a_terminal, Label::Epsilon), (b_terminal, Label::Epsilon)],
            leaving: smallvec![Label::Epsilon],
        }
        .finish()
    }

    /// Kleene star, built on `a` in place.
    fn star(&mut self, a: Fragment) -> Fragment {
        let i = self.ids.fresh();
        let t = self.ids.fresh();
        let (a_initial, a_terminal) = (a.initial(), a.terminal);

        let mut nfa = a.nfa;
        nfa.states.extend([i, t]);
        nfa.initial = i;
        nfa.add_transition(i, Label::Epsilon, t);
        nfa.add_transition(i, Label::Epsilon, a_initial);
        nfa.add_transition(a_terminal, Label::Epsilon, t);
        nfa.add_transition(a_terminal, Label::Epsilon, a_initial);

        trace!("KLEENE {} .. {}", i, t);
        Fragment {
            nfa,
            terminal: t,
            entering: smallvec![(i, Label::Epsilon), (a_terminal, Label::Epsilon)],
            leaving: smallvec![Label::Epsilon],
        }
        .finish()
    }

    /// A copy of `fragment` in which every state is replaced by a fresh one,
    /// so it shares nothing with the original.
    fn renamed(&mut self, fragment: &Fragment) -> Fragment {
        let renames: FxHashMap<StateId, StateId> = fragment
            .nfa
            .states
            .iter()
            .map(|&s| (s, self.ids.fresh()))
            .collect();
        let map = |s: StateId| renames.get(&s).copied().unwrap_or(s);

        let source = &fragment.nfa;
        let mut nfa = Nfa::empty(map(source.initial));
        nfa.states = source.states.iter().map(|&s| map(s)).collect();
        nfa.alphabet = source.alphabet.clone();
        for (&(from, label), targets) in &source.transitions {
            nfa.transitions
                .insert((map(from), label), targets.iter().map(|&s| map(s)).collect());
        }

        trace!("renamed fragment {} -> {}", source.initial, nfa.initial);
        Fragment {
            nfa,
            terminal: map(fragment.terminal),
            entering: fragment
                .entering
                .iter()
                .map(|&(from, label)| (map(from), label))
                .collect(),
            leaving: fragment.leaving.clone(),
        }
        .finish()
    }
}

/// Union of two NFAs with disjoint states, moving the smaller transition
/// table into the larger. Initial and terminal states are left to the
/// caller.
fn merge(a: Nfa, b: Nfa) -> Nfa {
    let (mut large, small) = if a.transitions.len() >= b.transitions.len() {
        (a, b)
    } else {
        (b, a)
    };
    large.states.extend(small.states);
    large.alphabet.extend(small.alphabet);
    for (key, targets) in small.transitions {
        large.transitions.entry(key).or_default().extend(targets);
    }
    large
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::automaton::Automaton;
    use crate::config::Config;

    fn nfa(regex: &str) -> Nfa {
        let tree = SyntaxTree::parse(&Config::default(), regex).unwrap();
        build(&tree).unwrap()
    }

    fn epsilon_edges(nfa: &Nfa) -> usize {
        nfa.edges()
            .iter()
            .filter(|e| e.label == Label::Epsilon)
            .count()
    }

    #[test]
    fn test_symbol_fragment() {
        let nfa = nfa("a");
        assert_eq!(nfa.states.len(), 2);
        assert_eq!(nfa.terminals.len(), 1);
        assert_eq!(nfa.transition_count(), 1);
        let t = *nfa.terminals.iter().next().unwrap();
        assert_eq!(
            nfa.targets(nfa.initial, Label::Symbol('a')),
            Some(&BTreeSet::from([t]))
        );
    }

    #[test]
    fn test_concat_merges_middle_states() {
        // a: 2 states, b: 2 states, merged middle replaces two of them
        let nfa = nfa("ab");
        assert_eq!(nfa.states.len(), 3);
        assert_eq!(nfa.transition_count(), 2);
        assert_eq!(epsilon_edges(&nfa), 0);

        let middle = nfa.move_on(&BTreeSet::from([nfa.initial]), 'a');
        assert_eq!(middle.len(), 1);
        let end = nfa.move_on(&middle, 'b');
        assert_eq!(&end, nfa.terminals());
    }

    #[test]
    fn test_union_shape() {
        let nfa = nfa("a|b");
        assert_eq!(nfa.states.len(), 6);
        assert_eq!(epsilon_edges(&nfa), 4);
        assert_eq!(nfa.terminals.len(), 1);
    }

    #[test]
    fn test_star_shape() {
        let nfa = nfa("a*");
        assert_eq!(nfa.states.len(), 4);
        // i->t, i->a.i, a.t->t, a.t->a.i
        assert_eq!(epsilon_edges(&nfa), 4);
        assert!(nfa.accepts(""));
        assert!(nfa.accepts("aaa"));
    }

    #[test]
    fn test_plus_copies_operand() {
        let nfa = nfa("a+");
        // a (2) + renamed star of a (4) - 2 merged + 1 middle
        assert_eq!(nfa.states.len(), 5);
        let a_edges = nfa
            .edges()
            .into_iter()
            .filter(|e| e.label == Label::Symbol('a'))
            .count();
        assert_eq!(a_edges, 2);
        assert!(!nfa.accepts(""));
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("aaaa"));
    }

    #[test]
    fn test_optional_accepts_empty() {
        let nfa = nfa("ab?");
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("ab"));
        assert!(!nfa.accepts("abb"));
    }

    #[test]
    fn test_epsilon_symbol_excluded_from_alphabet() {
        let nfa = nfa("a|ε");
        assert_eq!(nfa.alphabet, BTreeSet::from(['a']));
        assert!(nfa.accepts(""));
    }

    #[test]
    fn test_original_sample() {
        let nfa = nfa("(aa|b)+");
        for s in ["aa", "b", "aab", "baab", "bbbaa"] {
            assert!(nfa.accepts(s), "should accept {:?}", s);
        }
        for s in ["", "a", "aaa", "ba"] {
            assert!(!nfa.accepts(s), "should reject {:?}", s);
        }
    }

    #[test]
    fn test_long_literal_builds_in_linear_time() {
        let regex = "ab".repeat(20_000);
        let tree = SyntaxTree::parse(&Config::default(), &regex).unwrap();

        let start = Instant::now();
        let nfa = build(&tree).unwrap();
        let elapsed = start.elapsed();

        // one state per symbol plus the initial state, no epsilon moves
        assert_eq!(nfa.states.len(), regex.len() + 1);
        assert_eq!(nfa.transition_count(), regex.len());
        assert_eq!(epsilon_edges(&nfa), 0);
        assert!(nfa.accepts(&regex));
        assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
    }

    #[test]
    fn test_long_star_chain_builds_in_linear_time() {
        let regex = "a*".repeat(20_000);
        let tree = SyntaxTree::parse(&Config::default(), &regex).unwrap();

        let start = Instant::now();
        let nfa = build(&tree).unwrap();
        let elapsed = start.elapsed();

        // each star: 4 states, the concatenations merge 19_999 pairs
        assert_eq!(nfa.states.len(), 4 * 20_000 - 19_999);
        assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
    }

    #[test]
    fn test_concat_rewrites_only_merged_edges() {
        // (a|b) then c: the union's two exits must now lead to the middle state
        let nfa = nfa("(a|b)c");
        let start = BTreeSet::from([nfa.initial]);
        let after_a = nfa.epsilon_closure(nfa.move_on(&nfa.epsilon_closure(start.clone()), 'a'));
        let after_b = nfa.epsilon_closure(nfa.move_on(&nfa.epsilon_closure(start), 'b'));
        assert_eq!(after_a.intersection(&after_b).count(), 1);
        assert!(nfa.accepts("ac"));
        assert!(nfa.accepts("bc"));
        assert!(!nfa.accepts("c"));
        // 6 union states + 2 for c - 2 merged + 1 middle
        assert_eq!(nfa.states.len(), 7);
    }

    #[test]
    fn test_rejects_augmented_tree() {
        let tree = SyntaxTree::parse_augmented(&Config::default(), "a").unwrap();
        assert_eq!(build(&tree), Err(ConstructionError::UnexpectedEndMarker));
    }
}
