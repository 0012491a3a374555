//! Nondeterministic automata with epsilon moves.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::simulate::{run_nfa, Verdict};
use super::state::StateId;
use super::{Automaton, Edge, Label};
use crate::regexp::SyntaxTree;
use crate::ConstructionError;

/// An NFA. Transitions map `(state, label)` to a set of target states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) states: BTreeSet<StateId>,
    pub(crate) alphabet: BTreeSet<char>,
    pub(crate) transitions: FxHashMap<(StateId, Label), BTreeSet<StateId>>,
    pub(crate) initial: StateId,
    pub(crate) terminals: BTreeSet<StateId>,
}

impl Nfa {
    /// Build an NFA from a syntax tree with Thompson's construction.
    pub fn from_tree(tree: &SyntaxTree) -> Result<Self, ConstructionError> {
        super::thompson::build(tree)
    }

    pub(crate) fn empty(initial: StateId) -> Self {
        Self {
            states: BTreeSet::from([initial]),
            alphabet: BTreeSet::new(),
            transitions: FxHashMap::default(),
            initial,
            terminals: BTreeSet::new(),
        }
    }

    /// Add `from --label--> to`, creating the target set on first use.
    pub(crate) fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        self.transitions.entry((from, label)).or_default().insert(to);
    }

    /// Target states of `state` on `label`.
    #[inline]
    pub fn targets(&self, state: StateId, label: Label) -> Option<&BTreeSet<StateId>> {
        self.transitions.get(&(state, label))
    }

    /// Number of `(state, label, target)` triples.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(BTreeSet::len).sum()
    }

    /// States reachable from `states` through epsilon moves alone,
    /// `states` included.
    pub fn epsilon_closure<I>(&self, states: I) -> BTreeSet<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut closure = BTreeSet::new();
        let mut stack: SmallVec<[StateId; 16]> = SmallVec::new();
        for state in states {
            if closure.insert(state) {
                stack.push(state);
            }
        }

        while let Some(state) = stack.pop() {
            if let Some(targets) = self.targets(state, Label::Epsilon) {
                for &target in targets {
                    if closure.insert(target) {
                        stack.push(target);
                    }
                }
            }
        }
        closure
    }

    /// States reachable from any state of `states` on one `symbol` move.
    pub fn move_on(&self, states: &BTreeSet<StateId>, symbol: char) -> BTreeSet<StateId> {
        let mut out = BTreeSet::new();
        for &state in states {
            if let Some(targets) = self.targets(state, Label::Symbol(symbol)) {
                out.extend(targets.iter().copied());
            }
        }
        out
    }

    /// Check that every referenced state is declared and every symbol label
    /// belongs to the alphabet.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        self.check_state(self.initial)?;
        for &state in &self.terminals {
            self.check_state(state)?;
        }
        for (&(from, label), targets) in &self.transitions {
            self.check_state(from)?;
            for &to in targets {
                self.check_state(to)?;
            }
            if let Label::Symbol(symbol) = label {
                if !self.alphabet.contains(&symbol) {
                    return Err(ConstructionError::UnknownLabel { state: from, symbol });
                }
            }
        }
        Ok(())
    }

    fn check_state(&self, state: StateId) -> Result<(), ConstructionError> {
        if self.states.contains(&state) {
            Ok(())
        } else {
            Err(ConstructionError::DanglingState(state))
        }
    }
}

impl Automaton for Nfa {
    fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    fn initial(&self) -> StateId {
        self.initial
    }

    fn terminals(&self) -> &BTreeSet<StateId> {
        &self.terminals
    }

    fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .transitions
            .iter()
            .flat_map(|(&(from, label), targets)| {
                targets.iter().map(move |&to| Edge { from, label, to })
            })
            .collect();
        edges.sort();
        edges
    }

    fn run(&self, input: &str) -> Verdict {
        run_nfa(self, input)
    }
}
