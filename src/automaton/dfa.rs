//! Deterministic automata and the subset exploration shared by both DFA
//! constructions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::hash::Hash;

use log::trace;
use rustc_hash::FxHashMap;

use super::nfa::Nfa;
use super::simulate::{run_dfa, Verdict};
use super::state::{StateId, StateIds};
use super::{Automaton, Edge, Label};
use crate::regexp::{AttributedTree, PositionSet};
use crate::ConstructionError;

/// The set a DFA state was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subset {
    /// NFA states (subset construction).
    States(BTreeSet<StateId>),
    /// Tree positions (direct method).
    Positions(PositionSet),
}

/// A DFA. Transitions map `(state, symbol)` to exactly one state; a missing
/// entry is the dead state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) states: BTreeSet<StateId>,
    pub(crate) alphabet: BTreeSet<char>,
    pub(crate) transitions: FxHashMap<(StateId, char), StateId>,
    pub(crate) initial: StateId,
    pub(crate) terminals: BTreeSet<StateId>,
    pub(crate) subsets: BTreeMap<StateId, Subset>,
}

impl Dfa {
    /// Subset construction from an NFA.
    pub fn from_nfa(nfa: &Nfa) -> Result<Self, ConstructionError> {
        super::subset::build(nfa)
    }

    /// Direct construction from an attributed, augmented tree.
    pub fn from_attributed_tree(tree: &AttributedTree) -> Result<Self, ConstructionError> {
        super::direct::build(tree)
    }

    fn empty(initial: StateId, alphabet: BTreeSet<char>) -> Self {
        Self {
            states: BTreeSet::new(),
            alphabet,
            transitions: FxHashMap::default(),
            initial,
            terminals: BTreeSet::new(),
            subsets: BTreeMap::new(),
        }
    }

    /// Record `from --symbol--> to`. A second, different target for the same
    /// `(from, symbol)` is an error.
    pub(crate) fn insert_transition(
        &mut self,
        from: StateId,
        symbol: char,
        to: StateId,
    ) -> Result<(), ConstructionError> {
        match self.transitions.insert((from, symbol), to) {
            Some(previous) if previous != to => {
                Err(ConstructionError::NondeterministicEdge { state: from, symbol })
            }
            _ => Ok(()),
        }
    }

    /// The single successor of `state` on `symbol`, if any.
    #[inline]
    pub fn step(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// The NFA states or tree positions behind a DFA state.
    #[inline]
    pub fn subset(&self, state: StateId) -> Option<&Subset> {
        self.subsets.get(&state)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        let check = |state: StateId| {
            if self.states.contains(&state) {
                Ok(())
            } else {
                Err(ConstructionError::DanglingState(state))
            }
        };
        check(self.initial)?;
        for &state in &self.terminals {
            check(state)?;
        }
        for (&(from, symbol), &to) in &self.transitions {
            check(from)?;
            check(to)?;
            if !self.alphabet.contains(&symbol) {
                return Err(ConstructionError::UnknownLabel { state: from, symbol });
            }
        }
        Ok(())
    }
}

impl Automaton for Dfa {
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
            .map(|(&(from, symbol), &to)| Edge {
                from,
                label: Label::Symbol(symbol),
                to,
            })
            .collect();
        edges.sort();
        edges
    }

    fn run(&self, input: &str) -> Verdict {
        run_dfa(self, input)
    }
}

/// Worklist exploration of subsets reachable from `start`.
///
/// Each distinct subset gets one fresh DFA state on first sight, memoized by
/// value. `step` computes the successor subset for a symbol; an empty
/// successor means no transition. Explores in discovery order.
pub(crate) fn explore_subsets<T, S, F, W>(
    alphabet: &BTreeSet<char>,
    start: BTreeSet<T>,
    mut step: S,
    is_terminal: F,
    wrap: W,
) -> Result<Dfa, ConstructionError>
where
    T: Ord + Hash + Clone,
    S: FnMut(&BTreeSet<T>, char) -> Result<BTreeSet<T>, ConstructionError>,
    F: Fn(&BTreeSet<T>) -> bool,
    W: Fn(BTreeSet<T>) -> Subset,
{
    let mut ids = StateIds::new();
    let mut known: FxHashMap<BTreeSet<T>, StateId> = FxHashMap::default();
    let mut unmarked: VecDeque<BTreeSet<T>> = VecDeque::new();

    let initial = ids.fresh();
    known.insert(start.clone(), initial);
    unmarked.push_back(start);
    let mut dfa = Dfa::empty(initial, alphabet.clone());

    while let Some(subset) = unmarked.pop_front() {
        let from = *known.get(&subset).ok_or(ConstructionError::MissingSubset)?;

        for &symbol in alphabet {
            let next = step(&subset, symbol)?;
            if next.is_empty() {
                continue;
            }
            let to = match known.get(&next) {
                Some(&state) => state,
                None => {
                    let state = ids.fresh();
                    trace!("new subset for {} on {:?}", state, symbol);
                    known.insert(next.clone(), state);
                    unmarked.push_back(next);
                    state
                }
            };
            dfa.insert_transition(from, symbol, to)?;
        }

        dfa.states.insert(from);
        if is_terminal(&subset) {
            dfa.terminals.insert(from);
        }
        dfa.subsets.insert(from, wrap(subset));
    }

    dfa.validate()?;
    Ok(dfa)
}
