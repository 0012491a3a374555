//! Finite automata built from syntax trees.
//!
//! Three constructions produce automata from a parsed expression:
//!
//! - `thompson`: NFA with epsilon moves, one fragment per tree node
//! - `subset`: DFA whose states are epsilon-closed sets of NFA states
//! - `direct`: DFA whose states are sets of tree positions (followpos)
//!
//! # Module Organization
//!
//! - `state`: State identifiers and the per-construction allocator
//! - `nfa`, `dfa`: The automaton types and their validation
//! - `simulate`: Running an input string to a [`Verdict`]
//!
//! Every automaton implements [`Automaton`], which carries the read-only
//! view used by the simulator and by visualization (sorted edges and
//! `q0..` relabeling).

mod dfa;
mod direct;
mod nfa;
mod simulate;
mod state;
mod subset;
mod thompson;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::time::Instant;

pub use dfa::{Dfa, Subset};
pub use nfa::Nfa;
pub use simulate::{Simulation, Verdict};
pub use state::{StateId, StateIds};

/// A transition label: a symbol of the alphabet or an epsilon move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Label {
    Epsilon,
    Symbol(char),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "{}", crate::regexp::EPSILON),
            Label::Symbol(c) => write!(f, "{}", c),
        }
    }
}

/// One transition `from --label--> to`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Edge {
    pub from: StateId,
    pub label: Label,
    pub to: StateId,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -{}-> {}", self.from, self.label, self.to)
    }
}

/// Read-only view shared by NFAs and DFAs.
pub trait Automaton {
    fn states(&self) -> &BTreeSet<StateId>;

    /// Input symbols, excluding epsilon.
    fn alphabet(&self) -> &BTreeSet<char>;

    fn initial(&self) -> StateId;

    fn terminals(&self) -> &BTreeSet<StateId>;

    /// Every transition, sorted by source, label, then target.
    fn edges(&self) -> Vec<Edge>;

    /// Run `input` to completion or to the first failure.
    fn run(&self, input: &str) -> Verdict;

    /// [`run`](Automaton::run), timed.
    fn simulate(&self, input: &str) -> Simulation {
        let start = Instant::now();
        let verdict = self.run(input);
        Simulation {
            verdict,
            elapsed: start.elapsed(),
        }
    }

    fn accepts(&self, input: &str) -> bool {
        self.run(input).is_accepted()
    }

    fn is_terminal(&self, state: StateId) -> bool {
        self.terminals().contains(&state)
    }

    /// Display names `q0, q1, ..` in breadth-first order from the initial
    /// state. Unreachable states are numbered after the reachable ones.
    fn relabel(&self) -> BTreeMap<StateId, String> {
        let mut successors: BTreeMap<StateId, Vec<StateId>> = BTreeMap::new();
        for edge in self.edges() {
            successors.entry(edge.from).or_default().push(edge.to);
        }

        let mut names = BTreeMap::new();
        let mut queue = VecDeque::from([self.initial()]);
        let mut next = 0usize;
        let mut name = |names: &mut BTreeMap<StateId, String>, state: StateId| {
            if names.contains_key(&state) {
                return false;
            }
            names.insert(state, format!("q{}", next));
            next += 1;
            true
        };

        name(&mut names, self.initial());
        while let Some(state) = queue.pop_front() {
            for &to in successors.get(&state).into_iter().flatten() {
                if name(&mut names, to) {
                    queue.push_back(to);
                }
            }
        }
        for &state in self.states() {
            name(&mut names, state);
        }
        names
    }
}

#[cfg(test)]
mod tests;
