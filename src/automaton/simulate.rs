//! Running input strings through an automaton.

use std::fmt;
use std::time::Duration;

use super::dfa::Dfa;
use super::nfa::Nfa;

/// Outcome of running one input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// All input consumed, ending in a terminal state.
    Accepted,
    /// All input consumed, ending in a non-terminal state.
    Rejected,
    /// The symbol at `index` had no transition; the rest was not read.
    Stuck { index: usize },
    /// The symbol at `index` is not in the automaton's alphabet.
    UnknownSymbol { symbol: char, index: usize },
}

impl Verdict {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }

    /// True for `Rejected` and `Stuck`, the two ordinary rejections.
    #[inline]
    pub fn is_rejected(self) -> bool {
        matches!(self, Verdict::Rejected | Verdict::Stuck { .. })
    }

    #[inline]
    pub fn is_symbol_error(self) -> bool {
        matches!(self, Verdict::UnknownSymbol { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected => write!(f, "rejected"),
            Verdict::Stuck { index } => write!(f, "rejected: no transition at {}", index),
            Verdict::UnknownSymbol { symbol, index } => {
                write!(f, "symbol {:?} at {} is not recognized", symbol, index)
            }
        }
    }
}

/// A verdict and how long the run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Simulation {
    pub verdict: Verdict,
    pub elapsed: Duration,
}

pub(crate) fn run_nfa(nfa: &Nfa, input: &str) -> Verdict {
    let mut current = nfa.epsilon_closure([nfa.initial]);

    for (index, symbol) in input.chars().enumerate() {
        if !nfa.alphabet.contains(&symbol) {
            return Verdict::UnknownSymbol { symbol, index };
        }
        current = nfa.epsilon_closure(nfa.move_on(&current, symbol));
        if current.is_empty() {
            return Verdict::Stuck { index };
        }
    }

    if current.iter().any(|state| nfa.terminals.contains(state)) {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    }
}

pub(crate) fn run_dfa(dfa: &Dfa, input: &str) -> Verdict {
    let mut state = dfa.initial;

    for (index, symbol) in input.chars().enumerate() {
        if !dfa.alphabet.contains(&symbol) {
            return Verdict::UnknownSymbol { symbol, index };
        }
        match dfa.step(state, symbol) {
            Some(next) => state = next,
            None => return Verdict::Stuck { index },
        }
    }

    if dfa.terminals.contains(&state) {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    }
}
