//! regfa: Regular expressions to finite automata
//!
//! Parses a regular expression over single-character symbols and builds
//! three equivalent automata from it: a Thompson NFA, a DFA by subset
//! construction, and a DFA by the direct (followpos) method.
//!
//! ```
//! use regfa::automaton::{Automaton, Verdict};
//! use regfa::{compile, Config};
//!
//! let compiled = compile(&Config::default(), "(a|b)*abb").unwrap();
//! assert!(compiled.nfa.accepts("ababb"));
//! assert!(compiled.subset_dfa.accepts("abb"));
//! assert_eq!(compiled.direct_dfa.run("ab"), Verdict::Rejected);
//! ```
//!
//! Operators are `|` (union), `^` (concatenation, inserted implicitly),
//! `*`, `?` and `+`. `ε` denotes the empty string and a space is an
//! ordinary symbol.

pub mod automaton;
pub mod config;
pub mod regexp;

use log::debug;
use thiserror::Error;

use automaton::{Dfa, Nfa, StateId};
use regexp::{AttributedTree, Position, SyntaxError, SyntaxTree};

pub use config::{Config, ConfigError, Operator, Operators};

/// Broken invariants found while building or checking an automaton.
///
/// A well-formed tree never produces these; they indicate a tree or
/// automaton assembled by hand, or a bug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("subset has no assigned state")]
    MissingSubset,
    #[error("position {0} has no followpos entry")]
    UnknownPosition(Position),
    #[error("state {0} is referenced but not declared")]
    DanglingState(StateId),
    #[error("state {state} has more than one move on {symbol:?}")]
    NondeterministicEdge { state: StateId, symbol: char },
    #[error("state {state} moves on {symbol:?}, which is outside the alphabet")]
    UnknownLabel { state: StateId, symbol: char },
    #[error("`+` node must be expanded before computing attributes")]
    UnexpandedPlus,
    #[error("tree has no end marker")]
    MissingEndMarker,
    #[error("end marker in a tree meant for Thompson's construction")]
    UnexpectedEndMarker,
    #[error("operator node is missing an operand fragment")]
    MissingFragment,
    #[error("{0} fragments left after construction")]
    DanglingFragments(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Everything built from one expression.
#[derive(Clone, Debug)]
pub struct Compiled {
    /// Plain tree, input to Thompson's construction.
    pub tree: SyntaxTree,
    /// Augmented tree with its attributes, input to the direct method.
    pub attributed: AttributedTree,
    pub nfa: Nfa,
    pub subset_dfa: Dfa,
    pub direct_dfa: Dfa,
}

/// Parse `regex` and run all three constructions.
pub fn compile(config: &Config, regex: &str) -> Result<Compiled, Error> {
    let tree = SyntaxTree::parse(config, regex)?;
    let nfa = Nfa::from_tree(&tree)?;
    let subset_dfa = Dfa::from_nfa(&nfa)?;

    let attributed = AttributedTree::new(SyntaxTree::parse_augmented(config, regex)?)?;
    let direct_dfa = Dfa::from_attributed_tree(&attributed)?;

    debug!("compiled {:?}", regex);
    Ok(Compiled {
        tree,
        attributed,
        nfa,
        subset_dfa,
        direct_dfa,
    })
}
