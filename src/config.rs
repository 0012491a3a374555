//! Operator table and pipeline configuration.
//!
//! The operator set is fixed (`|`, `^`, `*`, `?`, `+`); only the precedence
//! assigned to each operator is configurable. Concatenation (`^`) is inserted
//! by the preprocessor and never needs to be typed.

use std::fmt;

use thiserror::Error;

/// Default limit on parenthesis nesting depth.
pub const DEFAULT_MAX_NESTING: usize = 256;

/// A regex operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Union,
    Concat,
    Star,
    Optional,
    Plus,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Union,
        Operator::Concat,
        Operator::Star,
        Operator::Optional,
        Operator::Plus,
    ];

    /// Map a regex character to its operator, if it is one.
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '|' => Some(Operator::Union),
            '^' => Some(Operator::Concat),
            '*' => Some(Operator::Star),
            '?' => Some(Operator::Optional),
            '+' => Some(Operator::Plus),
            _ => None,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Operator::Union => '|',
            Operator::Concat => '^',
            Operator::Star => '*',
            Operator::Optional => '?',
            Operator::Plus => '+',
        }
    }

    /// Unary operators apply to the single operand before them.
    #[inline]
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Star | Operator::Optional | Operator::Plus)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Error type for operator table construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` is not a recognized operator")]
    UnknownOperator(char),
    #[error("no precedence given for operator `{0}`")]
    MissingOperator(Operator),
}

/// Precedence for every operator. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operators {
    precedence: [u8; 5],
}

impl Default for Operators {
    fn default() -> Self {
        Self {
            // | ^ * ? +
            precedence: [1, 2, 3, 3, 3],
        }
    }
}

impl Operators {
    /// Build a table from `(operator char, precedence)` pairs.
    ///
    /// Every operator must be given exactly once; later pairs for the same
    /// operator overwrite earlier ones.
    pub fn from_chars<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (char, u8)>,
    {
        let mut precedence = [None; 5];
        for (c, p) in pairs {
            let op = Operator::from_char(c).ok_or(ConfigError::UnknownOperator(c))?;
            precedence[op as usize] = Some(p);
        }

        let mut table = [0; 5];
        for op in Operator::ALL {
            table[op as usize] = precedence[op as usize].ok_or(ConfigError::MissingOperator(op))?;
        }
        Ok(Self { precedence: table })
    }

    #[inline]
    pub fn precedence(&self, op: Operator) -> u8 {
        self.precedence[op as usize]
    }
}

/// Settings shared by every stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub operators: Operators,
    /// Maximum depth of nested parentheses accepted by the parser.
    pub max_nesting: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operators: Operators::default(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operators(mut self, operators: Operators) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}
