//! State identifiers and their allocator.

use std::fmt;

/// A state identifier - just an index handed out by [`StateIds`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Monotonic allocator for fresh state identifiers.
///
/// One allocator serves a whole construction, so every state it hands out
/// is distinct from every other state of that construction.
#[derive(Debug, Default)]
pub struct StateIds {
    next: u32,
}

impl StateIds {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn fresh(&mut self) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far.
    #[inline]
    pub fn issued(&self) -> usize {
        self.next as usize
    }
}
