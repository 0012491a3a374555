//! Position, nullable, firstpos, lastpos and followpos for the direct method.
//!
//! Computed in one postorder pass over an augmented tree. Every leaf,
//! including `ε` and the end marker, gets a position in visitation order;
//! `ε` positions are nullable and no transition ever consumes them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::trace;

use super::tree::{Leaf, Node, NodeId, SyntaxTree};
use crate::ConstructionError;

/// A 1-based leaf position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position(u32);

impl Position {
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type PositionSet = BTreeSet<Position>;

/// Hands out increasing positions.
struct PositionCounter(u32);

impl PositionCounter {
    fn next(&mut self) -> Position {
        self.0 += 1;
        Position(self.0)
    }
}

/// Per-node and per-position attributes of one tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attributes {
    position: Vec<Option<Position>>,
    nullable: Vec<bool>,
    firstpos: Vec<PositionSet>,
    lastpos: Vec<PositionSet>,
    followpos: BTreeMap<Position, PositionSet>,
    /// Leaf at each position, indexed by `position - 1`.
    leaves: Vec<Leaf>,
    end_marker: Position,
}

impl Attributes {
    /// Compute attributes for an augmented tree.
    ///
    /// Fails if the tree still holds a `+` node or has no end marker.
    pub fn compute(tree: &SyntaxTree) -> Result<Self, ConstructionError> {
        let n = tree.len();
        let order = tree.postorder();
        let mut counter = PositionCounter(0);
        let mut end_marker = None;
        let mut attrs = Attributes {
            position: vec![None; n],
            nullable: vec![false; n],
            firstpos: vec![PositionSet::new(); n],
            lastpos: vec![PositionSet::new(); n],
            followpos: BTreeMap::new(),
            leaves: Vec::new(),
            end_marker: Position(0),
        };

        for &id in &order {
            let i = id.index();
            match tree.node(id) {
                Node::Leaf(leaf) => {
                    let p = counter.next();
                    attrs.position[i] = Some(p);
                    attrs.nullable[i] = leaf == Leaf::Epsilon;
                    attrs.firstpos[i] = PositionSet::from([p]);
                    attrs.lastpos[i] = PositionSet::from([p]);
                    attrs.leaves.push(leaf);
                    attrs.followpos.insert(p, PositionSet::new());
                    if leaf == Leaf::EndMarker {
                        end_marker = Some(p);
                    }
                }
                Node::Union(l, r) => {
                    attrs.nullable[i] = attrs.nullable[l.index()] || attrs.nullable[r.index()];
                    attrs.firstpos[i] = attrs.joined(&attrs.firstpos, l, r);
                    attrs.lastpos[i] = attrs.joined(&attrs.lastpos, l, r);
                }
                Node::Concat(l, r) => {
                    let (left_nullable, right_nullable) =
                        (attrs.nullable[l.index()], attrs.nullable[r.index()]);
                    attrs.nullable[i] = left_nullable && right_nullable;
                    attrs.firstpos[i] = if left_nullable {
                        attrs.joined(&attrs.firstpos, l, r)
                    } else {
                        attrs.firstpos[l.index()].clone()
                    };
                    attrs.lastpos[i] = if right_nullable {
                        attrs.joined(&attrs.lastpos, l, r)
                    } else {
                        attrs.lastpos[r.index()].clone()
                    };
                }
                Node::Star(c) => {
                    attrs.nullable[i] = true;
                    attrs.firstpos[i] = attrs.firstpos[c.index()].clone();
                    attrs.lastpos[i] = attrs.lastpos[c.index()].clone();
                }
                Node::Plus(_) => return Err(ConstructionError::UnexpandedPlus),
            }
        }

        for &id in &order {
            let (sources, targets) = match tree.node(id) {
                Node::Concat(l, r) => (
                    attrs.lastpos[l.index()].clone(),
                    attrs.firstpos[r.index()].clone(),
                ),
                Node::Star(_) => (
                    attrs.lastpos[id.index()].clone(),
                    attrs.firstpos[id.index()].clone(),
                ),
                _ => continue,
            };
            attrs.follow(&sources, &targets)?;
        }

        attrs.end_marker = end_marker.ok_or(ConstructionError::MissingEndMarker)?;
        trace!("followpos: {:?}", attrs.followpos);
        Ok(attrs)
    }

    fn joined(&self, sets: &[PositionSet], l: NodeId, r: NodeId) -> PositionSet {
        sets[l.index()].union(&sets[r.index()]).copied().collect()
    }

    fn follow(
        &mut self,
        sources: &PositionSet,
        targets: &PositionSet,
    ) -> Result<(), ConstructionError> {
        for p in sources {
            self.followpos
                .get_mut(p)
                .ok_or(ConstructionError::UnknownPosition(*p))?
                .extend(targets.iter().copied());
        }
        Ok(())
    }

    /// Position of a leaf node; `None` for operator nodes.
    #[inline]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.position[id.index()]
    }

    #[inline]
    pub fn nullable(&self, id: NodeId) -> bool {
        self.nullable[id.index()]
    }

    #[inline]
    pub fn firstpos(&self, id: NodeId) -> &PositionSet {
        &self.firstpos[id.index()]
    }

    #[inline]
    pub fn lastpos(&self, id: NodeId) -> &PositionSet {
        &self.lastpos[id.index()]
    }

    #[inline]
    pub fn followpos(&self, p: Position) -> Option<&PositionSet> {
        self.followpos.get(&p)
    }

    /// The leaf found at position `p`.
    #[inline]
    pub fn leaf_at(&self, p: Position) -> Option<Leaf> {
        (p.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.leaves.get(i))
            .copied()
    }

    #[inline]
    pub fn end_marker(&self) -> Position {
        self.end_marker
    }

    /// Number of positions handed out.
    #[inline]
    pub fn positions(&self) -> usize {
        self.leaves.len()
    }
}

/// An augmented syntax tree together with its attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributedTree {
    tree: SyntaxTree,
    attributes: Attributes,
}

impl AttributedTree {
    pub fn new(tree: SyntaxTree) -> Result<Self, ConstructionError> {
        let attributes = Attributes::compute(&tree)?;
        Ok(Self { tree, attributes })
    }

    #[inline]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
