//! Arena syntax tree built from postfix tokens.
//!
//! Nodes live in a `Vec` and refer to their children by `NodeId`, so a tree
//! of any depth is built, walked and dropped without recursion. Children are
//! always allocated before their parent.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;

use super::error::SyntaxError;
use super::postfix::to_postfix;
use super::preprocess::{explicit_concat, Token, TokenKind, EPSILON};
use crate::config::{Config, Operator};

/// Printed form of the end-marker leaf.
pub const END_MARKER: char = '#';

/// Index of a node in its tree's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Leaf {
    Symbol(char),
    Epsilon,
    /// Appended to augmented trees; its position marks acceptance.
    EndMarker,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Node {
    Leaf(Leaf),
    Union(NodeId, NodeId),
    Concat(NodeId, NodeId),
    Star(NodeId),
    /// Only present in trees built with `TreeMode::Thompson`.
    Plus(NodeId),
}

impl Node {
    fn as_char(&self) -> char {
        match *self {
            Node::Leaf(Leaf::Symbol(c)) => c,
            Node::Leaf(Leaf::Epsilon) => EPSILON,
            Node::Leaf(Leaf::EndMarker) => END_MARKER,
            Node::Union(..) => '|',
            Node::Concat(..) => '^',
            Node::Star(_) => '*',
            Node::Plus(_) => '+',
        }
    }
}

/// How `+` is represented and whether the end marker is appended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TreeMode {
    /// Keep `+` as a node; the Thompson builder expands it.
    Thompson,
    /// Rewrite `x+` as `concat(x, star(copy(x)))` and append the end marker.
    Direct,
}

/// A regex syntax tree. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    alphabet: BTreeSet<char>,
}

impl SyntaxTree {
    /// Parse a regex into a tree for Thompson's construction.
    pub fn parse(config: &Config, regex: &str) -> Result<Self, SyntaxError> {
        Self::parse_with_mode(config, regex, TreeMode::Thompson)
    }

    /// Parse a regex into an augmented tree for the direct method.
    pub fn parse_augmented(config: &Config, regex: &str) -> Result<Self, SyntaxError> {
        Self::parse_with_mode(config, regex, TreeMode::Direct)
    }

    pub fn parse_with_mode(
        config: &Config,
        regex: &str,
        mode: TreeMode,
    ) -> Result<Self, SyntaxError> {
        let tokens = explicit_concat(regex);
        let postfix = to_postfix(&tokens, config)?;
        Self::from_postfix(&postfix, mode)
    }

    /// Build a tree from postfix tokens.
    ///
    /// `?` is rewritten to `union(x, ε)` in both modes.
    pub fn from_postfix(postfix: &[Token], mode: TreeMode) -> Result<Self, SyntaxError> {
        let mut tree = SyntaxTree {
            nodes: Vec::with_capacity(postfix.len() + 2),
            root: NodeId(0),
            alphabet: BTreeSet::new(),
        };
        let mut stack: Vec<NodeId> = Vec::new();

        for token in postfix {
            let node = match token.kind {
                TokenKind::Symbol(c) => {
                    tree.alphabet.insert(c);
                    tree.alloc(Node::Leaf(Leaf::Symbol(c)))
                }
                TokenKind::Epsilon => tree.alloc(Node::Leaf(Leaf::Epsilon)),
                TokenKind::Op(operator) if operator.is_unary() => {
                    let operand = stack.pop().ok_or(SyntaxError::IncompleteUnary {
                        operator,
                        offset: token.offset,
                    })?;
                    tree.unary(operator, operand, mode)
                }
                TokenKind::Op(operator) => {
                    let incomplete = SyntaxError::IncompleteBinary {
                        operator,
                        offset: token.offset,
                    };
                    let right = stack.pop().ok_or(incomplete.clone())?;
                    let left = stack.pop().ok_or(incomplete)?;
                    match operator {
                        Operator::Union => tree.alloc(Node::Union(left, right)),
                        _ => tree.alloc(Node::Concat(left, right)),
                    }
                }
                // to_postfix never emits parentheses
                TokenKind::Open | TokenKind::Close => {
                    return Err(SyntaxError::UnbalancedParenthesis {
                        offset: token.offset,
                    })
                }
            };
            stack.push(node);
        }

        let root = match stack.len() {
            0 => return Err(SyntaxError::Empty),
            1 => stack[0],
            count => return Err(SyntaxError::DanglingOperands { count }),
        };

        tree.root = match mode {
            TreeMode::Thompson => root,
            TreeMode::Direct => {
                let end = tree.alloc(Node::Leaf(Leaf::EndMarker));
                tree.alloc(Node::Concat(root, end))
            }
        };

        debug!(
            "built {:?} tree: {} nodes, height {}, postfix {}",
            mode,
            tree.len(),
            tree.height(),
            tree
        );
        Ok(tree)
    }

    fn unary(&mut self, operator: Operator, operand: NodeId, mode: TreeMode) -> NodeId {
        match (operator, mode) {
            (Operator::Optional, _) => {
                let epsilon = self.alloc(Node::Leaf(Leaf::Epsilon));
                self.alloc(Node::Union(operand, epsilon))
            }
            (Operator::Plus, TreeMode::Thompson) => self.alloc(Node::Plus(operand)),
            (Operator::Plus, TreeMode::Direct) => {
                let copy = self.copy_subtree(operand);
                let star = self.alloc(Node::Star(copy));
                self.alloc(Node::Concat(operand, star))
            }
            _ => self.alloc(Node::Star(operand)),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Duplicate the subtree under `id` with entirely new node identities.
    fn copy_subtree(&mut self, id: NodeId) -> NodeId {
        let mut copies: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        for old in self.postorder_from(id) {
            let map = |n: NodeId| copies[&n];
            let node = match self.nodes[old.index()] {
                Node::Leaf(leaf) => Node::Leaf(leaf),
                Node::Union(l, r) => Node::Union(map(l), map(r)),
                Node::Concat(l, r) => Node::Concat(map(l), map(r)),
                Node::Star(c) => Node::Star(map(c)),
                Node::Plus(c) => Node::Plus(map(c)),
            };
            let new = self.alloc(node);
            copies.insert(old, new);
        }
        copies[&id]
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id.index()]
    }

    /// Number of nodes in the arena.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Alphabet symbols appearing in the tree. Never contains `ε`.
    #[inline]
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Nodes reachable from the root, children before parents, left before right.
    pub fn postorder(&self) -> Vec<NodeId> {
        self.postorder_from(self.root)
    }

    fn postorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            match self.nodes[id.index()] {
                Node::Leaf(_) => {}
                Node::Union(l, r) | Node::Concat(l, r) => {
                    stack.push(l);
                    stack.push(r);
                }
                Node::Star(c) | Node::Plus(c) => stack.push(c),
            }
        }
        out.reverse();
        out
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut heights = vec![0usize; self.nodes.len()];
        for id in self.postorder() {
            let h = match self.nodes[id.index()] {
                Node::Leaf(_) => 1,
                Node::Union(l, r) | Node::Concat(l, r) => {
                    1 + heights[l.index()].max(heights[r.index()])
                }
                Node::Star(c) | Node::Plus(c) => 1 + heights[c.index()],
            };
            heights[id.index()] = h;
        }
        heights[self.root.index()]
    }

    /// The end-marker leaf, if this tree is augmented.
    pub fn end_marker(&self) -> Option<NodeId> {
        self.postorder()
            .into_iter()
            .find(|&id| self.nodes[id.index()] == Node::Leaf(Leaf::EndMarker))
    }
}

/// Writes the tree in postfix order.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.postorder() {
            write!(f, "{}", self.nodes[id.index()].as_char())?;
        }
        Ok(())
    }
}
