// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Behavior grammar: the producer-node tree walked by the engine.
//!
//! A grammar is an arena of [`NodeKind`] values addressed by stable
//! [`NodeId`] handles. Nodes never own their children exclusively, since a
//! named composite may be referenced from many places in the tree, so every
//! cross-reference is a handle lookup into the arena. Event names are
//! interned once and compared as small integers.
//!
//! # Node kinds
//!
//! - `Atom` emits a single named event.
//! - `Empty` emits nothing (the empty alternative).
//! - `Alt` tries child alternatives in order, one per traversal call.
//! - `Seq` runs children left to right as an ordered sequence.
//! - `Set` runs children as unordered concurrent branches.
//! - `Composite` is a named sequence owning a segment store; its kind
//!   distinguishes plain composite events, actor roots, and the schema.
//! - `Occurrence` stands in for a named composite, replaying its
//!   harvested segments.
//! - `Coordinate` equates shared events across two composites.
//!
//! The composite address book maps an event name to the composite node
//! owning the segment store for that name. It is populated during
//! construction and read-only afterwards.

use rustc_hash::FxHashMap;

pub mod builder;

pub use builder::GrammarBuilder;

/// Interned event name: an index into the grammar's name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventName(u32);

impl EventName {
    pub(crate) fn from_index(index: usize) -> Self {
        EventName(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle to a node in the grammar arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Flavor of a named composite.
///
/// `Event` is a plain reusable composite event; `Root` is an actor-level
/// root; `Schema` is the top-level composition whose members establish
/// causal order through explicit coordination rather than textual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Event,
    Root,
    Schema,
}

/// Closed set of producer-node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A single named event.
    Atom { name: EventName },

    /// The empty alternative: produces no event.
    Empty,

    /// Ordered alternatives; one is produced per traversal call.
    Alt { alternatives: Vec<NodeId> },

    /// Ordered sequence of members.
    Seq { members: Vec<NodeId> },

    /// Unordered concurrent branches.
    Set { branches: Vec<NodeId> },

    /// Named composite: a sequence with its own segment store.
    Composite {
        name: EventName,
        kind: CompositeKind,
        members: Vec<NodeId>,
        /// Index of this composite's store in the segment library.
        store: usize,
    },

    /// Reference to a named composite, resolved through the address book.
    Occurrence { name: EventName },

    /// Constraint equating `shared`-named events that occur directly
    /// inside `left` instances with those inside `right` instances.
    Coordinate {
        shared: EventName,
        left: EventName,
        right: EventName,
    },
}

/// Immutable producer tree plus its name table and address book.
///
/// Built once by [`GrammarBuilder`]; never mutated during enumeration, which
/// lets traversal hold shared references into the arena while the mutable
/// trace state travels separately.
#[derive(Debug)]
pub struct Grammar {
    nodes: Vec<NodeKind>,
    names: Vec<String>,
    by_name: FxHashMap<String, EventName>,
    address_book: FxHashMap<EventName, NodeId>,
    composites: Vec<NodeId>,
    store_count: usize,
}

impl Grammar {
    pub(crate) fn new(
        nodes: Vec<NodeKind>,
        names: Vec<String>,
        by_name: FxHashMap<String, EventName>,
        address_book: FxHashMap<EventName, NodeId>,
        composites: Vec<NodeId>,
        store_count: usize,
    ) -> Self {
        Grammar {
            nodes,
            names,
            by_name,
            address_book,
            composites,
            store_count,
        }
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of segment stores the library must provide (one per composite).
    pub fn store_count(&self) -> usize {
        self.store_count
    }

    pub fn name_str(&self, name: EventName) -> &str {
        &self.names[name.index()]
    }

    /// Look up an interned name by its string form.
    pub fn lookup_name(&self, text: &str) -> Option<EventName> {
        self.by_name.get(text).copied()
    }

    /// Address book lookup: the composite node owning segments for `name`.
    pub fn composite(&self, name: EventName) -> Option<NodeId> {
        self.address_book.get(&name).copied()
    }

    /// All composite nodes, in registration order.
    pub fn composites(&self) -> &[NodeId] {
        &self.composites
    }

    /// Destructure a composite node. `None` when `id` is not a composite.
    pub(crate) fn composite_parts(
        &self,
        id: NodeId,
    ) -> Option<(EventName, CompositeKind, usize, &[NodeId])> {
        match self.kind(id) {
            NodeKind::Composite {
                name,
                kind,
                members,
                store,
            } => Some((*name, *kind, *store, members)),
            _ => None,
        }
    }
}
