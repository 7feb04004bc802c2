// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Mutable traversal state, threaded through every traverse/hold call.
//!
//! All state shared across one enumeration attempt lives here: the trace
//! buffer, the three relation lists, the predecessor stack, the per-Set
//! heads/tails tables, and the per-node traversal cursors. Exactly one
//! context is alive per harvest run; the producer tree itself stays
//! immutable, so the borrow split between grammar and context is total.
//!
//! # Reset discipline
//!
//! [`TraceContext::reset_attempt`] clears everything assembled for the
//! previous attempt (trace, relations, heads, tails, predecessor) but
//! leaves cursors untouched: cursor positions carry the mixed-radix
//! enumeration state from one attempt to the next, and statistics
//! accumulate for the whole run.
//!
//! # Heads and tails
//!
//! While a Set node is open it owns one heads table (predecessor edges owed
//! to the first event of each branch) and contributes one tails table
//! (edges owed to whatever follows the Set). Tables are pushed as Sets
//! open and consumed in place: a drained tails table is cleared but keeps
//! its slot until the next attempt reset.

use crate::grammar::NodeId;
use crate::stats::Statistics;
use crate::trace::{PairList, Relations, TraceElement};

/// Per-node traversal cursor.
///
/// `current`/`previous` implement alternative advance and hold for Alt and
/// Occurrence nodes; `completed` is the completeness counter of Seq-like
/// nodes, consulted by the harvest driver to detect exhaustion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub current: usize,
    pub previous: usize,
    pub completed: usize,
}

/// The single mutable value threaded through traversal.
#[derive(Debug)]
pub struct TraceContext {
    /// Trace buffer for the attempt in progress.
    pub trace: Vec<TraceElement>,

    /// Follows/Inside/Equals accumulated for the attempt in progress.
    pub relations: Relations,

    /// Statistics for the whole run.
    pub stats: Statistics,

    predecessor: Vec<Option<usize>>,
    pub(crate) heads: Vec<PairList>,
    pub(crate) tails: Vec<PairList>,
    cursors: Vec<Cursor>,
}

impl TraceContext {
    /// A context sized for a grammar with `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        TraceContext {
            trace: Vec::new(),
            relations: Relations::new(),
            stats: Statistics::new(),
            predecessor: vec![None],
            heads: Vec::new(),
            tails: Vec::new(),
            cursors: vec![Cursor::default(); node_count],
        }
    }

    /// Clear per-attempt state; cursors and statistics persist.
    pub fn reset_attempt(&mut self) {
        self.trace.clear();
        self.relations.clear();
        self.heads.clear();
        self.tails.clear();
        self.predecessor.clear();
        self.predecessor.push(None);
    }

    /// Current nesting level's predecessor position, if defined.
    pub fn predecessor(&self) -> Option<usize> {
        self.predecessor.last().copied().flatten()
    }

    /// Overwrite the current nesting level's predecessor slot.
    pub fn set_predecessor(&mut self, value: Option<usize>) {
        if let Some(slot) = self.predecessor.last_mut() {
            *slot = value;
        }
    }

    pub(crate) fn cursor(&self, id: NodeId) -> Cursor {
        self.cursors[id.index()]
    }

    pub(crate) fn cursor_mut(&mut self, id: NodeId) -> &mut Cursor {
        &mut self.cursors[id.index()]
    }

    /// Completeness counter of a Seq-like node, for exhaustion detection.
    pub fn completed_members(&self, id: NodeId) -> usize {
        self.cursors[id.index()].completed
    }

    /// Record containment and succession for the event about to be pushed.
    ///
    /// The event's position is the current buffer length. It is contained
    /// in the segment's master composite (position 0). If a predecessor is
    /// defined it gains a Follows edge; otherwise the position is either a
    /// Set branch start (the Set mechanism owns its ordering) or a
    /// post-Set position whose pending tail edges are discharged here.
    /// Either way the event becomes the predecessor for the next sibling.
    pub fn link_leader(&mut self) {
        let position = self.trace.len();
        self.relations.inside.insert(position, 0);
        match self.predecessor() {
            Some(previous) => self.relations.follows.insert(position, previous),
            None => {
                if !self.position_in_heads(position) {
                    for second in self.drain_tails_matching(position) {
                        self.relations.follows.insert(position, second);
                    }
                }
            }
        }
        self.set_predecessor(Some(position));
    }

    /// Whether any open or closed Set recorded `position` as a branch start.
    pub(crate) fn position_in_heads(&self, position: usize) -> bool {
        self.heads.iter().any(|table| table.contains_key(position))
    }

    /// Collect pending tail edges owed to `position` from every tails
    /// table, clearing each table that matched.
    pub(crate) fn drain_tails_matching(&mut self, position: usize) -> Vec<usize> {
        let mut collected = Vec::new();
        for table in &mut self.tails {
            if table.contains_key(position) {
                collected.extend_from_slice(table.values_at(position));
                table.clear();
            }
        }
        collected
    }
}
