// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trace elements and the memoized segment storage.
//!
//! # Memory model
//!
//! Enumeration keeps two tiers of trace data:
//!
//! - the [`TraceContext`](context::TraceContext) holds the one trace
//!   currently being assembled, mutable and reset per attempt;
//! - the [`SegmentLibrary`] holds every previously harvested alternative of
//!   every named composite, append-only and immutable once stored.
//!
//! Occurrences replay library segments by value, shifting the stored
//! position-local relation lists by the splice base. A segment is never
//! mutated or freed during a run; later references reuse it by index.

use crate::grammar::{CompositeKind, EventName};

pub mod context;
pub mod relations;

pub use context::{Cursor, TraceContext};
pub use relations::{PairList, Relations};

/// One element of an event trace.
///
/// Position in the trace buffer is the integer key used throughout the
/// relation lists. Position 0 of every segment is the composite's own
/// instance marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceElement {
    /// An atomic event.
    Atom { name: EventName },

    /// A composite event instance; `segment` identifies which stored
    /// alternative of the named composite it stands for.
    Instance {
        name: EventName,
        kind: CompositeKind,
        segment: usize,
    },
}

impl TraceElement {
    pub fn name(&self) -> EventName {
        match self {
            TraceElement::Atom { name } => *name,
            TraceElement::Instance { name, .. } => *name,
        }
    }

    /// Single-letter tag used by the renderers: A for atoms, C/R/S for
    /// composite-event, root, and schema instances.
    pub fn kind_letter(&self) -> char {
        match self {
            TraceElement::Atom { .. } => 'A',
            TraceElement::Instance { kind, .. } => match kind {
                CompositeKind::Event => 'C',
                CompositeKind::Root => 'R',
                CompositeKind::Schema => 'S',
            },
        }
    }
}

/// One harvested alternative of a named composite: the trace slice plus its
/// relation lists, positions local to the slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub trace: Vec<TraceElement>,
    pub relations: Relations,
}

/// Append-only list of segments for one composite.
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}

/// All segment stores for a grammar, indexed by the store slot recorded in
/// each composite node.
#[derive(Debug)]
pub struct SegmentLibrary {
    stores: Vec<SegmentStore>,
}

impl SegmentLibrary {
    pub fn new(store_count: usize) -> Self {
        let mut stores = Vec::with_capacity(store_count);
        stores.resize_with(store_count, SegmentStore::default);
        SegmentLibrary { stores }
    }

    pub fn store(&self, index: usize) -> &SegmentStore {
        &self.stores[index]
    }

    pub(crate) fn store_mut(&mut self, index: usize) -> &mut SegmentStore {
        &mut self.stores[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CompositeKind;

    #[test]
    fn test_kind_letters() {
        let name = EventName::from_index(0);
        assert_eq!(TraceElement::Atom { name }.kind_letter(), 'A');
        let instance = |kind| TraceElement::Instance {
            name,
            kind,
            segment: 0,
        };
        assert_eq!(instance(CompositeKind::Event).kind_letter(), 'C');
        assert_eq!(instance(CompositeKind::Root).kind_letter(), 'R');
        assert_eq!(instance(CompositeKind::Schema).kind_letter(), 'S');
    }

    #[test]
    fn test_library_stores_are_independent() {
        let mut library = SegmentLibrary::new(2);
        library.store_mut(0).push(Segment {
            trace: vec![TraceElement::Atom {
                name: EventName::from_index(0),
            }],
            relations: Relations::new(),
        });

        assert_eq!(library.store(0).len(), 1);
        assert!(library.store(1).is_empty());
        assert!(library.store(0).get(0).is_some());
        assert!(library.store(0).get(1).is_none());
    }
}
