// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Programmatic construction of behavior grammars.
//!
//! The builder interns names, allocates arena nodes, and registers named
//! composites in the address book as they are created. Occurrences may
//! reference composites that are defined later (or never): resolution
//! happens through the address book at traversal time, so forward
//! references need no fixup pass. [`GrammarBuilder::finish`] reports the
//! occurrence names that never resolved; the engine degrades such
//! occurrences to a synthetic empty instance rather than failing.

use rustc_hash::FxHashMap;
use tracing::warn;

use super::{CompositeKind, EventName, Grammar, NodeId, NodeKind};

/// Incremental builder for a [`Grammar`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    nodes: Vec<NodeKind>,
    names: Vec<String>,
    by_name: FxHashMap<String, EventName>,
    address_book: FxHashMap<EventName, NodeId>,
    composites: Vec<NodeId>,
    occurrences: Vec<EventName>,
    empty: Option<NodeId>,
    store_count: usize,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        GrammarBuilder::default()
    }

    /// Intern an event name, returning the existing symbol on a repeat.
    pub fn name(&mut self, text: &str) -> EventName {
        if let Some(&existing) = self.by_name.get(text) {
            return existing;
        }
        let name = EventName::from_index(self.names.len());
        self.names.push(text.to_owned());
        self.by_name.insert(text.to_owned(), name);
        name
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(kind);
        id
    }

    /// A single named event.
    pub fn atom(&mut self, text: &str) -> NodeId {
        let name = self.name(text);
        self.push(NodeKind::Atom { name })
    }

    /// The shared empty producer, for optional/empty alternatives.
    pub fn empty(&mut self) -> NodeId {
        if let Some(id) = self.empty {
            return id;
        }
        let id = self.push(NodeKind::Empty);
        self.empty = Some(id);
        id
    }

    /// Ordered alternatives (one produced per traversal call).
    pub fn alternatives(&mut self, alternatives: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Alt { alternatives })
    }

    /// Ordered sequence.
    pub fn sequence(&mut self, members: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Seq { members })
    }

    /// Unordered concurrent branches.
    pub fn concurrent(&mut self, branches: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Set { branches })
    }

    /// Reference to a named composite, resolved lazily at traversal time.
    pub fn occurrence(&mut self, text: &str) -> NodeId {
        let name = self.name(text);
        self.occurrences.push(name);
        self.push(NodeKind::Occurrence { name })
    }

    /// Plain named composite event.
    pub fn composite(&mut self, text: &str, members: Vec<NodeId>) -> NodeId {
        self.named(text, CompositeKind::Event, members)
    }

    /// Actor-level root composite.
    pub fn root(&mut self, text: &str, members: Vec<NodeId>) -> NodeId {
        self.named(text, CompositeKind::Root, members)
    }

    /// Top-level schema; member ordering is suppressed during traversal.
    pub fn schema(&mut self, text: &str, members: Vec<NodeId>) -> NodeId {
        self.named(text, CompositeKind::Schema, members)
    }

    fn named(&mut self, text: &str, kind: CompositeKind, members: Vec<NodeId>) -> NodeId {
        let name = self.name(text);
        let store = self.store_count;
        let id = self.push(NodeKind::Composite {
            name,
            kind,
            members,
            store,
        });
        self.store_count += 1;
        // First registration wins; a duplicate name keeps the original store.
        if self.address_book.contains_key(&name) {
            warn!(name = text, "duplicate composite name ignored");
        } else {
            self.address_book.insert(name, id);
            self.composites.push(id);
        }
        id
    }

    /// Equate `shared`-named events inside `left` instances with those
    /// inside `right` instances.
    pub fn coordinate(&mut self, shared: &str, left: &str, right: &str) -> NodeId {
        let shared = self.name(shared);
        let left = self.name(left);
        let right = self.name(right);
        self.push(NodeKind::Coordinate {
            shared,
            left,
            right,
        })
    }

    /// Seal the grammar. The second value lists occurrence names with no
    /// matching composite; the engine will expand those to synthetic empty
    /// instances, so callers wanting stricter behavior should check it.
    pub fn finish(self) -> (Grammar, Vec<String>) {
        let mut unresolved = Vec::new();
        for &name in &self.occurrences {
            if !self.address_book.contains_key(&name) {
                let text = self.names[name.index()].clone();
                if !unresolved.contains(&text) {
                    warn!(name = %text, "occurrence has no matching composite");
                    unresolved.push(text);
                }
            }
        }
        let grammar = Grammar::new(
            self.nodes,
            self.names,
            self.by_name,
            self.address_book,
            self.composites,
            self.store_count,
        );
        (grammar, unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_interning() {
        let mut builder = GrammarBuilder::new();
        let a = builder.name("tick");
        let b = builder.name("tock");
        let c = builder.name("tick");
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_node_is_shared() {
        let mut builder = GrammarBuilder::new();
        let a = builder.empty();
        let b = builder.empty();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forward_reference_resolves() {
        let mut builder = GrammarBuilder::new();
        let occ = builder.occurrence("later");
        let schema = builder.schema("top", vec![occ]);
        let a = builder.atom("x");
        builder.composite("later", vec![a]);
        let (grammar, unresolved) = builder.finish();

        assert!(unresolved.is_empty());
        let later = grammar.lookup_name("later").unwrap();
        assert!(grammar.composite(later).is_some());
        assert_eq!(grammar.composites().len(), 2);
        assert!(matches!(
            grammar.kind(schema),
            NodeKind::Composite {
                kind: CompositeKind::Schema,
                ..
            }
        ));
    }

    #[test]
    fn test_unresolved_occurrence_reported() {
        let mut builder = GrammarBuilder::new();
        let occ = builder.occurrence("ghost");
        builder.root("top", vec![occ]);
        let (_, unresolved) = builder.finish();
        assert_eq!(unresolved, vec!["ghost".to_owned()]);
    }

    #[test]
    fn test_duplicate_composite_keeps_first() {
        let mut builder = GrammarBuilder::new();
        let a = builder.atom("a");
        let first = builder.composite("twin", vec![a]);
        let b = builder.atom("b");
        builder.composite("twin", vec![b]);
        let (grammar, _) = builder.finish();

        let name = grammar.lookup_name("twin").unwrap();
        assert_eq!(grammar.composite(name), Some(first));
        assert_eq!(grammar.composites().len(), 1);
        // Both nodes exist in the arena; only the first owns the name.
        assert_eq!(grammar.store_count(), 2);
    }
}
