// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Visualizer JSON: `{"traces": [[events, inside, follows], ...]}`.
//!
//! Events merged by coordination are collapsed before emission: within
//! each trace the transitive closure of the equality pairs is taken, and
//! every position equal to an earlier one is dropped from the event list
//! and from both relation lists. Position 0, the composite's own
//! instance marker, is always dropped.

use serde_json::{json, Value};

use crate::checker::BoolMatrix;
use crate::grammar::{Grammar, NodeId};
use crate::trace::{PairList, Segment, SegmentLibrary};

/// The full visualizer document for every segment stored for `id`.
pub fn traces_value(grammar: &Grammar, library: &SegmentLibrary, id: NodeId) -> Value {
    let traces: Vec<Value> = match grammar.composite_parts(id) {
        Some((_, _, store, _)) => library
            .store(store)
            .iter()
            .map(|segment| trace_value(grammar, segment))
            .collect(),
        None => Vec::new(),
    };
    json!({ "traces": traces })
}

fn trace_value(grammar: &Grammar, segment: &Segment) -> Value {
    let invalid = invalidated(segment.trace.len(), &segment.relations.equals);

    let mut events = Vec::new();
    for (i, element) in segment.trace.iter().enumerate().skip(1) {
        if invalid[i] {
            continue;
        }
        events.push(json!([
            grammar.name_str(element.name()),
            element.kind_letter(),
            i
        ]));
    }
    let inside = pairs_value(&segment.relations.inside, &invalid);
    let follows = pairs_value(&segment.relations.follows, &invalid);
    json!([events, inside, follows])
}

/// Marks every position equal to an earlier one; the earliest member of
/// each equality class survives. Position 0 is always invalidated.
fn invalidated(len: usize, equals: &PairList) -> Vec<bool> {
    let mut matrix = BoolMatrix::new(len);
    for (first, second) in equals.iter() {
        matrix.set(first, second, true);
        matrix.set(second, first, true);
    }
    matrix.close_transitive();

    let mut invalid = vec![false; len];
    invalid[0] = true;
    for k in 1..len {
        if invalid[k] {
            continue;
        }
        for i in 1..len {
            if k != i && matrix.get(k, i) {
                invalid[i] = true;
            }
        }
    }
    invalid
}

fn pairs_value(pairs: &PairList, invalid: &[bool]) -> Vec<Value> {
    let mut out = Vec::new();
    let mut previous = None;
    for (first, second) in pairs.iter() {
        if invalid[first] || invalid[second] || previous == Some((first, second)) {
            continue;
        }
        out.push(json!([first, second]));
        previous = Some((first, second));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::grammar::{CompositeKind, GrammarBuilder};
    use crate::harvest::Generator;
    use crate::trace::{Relations, TraceElement};

    #[test]
    fn test_plain_trace_document() {
        let mut builder = GrammarBuilder::new();
        let a = builder.atom("a");
        let b = builder.atom("b");
        builder.root("pair", vec![a, b]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest("pair").unwrap();

        let grammar = generator.grammar();
        let symbol = grammar.lookup_name("pair").unwrap();
        let id = grammar.composite(symbol).unwrap();
        let value = traces_value(grammar, generator.library(), id);
        // Pairs touching the invalidated marker at position 0 are dropped,
        // so a flat trace has an empty inside list.
        assert_eq!(
            value,
            json!({
                "traces": [[
                    [["a", "A", 1], ["b", "A", 2]],
                    [],
                    [[2, 1]],
                ]]
            })
        );
    }

    #[test]
    fn test_nested_containment_survives() {
        let mut builder = GrammarBuilder::new();
        let take = builder.atom("take");
        builder.composite("worker", vec![take]);
        let first = builder.occurrence("worker");
        let second = builder.occurrence("worker");
        builder.schema("plant", vec![first, second]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest_all();

        let grammar = generator.grammar();
        let symbol = grammar.lookup_name("plant").unwrap();
        let id = grammar.composite(symbol).unwrap();
        let value = traces_value(grammar, generator.library(), id);
        assert_eq!(
            value,
            json!({
                "traces": [[
                    [
                        ["worker", "C", 1],
                        ["take", "A", 2],
                        ["worker", "C", 3],
                        ["take", "A", 4],
                    ],
                    [[2, 1], [4, 3]],
                    [],
                ]]
            })
        );
    }

    fn marker(builder: &mut GrammarBuilder, text: &str) -> TraceElement {
        TraceElement::Instance {
            name: builder.name(text),
            kind: CompositeKind::Root,
            segment: 0,
        }
    }

    fn atom(builder: &mut GrammarBuilder, text: &str) -> TraceElement {
        TraceElement::Atom {
            name: builder.name(text),
        }
    }

    #[test]
    fn test_equal_events_collapse_to_the_earliest() {
        let mut builder = GrammarBuilder::new();
        let trace = vec![
            marker(&mut builder, "top"),
            atom(&mut builder, "x"),
            atom(&mut builder, "x"),
            atom(&mut builder, "y"),
        ];
        let mut relations = Relations::new();
        relations.inside.insert(1, 0);
        relations.inside.insert(2, 0);
        relations.inside.insert(3, 0);
        relations.follows.insert(3, 2);
        relations.equals.insert(1, 2);
        let segment = Segment { trace, relations };
        let (grammar, _) = builder.finish();

        let value = trace_value(&grammar, &segment);
        // Position 2 is merged away; the follows pair touching it
        // disappears with it, and root-level inside pairs go with the
        // invalidated position 0.
        assert_eq!(
            value,
            json!([[["x", "A", 1], ["y", "A", 3]], [], []])
        );
    }

    #[test]
    fn test_equality_closure_spans_chains() {
        let mut builder = GrammarBuilder::new();
        let trace = vec![
            marker(&mut builder, "top"),
            atom(&mut builder, "x"),
            atom(&mut builder, "x"),
            atom(&mut builder, "x"),
        ];
        let mut relations = Relations::new();
        relations.equals.insert(1, 2);
        relations.equals.insert(2, 3);
        let segment = Segment { trace, relations };
        let (grammar, _) = builder.finish();

        let value = trace_value(&grammar, &segment);
        assert_eq!(value, json!([[["x", "A", 1]], [], []]));
    }

    #[test]
    fn test_repeated_pairs_emitted_once() {
        let mut builder = GrammarBuilder::new();
        let trace = vec![
            marker(&mut builder, "top"),
            atom(&mut builder, "x"),
            atom(&mut builder, "y"),
        ];
        let mut relations = Relations::new();
        relations.follows.insert(2, 1);
        relations.follows.insert(2, 1);
        let segment = Segment { trace, relations };
        let (grammar, _) = builder.finish();

        let value = trace_value(&grammar, &segment);
        assert_eq!(value, json!([[["x", "A", 1], ["y", "A", 2]], [], [[2, 1]]]));
    }
}
