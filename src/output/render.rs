// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Plain-text listing of every stored trace of a composite.

use crate::grammar::{Grammar, NodeId};
use crate::trace::{PairList, SegmentLibrary, TraceElement};

/// Render every segment stored for `id`, numbered from 1, with the
/// relation lists spelled out under each trace.
pub fn show_traces(grammar: &Grammar, library: &SegmentLibrary, id: NodeId) -> String {
    let mut out = String::new();
    let Some((name, _, store, _)) = grammar.composite_parts(id) else {
        return out;
    };
    let segments = library.store(store);
    out.push_str(&format!(
        "\nTotal {} traces for Composite {}\n",
        segments.len(),
        grammar.name_str(name)
    ));
    out.push_str("=========================\n");
    for (k, segment) in segments.iter().enumerate() {
        let number = k + 1;
        out.push_str(&format!(
            "trace #{number} with {} events\n",
            segment.trace.len()
        ));
        for (i, element) in segment.trace.iter().enumerate() {
            let name = grammar.name_str(element.name());
            let letter = element.kind_letter();
            match element {
                TraceElement::Atom { .. } => {
                    out.push_str(&format!("({i}) Event {name}  type= {letter}\n"));
                }
                TraceElement::Instance { segment, .. } => {
                    out.push_str(&format!(
                        "({i}) Event {name}  type= {letter}  segment= {segment}\n"
                    ));
                }
            }
        }
        relation_section(&mut out, "FOLLOWS", "follows", number, &segment.relations.follows);
        relation_section(&mut out, "IN", "inside", number, &segment.relations.inside);
        relation_section(&mut out, "EQUALS", "equals", number, &segment.relations.equals);
        out.push('\n');
    }
    out
}

fn relation_section(out: &mut String, label: &str, verb: &str, number: usize, pairs: &PairList) {
    out.push_str(&format!("\n {label} list for trace #{number}\n"));
    for (first, second) in pairs.iter() {
        out.push_str(&format!("   {first} {verb} {second}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::grammar::GrammarBuilder;
    use crate::harvest::Generator;

    fn top(generator: &Generator, name: &str) -> NodeId {
        let symbol = generator.grammar().lookup_name(name).unwrap();
        generator.grammar().composite(symbol).unwrap()
    }

    #[test]
    fn test_single_trace_listing() {
        let mut builder = GrammarBuilder::new();
        let a = builder.atom("a");
        let b = builder.atom("b");
        builder.root("pair", vec![a, b]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest("pair").unwrap();

        let rendered = show_traces(
            generator.grammar(),
            generator.library(),
            top(&generator, "pair"),
        );
        let expected = concat!(
            "\n",
            "Total 1 traces for Composite pair\n",
            "=========================\n",
            "trace #1 with 3 events\n",
            "(0) Event pair  type= R  segment= 0\n",
            "(1) Event a  type= A\n",
            "(2) Event b  type= A\n",
            "\n",
            " FOLLOWS list for trace #1\n",
            "   2 follows 1\n",
            "\n",
            " IN list for trace #1\n",
            "   1 inside 0\n",
            "   2 inside 0\n",
            "\n",
            " EQUALS list for trace #1\n",
            "\n",
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_spliced_instances_show_their_segment() {
        let mut builder = GrammarBuilder::new();
        let take = builder.atom("take");
        builder.composite("worker", vec![take]);
        let first = builder.occurrence("worker");
        let second = builder.occurrence("worker");
        builder.schema("plant", vec![first, second]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest_all();

        let rendered = show_traces(
            generator.grammar(),
            generator.library(),
            top(&generator, "plant"),
        );
        assert!(rendered.contains("Total 1 traces for Composite plant"));
        assert!(rendered.contains("(1) Event worker  type= C  segment= 0\n"));
        assert!(rendered.contains("(3) Event worker  type= C  segment= 0\n"));
        assert!(rendered.contains("(0) Event plant  type= S  segment= 0\n"));
    }

    #[test]
    fn test_every_stored_trace_is_numbered() {
        let mut builder = GrammarBuilder::new();
        let coffee = builder.atom("coffee");
        let tea = builder.atom("tea");
        let drink = builder.alternatives(vec![coffee, tea]);
        builder.root("machine", vec![drink]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest("machine").unwrap();

        let rendered = show_traces(
            generator.grammar(),
            generator.library(),
            top(&generator, "machine"),
        );
        assert!(rendered.contains("Total 2 traces for Composite machine"));
        assert!(rendered.contains("trace #1 with 2 events"));
        assert!(rendered.contains("trace #2 with 2 events"));
        assert!(rendered.contains("(1) Event coffee  type= A"));
        assert!(rendered.contains("(1) Event tea  type= A"));
        assert!(rendered.contains(" EQUALS list for trace #2"));
    }
}
