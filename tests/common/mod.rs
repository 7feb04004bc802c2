// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

use trace_gen::harvest::Generator;
use trace_gen::trace::Segment;
use trace_gen::Grammar;

/// Harvest every composite of `grammar` and hand back the generator.
pub fn harvested(grammar: Grammar) -> Generator {
    let mut generator = Generator::new(grammar);
    generator.harvest_all();
    generator
}

/// The stored segments of the named composite.
pub fn segments<'a>(generator: &'a Generator, name: &str) -> Vec<&'a Segment> {
    generator
        .segments_of(name)
        .unwrap_or_else(|| panic!("no composite named {name}"))
        .iter()
        .collect()
}

/// Event names of one stored trace, the position-0 marker excluded.
pub fn event_names(generator: &Generator, segment: &Segment) -> Vec<String> {
    segment
        .trace
        .iter()
        .skip(1)
        .map(|element| {
            generator
                .grammar()
                .name_str(element.name())
                .to_owned()
        })
        .collect()
}
