// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The harvest driver: repeated traversal until exhaustion.
//!
//! # Architecture
//!
//! [`Generator`] owns the three long-lived values of a run: the immutable
//! grammar, the segment library, and the trace context. One harvest call
//! enumerates every trace of one composite:
//!
//! 1. reset the per-attempt state, keeping cursors and statistics;
//! 2. push the composite's own instance marker at position 0;
//! 3. traverse; a failed attempt is counted and retried unless the
//!    composite reports exhaustion;
//! 4. check the axioms over the assembled relations; violations reject
//!    the candidate without storing it;
//! 5. store the trace and its relations as a new segment, then go again
//!    until traversal reports completion.
//!
//! [`Generator::harvest_all`] runs composites in dependency order, so an
//! occurrence usually finds its segments already harvested; recursive
//! references find an empty store and degrade to a bare instance.

use std::mem;
use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::checker::RelationMatrices;
use crate::engine::{traverse, Outcome};
use crate::grammar::{Grammar, NodeId, NodeKind};
use crate::stats::{Counters, Statistics};
use crate::trace::{Segment, SegmentLibrary, SegmentStore, TraceContext, TraceElement};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no composite named {0} in the grammar")]
    UnknownComposite(String),
}

/// Per-composite result of one harvest call.
///
/// Event counts exclude the position-0 instance marker.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub name: String,
    pub traces: usize,
    pub events: usize,
    pub min_events: usize,
    pub max_events: usize,
}

/// Result of harvesting every composite in a grammar.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub summaries: Vec<HarvestSummary>,
    pub elapsed_ms: u64,
    pub events_per_second: f64,
}

/// Owns the state of an enumeration run.
pub struct Generator {
    grammar: Grammar,
    library: SegmentLibrary,
    ctx: TraceContext,
}

impl Generator {
    pub fn new(grammar: Grammar) -> Self {
        let library = SegmentLibrary::new(grammar.store_count());
        let ctx = TraceContext::new(grammar.node_count());
        Generator {
            grammar,
            library,
            ctx,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn library(&self) -> &SegmentLibrary {
        &self.library
    }

    pub fn statistics(&self) -> &Statistics {
        &self.ctx.stats
    }

    /// The segments stored so far for the named composite.
    pub fn segments_of(&self, name: &str) -> Option<&SegmentStore> {
        let id = self
            .grammar
            .lookup_name(name)
            .and_then(|symbol| self.grammar.composite(symbol))?;
        let (_, _, store, _) = self.grammar.composite_parts(id)?;
        Some(self.library.store(store))
    }

    /// Enumerate and store every trace of the named composite.
    pub fn harvest(&mut self, name: &str) -> Result<HarvestSummary, HarvestError> {
        let id = self
            .grammar
            .lookup_name(name)
            .and_then(|symbol| self.grammar.composite(symbol));
        let summary = id.and_then(|id| self.harvest_composite(id));
        summary.ok_or_else(|| HarvestError::UnknownComposite(name.to_owned()))
    }

    /// Harvest every composite, dependencies before their dependents.
    pub fn harvest_all(&mut self) -> RunReport {
        let start = Instant::now();
        let order = dependency_order(&self.grammar);
        let mut summaries = Vec::with_capacity(order.len());
        for id in order {
            if let Some(summary) = self.harvest_composite(id) {
                summaries.push(summary);
            }
        }
        let elapsed = start.elapsed();
        let events: usize = summaries.iter().map(|summary| summary.events).sum();
        let seconds = elapsed.as_secs_f64();
        let events_per_second = if seconds > 0.0 {
            events as f64 / seconds
        } else {
            0.0
        };
        info!(
            composites = summaries.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );
        RunReport {
            summaries,
            elapsed_ms: elapsed.as_millis() as u64,
            events_per_second,
        }
    }

    fn harvest_composite(&mut self, id: NodeId) -> Option<HarvestSummary> {
        let Generator {
            grammar,
            library,
            ctx,
        } = self;
        let (name, kind, store, members) = grammar.composite_parts(id)?;
        let member_count = members.len();

        let mut stored = 0;
        let mut events_total = 0;
        let mut min_events = usize::MAX;
        let mut max_events = 0;
        loop {
            ctx.reset_attempt();
            ctx.stats.bump(Counters::Attempts);
            ctx.trace.push(TraceElement::Instance {
                name,
                kind,
                segment: library.store(store).len(),
            });

            let result = traverse(grammar, library, id, ctx);
            if result == Outcome::Failed {
                ctx.stats.bump(Counters::FailedAttempts);
                if ctx.completed_members(id) == member_count {
                    break;
                }
                continue;
            }

            if let Err(violation) = RelationMatrices::build(ctx.trace.len(), &ctx.relations) {
                ctx.stats.record_violation(&violation);
                debug!(
                    composite = grammar.name_str(name),
                    %violation,
                    "candidate trace rejected"
                );
                if result == Outcome::Completed {
                    break;
                }
                continue;
            }

            let segment = Segment {
                trace: ctx.trace.clone(),
                relations: ctx.relations.clone(),
            };
            let events = segment.trace.len() - 1;
            let pairs = segment.relations.pair_count();
            let bytes = mem::size_of::<Segment>()
                + segment.trace.len() * mem::size_of::<TraceElement>()
                + pairs * mem::size_of::<(usize, usize)>();
            library.store_mut(store).push(segment);
            ctx.stats.observe_trace(events, pairs);
            ctx.stats.add(Counters::StorageBytes, bytes as u64);
            stored += 1;
            events_total += events;
            min_events = min_events.min(events);
            max_events = max_events.max(events);

            if result == Outcome::Completed {
                break;
            }
        }

        if stored > 0 {
            info!(
                composite = grammar.name_str(name),
                traces = stored,
                events = events_total,
                min = min_events,
                max = max_events,
                "harvest complete"
            );
        } else {
            min_events = 0;
            info!(composite = grammar.name_str(name), "no traces found");
        }
        Some(HarvestSummary {
            name: grammar.name_str(name).to_owned(),
            traces: stored,
            events: events_total,
            min_events,
            max_events,
        })
    }
}

/// Composites ordered so that referenced composites come before the
/// composites whose occurrences replay them. Cycles are broken at the
/// first back-reference; the occurrence fallback covers the gap.
fn dependency_order(grammar: &Grammar) -> Vec<NodeId> {
    let mut visited = FxHashSet::default();
    let mut order = Vec::new();
    for &composite in grammar.composites() {
        visit(grammar, composite, &mut visited, &mut order);
    }
    order
}

fn visit(
    grammar: &Grammar,
    id: NodeId,
    visited: &mut FxHashSet<NodeId>,
    order: &mut Vec<NodeId>,
) {
    if !visited.insert(id) {
        return;
    }
    let mut pending = match grammar.composite_parts(id) {
        Some((_, _, _, members)) => members.to_vec(),
        None => return,
    };
    while let Some(node) = pending.pop() {
        match grammar.kind(node) {
            NodeKind::Alt { alternatives } => pending.extend(alternatives),
            NodeKind::Seq { members } => pending.extend(members),
            NodeKind::Set { branches } => pending.extend(branches),
            NodeKind::Occurrence { name } => {
                if let Some(dependency) = grammar.composite(*name) {
                    visit(grammar, dependency, visited, order);
                }
            }
            NodeKind::Composite { .. } => visit(grammar, node, visited, order),
            NodeKind::Atom { .. } | NodeKind::Empty | NodeKind::Coordinate { .. } => {}
        }
    }
    order.push(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::grammar::GrammarBuilder;

    fn two_by_three() -> Generator {
        let mut builder = GrammarBuilder::new();
        let a0 = builder.atom("a0");
        let a1 = builder.atom("a1");
        let b0 = builder.atom("b0");
        let b1 = builder.atom("b1");
        let b2 = builder.atom("b2");
        let first = builder.alternatives(vec![a0, a1]);
        let second = builder.alternatives(vec![b0, b1, b2]);
        builder.root("machine", vec![first, second]);
        let (grammar, _) = builder.finish();
        Generator::new(grammar)
    }

    fn stored_names(generator: &Generator, composite: &str) -> Vec<(String, String)> {
        let grammar = generator.grammar();
        let name = grammar.lookup_name(composite).unwrap();
        let id = grammar.composite(name).unwrap();
        let (_, _, store, _) = grammar.composite_parts(id).unwrap();
        generator
            .library()
            .store(store)
            .iter()
            .map(|segment| {
                (
                    grammar.name_str(segment.trace[1].name()).to_owned(),
                    grammar.name_str(segment.trace[2].name()).to_owned(),
                )
            })
            .collect()
    }

    #[test]
    fn test_harvest_enumerates_product_in_order() {
        let mut generator = two_by_three();
        let summary = generator.harvest("machine").unwrap();

        assert_eq!(summary.traces, 6);
        assert_eq!(summary.events, 12);
        assert_eq!(summary.min_events, 2);
        assert_eq!(summary.max_events, 2);
        assert_eq!(
            stored_names(&generator, "machine"),
            [
                ("a0", "b0"),
                ("a0", "b1"),
                ("a0", "b2"),
                ("a1", "b0"),
                ("a1", "b1"),
                ("a1", "b2"),
            ]
            .map(|(a, b)| (a.to_owned(), b.to_owned()))
        );
        assert_eq!(generator.statistics().get(Counters::Attempts), 6);
        assert_eq!(generator.statistics().get(Counters::FailedAttempts), 0);
    }

    #[test]
    fn test_stored_relations_are_ordered() {
        let mut generator = two_by_three();
        generator.harvest("machine").unwrap();

        let grammar = generator.grammar();
        let name = grammar.lookup_name("machine").unwrap();
        let id = grammar.composite(name).unwrap();
        let (_, _, store, _) = grammar.composite_parts(id).unwrap();
        for segment in generator.library().store(store).iter() {
            assert!(segment.relations.follows.contains_pair(2, 1));
            assert!(segment.relations.inside.contains_pair(1, 0));
            assert!(segment.relations.inside.contains_pair(2, 0));
        }
    }

    #[test]
    fn test_unknown_composite_is_an_error() {
        let mut generator = two_by_three();
        assert!(matches!(
            generator.harvest("nope"),
            Err(HarvestError::UnknownComposite(_))
        ));
    }

    #[test]
    fn test_harvest_all_runs_dependencies_first() {
        let mut builder = GrammarBuilder::new();
        let first = builder.occurrence("worker");
        let second = builder.occurrence("worker");
        builder.schema("plant", vec![first, second]);
        let take = builder.atom("take");
        let put = builder.atom("put");
        builder.composite("worker", vec![take, put]);
        let (grammar, unresolved) = builder.finish();
        assert!(unresolved.is_empty());

        let mut generator = Generator::new(grammar);
        let report = generator.harvest_all();

        let names: Vec<&str> = report
            .summaries
            .iter()
            .map(|summary| summary.name.as_str())
            .collect();
        assert_eq!(names, vec!["worker", "plant"]);
        assert_eq!(report.summaries[0].traces, 1);
        assert_eq!(report.summaries[1].traces, 1);
        // The plant trace replays the worker segment twice.
        assert_eq!(report.summaries[1].events, 6);
        assert_eq!(generator.statistics().get(Counters::SegmentsSpliced), 2);
    }

    #[test]
    fn test_schema_members_stay_unordered() {
        let mut builder = GrammarBuilder::new();
        let first = builder.occurrence("worker");
        let second = builder.occurrence("worker");
        builder.schema("plant", vec![first, second]);
        let take = builder.atom("take");
        builder.composite("worker", vec![take]);
        let (grammar, _) = builder.finish();

        let mut generator = Generator::new(grammar);
        generator.harvest_all();

        let segments = stored_segments(&generator, "plant");
        assert_eq!(segments.len(), 1);
        // Positions 1 and 3 are the two worker instances; neither follows
        // the other, and each contains its own take event.
        let relations = &segments[0].relations;
        assert!(!relations.follows.contains_pair(3, 1));
        assert!(!relations.follows.contains_pair(1, 3));
        assert!(relations.inside.contains_pair(2, 1));
        assert!(relations.inside.contains_pair(4, 3));
    }

    fn stored_segments<'a>(generator: &'a Generator, composite: &str) -> Vec<&'a Segment> {
        let grammar = generator.grammar();
        let name = grammar.lookup_name(composite).unwrap();
        let id = grammar.composite(name).unwrap();
        let (_, _, store, _) = grammar.composite_parts(id).unwrap();
        generator.library().store(store).iter().collect()
    }
}
