// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Recursive-descent trace enumeration engine.
//!
//! This module implements the traversal protocol over the producer tree.
//! One call to [`traverse`] on a grammar root assembles one candidate trace
//! in the [`TraceContext`]; repeated calls enumerate every trace, advancing
//! node cursors like digits of a mixed-radix counter, rightmost fastest.
//!
//! # Architecture
//!
//! Every node answers a traversal call with an [`Outcome`]:
//!
//! 1. `Failed`: no contribution was possible; the caller abandons the
//!    attempt.
//! 2. `Completed`: the node contributed and has exhausted its
//!    alternatives; its cursor has wrapped to the start.
//! 3. `ReadyForNext`: the node contributed and holds further alternatives
//!    for later attempts; its cursor stays put.
//!
//! Sequence-like nodes drive the counter: when member `i` still has
//! alternatives, every member before `i` gets a [`hold`] call, freezing
//! the cursor it advanced this attempt so the next attempt replays the
//! same prefix. Alternative nodes advance one child per call; occurrence
//! nodes replay one stored segment per call.
//!
//! # Example
//!
//! ```
//! use trace_gen::engine::{traverse, Outcome};
//! use trace_gen::grammar::GrammarBuilder;
//! use trace_gen::trace::{SegmentLibrary, TraceContext};
//!
//! let mut builder = GrammarBuilder::new();
//! let coffee = builder.atom("coffee");
//! let tea = builder.atom("tea");
//! let drink = builder.alternatives(vec![coffee, tea]);
//! let (grammar, _) = builder.finish();
//!
//! let library = SegmentLibrary::new(grammar.store_count());
//! let mut ctx = TraceContext::new(grammar.node_count());
//! let outcome = traverse(&grammar, &library, drink, &mut ctx);
//! assert_eq!(outcome, Outcome::ReadyForNext);
//! assert_eq!(ctx.trace.len(), 1);
//! ```

mod sets;

use tracing::debug;

use crate::checker::{merge_equal, RelationMatrices, Violation};
use crate::grammar::{CompositeKind, EventName, Grammar, NodeId, NodeKind};
use crate::stats::Counters;
use crate::trace::{SegmentLibrary, TraceContext, TraceElement};

/// Result of one traversal call on a producer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No contribution was possible.
    Failed,
    /// Contributed, and every alternative has now been produced.
    Completed,
    /// Contributed, with alternatives remaining for later attempts.
    ReadyForNext,
}

/// Produce one contribution from `id` into the context.
pub fn traverse(
    grammar: &Grammar,
    library: &SegmentLibrary,
    id: NodeId,
    ctx: &mut TraceContext,
) -> Outcome {
    match grammar.kind(id) {
        NodeKind::Atom { name } => {
            ctx.link_leader();
            ctx.trace.push(TraceElement::Atom { name: *name });
            Outcome::Completed
        }
        NodeKind::Empty => Outcome::Completed,
        NodeKind::Alt { alternatives } => {
            traverse_alternatives(grammar, library, id, alternatives, ctx)
        }
        NodeKind::Seq { members } => traverse_sequence(grammar, library, id, members, false, ctx),
        NodeKind::Set { branches } => sets::traverse_set(grammar, library, branches, ctx),
        NodeKind::Composite { kind, members, .. } => {
            let suppress = *kind == CompositeKind::Schema;
            traverse_sequence(grammar, library, id, members, suppress, ctx)
        }
        NodeKind::Occurrence { name } => traverse_occurrence(grammar, library, id, *name, ctx),
        NodeKind::Coordinate {
            shared,
            left,
            right,
        } => traverse_coordinate(*shared, *left, *right, ctx),
    }
}

/// Freeze the cursors `id` advanced this attempt.
///
/// Called on the earlier members of a sequence or set when a later member
/// still has alternatives: the frozen members must replay the same
/// contribution until the later member completes.
pub fn hold(grammar: &Grammar, id: NodeId, ctx: &mut TraceContext) {
    match grammar.kind(id) {
        NodeKind::Alt { alternatives } => {
            let previous = ctx.cursor(id).previous;
            ctx.cursor_mut(id).current = previous;
            if let Some(&child) = alternatives.get(previous) {
                hold(grammar, child, ctx);
            }
        }
        NodeKind::Seq { members } | NodeKind::Composite { members, .. } => {
            for &member in members {
                hold(grammar, member, ctx);
            }
        }
        NodeKind::Set { branches } => {
            for &branch in branches {
                hold(grammar, branch, ctx);
            }
        }
        NodeKind::Occurrence { .. } => {
            let previous = ctx.cursor(id).previous;
            ctx.cursor_mut(id).current = previous;
        }
        NodeKind::Atom { .. } | NodeKind::Empty | NodeKind::Coordinate { .. } => {}
    }
}

/// Try alternatives from the cursor onward; produce the first that works.
fn traverse_alternatives(
    grammar: &Grammar,
    library: &SegmentLibrary,
    id: NodeId,
    alternatives: &[NodeId],
    ctx: &mut TraceContext,
) -> Outcome {
    let entry = ctx.cursor(id).current;
    ctx.cursor_mut(id).previous = entry;
    let mut result = Outcome::Failed;
    for &alternative in &alternatives[entry.min(alternatives.len())..] {
        result = traverse(grammar, library, alternative, ctx);
        match result {
            Outcome::Failed => continue,
            Outcome::Completed => {
                // One step past the entry point, even when intervening
                // alternatives failed: failures may be transient.
                ctx.cursor_mut(id).current += 1;
                break;
            }
            Outcome::ReadyForNext => break,
        }
    }
    if result == Outcome::Failed {
        return Outcome::Failed;
    }
    let cursor = ctx.cursor_mut(id);
    if cursor.current >= alternatives.len() {
        cursor.current = 0;
        Outcome::Completed
    } else {
        Outcome::ReadyForNext
    }
}

/// Run members left to right, counting completions.
///
/// With `suppress` set (schema members) the predecessor slot is blanked
/// before each member, so textual order implies no causal order.
fn traverse_sequence(
    grammar: &Grammar,
    library: &SegmentLibrary,
    id: NodeId,
    members: &[NodeId],
    suppress: bool,
    ctx: &mut TraceContext,
) -> Outcome {
    ctx.cursor_mut(id).completed = 0;
    for (i, &member) in members.iter().enumerate() {
        if suppress {
            ctx.set_predecessor(None);
        }
        match traverse(grammar, library, member, ctx) {
            Outcome::Failed => {
                if ctx.cursor(id).completed == i {
                    // Every earlier member was on its final alternative:
                    // mark the whole node exhausted for the harvest driver.
                    ctx.cursor_mut(id).completed = members.len();
                }
                return Outcome::Failed;
            }
            Outcome::Completed => ctx.cursor_mut(id).completed += 1,
            Outcome::ReadyForNext => {
                for &earlier in &members[..i] {
                    hold(grammar, earlier, ctx);
                }
            }
        }
    }
    if ctx.cursor(id).completed == members.len() {
        Outcome::Completed
    } else {
        Outcome::ReadyForNext
    }
}

/// Replay one stored segment of the named composite.
///
/// An unresolved name, or a store with nothing harvested yet (a recursive
/// reference), degrades to a bare instance marker so enumeration can
/// continue.
fn traverse_occurrence(
    grammar: &Grammar,
    library: &SegmentLibrary,
    id: NodeId,
    name: EventName,
    ctx: &mut TraceContext,
) -> Outcome {
    let store = grammar
        .composite(name)
        .and_then(|composite| grammar.composite_parts(composite))
        .map(|(_, _, store, _)| library.store(store));
    let cursor = ctx.cursor(id).current;
    let segment = match store.and_then(|store| store.get(cursor)) {
        Some(segment) => segment,
        None => {
            debug!(
                name = grammar.name_str(name),
                "no stored segments, emitting bare instance"
            );
            ctx.stats.bump(Counters::FallbackInstances);
            ctx.link_leader();
            ctx.trace.push(TraceElement::Instance {
                name,
                kind: CompositeKind::Event,
                segment: 0,
            });
            return Outcome::Completed;
        }
    };

    // The stored slice starts with the instance marker, so the splice base
    // is the marker's global position.
    let base = ctx.trace.len();
    ctx.link_leader();
    ctx.trace.extend_from_slice(&segment.trace);
    ctx.relations
        .follows
        .extend_shifted(&segment.relations.follows, base);
    ctx.relations
        .inside
        .extend_shifted(&segment.relations.inside, base);
    ctx.relations
        .equals
        .extend_shifted(&segment.relations.equals, base);
    ctx.stats.bump(Counters::SegmentsSpliced);

    let next = cursor + 1;
    let len = store.map_or(0, |store| store.len());
    let state = ctx.cursor_mut(id);
    state.previous = cursor;
    if next >= len {
        state.current = 0;
        Outcome::Completed
    } else {
        state.current = next;
        Outcome::ReadyForNext
    }
}

fn reject_coordination(ctx: &mut TraceContext, violation: &Violation) -> Outcome {
    ctx.stats.record_violation(violation);
    debug!(%violation, "coordination rejected");
    Outcome::Failed
}

/// Equate `shared`-named events inside `left` instances with those inside
/// `right` instances, pairing them in causal order.
///
/// Leaves the trace buffer untouched; only the relation lists change.
fn traverse_coordinate(
    shared: EventName,
    left: EventName,
    right: EventName,
    ctx: &mut TraceContext,
) -> Outcome {
    let mut left_list = Vec::new();
    let mut right_list = Vec::new();
    for position in 1..ctx.trace.len() {
        if ctx.trace[position].name() != shared {
            continue;
        }
        // The first containment pair is the structural container.
        let Some(&container) = ctx.relations.inside.values_at(position).first() else {
            continue;
        };
        let container_name = ctx.trace[container].name();
        if container_name == left {
            left_list.push(position);
        } else if container_name == right {
            right_list.push(position);
        }
    }

    if left_list.len() != right_list.len() {
        let violation = Violation::ChildCountMismatch {
            left: left_list.len(),
            right: right_list.len(),
        };
        return reject_coordination(ctx, &violation);
    }
    if left_list.is_empty() {
        return Outcome::Completed;
    }

    let matrices = match RelationMatrices::build(ctx.trace.len(), &ctx.relations) {
        Ok(matrices) => matrices,
        Err(violation) => return reject_coordination(ctx, &violation),
    };
    if let Err(violation) = matrices.sort_total(&mut left_list) {
        return reject_coordination(ctx, &violation);
    }
    if let Err(violation) = matrices.sort_total(&mut right_list) {
        return reject_coordination(ctx, &violation);
    }
    for i in 0..left_list.len() {
        if let Err(violation) = merge_equal(
            left_list[i],
            right_list[i],
            &ctx.trace,
            &matrices,
            &mut ctx.relations,
        ) {
            return reject_coordination(ctx, &violation);
        }
    }
    Outcome::Completed
}
