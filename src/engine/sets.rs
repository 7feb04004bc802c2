// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Traversal of unordered concurrent branches.
//!
//! A Set suspends the predecessor chain: branch events must not follow one
//! another, yet the first event of every branch still follows whatever
//! preceded the Set, and whatever comes after the Set must follow the last
//! event of every branch. Neither endpoint is known while a branch is being
//! produced, so the edges are parked in two bookkeeping tables:
//!
//! - the Set's *heads* table maps each branch-start position to the
//!   predecessors owed to it; the edges are emitted to Follows only once
//!   the branch has actually contributed an event;
//! - the Set's *tails* table, filled when the Set closes, maps the
//!   first position after the Set to every branch-final event. Whoever
//!   claims that position drains the table into Follows.
//!
//! Nested Sets chain through the same tables: an inner Set starting at a
//! branch start inherits that position's heads from the first enclosing
//! table that knows it, and an enclosing Set absorbs the tails its inner
//! Sets left behind.

use std::collections::BTreeSet;

use super::{hold, traverse, Outcome};
use crate::grammar::{Grammar, NodeId};
use crate::trace::{PairList, SegmentLibrary, TraceContext};

pub(super) fn traverse_set(
    grammar: &Grammar,
    library: &SegmentLibrary,
    branches: &[NodeId],
    ctx: &mut TraceContext,
) -> Outcome {
    let mut completed = 0;
    let last = ctx.predecessor();
    let first_branch_start = ctx.trace.len();
    let my_index = ctx.heads.len();
    ctx.heads.push(PairList::new());
    let mut my_tails: BTreeSet<usize> = BTreeSet::new();

    if let Some(last) = last {
        ctx.heads[my_index].insert(first_branch_start, last);
    }
    inherit_parent_heads(ctx, first_branch_start, my_index);
    for second in ctx.drain_tails_matching(first_branch_start) {
        ctx.heads[my_index].insert(first_branch_start, second);
    }

    for (i, &branch) in branches.iter().enumerate() {
        ctx.set_predecessor(None);
        let forthcoming = ctx.trace.len();
        if forthcoming > first_branch_start {
            fan_out_heads(ctx, my_index, first_branch_start, forthcoming);
        }
        my_tails.extend(ctx.drain_tails_matching(forthcoming));

        match traverse(grammar, library, branch, ctx) {
            Outcome::Failed => return Outcome::Failed,
            Outcome::Completed => completed += 1,
            Outcome::ReadyForNext => {
                for &earlier in &branches[..i] {
                    hold(grammar, earlier, ctx);
                }
            }
        }

        let next_event = ctx.trace.len();
        if next_event > forthcoming {
            // The branch contributed: its start position is settled, so
            // the parked head edges become real Follows pairs.
            forward_heads_to_follows(ctx, my_index, forthcoming);
            if let Some(previous) = ctx.predecessor() {
                my_tails.insert(previous);
            }
            if i == branches.len() - 1 {
                my_tails.extend(ctx.drain_tails_matching(next_event));
            }
        }
    }

    let next = ctx.trace.len();
    let mut tail_table = PairList::new();
    for &second in &my_tails {
        tail_table.insert(next, second);
    }
    ctx.tails.push(tail_table);
    ctx.set_predecessor(None);

    if completed == branches.len() {
        Outcome::Completed
    } else {
        Outcome::ReadyForNext
    }
}

/// Copy `branch_start`'s head edges from the first enclosing Set that has
/// them. A Set opening exactly at a parent's branch start owes the same
/// predecessors as that branch.
fn inherit_parent_heads(ctx: &mut TraceContext, branch_start: usize, my_index: usize) {
    let mut copied = Vec::new();
    for table in &ctx.heads[..my_index] {
        if table.contains_key(branch_start) {
            copied.extend_from_slice(table.values_at(branch_start));
            break;
        }
    }
    for second in copied {
        ctx.heads[my_index].insert(branch_start, second);
    }
}

/// Register a later branch start: it owes the same predecessors as the
/// first branch, deduplicated.
fn fan_out_heads(ctx: &mut TraceContext, my_index: usize, branch_start: usize, forthcoming: usize) {
    let collected: BTreeSet<usize> = ctx.heads[my_index]
        .values_at(branch_start)
        .iter()
        .copied()
        .collect();
    for second in collected {
        ctx.heads[my_index].insert(forthcoming, second);
    }
}

/// Emit the parked head edges of a settled branch start to Follows.
fn forward_heads_to_follows(ctx: &mut TraceContext, my_index: usize, forthcoming: usize) {
    let copied = ctx.heads[my_index].values_at(forthcoming).to_vec();
    for second in copied {
        ctx.relations.follows.insert(forthcoming, second);
    }
}
