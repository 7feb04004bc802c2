// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Axiom checking over event relations.
//!
//! Relations accumulate as flat pair lists while a trace is assembled; the
//! checker turns them into boolean reachability matrices to decide whether
//! the attempt describes a consistent behavior.
//!
//! # Architecture
//!
//! [`RelationMatrices::build`] constructs three square matrices over trace
//! positions, in dependency order. The Equals closure feeds row merging of
//! the containment matrix, and the closed containment matrix feeds ordering
//! distribution before the succession closure. Each closure is
//! Floyd-Warshall. Checks run as soon as their inputs exist: containment
//! cycles after the Inside closure, succession cycles and the
//! containment/succession exclusion after the Follows closure.
//!
//! [`merge_equal`] implements event coordination: it equates two events and
//! recursively equates their members, sorting member lists with the
//! matrices built before merging began while appending to the live
//! relation lists.

mod violation;

pub use violation::Violation;

use crate::trace::{Relations, TraceElement};

/// Square bit matrix over trace positions.
#[derive(Debug, Clone)]
pub struct BoolMatrix {
    len: usize,
    cells: Vec<bool>,
}

impl BoolMatrix {
    pub fn new(len: usize) -> Self {
        BoolMatrix {
            len,
            cells: vec![false; len * len],
        }
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.len + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.len + j] = value;
    }

    /// Floyd-Warshall reachability closure.
    pub fn close_transitive(&mut self) {
        for k in 0..self.len {
            for i in 0..self.len {
                for j in 0..self.len {
                    if self.get(i, k) && self.get(k, j) {
                        self.set(i, j, true);
                    }
                }
            }
        }
    }
}

/// Closed reachability matrices for one candidate trace.
#[derive(Debug)]
pub struct RelationMatrices {
    pub len: usize,
    pub equals: BoolMatrix,
    pub inside: BoolMatrix,
    pub follows: BoolMatrix,
}

/// Rows of equated events are unioned so either position answers for both.
fn merge_equal_rows(equals: &BoolMatrix, m: &mut BoolMatrix) {
    let len = equals.len;
    for i in 0..len {
        for j in 0..len {
            if i != j && equals.get(i, j) {
                for k in 0..len {
                    let merged = m.get(i, k) || m.get(j, k);
                    m.set(i, k, merged);
                    m.set(j, k, merged);
                }
            }
        }
    }
}

/// Ordering distributes over containment: a member precedes and is
/// preceded by everything its container is.
fn distribute_containment(inside: &BoolMatrix, m: &mut BoolMatrix) {
    let len = inside.len;
    for i in 0..len {
        for j in 0..len {
            if inside.get(i, j) {
                for k in 0..len {
                    if m.get(k, j) {
                        m.set(k, i, true);
                    }
                }
                for k in 0..len {
                    if m.get(j, k) {
                        m.set(i, k, true);
                    }
                }
            }
        }
    }
}

impl RelationMatrices {
    /// Build and check all three matrices for a trace of `len` positions.
    pub fn build(len: usize, relations: &Relations) -> Result<Self, Violation> {
        let mut equals = BoolMatrix::new(len);
        for (first, second) in relations.equals.iter() {
            equals.set(first, second, true);
            equals.set(second, first, true);
        }
        equals.close_transitive();

        let mut inside = BoolMatrix::new(len);
        for (first, second) in relations.inside.iter() {
            inside.set(first, second, true);
        }
        merge_equal_rows(&equals, &mut inside);
        inside.close_transitive();
        for position in 0..len {
            if inside.get(position, position) {
                return Err(Violation::ContainmentCycle { position });
            }
        }

        let mut follows = BoolMatrix::new(len);
        for (first, second) in relations.follows.iter() {
            follows.set(first, second, true);
        }
        merge_equal_rows(&equals, &mut follows);
        distribute_containment(&inside, &mut follows);
        follows.close_transitive();
        for position in 0..len {
            if follows.get(position, position) {
                return Err(Violation::SuccessionCycle { position });
            }
        }
        for k in 0..len {
            for i in 0..len {
                if inside.get(k, i) && follows.get(k, i) {
                    return Err(Violation::ContainmentSuccessionConflict { a: k, b: i });
                }
            }
        }

        Ok(RelationMatrices {
            len,
            equals,
            inside,
            follows,
        })
    }

    /// Topological sort by the closed succession matrix.
    ///
    /// Selection sort is fine for the short lists coordination produces,
    /// though it is not stable.
    pub fn sort_events(&self, list: &mut [usize]) {
        if list.len() < 2 {
            return;
        }
        for i in 0..list.len() - 1 {
            let mut min = i;
            for j in i + 1..list.len() {
                if self.follows.get(list[min], list[j]) {
                    min = j;
                }
            }
            list.swap(i, min);
        }
    }

    /// Sort, then require each adjacent pair to be ordered.
    pub fn sort_total(&self, list: &mut [usize]) -> Result<(), Violation> {
        if list.len() < 2 {
            return Ok(());
        }
        self.sort_events(list);
        for i in 0..list.len() - 1 {
            if !self.follows.get(list[i + 1], list[i]) {
                return Err(Violation::OrderNotTotal {
                    a: list[i],
                    b: list[i + 1],
                });
            }
        }
        Ok(())
    }
}

/// Equate events `a` and `b`, recursively equating their members.
///
/// The earlier position wins: the Equals pair and all copied relations
/// point at it. Member lists are sorted with `matrices`, which must have
/// been built before the first merge of the coordination; copied pairs
/// land in `relations` only, so sibling merges see the original ordering.
pub fn merge_equal(
    a: usize,
    b: usize,
    trace: &[TraceElement],
    matrices: &RelationMatrices,
    relations: &mut Relations,
) -> Result<(), Violation> {
    if a == b {
        return Ok(());
    }
    if trace[a].name() != trace[b].name() {
        return Err(Violation::NameMismatch { a, b });
    }
    if let (
        TraceElement::Instance {
            segment: segment_a, ..
        },
        TraceElement::Instance {
            segment: segment_b, ..
        },
    ) = (&trace[a], &trace[b])
    {
        if segment_a != segment_b {
            return Err(Violation::SegmentMismatch { a, b });
        }
    }

    let (a, b) = if a > b { (b, a) } else { (a, b) };
    relations.equals.insert(a, b);

    // Copy succession and containment from b onto a.
    let mut follows_additions = Vec::new();
    for (first, second) in relations.follows.iter() {
        if second == b {
            follows_additions.push((first, a));
        }
        if first == b {
            follows_additions.push((a, second));
        }
    }
    for (first, second) in follows_additions {
        relations.follows.insert(first, second);
    }

    let mut inside_additions = Vec::new();
    for (first, second) in relations.inside.iter() {
        if first == b {
            inside_additions.push((a, second));
        }
    }
    for (first, second) in inside_additions {
        relations.inside.insert(first, second);
    }

    if matches!(trace[a], TraceElement::Atom { .. }) {
        return Ok(());
    }

    // Composite events must agree member by member, in causal order.
    let mut a_list = Vec::new();
    let mut b_list = Vec::new();
    for (first, second) in relations.inside.iter() {
        if second == a {
            a_list.push(first);
        }
        if second == b {
            b_list.push(first);
        }
    }
    if a_list.len() != b_list.len() {
        return Err(Violation::ChildCountMismatch {
            left: a_list.len(),
            right: b_list.len(),
        });
    }
    matrices.sort_events(&mut a_list);
    matrices.sort_events(&mut b_list);
    for i in 0..a_list.len() {
        merge_equal(a_list[i], b_list[i], trace, matrices, relations)?;
    }
    Ok(())
}
