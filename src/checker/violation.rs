// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Axiom violations detected while checking or coordinating a trace.
//!
//! A violation rejects the current attempt only: the harvest driver counts
//! it and moves on to the next alternative assignment.

use strum_macros::EnumCount as EnumCountMacro;
use thiserror::Error;

/// Everything that can disqualify a candidate trace.
///
/// Positions are indices into the trace buffer of the attempt that failed.
#[derive(Debug, Clone, PartialEq, Eq, EnumCountMacro, Error)]
pub enum Violation {
    /// An event transitively contains itself.
    #[error("event {position} contains itself")]
    ContainmentCycle { position: usize },

    /// An event transitively precedes itself.
    #[error("event {position} precedes itself")]
    SuccessionCycle { position: usize },

    /// An event both contains and precedes another.
    #[error("event {a} both contains and precedes event {b}")]
    ContainmentSuccessionConflict { a: usize, b: usize },

    /// Coordinated events carry different names.
    #[error("cannot equate event {a} with differently named event {b}")]
    NameMismatch { a: usize, b: usize },

    /// Coordinated composites expanded from different stored segments.
    #[error("events {a} and {b} come from different stored segments")]
    SegmentMismatch { a: usize, b: usize },

    /// Coordinated composites contain different numbers of events.
    #[error("coordination needs matching counts, got {left} and {right}")]
    ChildCountMismatch { left: usize, right: usize },

    /// Events inside a coordinated composite are only partially ordered.
    #[error("events {a} and {b} are unordered within a coordinated group")]
    OrderNotTotal { a: usize, b: usize },
}

impl Violation {
    /// Slot of this variant in the statistics array (after the counters).
    pub(crate) fn counter_index(&self) -> usize {
        match self {
            Violation::ContainmentCycle { .. } => 0,
            Violation::SuccessionCycle { .. } => 1,
            Violation::ContainmentSuccessionConflict { .. } => 2,
            Violation::NameMismatch { .. } => 3,
            Violation::SegmentMismatch { .. } => 4,
            Violation::ChildCountMismatch { .. } => 5,
            Violation::OrderNotTotal { .. } => 6,
        }
    }

    /// Stable name for reports, one per variant.
    pub(crate) const LABELS: [&'static str; 7] = [
        "containment_cycle",
        "succession_cycle",
        "containment_succession_conflict",
        "name_mismatch",
        "segment_mismatch",
        "child_count_mismatch",
        "order_not_total",
    ];
}
