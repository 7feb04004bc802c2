// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Statistics are stored in the trace context and accumulate across every
//! attempt of a harvest run: counters for attempts and outcomes, one slot
//! per violation kind, and trace length extremes for the run summary.

use crate::checker::Violation;
use std::collections::BTreeMap;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone)]
#[repr(u8)]
pub enum Counters {
    #[strum(serialize = "attempts")]
    Attempts,
    #[strum(serialize = "failed_attempts")]
    FailedAttempts,
    #[strum(serialize = "traces_stored")]
    TracesStored,
    #[strum(serialize = "events_emitted")]
    EventsEmitted,
    #[strum(serialize = "relation_pairs")]
    RelationPairs,
    #[strum(serialize = "storage_bytes")]
    StorageBytes,
    #[strum(serialize = "segments_spliced")]
    SegmentsSpliced,
    #[strum(serialize = "fallback_instances")]
    FallbackInstances,
}

const COUNT: usize = Counters::COUNT + Violation::COUNT;

#[derive(Debug)]
pub struct Statistics {
    stats: [u64; COUNT],
    min_trace: Option<usize>,
    max_trace: Option<usize>,
}

impl Default for Statistics {
    fn default() -> Self {
        Statistics {
            stats: [0; COUNT],
            min_trace: None,
            max_trace: None,
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn bump(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Increment the specified counter by `amount`.
    pub fn add(&mut self, counter: Counters, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Count a rejected attempt against the violation's own slot.
    pub fn record_violation(&mut self, violation: &Violation) {
        self.stats[Counters::COUNT + violation.counter_index()] += 1;
    }

    /// Total rejections across every violation kind.
    pub fn violations(&self) -> u64 {
        self.stats[Counters::COUNT..].iter().sum()
    }

    /// Fold a stored trace into the running totals and extremes.
    ///
    /// `events` excludes the position-0 composite marker.
    pub fn observe_trace(&mut self, events: usize, pairs: usize) {
        self.bump(Counters::TracesStored);
        self.add(Counters::EventsEmitted, events as u64);
        self.add(Counters::RelationPairs, pairs as u64);
        self.min_trace = Some(match self.min_trace {
            Some(current) => current.min(events),
            None => events,
        });
        self.max_trace = Some(match self.max_trace {
            Some(current) => current.max(events),
            None => events,
        });
    }

    /// Shortest stored trace of the run, in events.
    pub fn min_trace(&self) -> Option<usize> {
        self.min_trace
    }

    /// Longest stored trace of the run, in events.
    pub fn max_trace(&self) -> Option<usize> {
        self.max_trace
    }

    /// Every counter and violation slot under its stable name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        let mut map = BTreeMap::new();
        for counter in Counters::iter() {
            let value = self.get(counter);
            map.insert(counter.into(), value);
        }
        for (offset, &label) in Violation::LABELS.iter().enumerate() {
            map.insert(label, self.stats[Counters::COUNT + offset]);
        }
        map
    }
}
