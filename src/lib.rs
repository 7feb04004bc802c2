// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exhaustive generator of causally-ordered event traces from behavior
//! grammars.
//!
//! A grammar is a tree of producers: atomic events, ordered alternatives,
//! sequences, unordered concurrent sets, named composites, occurrences
//! that replay an already-harvested composite, and coordination nodes
//! that equate shared events across composites. Harvesting a composite
//! enumerates every trace the tree can produce, together with three
//! relations over trace positions: succession, containment, and
//! equality.
//!
//! # Architecture
//!
//! Enumeration is cursor-driven backtracking rather than tree search:
//!
//! 1. **Traversal** walks the producer tree once per attempt. Every
//!    choice point keeps a cursor in the [`trace::TraceContext`]; a
//!    traversal reports whether it failed, completed its last option, or
//!    can produce another variant next time.
//! 2. **Holding** freezes the cursors of producers to the left of the
//!    one that advanced, so the attempts step through option
//!    combinations like a mixed-radix counter, rightmost fastest.
//! 3. **Harvesting** ([`harvest::Generator`]) repeats attempts until the
//!    tree is exhausted, validating each candidate's relations with the
//!    [`checker`] and storing accepted traces as segments for occurrence
//!    splicing.
//!
//! # Example
//!
//! ```
//! use trace_gen::grammar::GrammarBuilder;
//! use trace_gen::harvest::Generator;
//!
//! let mut builder = GrammarBuilder::new();
//! let coin = builder.atom("coin");
//! let coffee = builder.atom("coffee");
//! let tea = builder.atom("tea");
//! let drink = builder.alternatives(vec![coffee, tea]);
//! builder.root("machine", vec![coin, drink]);
//! let (grammar, unresolved) = builder.finish();
//! assert!(unresolved.is_empty());
//!
//! let mut generator = Generator::new(grammar);
//! let summary = generator.harvest("machine")?;
//! assert_eq!(summary.traces, 2);
//! # Ok::<(), trace_gen::harvest::HarvestError>(())
//! ```

pub mod checker;
pub mod engine;
pub mod grammar;
pub mod harvest;
pub mod models;
pub mod output;
pub mod stats;
pub mod trace;

// Re-export commonly used types
pub use engine::{hold, traverse, Outcome};
pub use grammar::{Grammar, GrammarBuilder};
pub use harvest::Generator;
pub use trace::TraceContext;
