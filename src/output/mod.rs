// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Renderers over harvested segment stores.
//!
//! Both renderers read a composite's store without touching generator
//! state, so they can run any number of times after a harvest. The text
//! form is a human-readable listing; the JSON form is the compact
//! visualizer format, with equality-merged duplicates removed.

pub mod json;
pub mod render;
