// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Built-in demonstration grammars for the command line.
//!
//! Each model returns the sealed grammar together with the name of the
//! composite whose traces the renderers should show. `scope` bounds the
//! branch count where a model repeats a structure; the other models
//! ignore it.

use crate::grammar::{Grammar, GrammarBuilder};

pub fn available() -> &'static [&'static str] {
    &["handshake", "vending", "pipeline", "relay"]
}

/// Build a named model, or `None` when the name is unknown.
pub fn build(name: &str, scope: usize) -> Option<(Grammar, String)> {
    match name {
        "handshake" => Some(handshake()),
        "vending" => Some(vending()),
        "pipeline" => Some(pipeline()),
        "relay" => Some(relay(scope)),
        _ => None,
    }
}

/// Two actors sharing a `request` event through coordination. The
/// sender may or may not see a confirmation, so the schema has two
/// traces, each with the two `request` events merged into one.
fn handshake() -> (Grammar, String) {
    let mut builder = GrammarBuilder::new();

    let request = builder.atom("request");
    let confirm = builder.atom("confirm");
    let empty = builder.empty();
    let maybe_confirm = builder.alternatives(vec![confirm, empty]);
    builder.root("Sender", vec![request, maybe_confirm]);

    let request = builder.atom("request");
    let reply = builder.atom("reply");
    builder.root("Receiver", vec![request, reply]);

    let sender = builder.occurrence("Sender");
    let receiver = builder.occurrence("Receiver");
    let shared = builder.coordinate("request", "Sender", "Receiver");
    builder.schema("Session", vec![sender, receiver, shared]);

    let (grammar, _) = builder.finish();
    (grammar, "Session".to_owned())
}

/// One actor, three drink choices, an optional receipt: six traces.
fn vending() -> (Grammar, String) {
    let mut builder = GrammarBuilder::new();

    let coin = builder.atom("coin");
    let coffee = builder.atom("coffee");
    let tea = builder.atom("tea");
    let juice = builder.atom("juice");
    let drink = builder.alternatives(vec![coffee, tea, juice]);
    let receipt = builder.atom("receipt");
    let empty = builder.empty();
    let slip = builder.alternatives(vec![receipt, empty]);
    builder.root("Machine", vec![coin, drink, slip]);

    let (grammar, _) = builder.finish();
    (grammar, "Machine".to_owned())
}

/// Two workers replayed from a shared store; the schema enumerates the
/// cartesian product of their traces.
fn pipeline() -> (Grammar, String) {
    let mut builder = GrammarBuilder::new();

    let take = builder.atom("take");
    let process = builder.atom("process");
    let reject = builder.atom("reject");
    let outcome = builder.alternatives(vec![process, reject]);
    let put = builder.atom("put");
    builder.composite("Worker", vec![take, outcome, put]);

    let first = builder.occurrence("Worker");
    let second = builder.occurrence("Worker");
    builder.schema("Plant", vec![first, second]);

    let (grammar, _) = builder.finish();
    (grammar, "Plant".to_owned())
}

/// `scope` unordered pulses between an arming and a firing event.
fn relay(scope: usize) -> (Grammar, String) {
    let mut builder = GrammarBuilder::new();

    let arm = builder.atom("arm");
    let pulses: Vec<_> = (1..=scope.max(1))
        .map(|i| builder.atom(&format!("pulse_{i}")))
        .collect();
    let burst = builder.concurrent(pulses);
    let fire = builder.atom("fire");
    builder.root("Relay", vec![arm, burst, fire]);

    let (grammar, _) = builder.finish();
    (grammar, "Relay".to_owned())
}
