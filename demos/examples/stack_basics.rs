// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler stack basics.
//!
//! Builds a root plus a two-level chain of contexts, dispatches a few events,
//! then pops the middle context and shows the cascade and the parent notice.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p colloquy_demos --example stack_basics`

use std::sync::Arc;

use colloquy_stack::{Capabilities, Handler, HandlerId, HandlerRef, HandlerStack};

type Stack = HandlerStack<&'static str, ()>;

struct Named {
    name: &'static str,
    claims: &'static str,
}

impl Handler<&'static str, ()> for Named {
    fn handle(&self, _cx: &(), event: &&'static str) -> bool {
        let claimed = *event == self.claims;
        println!("  {} saw {:?} -> {}", self.name, event, claimed);
        claimed
    }

    fn on_child_removed(&self, _cx: &(), _child: &HandlerRef<&'static str, ()>, id: HandlerId) {
        println!("  {} was told child {id} closed", self.name);
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::CHILD_REMOVED
    }
}

fn named(name: &'static str, claims: &'static str) -> Arc<Named> {
    Arc::new(Named { name, claims })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let stack = Stack::new();
    stack.add_root(named("root", "never"));
    let menu = named("menu", "1");
    let dialog = named("dialog", "yes");
    stack.push(menu.clone(), None);
    stack.push(dialog.clone(), Some(&*menu));

    for event in ["yes", "1", "hello"] {
        println!("event {event:?}:");
        println!("  => {:?}", stack.handle(&(), &event));
    }

    println!("pop menu:");
    stack.pop(&(), &*menu);
    println!("  live nodes: {}", stack.len());

    println!("event \"yes\":");
    println!("  => {:?}", stack.handle(&(), &"yes"));

    println!("push dialog under a fresh menu, pop dialog:");
    stack.push(menu.clone(), None);
    stack.push(dialog.clone(), Some(&*menu));
    stack.pop(&(), &*dialog);
    println!("  active: {}", stack.current_active().len());
}
