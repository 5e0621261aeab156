// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colloquy Stack: a hierarchical, identity-addressed handler stack for event dispatch.
//!
//! ## Overview
//!
//! This crate composes independent event handlers into a dynamic tree of
//! active contexts (think nested menus or sub-dialogs in a chat bot), routes
//! each incoming event to the right subset of that tree, and tells a parent
//! when one of its child contexts is closed.
//!
//! It does not read events from anywhere. Feed it one event at a time with
//! [`HandlerStack::handle`]; the transport, persistence and the handlers
//! themselves belong to the caller.
//!
//! ## Roots and active contexts
//!
//! - Roots ([`HandlerStack::add_root`]) are always-on listeners. They are
//!   offered every event that no active context claims, in the order they were
//!   added, and never suppress one another.
//! - Active contexts ([`HandlerStack::push`]) form a LIFO stack. The most
//!   recently pushed one is offered each event first; the first to return
//!   `true` claims the event and nothing else sees it.
//! - A pushed context may name a parent. Popping a context removes its whole
//!   subtree, and the popped node's direct parent is notified through
//!   [`Handler::on_child_removed`] if it declares
//!   [`Capabilities::CHILD_REMOVED`]. Descendants removed by the cascade do not
//!   generate notifications.
//!
//! ## Identity
//!
//! Handlers are shared as [`HandlerRef`] (`Arc<dyn Handler>`) and compared by
//! allocation, never by value. The [`registry`] maps each reference to one
//! adapter for the life of the stack, and each push issues a fresh
//! [`HandlerId`] that is never reused.
//!
//! ## Reentrancy
//!
//! Handler code always runs without the stack lock held. A handler may push,
//! pop (including popping itself) or query parents from inside
//! [`Handler::handle`] or [`Handler::on_child_removed`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use colloquy_stack::{Handler, HandlerStack, Outcome};
//!
//! /// Claims events while it is the innermost context.
//! struct Menu;
//! impl Handler<String, ()> for Menu {
//!     fn handle(&self, _cx: &(), event: &String) -> bool {
//!         event.starts_with("menu")
//!     }
//! }
//!
//! /// Counts everything nobody else claimed.
//! #[derive(Default)]
//! struct Fallback(AtomicUsize);
//! impl Handler<String, ()> for Fallback {
//!     fn handle(&self, _cx: &(), _event: &String) -> bool {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         false
//!     }
//! }
//!
//! let stack: HandlerStack<String, ()> = HandlerStack::new();
//! let fallback = Arc::new(Fallback::default());
//! stack.add_root(fallback.clone());
//!
//! let menu = Arc::new(Menu);
//! let menu_id = stack.push(menu.clone(), None);
//!
//! assert_eq!(stack.handle(&(), &"menu 2".to_string()), Outcome::Claimed(menu_id));
//! assert_eq!(stack.handle(&(), &"hello".to_string()), Outcome::Fallback { roots: 1 });
//! assert_eq!(fallback.0.load(Ordering::Relaxed), 1);
//!
//! stack.pop(&(), &*menu);
//! assert!(stack.current_active().is_empty());
//! ```

pub mod dispatch;
pub mod notify;
pub mod registry;
pub mod stack;
pub mod types;

pub use dispatch::Snapshot;
pub use stack::HandlerStack;
pub use types::{Capabilities, Handler, HandlerId, HandlerRef, Outcome};
