// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher: decides which handlers see an event, and in what order.
//!
//! ## Ordering
//!
//! 1. Active handlers are offered the event newest first. The first one that
//!    returns `true` claims it and dispatch stops there; no other active or
//!    root handler sees the event.
//! 2. If no active handler claims it, every root handler is invoked in the
//!    order roots were added. Root return values are ignored, so roots never
//!    suppress one another.
//!
//! ## Snapshots
//!
//! The handler lists are copied under the shared lock and the lock is released
//! before any handler runs. A handler captured in the snapshot is still
//! invoked even if it is popped while the dispatch is in flight, and a handler
//! pushed mid-dispatch is not seen until the next event.

use std::sync::Arc;

use crate::registry::Adapter;
use crate::stack::{Entry, HandlerStack};
use crate::types::{HandlerId, Outcome};

/// The handlers one dispatch will consider, copied out of the stack.
pub struct Snapshot<E, C> {
    active: Vec<Entry<E, C>>,
    roots: Vec<Entry<E, C>>,
}

impl<E, C> core::fmt::Debug for Snapshot<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ids = |entries: &[Entry<E, C>]| entries.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        f.debug_struct("Snapshot")
            .field("active", &ids(&self.active))
            .field("roots", &ids(&self.roots))
            .finish()
    }
}

impl<E, C> Snapshot<E, C> {
    /// Ids in the order they will be offered the event: active newest first, then roots.
    pub fn order(&self) -> Vec<HandlerId> {
        self.active_newest_first()
            .chain(self.roots.iter())
            .map(|(id, _)| *id)
            .collect()
    }

    fn active_newest_first(&self) -> impl Iterator<Item = &(HandlerId, Arc<Adapter<E, C>>)> {
        self.active.iter().rev()
    }

    /// Run the dispatch algorithm over this snapshot.
    pub fn run(&self, cx: &C, event: &E) -> Outcome {
        for (id, adapter) in self.active_newest_first() {
            if adapter.handle(cx, event) {
                tracing::trace!(%id, "event claimed by active handler");
                return Outcome::Claimed(*id);
            }
        }
        for (_, adapter) in &self.roots {
            let _ = adapter.handle(cx, event);
        }
        tracing::trace!(roots = self.roots.len(), "event fell through to roots");
        Outcome::Fallback {
            roots: self.roots.len(),
        }
    }
}

impl<E, C> HandlerStack<E, C> {
    /// Take a stable copy of the active and root handlers.
    pub fn snapshot(&self) -> Snapshot<E, C> {
        let (active, roots) = self.entries();
        Snapshot { active, roots }
    }

    /// Dispatch one event.
    ///
    /// No stack lock is held while handlers run, so handlers may push or pop,
    /// including popping themselves. There is no timeout: a handler that never
    /// returns blocks this call.
    pub fn handle(&self, cx: &C, event: &E) -> Outcome {
        self.snapshot().run(cx, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capabilities, Handler, HandlerRef};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Dispatch context for tests: gives handlers access to the stack.
    #[derive(Default)]
    struct Cx {
        stack: HandlerStack<&'static str, Cx>,
        log: Mutex<Vec<&'static str>>,
    }

    type Ref = HandlerRef<&'static str, Cx>;

    #[derive(Default)]
    struct Probe {
        name: &'static str,
        claim: AtomicBool,
        pop_self: AtomicBool,
        could_handle: AtomicUsize,
        handled: AtomicUsize,
        children_popped: AtomicUsize,
    }

    impl Probe {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                ..Self::default()
            })
        }
        fn seen(&self) -> usize {
            self.could_handle.load(Ordering::Relaxed)
        }
        fn handled(&self) -> usize {
            self.handled.load(Ordering::Relaxed)
        }
        fn notified(&self) -> usize {
            self.children_popped.load(Ordering::Relaxed)
        }
    }

    impl Handler<&'static str, Cx> for Probe {
        fn handle(&self, cx: &Cx, _event: &&'static str) -> bool {
            self.could_handle.fetch_add(1, Ordering::Relaxed);
            cx.log.lock().unwrap().push(self.name);
            if self.pop_self.load(Ordering::Relaxed) {
                cx.stack.pop(cx, self);
            }
            if self.claim.load(Ordering::Relaxed) {
                self.handled.fetch_add(1, Ordering::Relaxed);
                return true;
            }
            false
        }
        fn on_child_removed(&self, _cx: &Cx, _child: &Ref, _id: HandlerId) {
            self.children_popped.fetch_add(1, Ordering::Relaxed);
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities::CHILD_REMOVED
        }
    }

    fn log(cx: &Cx) -> Vec<&'static str> {
        core::mem::take(&mut *cx.log.lock().unwrap())
    }

    #[test]
    fn claim_short_circuit_and_root_fallback() {
        let cx = Cx::default();
        let c1 = Probe::named("c1");
        let c2 = Probe::named("c2");
        let c3 = Probe::named("c3");
        let c4 = Probe::named("c4");

        cx.stack.add_root(c1.clone());
        cx.stack.add_root(c4.clone());
        cx.stack.push(c2.clone(), Some(&*c1));
        cx.stack.push(c3.clone(), None);

        let out = cx.stack.handle(&cx, &"test");
        assert_eq!(out, Outcome::Fallback { roots: 2 });
        assert_eq!(log(&cx), vec!["c3", "c2", "c1", "c4"]);

        c3.claim.store(true, Ordering::Relaxed);
        assert!(cx.stack.handle(&cx, &"test").is_claimed());
        assert_eq!(log(&cx), vec!["c3"]);
        assert_eq!((c1.seen(), c2.seen(), c3.seen(), c4.seen()), (1, 1, 2, 1));
        assert_eq!((c1.handled(), c2.handled(), c3.handled()), (0, 0, 1));

        // A claiming root does not stop the other roots.
        c1.claim.store(true, Ordering::Relaxed);
        c3.claim.store(false, Ordering::Relaxed);
        cx.stack.handle(&cx, &"test");
        assert_eq!((c1.seen(), c2.seen(), c3.seen(), c4.seen()), (2, 2, 3, 2));
        assert_eq!((c1.handled(), c2.handled(), c3.handled()), (1, 0, 1));

        // The root pops itself mid-dispatch, which also removes its child c2.
        c1.pop_self.store(true, Ordering::Relaxed);
        cx.stack.handle(&cx, &"test");
        assert_eq!((c1.seen(), c2.seen(), c3.seen(), c4.seen()), (3, 3, 4, 3));
        assert_eq!(c1.handled(), 2);

        cx.stack.handle(&cx, &"test");
        assert_eq!((c1.seen(), c2.seen(), c3.seen(), c4.seen()), (3, 3, 5, 4));
        assert_eq!((c1.handled(), c2.handled(), c3.handled()), (2, 0, 1));
    }

    #[test]
    fn newest_active_claims_before_older_and_roots() {
        let cx = Cx::default();
        let x = Probe::named("x");
        let y = Probe::named("y");
        let p = Probe::named("p");
        let q = Probe::named("q");
        cx.stack.push(x.clone(), None);
        let y_id = cx.stack.push(y.clone(), None);
        cx.stack.add_root(p.clone());
        cx.stack.add_root(q.clone());

        y.claim.store(true, Ordering::Relaxed);
        assert_eq!(cx.stack.handle(&cx, &"e"), Outcome::Claimed(y_id));
        assert_eq!(log(&cx), vec!["y"]);
        assert_eq!((x.seen(), p.seen(), q.seen()), (0, 0, 0));
    }

    #[test]
    fn roots_are_invoked_once_each_regardless_of_result() {
        let cx = Cx::default();
        let p = Probe::named("p");
        let q = Probe::named("q");
        p.claim.store(true, Ordering::Relaxed);
        cx.stack.add_root(p.clone());
        cx.stack.add_root(q.clone());

        assert_eq!(cx.stack.handle(&cx, &"e"), Outcome::Fallback { roots: 2 });
        assert_eq!((p.seen(), q.seen()), (1, 1));
        assert_eq!(log(&cx), vec!["p", "q"]);
    }

    #[test]
    fn self_pop_mid_dispatch_notifies_grandparent_only() {
        let cx = Cx::default();
        let p1 = Probe::named("p1");
        let p2 = Probe::named("p2");
        let p3 = Probe::named("p3");
        cx.stack.push(p1.clone(), None);
        cx.stack.push(p2.clone(), Some(&*p1));
        cx.stack.push(p3.clone(), Some(&*p2));

        cx.stack.handle(&cx, &"first");
        assert_eq!((p1.notified(), p2.notified(), p3.notified()), (0, 0, 0));
        let _ = log(&cx);

        p2.claim.store(true, Ordering::Relaxed);
        p2.pop_self.store(true, Ordering::Relaxed);
        assert!(cx.stack.handle(&cx, &"second").is_claimed());

        assert_eq!(log(&cx), vec!["p3", "p2"]);
        assert_eq!((p1.notified(), p2.notified(), p3.notified()), (1, 0, 0));
        assert_eq!(p1.seen(), 1);
        assert_eq!(cx.stack.current_active().len(), 1);
        assert!(cx.stack.id_of(&*p2).is_none());
        assert!(cx.stack.id_of(&*p3).is_none());
    }

    #[test]
    fn self_pop_with_no_survivors_empties_the_stack() {
        let cx = Cx::default();
        let p1 = Probe::named("p1");
        let p2 = Probe::named("p2");
        let p3 = Probe::named("p3");
        cx.stack.push(p1.clone(), None);
        cx.stack.push(p2.clone(), Some(&*p1));
        cx.stack.push(p3.clone(), Some(&*p2));

        p1.claim.store(true, Ordering::Relaxed);
        p1.pop_self.store(true, Ordering::Relaxed);
        assert!(cx.stack.handle(&cx, &"e").is_claimed());
        assert!(cx.stack.current_active().is_empty());
        assert_eq!((p1.notified(), p2.notified(), p3.notified()), (0, 0, 0));
    }

    #[test]
    fn snapshot_survives_mid_dispatch_pop_of_a_later_handler() {
        /// Pops another handler, then declines.
        struct Popper {
            victim: Ref,
        }
        impl Handler<&'static str, Cx> for Popper {
            fn handle(&self, cx: &Cx, _event: &&'static str) -> bool {
                cx.stack.pop(cx, &*self.victim);
                false
            }
        }

        let cx = Cx::default();
        let victim = Probe::named("victim");
        cx.stack.push(victim.clone(), None);
        let popper: Ref = Arc::new(Popper {
            victim: victim.clone(),
        });
        cx.stack.push(Arc::clone(&popper), None);

        cx.stack.handle(&cx, &"e");
        // Captured before the pop, so still invoked.
        assert_eq!(victim.seen(), 1);
        assert!(cx.stack.id_of(&*victim).is_none());
    }

    #[test]
    fn handler_pushed_mid_dispatch_is_not_seen_until_next_event() {
        struct Opener {
            child: Arc<Probe>,
        }
        impl Handler<&'static str, Cx> for Opener {
            fn handle(&self, cx: &Cx, _event: &&'static str) -> bool {
                if cx.stack.id_of(&*self.child).is_none() {
                    cx.stack.push(self.child.clone(), Some(self));
                }
                false
            }
        }

        let cx = Cx::default();
        let child = Probe::named("child");
        let opener: Ref = Arc::new(Opener {
            child: child.clone(),
        });
        cx.stack.add_root(Arc::clone(&opener));

        cx.stack.handle(&cx, &"one");
        assert_eq!(child.seen(), 0);
        assert!(cx.stack.parent_of(&*child).is_some());

        cx.stack.handle(&cx, &"two");
        assert_eq!(child.seen(), 1);
    }

    #[test]
    fn parent_may_reenter_the_stack_when_notified() {
        /// Replaces a popped child with a fresh one.
        struct Respawn {
            spawned: AtomicUsize,
        }
        impl Handler<&'static str, Cx> for Respawn {
            fn handle(&self, _cx: &Cx, _event: &&'static str) -> bool {
                false
            }
            fn on_child_removed(&self, cx: &Cx, _child: &Ref, _id: HandlerId) {
                self.spawned.fetch_add(1, Ordering::Relaxed);
                cx.stack.push(Probe::named("respawned"), Some(self));
            }
            fn capabilities(&self) -> Capabilities {
                Capabilities::CHILD_REMOVED
            }
        }

        let cx = Cx::default();
        let parent = Arc::new(Respawn {
            spawned: AtomicUsize::new(0),
        });
        let child = Probe::named("child");
        cx.stack.push(parent.clone(), None);
        cx.stack.push(child.clone(), Some(&*parent));

        cx.stack.pop(&cx, &*child);
        assert_eq!(parent.spawned.load(Ordering::Relaxed), 1);
        assert_eq!(cx.stack.len(), 2);
    }

    #[test]
    fn snapshot_order_lists_active_newest_first_then_roots() {
        let cx = Cx::default();
        let r = cx.stack.add_root(Probe::named("r"));
        let a = cx.stack.push(Probe::named("a"), None);
        let b = cx.stack.push(Probe::named("b"), None);
        let snap = cx.stack.snapshot();
        assert_eq!(snap.order(), vec![b, a, r]);
        assert!(format!("{snap:?}").contains("Snapshot"));
    }

    #[test]
    fn empty_stack_falls_back_to_no_roots() {
        let cx = Cx::default();
        assert_eq!(cx.stack.handle(&cx, &"e"), Outcome::Fallback { roots: 0 });
    }
}
