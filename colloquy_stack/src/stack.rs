// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler stack implementation: node storage, mutation, cascade removal and reads.
//!
//! ## Structure
//!
//! - `nodes`: id → node, the authoritative store.
//! - `root_ids`: permanent listeners, in insertion order.
//! - `active_ids`: pushed contexts, oldest first.
//! - `parents`: child id → parent id. An absent entry means no parent.
//! - `children`: the reverse of `parents`, so a cascade visits each
//!   descendant once.
//! - `live`: adapter → live ids for that handler, oldest first.
//!
//! Every live id is in exactly one of `root_ids` and `active_ids`. Cascade
//! removal walks an explicit worklist, so subtree depth is bounded by memory
//! rather than by the thread's stack.
//!
//! ## Locking
//!
//! One coarse reader/writer lock covers the whole structure. Mutations take
//! the exclusive lock, reads take the shared lock. No handler code runs while
//! the lock is held: dispatch copies a snapshot first (see
//! [`dispatch`](crate::dispatch)), and child-removed notifications are
//! delivered after [`HandlerStack::pop`] releases the lock.

use core::num::NonZeroU64;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::notify::{self, ChildRemoved};
use crate::registry::{Adapter, AdapterKey, Registry};
use crate::types::{Handler, HandlerId, HandlerRef};

/// Which ordered list a live node belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Membership {
    Root,
    Active,
}

#[derive(Copy, Clone, Debug)]
struct Node {
    adapter: AdapterKey,
    membership: Membership,
}

struct Inner<E, C> {
    registry: Registry<E, C>,
    nodes: BTreeMap<HandlerId, Node>,
    root_ids: Vec<HandlerId>,
    active_ids: Vec<HandlerId>,
    parents: BTreeMap<HandlerId, HandlerId>,
    children: HashMap<HandlerId, Vec<HandlerId>>,
    live: HashMap<AdapterKey, Vec<HandlerId>>,
    next_id: NonZeroU64,
}

pub(crate) type Entry<E, C> = (HandlerId, Arc<Adapter<E, C>>);

/// A dynamic tree of active handler contexts plus always-on root handlers.
///
/// ## Usage
///
/// - [`add_root`](Self::add_root) registers permanent listeners. Every root
///   sees every event that no active handler claims.
/// - [`push`](Self::push) opens a nested context, optionally under a parent.
///   The most recently pushed context gets the first chance at each event.
/// - [`pop`](Self::pop) closes a context and its whole subtree, and tells the
///   direct parent of the popped node (if it opted in).
/// - [`handle`](Self::handle) dispatches one event.
///
/// All methods take `&self`; the stack is safe to share between threads and
/// to call into from inside handler code.
pub struct HandlerStack<E, C> {
    inner: RwLock<Inner<E, C>>,
}

impl<E, C> Default for HandlerStack<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> core::fmt::Debug for HandlerStack<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Some(inner) = self.inner.try_read() else {
            return f.debug_struct("HandlerStack").finish_non_exhaustive();
        };
        f.debug_struct("HandlerStack")
            .field("roots", &inner.root_ids)
            .field("active", &inner.active_ids)
            .field("parents", &inner.parents)
            .field("registered", &inner.registry.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

impl<E, C> HandlerStack<E, C> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                registry: Registry::new(),
                nodes: BTreeMap::new(),
                root_ids: Vec::new(),
                active_ids: Vec::new(),
                parents: BTreeMap::new(),
                children: HashMap::new(),
                live: HashMap::new(),
                next_id: NonZeroU64::MIN,
            }),
        }
    }

    /// Register `handler` as a permanent root listener.
    ///
    /// Roots are dispatched in the order they were added.
    pub fn add_root(&self, handler: HandlerRef<E, C>) -> HandlerId {
        let mut inner = self.inner.write();
        let id = inner.insert(&handler, Membership::Root);
        inner.root_ids.push(id);
        tracing::debug!(%id, "added root handler");
        id
    }

    /// Push `handler` as a new active context.
    ///
    /// If `parent` names a live node, that node becomes the parent of the new
    /// one. Otherwise the new node has no parent.
    pub fn push(
        &self,
        handler: HandlerRef<E, C>,
        parent: Option<&dyn Handler<E, C>>,
    ) -> HandlerId {
        let mut inner = self.inner.write();
        // Resolve before inserting so a handler pushed under itself binds to its older node.
        let parent_id = inner.find_id(parent);
        let id = inner.insert(&handler, Membership::Active);
        inner.active_ids.push(id);
        if let Some(parent_id) = parent_id {
            inner.parents.insert(id, parent_id);
            inner.children.entry(parent_id).or_default().push(id);
        }
        tracing::debug!(%id, parent = ?parent_id.map(HandlerId::get), "pushed handler");
        id
    }

    /// Pop the live node for `handler`, removing its whole subtree.
    ///
    /// If the popped node has a live parent that observes child removal, the
    /// parent is notified once, after the stack lock is released. Descendants
    /// removed along the way never cause notifications.
    ///
    /// # Panics
    ///
    /// Panics if `handler` has no live node. That means push and pop calls are
    /// mismatched, which is a bug in the caller.
    pub fn pop(&self, cx: &C, handler: &dyn Handler<E, C>) {
        let notice = {
            let mut inner = self.inner.write();
            let Some(id) = inner.find_id(Some(handler)) else {
                drop(inner);
                panic!("pop of a handler with no live node: push/pop calls are mismatched");
            };
            tracing::debug!(%id, "popping handler");
            inner.remove(id)
        };
        if let Some(notice) = notice {
            notify::notify_parent(cx, &notice);
        }
    }

    /// The handler recorded as the parent of `handler`'s node.
    ///
    /// Returns `None` if `handler` has no live node, was pushed without a
    /// parent, or if the recorded parent is no longer live.
    pub fn parent_of(&self, handler: &dyn Handler<E, C>) -> Option<HandlerRef<E, C>> {
        let inner = self.inner.read();
        let id = inner.find_id(Some(handler))?;
        let parent = inner.live_parent(id)?;
        inner.handler_of(parent)
    }

    /// Active handlers in push order, oldest first.
    pub fn current_active(&self) -> Vec<HandlerRef<E, C>> {
        let inner = self.inner.read();
        inner.handlers(&inner.active_ids)
    }

    /// Root handlers in the order they were added.
    pub fn current_roots(&self) -> Vec<HandlerRef<E, C>> {
        let inner = self.inner.read();
        inner.handlers(&inner.root_ids)
    }

    /// Id of the live node for `handler`, if any.
    ///
    /// When the same handler is live more than once, the oldest node wins.
    pub fn id_of(&self, handler: &dyn Handler<E, C>) -> Option<HandlerId> {
        self.inner.read().find_id(Some(handler))
    }

    /// Returns `true` if `id` names a live node.
    pub fn is_alive(&self, id: HandlerId) -> bool {
        self.inner.read().nodes.contains_key(&id)
    }

    /// Number of live nodes, roots and active.
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Returns `true` if there are no live nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.read().nodes.is_empty()
    }

    /// Number of distinct handler references the stack has ever seen.
    pub fn registered(&self) -> usize {
        self.inner.read().registry.len()
    }

    /// Copy the active and root entries under a single shared lock.
    pub(crate) fn entries(&self) -> (Vec<Entry<E, C>>, Vec<Entry<E, C>>) {
        let inner = self.inner.read();
        (inner.entries(&inner.active_ids), inner.entries(&inner.root_ids))
    }
}

impl<E, C> Inner<E, C> {
    fn next_id(&mut self) -> HandlerId {
        let id = HandlerId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn insert(&mut self, handler: &HandlerRef<E, C>, membership: Membership) -> HandlerId {
        let adapter = self.registry.adapter_for(handler);
        let id = self.next_id();
        self.live.entry(adapter).or_default().push(id);
        self.nodes.insert(
            id,
            Node {
                adapter,
                membership,
            },
        );
        id
    }

    fn find_id(&self, handler: Option<&dyn Handler<E, C>>) -> Option<HandlerId> {
        let key = self.registry.lookup(handler)?;
        self.live.get(&key)?.first().copied()
    }

    fn live_parent(&self, id: HandlerId) -> Option<HandlerId> {
        self.parents
            .get(&id)
            .copied()
            .filter(|parent| self.nodes.contains_key(parent))
    }

    fn adapter_of(&self, id: HandlerId) -> Option<&Arc<Adapter<E, C>>> {
        self.nodes.get(&id).map(|node| self.registry.get(node.adapter))
    }

    fn handler_of(&self, id: HandlerId) -> Option<HandlerRef<E, C>> {
        self.adapter_of(id).map(|adapter| Arc::clone(adapter.handler()))
    }

    fn handlers(&self, ids: &[HandlerId]) -> Vec<HandlerRef<E, C>> {
        ids.iter().filter_map(|&id| self.handler_of(id)).collect()
    }

    fn entries(&self, ids: &[HandlerId]) -> Vec<Entry<E, C>> {
        ids.iter()
            .filter_map(|&id| self.adapter_of(id).map(|a| (id, Arc::clone(a))))
            .collect()
    }

    /// Remove `id` and its subtree.
    ///
    /// Returns the notice for `id`'s parent, if it has a live one. Nodes
    /// removed by the cascade produce no notices.
    fn remove(&mut self, id: HandlerId) -> Option<ChildRemoved<E, C>> {
        let parent_id = self.live_parent(id);
        let parent = parent_id.and_then(|p| self.adapter_of(p)).map(Arc::clone);
        let child = self.handler_of(id)?;

        if let Some(p) = parent_id
            && let Some(siblings) = self.children.get_mut(&p)
        {
            siblings.retain(|&other| other != id);
            if siblings.is_empty() {
                self.children.remove(&p);
            }
        }

        let mut doomed = HashSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(kids) = self.children.remove(&next) {
                for &kid in &kids {
                    tracing::trace!(child = %kid, parent = %next, "cascade removal");
                }
                pending.extend(kids);
            }
            doomed.insert(next);
        }

        for &gone in &doomed {
            self.parents.remove(&gone);
            let Some(node) = self.nodes.remove(&gone) else {
                continue;
            };
            if let Some(ids) = self.live.get_mut(&node.adapter) {
                ids.retain(|&other| other != gone);
                if ids.is_empty() {
                    self.live.remove(&node.adapter);
                }
            }
        }
        self.active_ids.retain(|other| !doomed.contains(other));
        self.root_ids.retain(|other| !doomed.contains(other));

        Some(ChildRemoved {
            parent: parent?,
            child,
            id,
        })
    }
}
