// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity registry: maps handler references to stable adapters.
//!
//! ## Overview
//!
//! The stack never compares handlers directly. Instead, the first time a
//! handler reference is used, the registry builds an [`Adapter`] for it and
//! issues an [`AdapterKey`]. Every later lookup by the same reference (push,
//! pop, parent-of) resolves to that same key.
//!
//! Adapters are retained for the lifetime of the registry. A handler that is
//! popped and pushed again gets a new [`HandlerId`] but the same adapter.
//! Because the registry holds a strong reference, the allocation backing an
//! identity cannot be freed and reused by a different handler while the
//! registry lives.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Capabilities, Handler, HandlerId, HandlerRef, Identity, identity};

/// Opaque token issued by the [`Registry`] for each distinct handler reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AdapterKey(u32);

impl AdapterKey {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Uniform wrapper around a registered handler.
///
/// Capabilities are captured when the adapter is built, so the notification
/// path only consults the cached flags.
pub struct Adapter<E, C> {
    key: AdapterKey,
    handler: HandlerRef<E, C>,
    capabilities: Capabilities,
}

impl<E, C> core::fmt::Debug for Adapter<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Adapter")
            .field("key", &self.key)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<E, C> Adapter<E, C> {
    /// Key issued for this adapter.
    pub fn key(&self) -> AdapterKey {
        self.key
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &HandlerRef<E, C> {
        &self.handler
    }

    /// Capabilities captured at registration.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Offer an event to the wrapped handler.
    pub fn handle(&self, cx: &C, event: &E) -> bool {
        self.handler.handle(cx, event)
    }

    /// Relay a child-removed notification if the handler opted in.
    ///
    /// Returns `true` if the notification was delivered.
    pub fn child_removed(&self, cx: &C, child: &HandlerRef<E, C>, id: HandlerId) -> bool {
        if !self.capabilities.contains(Capabilities::CHILD_REMOVED) {
            return false;
        }
        self.handler.on_child_removed(cx, child, id);
        true
    }
}

/// Map from handler identity to adapter.
pub struct Registry<E, C> {
    adapters: Vec<Arc<Adapter<E, C>>>,
    by_identity: HashMap<Identity, AdapterKey>,
}

impl<E, C> Default for Registry<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> core::fmt::Debug for Registry<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("adapters", &self.adapters.len())
            .finish_non_exhaustive()
    }
}

impl<E, C> Registry<E, C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
            by_identity: HashMap::new(),
        }
    }

    /// Return the adapter key for `handler`, building the adapter on first use.
    pub fn adapter_for(&mut self, handler: &HandlerRef<E, C>) -> AdapterKey {
        let ident = identity(&**handler);
        if let Some(&key) = self.by_identity.get(&ident) {
            return key;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "More than u32::MAX distinct handlers is not a supported workload."
        )]
        let key = AdapterKey(self.adapters.len() as u32);
        let capabilities = handler.capabilities() | Capabilities::HANDLE;
        tracing::trace!(?key, ?capabilities, "registered handler adapter");
        self.adapters.push(Arc::new(Adapter {
            key,
            handler: Arc::clone(handler),
            capabilities,
        }));
        self.by_identity.insert(ident, key);
        key
    }

    /// Look up the adapter key for `handler` without registering it.
    ///
    /// `None` in means "no handler" and always yields `None`.
    pub fn lookup(&self, handler: Option<&dyn Handler<E, C>>) -> Option<AdapterKey> {
        let handler = handler?;
        self.by_identity.get(&identity(handler)).copied()
    }

    /// Adapter for a key issued by this registry.
    pub fn get(&self, key: AdapterKey) -> &Arc<Adapter<E, C>> {
        &self.adapters[key.idx()]
    }

    /// Number of adapters built so far.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns `true` if no handler has been registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
