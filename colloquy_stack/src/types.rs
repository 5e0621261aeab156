// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the stack: node ids, capabilities, the handler contract and dispatch outcomes.
//!
//! ## Overview
//!
//! These types describe the contract between the [`HandlerStack`](crate::stack::HandlerStack)
//! and the pluggable handlers it owns. They are used by the
//! [`registry`](crate::registry), the [`stack`](crate::stack) and the [`dispatch`](crate::dispatch)
//! modules, and by downstream layers such as a chat bot.

use core::num::NonZeroU64;
use std::sync::Arc;

/// Identifier for a node in the stack.
///
/// Returned by [`HandlerStack::push`](crate::stack::HandlerStack::push) and carried by
/// child-removed notifications.
///
/// ## Semantics
///
/// - Ids are issued from a counter that starts at `1`; `0` is reserved as the
///   "no parent" sentinel and is never issued.
/// - Ids strictly increase in issue order and are never reused, even after the
///   node they named has been popped. A stale id therefore never aliases a
///   later node.
///
/// Use [`HandlerStack::is_alive`](crate::stack::HandlerStack::is_alive) to check whether
/// an id still names a live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HandlerId(NonZeroU64);

impl HandlerId {
    /// Sentinel value meaning "no parent". Never issued as an id.
    pub const NO_PARENT: u64 = 0;

    pub(crate) const fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value of this id.
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl core::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Capabilities a handler exposes to the stack.
    ///
    /// Read once, when the [`Registry`](crate::registry::Registry) builds the
    /// adapter for a handler, and never re-checked afterwards.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Handler receives events. Every handler has this.
        const HANDLE        = 0b0000_0001;
        /// Handler wants [`Handler::on_child_removed`] when a child it parents is popped.
        const CHILD_REMOVED = 0b0000_0010;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::HANDLE
    }
}

/// A shared, identity-compared handler reference.
///
/// Two references are the same handler exactly when they point at the same
/// allocation. Handlers with equal contents but separate allocations are
/// distinct. Give each handler its own `Arc`: a handler embedded in another
/// handler is not a separate identity unless its size also differs.
pub type HandlerRef<E, C> = Arc<dyn Handler<E, C>>;

/// A pluggable event handler.
///
/// `E` is the event type and `C` is the dispatch context handed to every call
/// (for a chat bot, the bot itself). Handlers are invoked without any stack
/// lock held, so they may call back into the owning stack, including popping
/// themselves.
pub trait Handler<E, C>: Send + Sync {
    /// Offer `event` to this handler. Return `true` to claim it.
    ///
    /// Only active handlers can claim; return values from root handlers are ignored.
    fn handle(&self, cx: &C, event: &E) -> bool;

    /// Called when `child`, pushed with this handler as its parent, is explicitly popped.
    ///
    /// Not called for descendants removed by a cascade. Delivered only when
    /// [`capabilities`](Self::capabilities) includes [`Capabilities::CHILD_REMOVED`].
    fn on_child_removed(&self, cx: &C, child: &HandlerRef<E, C>, id: HandlerId) {
        let _ = (cx, child, id);
    }

    /// Capabilities this handler exposes. Defaults to [`Capabilities::HANDLE`].
    fn capabilities(&self) -> Capabilities {
        Capabilities::HANDLE
    }
}

/// Result of a single [`HandlerStack::handle`](crate::stack::HandlerStack::handle) call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// An active handler claimed the event; no other handler saw it.
    Claimed(HandlerId),
    /// No active handler claimed the event, so it was offered to every root.
    Fallback {
        /// Number of root handlers invoked.
        roots: usize,
    },
}

impl Outcome {
    /// Returns `true` if an active handler claimed the event.
    pub const fn is_claimed(self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}

/// Identity of a handler: the address of its shared allocation and its size.
///
/// The size keeps a container and its first field apart, since they share an
/// address. It is read through the vtable, so it does not depend on which
/// vtable instance a particular reference carries.
pub(crate) fn identity<E, C>(handler: &dyn Handler<E, C>) -> Identity {
    Identity {
        addr: core::ptr::from_ref(handler).cast::<()>().addr(),
        size: size_of_val(handler),
    }
}

/// Key the registry maps handlers by. See [`identity`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Identity {
    addr: usize,
    size: usize,
}
