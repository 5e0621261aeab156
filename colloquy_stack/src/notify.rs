// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child-removed notifications.
//!
//! A pop produces at most one [`ChildRemoved`] notice: for the node that was
//! the direct target of the pop, addressed to its live parent. The stack
//! builds the notice under its exclusive lock and delivers it with
//! [`notify_parent`] after the lock is released, so the parent may push or pop
//! from inside [`Handler::on_child_removed`](crate::types::Handler::on_child_removed).

use std::sync::Arc;

use crate::registry::Adapter;
use crate::types::{HandlerId, HandlerRef};

/// A pending notification for the parent of a popped node.
pub struct ChildRemoved<E, C> {
    /// Adapter of the popped node's parent.
    pub parent: Arc<Adapter<E, C>>,
    /// The popped handler.
    pub child: HandlerRef<E, C>,
    /// Id the popped node had while it was live.
    pub id: HandlerId,
}

impl<E, C> core::fmt::Debug for ChildRemoved<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChildRemoved")
            .field("parent", &self.parent.key())
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Deliver `notice` to the parent if it exposes the child-removed capability.
///
/// A parent without the capability is a silent no-op. Returns `true` if the
/// parent was called.
pub fn notify_parent<E, C>(cx: &C, notice: &ChildRemoved<E, C>) -> bool {
    let delivered = notice.parent.child_removed(cx, &notice.child, notice.id);
    if delivered {
        tracing::debug!(
            child = %notice.id,
            parent = ?notice.parent.key(),
            "notified parent of popped child"
        );
    } else {
        tracing::trace!(
            child = %notice.id,
            parent = ?notice.parent.key(),
            "parent does not observe child removal"
        );
    }
    delivered
}
