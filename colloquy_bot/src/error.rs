// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by chat transports.

use thiserror::Error;

/// A failure at the transport boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A message could not be delivered.
    #[error("failed to send to {to}: {reason}")]
    Send {
        /// Room or user the message was addressed to.
        to: String,
        /// Backend-specific reason.
        reason: String,
    },
    /// A room could not be joined.
    #[error("failed to join room {room}: {reason}")]
    Join {
        /// Room id.
        room: String,
        /// Backend-specific reason.
        reason: String,
    },
    /// The presence status could not be set.
    #[error("failed to set status: {reason}")]
    Status {
        /// Backend-specific reason.
        reason: String,
    },
    /// The backend connection is gone.
    #[error("chat network disconnected")]
    Disconnected,
    /// The message pump thread could not be started.
    #[error("failed to start message pump: {0}")]
    Pump(#[from] std::io::Error),
}
