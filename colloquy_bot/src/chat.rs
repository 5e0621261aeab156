// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chat messages and the transport boundary.

use chrono::{DateTime, Utc};

use crate::error::ChatError;

/// An inbound chat message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMsg {
    /// Transport-assigned message id.
    pub id: String,
    /// Room the message was posted in. `None` for a private message.
    pub room_id: Option<String>,
    /// Sender's chat user id.
    pub from: String,
    /// Message text.
    pub body: String,
    /// When the transport received the message.
    pub arrived_at: DateTime<Utc>,
    /// When the sender's client sent the message.
    pub sent_at: DateTime<Utc>,
}

impl InMsg {
    /// A private message from `from`, stamped as arriving now.
    pub fn private(from: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            from: from.into(),
            body: body.into(),
            arrived_at: now,
            sent_at: now,
            ..Self::default()
        }
    }

    /// A room message from `from` in `room`, stamped as arriving now.
    pub fn in_room(
        room: impl Into<String>,
        from: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            room_id: Some(room.into()),
            ..Self::private(from, body)
        }
    }

    /// Returns `true` for a private message.
    pub fn is_pm(&self) -> bool {
        self.room_id.is_none()
    }
}

/// An outbound chat message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutMsg {
    /// Room id or chat user id, depending on how the message is sent.
    pub to: String,
    /// Message text.
    pub body: String,
    /// Optional highlight color, if the backend supports one.
    pub color: Option<String>,
    /// Whether the backend should notify recipients.
    pub notify: Option<bool>,
    /// Whether `body` is HTML.
    pub html: Option<bool>,
}

impl OutMsg {
    /// Plain-text message to `to`.
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            ..Self::default()
        }
    }
}

/// A chat backend.
///
/// Inbound messages are delivered separately, through the channel handed to
/// [`spawn_pump`](crate::pump::spawn_pump).
pub trait Network: Send + Sync {
    /// The bot's display name on this network.
    fn nickname(&self) -> String;
    /// Send a private message to the user named by `msg.to`.
    fn send_pm(&self, msg: OutMsg) -> Result<(), ChatError>;
    /// Send a message to the room named by `msg.to`.
    fn send(&self, msg: OutMsg) -> Result<(), ChatError>;
    /// Join a room.
    fn join_room(&self, room: &str) -> Result<(), ChatError>;
    /// Set the bot's presence status.
    fn set_status(&self, status: &str) -> Result<(), ChatError>;
}
