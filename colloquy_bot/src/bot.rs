// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bot facade: a chat network plus a handler stack keyed on chat messages.

use std::sync::Arc;
use std::time::Instant;

use colloquy_stack::{Handler, HandlerId, HandlerRef, HandlerStack, Outcome};

use crate::chat::{InMsg, Network, OutMsg};
use crate::config::BotConfig;
use crate::error::ChatError;

/// A handler for chat messages. Handlers receive the [`Bot`] as dispatch context.
pub type MessageHandlerRef = HandlerRef<InMsg, Bot>;

/// A chat bot.
///
/// Owns the [`HandlerStack`] that routes inbound messages and the [`Network`]
/// that replies go out through. Handlers get `&Bot` on every call and use it
/// to reply or to open and close nested contexts.
pub struct Bot {
    network: Arc<dyn Network>,
    stack: HandlerStack<InMsg, Self>,
    config: BotConfig,
}

impl core::fmt::Debug for Bot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bot")
            .field("stack", &self.stack)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Create a bot on `network` with the default configuration.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self::with_config(network, BotConfig::default())
    }

    /// Create a bot on `network` with an explicit configuration.
    pub fn with_config(network: Arc<dyn Network>, config: BotConfig) -> Self {
        Self {
            network,
            stack: HandlerStack::new(),
            config,
        }
    }

    /// The underlying chat network.
    pub fn network(&self) -> &dyn Network {
        &*self.network
    }

    /// The handler stack messages are dispatched through.
    pub fn stack(&self) -> &HandlerStack<InMsg, Self> {
        &self.stack
    }

    /// The configuration this bot was built with.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The bot's display name on its network.
    pub fn nickname(&self) -> String {
        self.network.nickname()
    }

    /// Register an always-on handler.
    pub fn add_root_handler(&self, handler: MessageHandlerRef) -> HandlerId {
        self.stack.add_root(handler)
    }

    /// Open a nested context for `handler`, optionally under `parent`.
    pub fn push_handler(
        &self,
        handler: MessageHandlerRef,
        parent: Option<&dyn Handler<InMsg, Self>>,
    ) -> HandlerId {
        self.stack.push(handler, parent)
    }

    /// Close `handler`'s context and everything opened under it.
    ///
    /// # Panics
    ///
    /// Panics if `handler` has no open context.
    pub fn pop_handler(&self, handler: &dyn Handler<InMsg, Self>) {
        self.stack.pop(self, handler);
    }

    /// The handler `handler` was pushed under, if it is still open.
    pub fn parent_handler(
        &self,
        handler: &dyn Handler<InMsg, Self>,
    ) -> Option<MessageHandlerRef> {
        self.stack.parent_of(handler)
    }

    /// Dispatch one inbound message through the handler stack.
    pub fn handle_message(&self, msg: &InMsg) -> Outcome {
        if self.config.log_traffic {
            let room = msg.room_id.as_deref().unwrap_or(&self.config.pm_label);
            tracing::info!(from = %msg.from, room, "<{} ({})> {}", msg.from, room, msg.body);
        }
        let started = Instant::now();
        let outcome = self.stack.handle(self, msg);
        tracing::debug!(elapsed = ?started.elapsed(), ?outcome, "dispatched message");
        outcome
    }

    /// Reply where `orig` came from: its room, or privately to the sender.
    pub fn reply(&self, orig: &InMsg, body: &str) -> Result<(), ChatError> {
        match &orig.room_id {
            Some(room) => {
                self.log_outbound(room, body);
                self.network.send(OutMsg::new(room.as_str(), body))
            }
            None => self.send_private(&orig.from, body),
        }
    }

    /// Reply privately to the sender of `orig`, even if it was posted in a room.
    pub fn reply_pm(&self, orig: &InMsg, body: &str) -> Result<(), ChatError> {
        self.send_private(&orig.from, body)
    }

    fn send_private(&self, to: &str, body: &str) -> Result<(), ChatError> {
        self.log_outbound(format_args!("{}:{to}", self.config.pm_label), body);
        self.network.send_pm(OutMsg::new(to, body))
    }

    fn log_outbound(&self, room: impl core::fmt::Display, body: &str) {
        if self.config.log_traffic {
            tracing::info!(%room, "<{} ({})> {}", self.nickname(), room, body);
        }
    }
}
