// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The inbound message loop.
//!
//! A transport pushes [`InMsg`]s into a channel; the pump feeds them to
//! [`Bot::handle_message`] one at a time, in arrival order, on a dedicated
//! thread. A handler that blocks holds up every message behind it.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use chrono::Utc;

use crate::bot::Bot;
use crate::chat::InMsg;
use crate::error::ChatError;

/// Start a thread that dispatches every message from `inbox` through `bot`.
///
/// The thread exits once every sender for `inbox` has been dropped.
pub fn spawn_pump(bot: Arc<Bot>, inbox: Receiver<InMsg>) -> Result<JoinHandle<()>, ChatError> {
    let handle = thread::Builder::new()
        .name("colloquy-pump".to_owned())
        .spawn(move || {
            for msg in inbox {
                bot.handle_message(&msg);
                let latency = Utc::now().signed_duration_since(msg.arrived_at);
                tracing::debug!(
                    id = %msg.id,
                    latency_ms = latency.num_milliseconds(),
                    "handled message"
                );
            }
            tracing::debug!("inbox closed, message pump exiting");
        })?;
    Ok(handle)
}
