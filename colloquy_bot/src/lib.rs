// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colloquy Bot: a chat bot facade over [`colloquy_stack`].
//!
//! ## Overview
//!
//! A [`Bot`](crate::bot::Bot) pairs a [`Network`](crate::chat::Network) (the
//! chat backend) with a [`HandlerStack`](colloquy_stack::HandlerStack) keyed on
//! [`InMsg`](crate::chat::InMsg). Handlers implement
//! [`Handler<InMsg, Bot>`](colloquy_stack::Handler) and receive the bot on
//! every call, so they can reply and open or close nested conversations
//! without any global state.
//!
//! Backends are out of scope: implement [`Network`](crate::chat::Network) for
//! your chat service and feed inbound messages to
//! [`spawn_pump`](crate::pump::spawn_pump).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use colloquy_bot::bot::Bot;
//! use colloquy_bot::chat::{InMsg, Network, OutMsg};
//! use colloquy_bot::error::ChatError;
//! use colloquy_stack::Handler;
//!
//! struct Stdout;
//! impl Network for Stdout {
//!     fn nickname(&self) -> String { "echo".into() }
//!     fn send_pm(&self, m: OutMsg) -> Result<(), ChatError> {
//!         println!("{}: {}", m.to, m.body);
//!         Ok(())
//!     }
//!     fn send(&self, m: OutMsg) -> Result<(), ChatError> {
//!         println!("#{}: {}", m.to, m.body);
//!         Ok(())
//!     }
//!     fn join_room(&self, _room: &str) -> Result<(), ChatError> { Ok(()) }
//!     fn set_status(&self, _status: &str) -> Result<(), ChatError> { Ok(()) }
//! }
//!
//! struct Echo;
//! impl Handler<InMsg, Bot> for Echo {
//!     fn handle(&self, bot: &Bot, msg: &InMsg) -> bool {
//!         bot.reply(msg, &msg.body).is_ok()
//!     }
//! }
//!
//! let bot = Bot::new(Arc::new(Stdout));
//! bot.add_root_handler(Arc::new(Echo));
//! bot.handle_message(&InMsg::private("alice", "hello"));
//! ```

pub mod bot;
pub mod chat;
pub mod config;
pub mod error;
pub mod pump;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bot::{Bot, MessageHandlerRef};
pub use config::BotConfig;
pub use error::ChatError;
