// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A greeting bot on an in-memory network.
//!
//! Two root greeters answer their own names; a `quiz` command opens a nested
//! question that claims the next message and then closes itself. Messages are
//! fed through the pump thread the way a real transport would.
//!
//! Run:
//! - `cargo run -p colloquy_demos --example greeter_bot`

use std::sync::Arc;
use std::sync::mpsc;

use colloquy_bot::chat::InMsg;
use colloquy_bot::pump::spawn_pump;
use colloquy_bot::testing::MockChat;
use colloquy_bot::{Bot, ChatError};
use colloquy_stack::Handler;

struct Greeter {
    name: &'static str,
    greeting: &'static str,
}

impl Handler<InMsg, Bot> for Greeter {
    fn handle(&self, bot: &Bot, msg: &InMsg) -> bool {
        if msg.body == format!("Hello {}", self.name) {
            if let Err(err) = bot.reply_pm(msg, self.greeting) {
                tracing::warn!(%err, "greeting failed");
            }
            return true;
        }
        false
    }
}

struct Quiz;

impl Handler<InMsg, Bot> for Quiz {
    fn handle(&self, bot: &Bot, msg: &InMsg) -> bool {
        if msg.body == "quiz" {
            bot.push_handler(Arc::new(Question), Some(self));
            let _ = bot.reply(msg, "What is 6 times 7?");
        }
        false
    }
}

struct Question;

impl Handler<InMsg, Bot> for Question {
    fn handle(&self, bot: &Bot, msg: &InMsg) -> bool {
        let verdict = if msg.body.trim() == "42" { "Correct." } else { "Nope, 42." };
        let _ = bot.reply(msg, verdict);
        bot.pop_handler(self);
        true
    }
}

fn main() -> Result<(), ChatError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let chat = Arc::new(MockChat::new());
    let bot = Arc::new(Bot::new(chat.clone()));
    bot.add_root_handler(Arc::new(Greeter {
        name: "Alice",
        greeting: "Hi Alice",
    }));
    bot.add_root_handler(Arc::new(Greeter {
        name: "Bob",
        greeting: "Hi Bob",
    }));
    bot.add_root_handler(Arc::new(Quiz));

    let (tx, rx) = mpsc::channel();
    let pump = spawn_pump(Arc::clone(&bot), rx)?;
    for (room, body) in [
        (None, "Hello Alice"),
        (Some("lobby"), "Hello Nobody"),
        (Some("lobby"), "quiz"),
        (Some("lobby"), "41"),
        (Some("lobby"), "Hello Bob"),
    ] {
        let msg = match room {
            Some(room) => InMsg::in_room(room, "12345", body),
            None => InMsg::private("12345", body),
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
    drop(tx);
    if pump.join().is_err() {
        tracing::error!("message pump panicked");
    }

    for out in chat.sent_pms() {
        println!("pm to {}: {}", out.to, out.body);
    }
    for out in chat.sent_rooms() {
        println!("#{}: {}", out.to, out.body);
    }
    Ok(())
}
