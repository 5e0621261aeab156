// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted, in-memory [`Network`] for tests.
//!
//! Queue the messages you expect the bot to send with
//! [`MockChat::expect_pm`] and [`MockChat::expect_room_msg`], drive the bot,
//! then call [`MockChat::check`]. Sends are matched in order against the
//! queued expectations on `to` and `body`.
//!
//! Enabled in this crate's own tests and, for other crates, with the
//! `testing` feature.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::chat::{Network, OutMsg};
use crate::error::ChatError;

#[derive(Debug, Default)]
struct Script {
    expected_pms: VecDeque<OutMsg>,
    expected_rooms: VecDeque<OutMsg>,
    sent_pms: Vec<OutMsg>,
    sent_rooms: Vec<OutMsg>,
    joined: Vec<String>,
    status: Option<String>,
    failures: Vec<String>,
    fail_sends: bool,
    fail_joins: bool,
    fail_status: bool,
    disconnected: bool,
}

impl Script {
    fn check_connected(&self) -> Result<(), ChatError> {
        if self.disconnected {
            return Err(ChatError::Disconnected);
        }
        Ok(())
    }

    fn check_send(&self, to: &str) -> Result<(), ChatError> {
        self.check_connected()?;
        if self.fail_sends {
            return Err(ChatError::Send {
                to: to.to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }
        Ok(())
    }
}

/// Scripted chat network.
#[derive(Debug)]
pub struct MockChat {
    nickname: String,
    script: Mutex<Script>,
}

impl Default for MockChat {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChat {
    /// A network whose bot is called `botty`.
    pub fn new() -> Self {
        Self::with_nickname("botty")
    }

    /// A network with a custom bot nickname.
    pub fn with_nickname(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            script: Mutex::new(Script::default()),
        }
    }

    /// Expect the next private message to be `msg`.
    pub fn expect_pm(&self, msg: OutMsg) {
        self.script.lock().expected_pms.push_back(msg);
    }

    /// Expect the next room message to be `msg`.
    pub fn expect_room_msg(&self, msg: OutMsg) {
        self.script.lock().expected_rooms.push_back(msg);
    }

    /// Make every subsequent send fail with [`ChatError::Send`].
    pub fn fail_sends(&self, fail: bool) {
        self.script.lock().fail_sends = fail;
    }

    /// Make every subsequent join fail with [`ChatError::Join`].
    pub fn fail_joins(&self, fail: bool) {
        self.script.lock().fail_joins = fail;
    }

    /// Make every subsequent status change fail with [`ChatError::Status`].
    pub fn fail_status(&self, fail: bool) {
        self.script.lock().fail_status = fail;
    }

    /// Drop the connection: every later call fails with [`ChatError::Disconnected`].
    pub fn disconnect(&self) {
        self.script.lock().disconnected = true;
    }

    /// Private messages sent so far.
    pub fn sent_pms(&self) -> Vec<OutMsg> {
        self.script.lock().sent_pms.clone()
    }

    /// Room messages sent so far.
    pub fn sent_rooms(&self) -> Vec<OutMsg> {
        self.script.lock().sent_rooms.clone()
    }

    /// Rooms joined so far.
    pub fn joined(&self) -> Vec<String> {
        self.script.lock().joined.clone()
    }

    /// Last status set, if any.
    pub fn status(&self) -> Option<String> {
        self.script.lock().status.clone()
    }

    /// Assert that every send matched and every expectation was met.
    ///
    /// # Panics
    ///
    /// Panics with a description of each mismatch or unmet expectation.
    pub fn check(&self) {
        let script = self.script.lock();
        let mut problems = script.failures.clone();
        if !script.expected_pms.is_empty() {
            problems.push(format!("did not receive pms {:?}", script.expected_pms));
        }
        if !script.expected_rooms.is_empty() {
            problems.push(format!(
                "did not receive room messages {:?}",
                script.expected_rooms
            ));
        }
        assert!(problems.is_empty(), "mock chat: {}", problems.join("; "));
    }

    fn record(
        expected: &mut VecDeque<OutMsg>,
        failures: &mut Vec<String>,
        kind: &str,
        msg: &OutMsg,
    ) {
        match expected.pop_front() {
            Some(want) if want.to == msg.to && want.body == msg.body => {}
            Some(want) => failures.push(format!(
                "{kind}: expected {:?} to {:?}, got {:?} to {:?}",
                want.body, want.to, msg.body, msg.to
            )),
            None => failures.push(format!(
                "{kind}: unexpected {:?} to {:?}",
                msg.body, msg.to
            )),
        }
    }
}

impl Network for MockChat {
    fn nickname(&self) -> String {
        self.nickname.clone()
    }

    fn send_pm(&self, msg: OutMsg) -> Result<(), ChatError> {
        let mut script = self.script.lock();
        script.check_send(&msg.to)?;
        let Script {
            expected_pms,
            failures,
            sent_pms,
            ..
        } = &mut *script;
        Self::record(expected_pms, failures, "pm", &msg);
        sent_pms.push(msg);
        Ok(())
    }

    fn send(&self, msg: OutMsg) -> Result<(), ChatError> {
        let mut script = self.script.lock();
        script.check_send(&msg.to)?;
        let Script {
            expected_rooms,
            failures,
            sent_rooms,
            ..
        } = &mut *script;
        Self::record(expected_rooms, failures, "room", &msg);
        sent_rooms.push(msg);
        Ok(())
    }

    fn join_room(&self, room: &str) -> Result<(), ChatError> {
        let mut script = self.script.lock();
        script.check_connected()?;
        if script.fail_joins {
            return Err(ChatError::Join {
                room: room.to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }
        script.joined.push(room.to_owned());
        Ok(())
    }

    fn set_status(&self, status: &str) -> Result<(), ChatError> {
        let mut script = self.script.lock();
        script.check_connected()?;
        if script.fail_status {
            return Err(ChatError::Status {
                reason: "scripted failure".to_owned(),
            });
        }
        script.status = Some(status.to_owned());
        Ok(())
    }
}
