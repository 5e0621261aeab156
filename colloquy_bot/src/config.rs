// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bot configuration, passed explicitly to [`Bot::with_config`](crate::bot::Bot::with_config).

/// Options for a [`Bot`](crate::bot::Bot).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotConfig {
    /// Log every inbound and outbound chat line at `info`.
    pub log_traffic: bool,
    /// Label used in logs in place of a room id for private messages.
    pub pm_label: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_traffic: true,
            pm_label: "PM".to_owned(),
        }
    }
}

impl BotConfig {
    /// Turn traffic logging on or off.
    #[must_use]
    pub fn log_traffic(mut self, on: bool) -> Self {
        self.log_traffic = on;
        self
    }

    /// Set the label used for private messages in logs.
    #[must_use]
    pub fn pm_label(mut self, label: impl Into<String>) -> Self {
        self.pm_label = label.into();
        self
    }
}
