use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::StatsStore;

use super::field::{EventKind, FieldEvent};
use super::InputShield;

/// Runtime switches for the event layer. The core analysis never reads these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldSettings {
    pub enabled: bool,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Control message sent from the popup to every page's shield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShieldMessage {
    #[serde(rename = "SET_ENABLED")]
    SetEnabled { value: bool },
}

/// Owning side of the settings channel.
pub struct SettingsHandle {
    tx: watch::Sender<ShieldSettings>,
}

impl SettingsHandle {
    pub fn new(initial: ShieldSettings) -> (Self, watch::Receiver<ShieldSettings>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }

    /// Apply a control message; every subscribed dispatcher sees it on its next event.
    pub fn apply(&self, message: &ShieldMessage) {
        match message {
            ShieldMessage::SetEnabled { value } => {
                let value = *value;
                self.tx.send_modify(|s| s.enabled = value);
                tracing::info!(enabled = value, "input shield toggled");
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ShieldSettings> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ShieldSettings {
        *self.tx.borrow()
    }
}

/// What the page should do with the field after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FieldAction {
    Untouched,
    Rewrite {
        value: String,
        /// Paste events: cancel the browser's own insertion.
        suppress_default: bool,
        notice: String,
    },
}

/// Event-handling layer around [`InputShield`]: checks the enabled flag and
/// the field type, rewrites the value, and counts sanitizing actions.
pub struct ShieldDispatcher {
    shield: InputShield,
    settings: watch::Receiver<ShieldSettings>,
    stats: Option<Arc<dyn StatsStore>>,
}

impl ShieldDispatcher {
    pub fn new(shield: InputShield, settings: watch::Receiver<ShieldSettings>) -> Self {
        Self {
            shield,
            settings,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: Arc<dyn StatsStore>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn handle(&self, event: &FieldEvent) -> FieldAction {
        self.handle_on(event, Utc::now().date_naive())
    }

    /// Like [`handle`](Self::handle), attributing any sanitizing action to `day`.
    pub fn handle_on(&self, event: &FieldEvent, day: NaiveDate) -> FieldAction {
        if !self.settings.borrow().enabled {
            return FieldAction::Untouched;
        }
        if !event.field.is_inspectable(&event.page_host) {
            return FieldAction::Untouched;
        }

        let outcome = self.shield.analyze_and_sanitize(&event.value);
        if !outcome.acted {
            return FieldAction::Untouched;
        }

        let categories = outcome.categories();
        tracing::info!(
            host = %event.page_host,
            kind = ?event.kind,
            categories = ?categories,
            "sanitized field value"
        );
        if let Some(stats) = &self.stats {
            if let Err(e) = stats.record(day, &categories) {
                tracing::warn!("failed to record sanitizer stats: {}", e);
            }
        }

        let (suppress_default, notice) = match event.kind {
            EventKind::Input => (false, "Suspicious input sanitized."),
            EventKind::Paste => (true, "Suspicious paste sanitized."),
        };
        FieldAction::Rewrite {
            value: outcome.cleaned,
            suppress_default,
            notice: notice.to_string(),
        }
    }
}
