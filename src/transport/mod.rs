//! Live dispatch: push composed messages through a `Transport`.
//!
//! A `Sent` result means the transport ran its steps without error. There is
//! no delivery acknowledgement from WhatsApp, so it is best-effort only.
//!
//! CHANGELOG:
//! - 02/19/2026 - Dry-run transport
//! - 02/18/2026 - Batch keeps going past failed recipients
//! - 02/15/2026 - Initial Transport trait

pub mod browser;

pub use browser::{BrowserSettings, BrowserTransport};

use crate::compose::OutgoingMessage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors from a single send attempt.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    Automation { command: String, stderr: String },

    #[error("Invalid recipient phone '{0}'")]
    InvalidPhone(String),
}

/// Attempted send (not a delivery receipt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sent {
    pub phone: String,
    pub attempted_at: DateTime<Utc>,
}

impl Sent {
    pub fn now(phone: &str) -> Self {
        Self {
            phone: phone.to_string(),
            attempted_at: Utc::now(),
        }
    }
}

/// Something that can push one message to one phone.
pub trait Transport {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    fn send(&mut self, phone: &str, message: &str) -> Result<Sent, TransportError>;
}

/// One recipient that could not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub error: String,
}

/// Outcome of a live-dispatch batch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub transport: String,
    pub attempted: usize,
    pub sent: usize,
    pub failures: Vec<DispatchFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DispatchReport {
    pub fn all_sent(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Send each message in order. A failure is logged and recorded, and the
/// batch moves on to the next recipient.
pub fn dispatch_live<T>(transport: &mut T, messages: &[OutgoingMessage]) -> DispatchReport
where
    T: Transport + ?Sized,
{
    let started_at = Utc::now();
    let mut sent = 0usize;
    let mut failures = Vec::new();

    for message in messages {
        match transport.send(&message.phone, &message.text) {
            Ok(_) => {
                tracing::info!(id = %message.id, phone = %message.phone, "message sent");
                sent += 1;
            }
            Err(e) => {
                tracing::warn!(id = %message.id, phone = %message.phone, error = %e, "send failed, continuing");
                failures.push(DispatchFailure {
                    id: message.id.clone(),
                    name: message.name.clone(),
                    phone: message.phone.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    DispatchReport {
        transport: transport.name().to_string(),
        attempted: messages.len(),
        sent,
        failures,
        started_at,
        finished_at: Utc::now(),
    }
}

/// Logs what would be sent and records it.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    pub sent: Vec<(String, String)>,
}

impl Transport for DryRunTransport {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(&mut self, phone: &str, message: &str) -> Result<Sent, TransportError> {
        tracing::info!(phone, chars = message.chars().count(), "dry run, not sending");
        self.sent.push((phone.to_string(), message.to_string()));
        Ok(Sent::now(phone))
    }
}
