//! Message composition: per-recipient text and click-to-chat links.
//!
//! CHANGELOG:
//! - 02/14/2026 - Initial module structure

pub mod link;
pub mod template;

pub use link::{build_link, build_link_with_base, encode_text, live_url};
pub use template::{render, MessageTemplate, DEFAULT_TEMPLATE};

use crate::contacts::ContactRecord;
use serde::Serialize;

/// Rendered message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub text: String,
}

/// Deep link for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLink {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub url: String,
}

/// Render the template for each recipient, in order.
pub fn compose<'a, I>(template: &MessageTemplate, recipients: I) -> Vec<OutgoingMessage>
where
    I: IntoIterator<Item = &'a ContactRecord>,
{
    recipients
        .into_iter()
        .map(|record| OutgoingMessage {
            id: record.id.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            text: template.render(record),
        })
        .collect()
}

/// Build deep links for already composed messages.
pub fn generate_links(link_base: &str, messages: &[OutgoingMessage]) -> Vec<ChatLink> {
    messages
        .iter()
        .map(|m| ChatLink {
            id: m.id.clone(),
            name: m.name.clone(),
            phone: m.phone.clone(),
            url: build_link_with_base(link_base, &m.phone, &m.text),
        })
        .collect()
}
