//! WhatsApp deep links.
//!
//! CHANGELOG:
//! - 02/17/2026 - Encode every reserved character, not just spaces/newlines
//! - 02/14/2026 - Initial wa.me link builder

use crate::contacts::phone::link_phone;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Click-to-chat base URL.
pub const DEFAULT_LINK_BASE: &str = "https://wa.me";

/// WhatsApp Web send endpoint used for live dispatch.
pub const DEFAULT_LIVE_BASE: &str = "https://web.whatsapp.com/send";

/// Everything except RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode text for a query-string value (space -> `%20`, newline -> `%0A`).
pub fn encode_text(text: &str) -> String {
    utf8_percent_encode(text, QUERY_VALUE).to_string()
}

/// `https://wa.me/<phone>?text=<message>` with the `+` removed from the phone.
pub fn build_link(phone: &str, message: &str) -> String {
    build_link_with_base(DEFAULT_LINK_BASE, phone, message)
}

/// `build_link` against a custom click-to-chat base.
pub fn build_link_with_base(base: &str, phone: &str, message: &str) -> String {
    format!(
        "{}/{}?text={}",
        base.trim_end_matches('/'),
        link_phone(phone),
        encode_text(message)
    )
}

/// WhatsApp Web URL that opens a chat with the message prefilled.
pub fn live_url(base: &str, phone: &str, message: &str) -> String {
    format!(
        "{}?phone={}&text={}",
        base.trim_end_matches('/'),
        link_phone(phone),
        encode_text(message)
    )
}
