//! wolfies-whatsapp library
//!
//! Contact sheet cleanup, message composition and WhatsApp delivery, shared by
//! the one-shot commands and the interactive shell.
//!
//! CHANGELOG:
//! - 02/16/2026 - Session and view for the interactive shell
//! - 02/14/2026 - Initial library structure

// Core modules
pub mod compose;
pub mod config;
pub mod contacts;
pub mod output;
pub mod transport;

// Interactive flow
pub mod session;
pub mod view;

pub mod commands;
