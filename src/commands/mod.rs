//! Command implementations.
//!
//! CHANGELOG:
//! - 02/16/2026 - Interactive shell
//! - 02/14/2026 - Initial module structure

pub mod contacts;
pub mod messaging;
pub mod shell;
