//! Contacts: the member store, phone normalization and sheet I/O.
//!
//! CHANGELOG:
//! - 02/14/2026 - Initial module structure

pub mod phone;
pub mod sheet;
pub mod store;

pub use phone::normalize_phone;
pub use sheet::{Sheet, SheetError, EXPORT_FILE_NAME};
pub use store::{ContactRecord, ContactStore, ImportSummary, RecordUpdate, StoreError};
