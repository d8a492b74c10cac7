//! Interactive session: the store plus UI state, one action per cycle.
//!
//! Every action method ends its cycle with the standing keep-last cleanup, so
//! a manual add or edit always overrides an imported row with the same ID.
//!
//! CHANGELOG:
//! - 02/20/2026 - Unselect after select-all; renames onto a taken ID win
//! - 02/19/2026 - Live sending goes through the Transport trait
//! - 02/18/2026 - Selection follows ID renames
//! - 02/16/2026 - Initial state machine

use crate::compose::{self, ChatLink, MessageTemplate, OutgoingMessage};
use crate::contacts::{
    sheet, ContactRecord, ContactStore, ImportSummary, RecordUpdate, Sheet, SheetError, StoreError,
};
use crate::transport::{dispatch_live, DispatchReport, Transport};
use crate::view::{render_view, Screen, UiFlags, View};
use std::io::Write;
use thiserror::Error;

/// Errors surfaced to the user inline; none end the session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Select at least one member.")]
    NothingSelected,

    #[error("No {0} form is open")]
    NoFormOpen(&'static str),
}

/// One user's working session.
#[derive(Debug, Clone)]
pub struct Session {
    store: ContactStore,
    flags: UiFlags,
    search_term: String,
    template: MessageTemplate,
    link_base: String,
}

impl Session {
    pub fn new(template: MessageTemplate, link_base: impl Into<String>) -> Self {
        Self {
            store: ContactStore::new(),
            flags: UiFlags::default(),
            search_term: String::new(),
            template,
            link_base: link_base.into(),
        }
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    pub fn screen(&self) -> &Screen {
        &self.flags.screen
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The current screen.
    pub fn view(&self) -> View {
        render_view(&self.store, &self.search_term, &self.flags)
    }

    // ========================================================================
    // Cycle bookkeeping
    // ========================================================================

    /// One-shot screens fall back to the member list when the next action starts.
    fn begin_cycle(&mut self) {
        if matches!(
            self.flags.screen,
            Screen::Uploaded | Screen::LinksGenerated | Screen::SendingLive
        ) {
            self.flags.screen = Screen::Viewing;
        }
    }

    /// Standing cleanup: collapse duplicate IDs (last wins), drop stale state.
    fn end_cycle(&mut self) {
        self.store.dedup_keep_last();

        let store = &self.store;
        self.flags.selected.retain(|id| store.get(id).is_some());

        let stale_edit = matches!(
            &self.flags.screen,
            Screen::EditFormOpen(id) if self.store.get(id).is_none()
        );
        if stale_edit {
            self.flags.screen = Screen::Viewing;
        }
        if self.store.is_empty() && self.flags.screen == Screen::Viewing {
            self.flags.screen = Screen::Idle;
        }
    }

    // ========================================================================
    // Store actions
    // ========================================================================

    /// Merge an uploaded sheet. A schema error leaves the store untouched.
    pub fn upload(&mut self, sheet: &Sheet) -> Result<ImportSummary, SessionError> {
        self.begin_cycle();
        let result = self.store.import_bulk(sheet);
        if result.is_ok() {
            self.flags.screen = Screen::Uploaded;
        }
        self.end_cycle();
        Ok(result?)
    }

    pub fn open_add_form(&mut self) {
        self.begin_cycle();
        self.flags.screen = Screen::AddFormOpen;
        self.end_cycle();
    }

    /// Submit the add form. The form stays open on validation errors.
    pub fn submit_add(&mut self, record: ContactRecord) -> Result<(), SessionError> {
        self.begin_cycle();
        if self.flags.screen != Screen::AddFormOpen {
            return Err(SessionError::NoFormOpen("add"));
        }
        self.store.add(record)?;
        self.flags.screen = Screen::Viewing;
        self.end_cycle();
        Ok(())
    }

    /// Open the edit form for the member with `id`.
    pub fn open_edit_form(&mut self, id: &str) -> Result<ContactRecord, SessionError> {
        self.begin_cycle();
        let record = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.flags.screen = Screen::EditFormOpen(record.id.clone());
        self.end_cycle();
        Ok(record)
    }

    /// Save the edit form.
    pub fn submit_edit(&mut self, update: RecordUpdate) -> Result<(), SessionError> {
        self.begin_cycle();
        let Screen::EditFormOpen(id) = self.flags.screen.clone() else {
            return Err(SessionError::NoFormOpen("edit"));
        };

        let new_id = update.id.as_ref().map(|s| s.trim().to_string());
        self.store.update(&id, update)?;

        if let Some(new_id) = new_id {
            if new_id != id && self.flags.selected.remove(&id) {
                self.flags.selected.insert(new_id);
            }
        }
        self.flags.screen = Screen::Viewing;
        self.end_cycle();
        Ok(())
    }

    pub fn cancel_form(&mut self) {
        self.begin_cycle();
        if matches!(self.flags.screen, Screen::AddFormOpen | Screen::EditFormOpen(_)) {
            self.flags.screen = Screen::Viewing;
        }
        self.end_cycle();
    }

    /// Remove a member. Unknown IDs are ignored.
    pub fn delete(&mut self, id: &str) -> usize {
        self.begin_cycle();
        let removed = self.store.delete(id);
        self.end_cycle();
        removed
    }

    /// Drop every member and reset the UI.
    pub fn clear(&mut self) {
        self.store.clear();
        self.flags = UiFlags::default();
        self.search_term.clear();
        tracing::info!("all data cleared");
    }

    // ========================================================================
    // View actions
    // ========================================================================

    pub fn set_search(&mut self, term: &str) {
        self.begin_cycle();
        self.search_term = term.to_string();
        self.end_cycle();
    }

    pub fn set_template(&mut self, template: MessageTemplate) {
        self.begin_cycle();
        self.template = template;
        self.end_cycle();
    }

    /// Check members by ID. Returns IDs that do not exist.
    pub fn select<I, S>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.begin_cycle();
        let mut unknown = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if self.store.get(id).is_some() {
                self.flags.selected.insert(id.to_string());
            } else {
                unknown.push(id.to_string());
            }
        }
        self.end_cycle();
        unknown
    }

    /// Uncheck members by ID. With select-all on, the visible rows become
    /// explicit checks first, so the member really drops out.
    pub fn unselect<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.begin_cycle();
        if self.flags.select_all {
            let visible: Vec<String> = self
                .store
                .search(&self.search_term)
                .into_iter()
                .map(|r| r.id.clone())
                .collect();
            self.flags.selected.extend(visible);
            self.flags.select_all = false;
        }
        for id in ids {
            self.flags.selected.remove(id.as_ref());
        }
        self.end_cycle();
    }

    /// Toggle "select all"; turning it off also clears explicit checks.
    pub fn set_select_all(&mut self, on: bool) {
        self.begin_cycle();
        self.flags.select_all = on;
        if !on {
            self.flags.selected.clear();
        }
        self.end_cycle();
    }

    /// Selected members that are visible under the current search, in order.
    pub fn selected_records(&self) -> Vec<&ContactRecord> {
        self.store
            .search(&self.search_term)
            .into_iter()
            .filter(|r| self.flags.is_selected(&r.id))
            .collect()
    }

    fn compose_selected(&self) -> Result<Vec<OutgoingMessage>, SessionError> {
        let selected = self.selected_records();
        if selected.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        Ok(compose::compose(&self.template, selected))
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Deep links for the selected members.
    pub fn generate_links(&mut self) -> Result<Vec<ChatLink>, SessionError> {
        self.begin_cycle();
        let messages = self.compose_selected()?;
        let links = compose::generate_links(&self.link_base, &messages);
        self.flags.screen = Screen::LinksGenerated;
        self.end_cycle();
        Ok(links)
    }

    /// Send to the selected members through `transport`, best effort.
    pub fn send_live(&mut self, transport: &mut dyn Transport) -> Result<DispatchReport, SessionError> {
        self.begin_cycle();
        let messages = self.compose_selected()?;
        self.flags.screen = Screen::SendingLive;
        tracing::info!(recipients = messages.len(), transport = transport.name(), "live send started");
        let report = dispatch_live(transport, &messages);
        self.flags.screen = Screen::Viewing;
        self.end_cycle();
        Ok(report)
    }

    /// Write the members CSV.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), SessionError> {
        sheet::write_csv(&self.store, writer)?;
        Ok(())
    }
}
