//! Screen description for one interaction cycle.
//!
//! `render_view` is a pure function of the store, the search term and the UI
//! flags; the shell prints its result after every action.
//!
//! CHANGELOG:
//! - 02/18/2026 - Text table rendering
//! - 02/16/2026 - Initial implementation

use crate::contacts::{ContactRecord, ContactStore};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Where the user is in the per-cycle flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Idle,
    Uploaded,
    Viewing,
    AddFormOpen,
    EditFormOpen(String),
    LinksGenerated,
    SendingLive,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Idle => write!(f, "idle"),
            Screen::Uploaded => write!(f, "uploaded"),
            Screen::Viewing => write!(f, "viewing"),
            Screen::AddFormOpen => write!(f, "add form"),
            Screen::EditFormOpen(id) => write!(f, "editing {}", id),
            Screen::LinksGenerated => write!(f, "links generated"),
            Screen::SendingLive => write!(f, "sending"),
        }
    }
}

/// UI state that is not part of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiFlags {
    pub screen: Screen,
    /// Every row in the filtered view counts as selected
    pub select_all: bool,
    /// Explicitly checked member IDs
    pub selected: BTreeSet<String>,
}

impl UiFlags {
    pub fn is_selected(&self, id: &str) -> bool {
        self.select_all || self.selected.contains(id)
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    /// 1-based position in the store
    pub position: usize,
    pub selected: bool,
    #[serde(flatten)]
    pub record: ContactRecord,
}

/// An open form and its current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum FormView {
    Add,
    Edit { record: ContactRecord },
}

/// Everything the shell needs to draw one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub screen: Screen,
    pub search_term: String,
    pub total: usize,
    pub selected_count: usize,
    pub rows: Vec<ViewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormView>,
}

/// Build the view for the current store, search term and flags.
pub fn render_view(store: &ContactStore, search_term: &str, flags: &UiFlags) -> View {
    let rows: Vec<ViewRow> = store
        .search_with_positions(search_term)
        .into_iter()
        .map(|(i, r)| ViewRow {
            position: i + 1,
            selected: flags.is_selected(&r.id),
            record: r.clone(),
        })
        .collect();

    let form = match &flags.screen {
        Screen::AddFormOpen => Some(FormView::Add),
        Screen::EditFormOpen(id) => store.get(id).map(|record| FormView::Edit {
            record: record.clone(),
        }),
        _ => None,
    };

    View {
        screen: flags.screen.clone(),
        search_term: search_term.to_string(),
        total: store.len(),
        selected_count: rows.iter().filter(|r| r.selected).count(),
        rows,
        form,
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, to: usize) -> String {
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(to.saturating_sub(width(s))));
    out
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.search_term.is_empty() {
            writeln!(f, "Members ({}) [{}]", self.total, self.screen)?;
        } else {
            writeln!(
                f,
                "Members ({} of {} matching \"{}\") [{}]",
                self.rows.len(),
                self.total,
                self.search_term,
                self.screen
            )?;
        }

        if self.rows.is_empty() {
            writeln!(f, "No members to show.")?;
        } else {
            let id_w = self.rows.iter().map(|r| width(&r.record.id)).max().unwrap_or(0).max(2);
            let name_w = self.rows.iter().map(|r| width(&r.record.name)).max().unwrap_or(0).max(4);

            writeln!(f, "{:>4}     {}  {}  Phone", "#", pad("ID", id_w), pad("Name", name_w))?;
            writeln!(f, "{}", "-".repeat(4 + 5 + id_w + 2 + name_w + 2 + 13))?;
            for row in &self.rows {
                writeln!(
                    f,
                    "{:>4} [{}] {}  {}  {}",
                    row.position,
                    if row.selected { "x" } else { " " },
                    pad(&row.record.id, id_w),
                    pad(&row.record.name, name_w),
                    row.record.phone
                )?;
            }
            writeln!(f, "{} selected", self.selected_count)?;
        }

        match &self.form {
            Some(FormView::Add) => {
                writeln!(f, "Add member: add <id> <phone> <name...>   (cancel to close)")?;
            }
            Some(FormView::Edit { record }) => {
                writeln!(f, "Edit member {}", record.id)?;
                writeln!(f, "  ID:    {}", record.id)?;
                writeln!(f, "  Name:  {}", record.name)?;
                writeln!(f, "  Phone: {}", record.phone)?;
                writeln!(f, "save [--id ID] [--name NAME...] [--phone PHONE]   (cancel to close)")?;
            }
            None => {}
        }
        Ok(())
    }
}
