//! Interactive session: one line per action, the member list redrawn after each.
//!
//! Errors are printed inline and the session keeps going. Free text (the
//! template, a search term, a new member's name) is taken verbatim from the
//! line, so spacing and leading hyphens survive.
//!
//! CHANGELOG:
//! - 02/20/2026 - Verbatim free text for template / search / add
//! - 02/19/2026 - send / send --dry-run
//! - 02/18/2026 - Edit form (edit / save / cancel)
//! - 02/16/2026 - Initial REPL

use crate::compose::MessageTemplate;
use crate::config::{expand_path, Config};
use crate::contacts::{sheet, ContactRecord, RecordUpdate, Sheet};
use crate::output::OutputControls;
use crate::session::{Session, SessionError};
use crate::transport::{BrowserTransport, DryRunTransport, Transport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};

/// One shell line.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Merge a CSV/TSV sheet with ID, Name, Phone columns
    Import {
        /// Path to the sheet
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Open the add form, or add a member directly
    Add {
        /// Member ID
        id: Option<String>,

        /// Phone (e.g., 9876543210)
        phone: Option<String>,

        /// Display name
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },

    /// Open the edit form for a member
    Edit {
        /// Member ID
        id: String,
    },

    /// Save the open edit form
    Save {
        /// New ID
        #[arg(long)]
        id: Option<String>,

        /// New name
        #[arg(long, num_args = 1..)]
        name: Option<Vec<String>>,

        /// New phone
        #[arg(long)]
        phone: Option<String>,
    },

    /// Close the open form
    Cancel,

    /// Delete a member
    Delete {
        /// Member ID
        id: String,
    },

    /// Filter by ID, name or phone (no term clears the filter)
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        term: Vec<String>,
    },

    /// Check members by ID
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Uncheck members by ID
    Unselect {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Check every visible member
    SelectAll,

    /// Uncheck everything
    SelectNone,

    /// Show or set the message template ({name}, {id}; \n for newline)
    Template {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Redraw the member list
    Show,

    /// Generate WhatsApp links for the selected members
    Links,

    /// Send to the selected members through WhatsApp Web
    Send {
        /// Log instead of driving the browser
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete all data
    Clear,

    /// Write the members CSV
    Export {
        /// Output path (default from config)
        path: Option<String>,
    },

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Text after the first `words` whitespace-separated words, untouched.
fn rest_after(line: &str, words: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..words {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

fn is_flag(word: &str) -> bool {
    word.starts_with('-')
}

/// Commands whose trailing text is kept exactly as typed.
///
/// Returns `None` for everything else (and for `-h`/`--help`), which then
/// goes through clap.
fn parse_verbatim(line: &str) -> Option<ShellCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let first = words.next();
    let tail = rest_after(line, 1);
    let text = |raw: &str| {
        if raw.is_empty() {
            Vec::new()
        } else {
            vec![raw.to_string()]
        }
    };

    match command {
        "template" | "search" if !matches!(tail, "-h" | "--help") => {
            Some(if command == "template" {
                ShellCommand::Template { text: text(tail) }
            } else {
                ShellCommand::Search { term: text(tail) }
            })
        }
        "add" => {
            let id = first.filter(|w| !is_flag(w))?;
            let phone = words.next();
            Some(ShellCommand::Add {
                id: Some(id.to_string()),
                phone: phone.map(str::to_string),
                name: text(rest_after(line, 3)),
            })
        }
        _ => None,
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive session on stdin/stdout.
pub fn run(input: Option<&str>, config: &Config, output: &OutputControls) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(stdin.lock(), stdout.lock(), input, config, output)
}

/// Run the session on any line source and sink.
pub fn run_with<R: BufRead, W: Write>(
    reader: R,
    mut out: W,
    input: Option<&str>,
    config: &Config,
    output: &OutputControls,
) -> Result<()> {
    let mut session = Session::new(config.template.clone(), config.link_base.clone());

    if let Some(path) = input {
        if let Err(e) = import(&mut session, path, &mut out) {
            tracing::debug!(error = %e, "startup import failed");
            writeln!(out, "Error: {:#}", e)?;
        }
        draw(&session, &mut out, output)?;
    } else {
        writeln!(out, "Type 'help' for commands.")?;
    }

    for line in reader.lines() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_verbatim(&line) {
            Some(command) => command,
            None => match ShellLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    write!(out, "{}", e.render())?;
                    continue;
                }
            },
        };

        match execute(&mut session, command, config, &mut out, output) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => {
                tracing::debug!(error = %e, "shell action failed");
                writeln!(out, "Error: {:#}", e)?;
            }
        }
    }

    Ok(())
}

fn draw<W: Write>(session: &Session, out: &mut W, output: &OutputControls) -> Result<()> {
    let view = session.view();
    if output.json {
        writeln!(out, "{}", output.emit(&view))?;
    } else {
        write!(out, "{}", view)?;
    }
    Ok(())
}

fn import<W: Write>(session: &mut Session, path: &str, out: &mut W) -> Result<()> {
    let path = expand_path(path);
    let sheet = Sheet::from_path(&path).map_err(SessionError::from)?;
    let summary = session.upload(&sheet)?;
    writeln!(
        out,
        "Loaded {} new members ({} duplicate IDs kept as before, {} rows skipped).",
        summary.added, summary.duplicates, summary.skipped
    )?;
    Ok(())
}

fn execute<W: Write>(
    session: &mut Session,
    command: ShellCommand,
    config: &Config,
    out: &mut W,
    output: &OutputControls,
) -> Result<Flow> {
    match command {
        ShellCommand::Import { path } => {
            import(session, &path.join(" "), out)?;
        }
        ShellCommand::Add { id, phone, name } => match id {
            None => session.open_add_form(),
            Some(id) => {
                if *session.screen() != crate::view::Screen::AddFormOpen {
                    session.open_add_form();
                }
                let phone = phone.unwrap_or_default();
                session.submit_add(ContactRecord::new(id, name.join(" "), phone))?;
                writeln!(out, "Member added.")?;
            }
        },
        ShellCommand::Edit { id } => {
            session.open_edit_form(&id)?;
        }
        ShellCommand::Save { id, name, phone } => {
            session.submit_edit(RecordUpdate {
                id,
                name: name.map(|words| words.join(" ")),
                phone,
            })?;
            writeln!(out, "Changes saved.")?;
        }
        ShellCommand::Cancel => session.cancel_form(),
        ShellCommand::Delete { id } => {
            let removed = session.delete(&id);
            if removed == 0 {
                writeln!(out, "No member with ID '{}'; nothing deleted.", id)?;
            }
        }
        ShellCommand::Search { term } => session.set_search(&term.join(" ")),
        ShellCommand::Select { ids } => {
            let unknown = session.select(&ids);
            if !unknown.is_empty() {
                writeln!(out, "Unknown IDs: {}", unknown.join(", "))?;
            }
        }
        ShellCommand::Unselect { ids } => session.unselect(&ids),
        ShellCommand::SelectAll => session.set_select_all(true),
        ShellCommand::SelectNone => session.set_select_all(false),
        ShellCommand::Template { text } => {
            if !text.is_empty() {
                let template = text.join(" ").replace("\\n", "\n");
                session.set_template(MessageTemplate::from(template));
            }
            writeln!(out, "Template: {}", session.template().as_str())?;
            return Ok(Flow::Continue);
        }
        ShellCommand::Show => {}
        ShellCommand::Links => {
            let links = session.generate_links()?;
            if output.json {
                writeln!(out, "{}", output.emit(&links))?;
            } else {
                writeln!(out, "WhatsApp Message Links:")?;
                for link in &links {
                    writeln!(out, "  {} ({}): {}", link.name, link.id, link.url)?;
                }
            }
            return Ok(Flow::Continue);
        }
        ShellCommand::Send { dry_run } => {
            let mut transport: Box<dyn Transport> = if dry_run {
                Box::new(DryRunTransport::default())
            } else {
                Box::new(BrowserTransport::new(config.browser.clone()))
            };
            let report = session.send_live(transport.as_mut())?;
            if output.json {
                writeln!(out, "{}", output.emit(&report))?;
            } else {
                writeln!(out, "Sent {} of {} messages.", report.sent, report.attempted)?;
                for failure in &report.failures {
                    writeln!(out, "  failed: {} ({}): {}", failure.name, failure.phone, failure.error)?;
                }
            }
        }
        ShellCommand::Clear => {
            session.clear();
            writeln!(out, "All data deleted.")?;
        }
        ShellCommand::Export { path } => {
            let target = match path {
                Some(p) => expand_path(&p),
                None => config.export_path(),
            };
            sheet::export_csv(session.store(), &target)
                .with_context(|| format!("Failed to write members CSV: {:?}", target))?;
            writeln!(out, "Exported {} members to {}", session.store().len(), target.display())?;
            return Ok(Flow::Continue);
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    draw(session, out, output)?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &str, input: Option<&str>) -> String {
        let mut out = Vec::new();
        run_with(
            script.as_bytes(),
            &mut out,
            input,
            &Config::default(),
            &OutputControls::default(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_add_select_links() {
        let out = run_script(
            "add 7 9876543210 Asha Rao\nselect 7\ntemplate Hi {name}, id {id}\nlinks\n",
            None,
        );
        assert!(out.contains("Member added."));
        assert!(out.contains("[x] 7"));
        assert!(out.contains("https://wa.me/919876543210?text=Hi%20Asha%20Rao%2C%20id%207"));
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let out = run_script("edit 404\nlinks\nadd 1 9876543210 Asha\nshow\n", None);
        assert!(out.contains("Error: No member with ID '404'"));
        assert!(out.contains("Error: Select at least one member."));
        assert!(out.contains("Members (1)"));
    }

    #[test]
    fn test_edit_and_save() {
        let out = run_script(
            "add 1 9876543210 Asha\nedit 1\nsave --name Asha Rao --phone 919000000000\n",
            None,
        );
        assert!(out.contains("Edit member 1"));
        assert!(out.contains("Changes saved."));
        assert!(out.contains("Asha Rao"));
        assert!(out.contains("+919000000000"));
    }

    #[test]
    fn test_import_from_flag_and_dry_run_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.csv");
        std::fs::write(&path, "ID,Name,Phone\n1,Asha,9876543210\n2,Ravi,9123456789\n").unwrap();

        let out = run_script("select-all\nsend --dry-run\nquit\nshow\n", path.to_str());
        assert!(out.contains("Loaded 2 new members"));
        assert!(out.contains("Sent 2 of 2 messages."));
        // Nothing after quit runs
        assert_eq!(out.matches("Members (2)").count(), 3);
    }

    #[test]
    fn test_export_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("out.csv");
        let script = format!(
            "add 1 9876543210 Asha\nexport {}\nclear\nshow\n",
            export.display()
        );
        let out = run_script(&script, None);
        assert!(out.contains("Exported 1 members"));
        assert!(out.contains("All data deleted."));
        assert!(out.contains("No members to show."));
        assert_eq!(
            std::fs::read_to_string(&export).unwrap(),
            "ID,Name,Phone\n1,Asha,+919876543210\n"
        );
    }

    #[test]
    fn test_template_keeps_hyphens_and_spacing() {
        let out = run_script("template Hi {name} -Team\ntemplate Hi  {name},   see you\n", None);
        assert!(out.contains("Template: Hi {name} -Team\n"));
        assert!(out.contains("Template: Hi  {name},   see you\n"));
        assert!(!out.contains("unexpected argument"));
    }

    #[test]
    fn test_verbatim_name_and_search() {
        let out = run_script(
            "add 1 9876543210 Asha  -Rao\nadd 2 9123456789 Ravi\nsearch -rao\n",
            None,
        );
        assert!(out.contains("Asha  -Rao"));
        assert!(out.contains("Members (1 of 2 matching \"-rao\")"));
    }

    #[test]
    fn test_rest_after() {
        assert_eq!(rest_after("  add 7 98  Asha   Rao ", 3), "Asha   Rao ");
        assert_eq!(rest_after("template", 1), "");
        assert_eq!(rest_after("search  -x", 1), "-x");
    }

    #[test]
    fn test_failed_startup_import_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let out = run_script("add 1 9876543210 Asha\n", missing.to_str());
        assert!(out.contains("Error: Failed to open"));
        assert!(out.contains("Member added."));
    }

    #[test]
    fn test_select_all_then_unselect_skips_member() {
        let out = run_script(
            "add 1 9876543210 Asha\nadd 2 9123456789 Ravi\nselect-all\nunselect 2\nlinks\n",
            None,
        );
        assert!(out.contains("(1): https://wa.me/919876543210"));
        assert!(!out.contains("(2): https://wa.me/"));
    }

    #[test]
    fn test_unknown_command_prints_usage() {
        let out = run_script("frobnicate\n", None);
        assert!(out.contains("unrecognized subcommand"));
    }
}
