//! Messaging commands: links, send.
//!
//! CHANGELOG:
//! - 02/19/2026 - send reports per-recipient failures and keeps going
//! - 02/15/2026 - Initial implementation

use super::contacts::load_store;
use crate::compose::{self, MessageTemplate};
use crate::config::Config;
use crate::output::OutputControls;
use crate::transport::{dispatch_live, BrowserTransport, DryRunTransport, Transport};
use anyhow::{anyhow, Result};
use serde_json::json;

/// Pick the template: CLI flag, else config. `\n` in a flag becomes a newline.
fn resolve_template(flag: Option<&str>, config: &Config) -> MessageTemplate {
    match flag {
        Some(text) => MessageTemplate::from(text.replace("\\n", "\n")),
        None => config.template.clone(),
    }
}

/// Print click-to-chat links for every matching member.
pub fn links(
    input: &str,
    search: Option<&str>,
    template: Option<&str>,
    config: &Config,
    output: &OutputControls,
) -> Result<()> {
    let (store, _) = load_store(input)?;
    let recipients = store.search(search.unwrap_or(""));
    if recipients.is_empty() {
        return Err(anyhow!("No members match"));
    }

    let template = resolve_template(template, config);
    let messages = compose::compose(&template, recipients);
    let links = compose::generate_links(&config.link_base, &messages);

    if output.json {
        output.print(&links);
    } else {
        println!("WhatsApp Message Links ({}):", links.len());
        for link in &links {
            println!("{} ({}): {}", link.name, link.id, link.url);
        }
    }

    Ok(())
}

/// Send to every matching member through the browser (or dry run).
pub fn send(
    input: &str,
    search: Option<&str>,
    template: Option<&str>,
    dry_run: bool,
    config: &Config,
    output: &OutputControls,
) -> Result<()> {
    let (store, _) = load_store(input)?;
    let recipients = store.search(search.unwrap_or(""));
    if recipients.is_empty() {
        return Err(anyhow!("No members match"));
    }

    let template = resolve_template(template, config);
    let messages = compose::compose(&template, recipients);

    let mut transport: Box<dyn Transport> = if dry_run {
        Box::new(DryRunTransport::default())
    } else {
        Box::new(BrowserTransport::new(config.browser.clone()))
    };
    let report = dispatch_live(transport.as_mut(), &messages);

    if output.json {
        output.print(&json!({
            "success": report.all_sent(),
            "report": report,
        }));
    } else {
        println!("Sent {} of {} messages via {}", report.sent, report.attempted, report.transport);
        for failure in &report.failures {
            eprintln!("  failed: {} ({}) {}: {}", failure.name, failure.id, failure.phone, failure.error);
        }
    }

    if report.all_sent() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} sends failed",
            report.failures.len(),
            report.attempted
        ))
    }
}
