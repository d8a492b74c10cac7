//! wolfies-whatsapp - Fast Rust CLI for WhatsApp bulk messaging
//!
//! Cleans a member sheet (ID, Name, Phone), builds personalized wa.me links,
//! and can drive WhatsApp Web to send them one by one.
//!
//! CHANGELOG:
//! - 02/19/2026 - send subcommand and --config
//! - 02/16/2026 - Interactive shell is the default command
//! - 02/14/2026 - Initial scaffold with CLI skeleton

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use wolfies_whatsapp::commands;
use wolfies_whatsapp::config::Config;
use wolfies_whatsapp::output::{self, OutputControls};

/// Fast Rust CLI for WhatsApp bulk messaging - sheet cleanup, deep links and browser sending.
#[derive(Parser, Debug)]
#[command(name = "wolfies-whatsapp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output as JSON (most commands support this)
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Comma-separated field allowlist
    #[arg(long, global = true)]
    fields: Option<String>,

    /// Truncate text fields to this length
    #[arg(long, global = true)]
    max_text_chars: Option<u32>,

    /// Config file (default: $WOLFIES_WHATSAPP_CONFIG or ~/.config/wolfies-whatsapp/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Shell {
        /// Sheet to import on start
        #[arg(short, long)]
        input: Option<String>,
    },

    /// List members of a sheet
    List {
        /// CSV/TSV sheet with ID, Name, Phone columns
        #[arg(short, long)]
        input: String,

        /// Only members whose ID, name or phone contains this
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print wa.me links for every matching member
    Links {
        /// CSV/TSV sheet with ID, Name, Phone columns
        #[arg(short, long)]
        input: String,

        /// Only members whose ID, name or phone contains this
        #[arg(short, long)]
        search: Option<String>,

        /// Message template ({name}, {id}; \n for newline)
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Send to every matching member through WhatsApp Web
    Send {
        /// CSV/TSV sheet with ID, Name, Phone columns
        #[arg(short, long)]
        input: String,

        /// Only members whose ID, name or phone contains this
        #[arg(short, long)]
        search: Option<String>,

        /// Message template ({name}, {id}; \n for newline)
        #[arg(short, long)]
        template: Option<String>,

        /// Log the messages instead of driving the browser
        #[arg(long)]
        dry_run: bool,
    },

    /// Normalize phones, drop duplicate IDs, write the members CSV
    Clean {
        /// CSV/TSV sheet with ID, Name, Phone columns
        #[arg(short, long)]
        input: String,

        /// Output path (default: export_file from config)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    // Build output controls from global flags
    let output_controls = OutputControls {
        json: cli.json,
        compact: cli.compact,
        fields: cli.fields.clone(),
        max_text_chars: cli.max_text_chars,
    };

    let result = Config::load_default(cli.config.as_deref()).and_then(|config| {
        match cli.command.unwrap_or(Command::Shell { input: None }) {
            Command::Shell { input } => {
                commands::shell::run(input.as_deref(), &config, &output_controls)
            }
            Command::List { input, search } => {
                commands::contacts::list(&input, search.as_deref(), &output_controls)
            }
            Command::Links { input, search, template } => {
                commands::messaging::links(&input, search.as_deref(), template.as_deref(), &config, &output_controls)
            }
            Command::Send { input, search, template, dry_run } => {
                commands::messaging::send(&input, search.as_deref(), template.as_deref(), dry_run, &config, &output_controls)
            }
            Command::Clean { input, output } => {
                commands::contacts::clean(&input, output.as_deref(), &config, &output_controls)
            }
        }
    });

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            if cli.json {
                eprintln!("{}", output::format_error(&format!("{:#}", e)));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}
