//! Browser automation transport for WhatsApp Web.
//!
//! Opens the prefilled chat URL in the default browser, waits a fixed time
//! for WhatsApp Web to load, then presses Return in the focused chat box.
//! macOS drives the keyboard through `osascript` / System Events, other
//! platforms through `xdotool`.
//!
//! The waits are fixed sleeps. Nothing confirms the message actually left.
//!
//! CHANGELOG:
//! - 02/19/2026 - Optional tab close after send, browser activation on macOS
//! - 02/15/2026 - Initial implementation

use super::{Sent, Transport, TransportError};
use crate::compose::link::{live_url, DEFAULT_LIVE_BASE};
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Timing and command knobs for browser sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Command used to open URLs (default: `open` on macOS, `xdg-open` elsewhere)
    pub open_command: Option<String>,
    /// macOS application to bring to front before pressing Return
    pub browser_app: Option<String>,
    /// Seconds to wait for WhatsApp Web to load the chat
    pub page_load_wait_secs: u64,
    /// Seconds to wait after pressing Return
    pub send_settle_secs: u64,
    /// Close the tab after each send
    pub auto_close: bool,
    /// WhatsApp Web send endpoint
    pub live_base: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            open_command: None,
            browser_app: None,
            page_load_wait_secs: 15,
            send_settle_secs: 3,
            auto_close: true,
            live_base: DEFAULT_LIVE_BASE.to_string(),
        }
    }
}

/// Keyboard automation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    X11,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::X11
        }
    }
}

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Run to completion; non-zero exit is an automation error.
    fn run(&self) -> Result<(), TransportError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| TransportError::Launch {
                command: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TransportError::Automation {
                command: self.program.clone(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

/// Escape a string for safe inclusion in AppleScript.
///
/// Backslashes first, then quotes, so an escaped quote is not re-escaped.
pub fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Sends by driving WhatsApp Web in a real browser.
pub struct BrowserTransport {
    settings: BrowserSettings,
    platform: Platform,
    sleep: fn(Duration),
}

impl BrowserTransport {
    pub fn new(settings: BrowserSettings) -> Self {
        Self::with_platform(settings, Platform::current())
    }

    pub fn with_platform(settings: BrowserSettings, platform: Platform) -> Self {
        Self {
            settings,
            platform,
            sleep: thread::sleep,
        }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Command that opens `url` in the browser.
    pub fn open_invocation(&self, url: &str) -> Invocation {
        let default = match self.platform {
            Platform::MacOs => "open",
            Platform::X11 => "xdg-open",
        };
        let program = self.settings.open_command.as_deref().unwrap_or(default);
        Invocation::new(program, &[url])
    }

    /// Command that presses Return in the focused window.
    pub fn send_key_invocation(&self) -> Invocation {
        match self.platform {
            Platform::MacOs => {
                let mut script = String::new();
                if let Some(app) = &self.settings.browser_app {
                    script.push_str(&format!(
                        "tell application \"{}\" to activate\n",
                        escape_applescript_string(app)
                    ));
                }
                script.push_str("tell application \"System Events\" to key code 36");
                Invocation::new("osascript", &["-e", script.as_str()])
            }
            Platform::X11 => Invocation::new("xdotool", &["key", "--clearmodifiers", "Return"]),
        }
    }

    /// Command that closes the current browser tab.
    pub fn close_tab_invocation(&self) -> Invocation {
        match self.platform {
            Platform::MacOs => Invocation::new(
                "osascript",
                &[
                    "-e",
                    "tell application \"System Events\" to keystroke \"w\" using command down",
                ],
            ),
            Platform::X11 => Invocation::new("xdotool", &["key", "--clearmodifiers", "ctrl+w"]),
        }
    }

    fn wait(&self, secs: u64) {
        if secs > 0 {
            (self.sleep)(Duration::from_secs(secs));
        }
    }
}

impl Transport for BrowserTransport {
    fn name(&self) -> &str {
        "browser"
    }

    fn send(&mut self, phone: &str, message: &str) -> Result<Sent, TransportError> {
        if !phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(TransportError::InvalidPhone(phone.to_string()));
        }

        let url = live_url(&self.settings.live_base, phone, message);
        tracing::debug!(phone, "opening WhatsApp Web chat");
        self.open_invocation(&url).run()?;

        self.wait(self.settings.page_load_wait_secs);
        self.send_key_invocation().run()?;
        self.wait(self.settings.send_settle_secs);

        if self.settings.auto_close {
            // Close failure does not fail the send
            if let Err(e) = self.close_tab_invocation().run() {
                tracing::warn!(phone, error = %e, "failed to close tab");
            }
        }

        Ok(Sent::now(phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_sleep(_: Duration) {}

    fn transport(platform: Platform, settings: BrowserSettings) -> BrowserTransport {
        let mut t = BrowserTransport::with_platform(settings, platform);
        t.sleep = no_sleep;
        t
    }

    #[test]
    fn test_escape_quotes_and_backslashes() {
        assert_eq!(escape_applescript_string("Google Chrome"), "Google Chrome");
        assert_eq!(escape_applescript_string(r#"My "Browser""#), r#"My \"Browser\""#);
        assert_eq!(escape_applescript_string(r#"\"x\""#), r#"\\\"x\\\""#);
    }

    #[test]
    fn test_open_defaults_per_platform() {
        let mac = transport(Platform::MacOs, BrowserSettings::default());
        assert_eq!(mac.open_invocation("https://x").program, "open");
        let x11 = transport(Platform::X11, BrowserSettings::default());
        assert_eq!(
            x11.open_invocation("https://x"),
            Invocation::new("xdg-open", &["https://x"])
        );
    }

    #[test]
    fn test_open_command_override() {
        let settings = BrowserSettings {
            open_command: Some("firefox".to_string()),
            ..Default::default()
        };
        let t = transport(Platform::X11, settings);
        assert_eq!(t.open_invocation("u").program, "firefox");
    }

    #[test]
    fn test_macos_send_key_activates_browser() {
        let settings = BrowserSettings {
            browser_app: Some("Google Chrome".to_string()),
            ..Default::default()
        };
        let t = transport(Platform::MacOs, settings);
        let inv = t.send_key_invocation();
        assert_eq!(inv.program, "osascript");
        assert_eq!(
            inv.args[1],
            "tell application \"Google Chrome\" to activate\ntell application \"System Events\" to key code 36"
        );
    }

    #[test]
    fn test_x11_close_tab() {
        let t = transport(Platform::X11, BrowserSettings::default());
        assert_eq!(t.close_tab_invocation().args, vec!["key", "--clearmodifiers", "ctrl+w"]);
    }

    #[test]
    fn test_rejects_phone_without_digits() {
        let mut t = transport(Platform::X11, BrowserSettings::default());
        let err = t.send("+", "hi").unwrap_err();
        assert!(matches!(err, TransportError::InvalidPhone(_)));
    }

    #[test]
    fn test_missing_opener_is_launch_error() {
        let settings = BrowserSettings {
            open_command: Some("wolfies-whatsapp-no-such-opener".to_string()),
            ..Default::default()
        };
        let mut t = transport(Platform::X11, settings);
        let err = t.send("+919876543210", "hi").unwrap_err();
        assert!(matches!(err, TransportError::Launch { .. }));
    }
}
