//! Message templates with `{name}` and `{id}` placeholders.
//!
//! CHANGELOG:
//! - 02/17/2026 - Single-pass substitution (values are never re-expanded)
//! - 02/14/2026 - Initial implementation

use crate::contacts::ContactRecord;
use serde::{Deserialize, Serialize};

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "Hi {name}, your ID is {id}. Stay strong and keep going! 💪";

const NAME_TOKEN: &str = "{name}";
const ID_TOKEN: &str = "{id}";

/// A message with per-recipient placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl Default for MessageTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}

impl From<&str> for MessageTemplate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageTemplate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl MessageTemplate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute every `{name}` and `{id}` for this record.
    pub fn render(&self, record: &ContactRecord) -> String {
        render(&self.0, record)
    }
}

/// Substitute `{name}` and `{id}` in one left-to-right pass.
///
/// Substituted values are copied verbatim, so a name containing `{id}` stays
/// literal. Any other brace text is left untouched.
pub fn render(template: &str, record: &ContactRecord) -> String {
    let mut out = String::with_capacity(template.len() + record.name.len() + record.id.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(NAME_TOKEN) {
            out.push_str(&record.name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(ID_TOKEN) {
            out.push_str(&record.id);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> ContactRecord {
        ContactRecord::new("7", "Asha", "+919876543210")
    }

    #[test]
    fn test_render_basic() {
        assert_eq!(render("Hi {name}, id {id}", &asha()), "Hi Asha, id 7");
    }

    #[test]
    fn test_render_every_occurrence() {
        assert_eq!(render("{name}{name} {id}/{id}", &asha()), "AshaAsha 7/7");
    }

    #[test]
    fn test_unknown_placeholders_untouched() {
        assert_eq!(
            render("{phone} {Name} {{name}} {", &asha()),
            "{phone} {Name} {Asha} {"
        );
    }

    #[test]
    fn test_values_not_reexpanded() {
        let tricky = ContactRecord::new("{name}", "{id}", "");
        assert_eq!(render("{name}:{id}", &tricky), "{id}:{name}");
    }

    #[test]
    fn test_multiline_and_unicode() {
        let template = MessageTemplate::from("नमस्ते {name}\nID: {id} 💪");
        assert_eq!(template.render(&asha()), "नमस्ते Asha\nID: 7 💪");
    }

    #[test]
    fn test_default_template() {
        assert_eq!(
            MessageTemplate::default().render(&asha()),
            "Hi Asha, your ID is 7. Stay strong and keep going! 💪"
        );
    }
}
