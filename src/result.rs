//! Result types handed back to the caller, and the context actions they offer.

use serde::Serialize;

/// Short title plus longer description shown on hover
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub title: String,
    pub text: String,
}

impl Tooltip {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// What activating a result does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ResultAction {
    /// Copy the payload to the clipboard
    CopyValue(String),
    /// Replace the host's active query with the payload
    ChangeQuery(String),
    /// Nothing to do (error results)
    None,
}

/// Data attached to a generated value, enough to replay the invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedData {
    /// Canonical command name
    pub command: String,
    /// Resolved parameter string, if the command takes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    pub value: String,
}

impl GeneratedData {
    /// Query text that re-runs this invocation, without the action keyword
    pub fn invocation(&self) -> String {
        match &self.parameter {
            Some(parameter) if !parameter.is_empty() => format!("{} {}", self.command, parameter),
            _ => self.command.clone(),
        }
    }
}

/// Pointer back into the command registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionData {
    /// Command name or usage string (`"password [length]"`)
    pub command: String,
}

impl SuggestionData {
    /// Bare command name, without usage hints
    pub fn name(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or_default()
    }
}

/// Kind-specific payload of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultKind {
    Generated(GeneratedData),
    Suggestion(SuggestionData),
    Error,
}

/// One entry of a dispatch result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResult {
    /// Text echoed in the query bar while the result is selected
    pub display_text: String,
    pub title: String,
    pub subtitle: String,
    pub tooltip: Tooltip,
    /// Ranking hint; suggestions are pushed above host results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub action: ResultAction,
    pub kind: ResultKind,
}

impl GeneratedResult {
    /// Generated value, if this result carries one
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ResultKind::Generated(data) => Some(&data.value),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            ResultKind::Generated(data) => Some(&data.command),
            ResultKind::Suggestion(data) => Some(data.name()),
            ResultKind::Error => None,
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        match &self.kind {
            ResultKind::Generated(data) => data.parameter.as_deref(),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ResultKind::Error)
    }

    pub fn is_suggestion(&self) -> bool {
        matches!(self.kind, ResultKind::Suggestion(_))
    }
}

// ============================================================================
// Context Menu
// ============================================================================

/// Secondary action on a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuAction {
    Copy { value: String },
    Regenerate { command: String, parameter: Option<String> },
    Select { command: String },
}

/// Context menu entry with its keyboard accelerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMenuEntry {
    pub title: &'static str,
    pub accelerator: &'static str,
    pub action: MenuAction,
}

/// Context menu for a result: copy/regenerate for values, select for suggestions.
pub fn context_menu(result: &GeneratedResult) -> Vec<ContextMenuEntry> {
    match &result.kind {
        ResultKind::Generated(data) => vec![
            ContextMenuEntry {
                title: "Copy to clipboard (Ctrl+C)",
                accelerator: "Ctrl+C",
                action: MenuAction::Copy {
                    value: data.value.clone(),
                },
            },
            ContextMenuEntry {
                title: "Generate new",
                accelerator: "F5",
                action: MenuAction::Regenerate {
                    command: data.command.clone(),
                    parameter: data.parameter.clone(),
                },
            },
        ],
        ResultKind::Suggestion(data) => vec![ContextMenuEntry {
            title: "Select command (Enter)",
            accelerator: "Enter",
            action: MenuAction::Select {
                command: data.name().to_string(),
            },
        }],
        ResultKind::Error => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(parameter: Option<&str>) -> GeneratedResult {
        GeneratedResult {
            display_text: "pin 6".to_string(),
            title: "482915".to_string(),
            subtitle: String::new(),
            tooltip: Tooltip::new("Secure PIN", ""),
            score: None,
            action: ResultAction::CopyValue("482915".to_string()),
            kind: ResultKind::Generated(GeneratedData {
                command: "pin".to_string(),
                parameter: parameter.map(str::to_string),
                value: "482915".to_string(),
            }),
        }
    }

    #[test]
    fn test_generated_menu() {
        let menu = context_menu(&generated(Some("6")));
        assert_eq!(menu.len(), 2);
        assert_eq!(
            menu[0].action,
            MenuAction::Copy {
                value: "482915".to_string()
            }
        );
        assert_eq!(menu[1].accelerator, "F5");
    }

    #[test]
    fn test_invocation() {
        let result = generated(Some("6"));
        let ResultKind::Generated(data) = &result.kind else {
            panic!("expected generated result");
        };
        assert_eq!(data.invocation(), "pin 6");

        let result = generated(None);
        let ResultKind::Generated(data) = &result.kind else {
            panic!("expected generated result");
        };
        assert_eq!(data.invocation(), "pin");
    }

    #[test]
    fn test_suggestion_menu_uses_bare_name() {
        let result = GeneratedResult {
            display_text: "password [length]".to_string(),
            title: "password [length]".to_string(),
            subtitle: String::new(),
            tooltip: Tooltip::new("", ""),
            score: None,
            action: ResultAction::ChangeQuery("rd password ".to_string()),
            kind: ResultKind::Suggestion(SuggestionData {
                command: "password [length]".to_string(),
            }),
        };
        let menu = context_menu(&result);
        assert_eq!(
            menu[0].action,
            MenuAction::Select {
                command: "password".to_string()
            }
        );
        assert_eq!(result.command(), Some("password"));
    }

    #[test]
    fn test_error_has_no_menu() {
        let mut result = generated(None);
        result.kind = ResultKind::Error;
        assert!(context_menu(&result).is_empty());
        assert!(result.value().is_none());
    }
}
