use std::str::FromStr;

use thiserror::Error;

/// A user action read from one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Any line that is not a command replaces the draft. A leading `//`
    /// stands for a literal `/`.
    Draft(String),
    Publish,
    Unsubscribe,
    Resubscribe,
    Show,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command '{0}', expected one of /publish /unsubscribe /resubscribe /show /quit")]
pub struct UnknownCommand(pub String);

impl FromStr for PanelCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Ok(PanelCommand::Draft(line.to_string()));
        }
        if let Some(escaped) = line.trim_start().strip_prefix("//") {
            return Ok(PanelCommand::Draft(format!("/{escaped}")));
        }
        match trimmed {
            "/publish" | "/p" => Ok(PanelCommand::Publish),
            "/unsubscribe" | "/u" => Ok(PanelCommand::Unsubscribe),
            "/resubscribe" | "/r" => Ok(PanelCommand::Resubscribe),
            "/show" => Ok(PanelCommand::Show),
            "/quit" | "/q" => Ok(PanelCommand::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}
