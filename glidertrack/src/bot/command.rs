//! Chat command parsing.

use thiserror::Error;

use crate::ident::normalize;

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    StartSession,
    Add { id: String, name: Option<String> },
    Remove { id: String },
    TrackOn,
    TrackOff,
    List,
    Status,
    Landing,
    Help,
}

/// A command with missing or invalid arguments. The message is the usage
/// string sent back to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Usage: /add <ogn_id> [name]")]
    Add,
    #[error("Usage: /remove <ogn_id>")]
    Remove,
}

/// Static description of a command, used for `/help` and the bot menu.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

/// Every command the bot understands, in menu order.
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo { name: "start", args: "", description: "display a welcome message" },
    CommandInfo { name: "start_session", args: "", description: "enable full commands or reset the session" },
    CommandInfo { name: "add", args: " <id> [name]", description: "start tracking the given OGN id; the optional name is shown in messages" },
    CommandInfo { name: "remove", args: " <id>", description: "stop tracking the id" },
    CommandInfo { name: "landing", args: "", description: "set the landing location used for distances" },
    CommandInfo { name: "track_on", args: "", description: "enable tracking" },
    CommandInfo { name: "track_off", args: "", description: "disable tracking" },
    CommandInfo { name: "list", args: "", description: "show current tracked ids and state" },
    CommandInfo { name: "status", args: "", description: "show current state" },
    CommandInfo { name: "help", args: "", description: "show this help" },
];

/// `/help` reply.
pub fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|c| format!("/{}{} - {}", c.name, c.args, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `(command, description)` pairs for the chat client's command menu.
pub fn menu() -> Vec<(&'static str, &'static str)> {
    COMMANDS.iter().map(|c| (c.name, c.description)).collect()
}

impl Command {
    /// Parse a message text.
    ///
    /// Returns `Ok(None)` for text that is not a command or names an unknown
    /// command. A `@botname` suffix on the command is ignored.
    pub fn parse(text: &str) -> Result<Option<Command>, UsageError> {
        let Some(rest) = text.trim_start().strip_prefix('/') else {
            return Ok(None);
        };

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default();

        let command = match name {
            "start" => Command::Start,
            "start_session" => Command::StartSession,
            "add" => {
                let mut words = args.split_whitespace();
                let id = words.next().map(normalize).unwrap_or_default();
                if id.is_empty() {
                    return Err(UsageError::Add);
                }
                let name = words.collect::<Vec<_>>().join(" ");
                Command::Add {
                    id,
                    name: (!name.is_empty()).then_some(name),
                }
            }
            "remove" => {
                let id = args.split_whitespace().next().map(normalize).unwrap_or_default();
                if id.is_empty() {
                    return Err(UsageError::Remove);
                }
                Command::Remove { id }
            }
            "track_on" => Command::TrackOn,
            "track_off" => Command::TrackOff,
            "list" => Command::List,
            "status" => Command::Status,
            "landing" => Command::Landing,
            "help" => Command::Help,
            _ => return Ok(None),
        };

        Ok(Some(command))
    }
}
