#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Session,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Type a message and press Enter to send it.\n\
/session  show the session id and the address that resumes it\n\
/help     show this help\n\
/quit     exit (Ctrl-C and end of input also exit)";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/session" => SlashCommand::Session,
        "/quit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
