use super::types::Command;

/// Parse `input` as a prefixed command. Extra arguments are ignored.
pub fn parse_command(input: &str, prefix: &str) -> Option<Command> {
    let trimmed = input.trim();
    if prefix.is_empty() {
        return None;
    }
    let rest = trimmed.strip_prefix(prefix)?;

    let word = rest.split(char::is_whitespace).next()?.to_lowercase();

    match word.as_str() {
        "stats" => Some(Command::Stats),
        "help_steam" | "help" => Some(Command::Help),
        _ => None,
    }
}
