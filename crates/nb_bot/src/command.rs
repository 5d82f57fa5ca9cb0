#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Articles,
    Random,
}

impl Command {
    /// Parses the leading `/command` of a message, ignoring an `@botname`
    /// suffix and any trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.split('@').next().unwrap_or(token);
        match name {
            "/start" => Some(Self::Start),
            "/articles" => Some(Self::Articles),
            "/random" => Some(Self::Random),
            _ => None,
        }
    }
}

/// A command received from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub chat_id: String,
    pub command: Command,
}

impl InboundCommand {
    pub fn new(chat_id: impl Into<String>, command: Command) -> Self {
        Self {
            chat_id: chat_id.into(),
            command,
        }
    }

    pub fn parse(chat_id: impl Into<String>, text: &str) -> Option<Self> {
        Command::parse(text).map(|command| Self::new(chat_id, command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /articles  "), Some(Command::Articles));
        assert_eq!(Command::parse("/random please"), Some(Command::Random));
        assert_eq!(Command::parse("/random@news_digest_bot"), Some(Command::Random));
    }

    #[test]
    fn test_ignores_other_text() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/help"), None);
        assert_eq!(Command::parse("/Start"), None);
        assert_eq!(Command::parse("say /start"), None);
    }

    #[test]
    fn test_inbound_command() {
        assert_eq!(
            InboundCommand::parse("12", "/start"),
            Some(InboundCommand::new("12", Command::Start))
        );
        assert_eq!(InboundCommand::parse("12", "hi"), None);
    }
}
