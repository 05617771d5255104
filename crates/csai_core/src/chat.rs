//! In-game chat commands.
//!
//! Players talk to the AI with lines like `.csai* debugon` (every CSAI
//! instance), `.csai debugon`, or `.csai1 debugon` (only the AI on team 1).

/// Prefix that addresses a chat line to the AI.
pub const CHAT_PREFIX: &str = ".csai";

/// A command the AI understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// List available commands.
    Help,
    /// Start drawing constructor build sites.
    ShowNextBuildSiteOn,
    /// Stop drawing constructor build sites.
    ShowNextBuildSiteOff,
    /// Enable debug markers.
    DebugOn,
    /// Disable debug markers.
    DebugOff,
    /// Report the pack size.
    TanksCount,
}

impl ChatCommand {
    /// Every command, in help order.
    pub const ALL: [Self; 6] = [
        Self::Help,
        Self::ShowNextBuildSiteOn,
        Self::ShowNextBuildSiteOff,
        Self::DebugOn,
        Self::DebugOff,
        Self::TanksCount,
    ];

    /// The word that invokes this command.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::ShowNextBuildSiteOn => "constructorshownextbuildsiteon",
            Self::ShowNextBuildSiteOff => "constructorshownextbuildsiteoff",
            Self::DebugOn => "debugon",
            Self::DebugOff => "debugoff",
            Self::TanksCount => "tankscount",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == word)
    }
}

/// Result of reading a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatParse {
    /// The line is not addressed to this AI.
    NotForUs,
    /// A recognised command.
    Command(ChatCommand),
    /// Addressed to us but the command is unknown (or missing).
    Unknown(String),
}

/// Interpret a chat line for the AI playing `team`.
#[must_use]
pub fn parse_chat(message: &str, team: i32) -> ChatParse {
    let lower = message.to_lowercase();
    let Some(rest) = lower.strip_prefix(CHAT_PREFIX) else {
        return ChatParse::NotForUs;
    };

    let mut words = rest.split_whitespace();
    let target_matches = if rest.starts_with(' ') {
        true
    } else {
        match words.next() {
            Some("*") => true,
            Some(target) => target.parse::<i32>().map_or(false, |t| t == team),
            None => false,
        }
    };
    if !target_matches {
        return ChatParse::NotForUs;
    }

    match words.next() {
        Some(word) => ChatCommand::from_keyword(word)
            .map_or_else(|| ChatParse::Unknown(word.to_string()), ChatParse::Command),
        None => ChatParse::Unknown(String::new()),
    }
}

/// Help text listing every command.
#[must_use]
pub fn help_text(team: i32) -> Vec<String> {
    let commands: Vec<&str> = ChatCommand::ALL.iter().map(|c| c.keyword()).collect();
    vec![
        format!("CSAI commands available: {}", commands.join(", ")),
        format!("Example: {CHAT_PREFIX}{team} debugon"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_target() {
        assert_eq!(
            parse_chat(".csai* debugon", 3),
            ChatParse::Command(ChatCommand::DebugOn)
        );
    }

    #[test]
    fn test_space_target() {
        assert_eq!(
            parse_chat(".CSAI ConstructorShowNextBuildSiteOn", 0),
            ChatParse::Command(ChatCommand::ShowNextBuildSiteOn)
        );
    }

    #[test]
    fn test_team_target() {
        assert_eq!(
            parse_chat(".csai1 help", 1),
            ChatParse::Command(ChatCommand::Help)
        );
        assert_eq!(parse_chat(".csai2 help", 1), ChatParse::NotForUs);
    }

    #[test]
    fn test_tanks_count() {
        assert_eq!(
            parse_chat(".csai* TanksCount", 0),
            ChatParse::Command(ChatCommand::TanksCount)
        );
    }

    #[test]
    fn test_unrelated_chat() {
        assert_eq!(parse_chat("gg", 0), ChatParse::NotForUs);
        assert_eq!(parse_chat(".csaifoo bar", 0), ChatParse::NotForUs);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_chat(".csai* dance", 0),
            ChatParse::Unknown("dance".to_string())
        );
        assert_eq!(parse_chat(".csai ", 0), ChatParse::Unknown(String::new()));
    }

    #[test]
    fn test_help_lists_all_commands() {
        let help = help_text(2);
        for command in ChatCommand::ALL {
            assert!(help[0].contains(command.keyword()));
        }
        assert_eq!(help[1], "Example: .csai2 debugon");
    }
}
