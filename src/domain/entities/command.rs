/// Commands understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Greeting,
    Help,
    Ping,
    Time,
    KickAll,
}

/// Static description of a command
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub command: Command,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub group_only: bool,
}

impl CommandSpec {
    /// Exact match against name or aliases, ignoring case and surrounding whitespace
    pub fn matches(&self, input: &str) -> bool {
        let input = input.trim();
        self.name.eq_ignore_ascii_case(input)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }

    /// Label used in the help menu (`hi / hello`)
    pub fn label(&self) -> String {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// The command table, in the order shown by `help`
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: Command::Greeting,
        name: "hi",
        aliases: &["hello"],
        description: "Greeting",
        group_only: false,
    },
    CommandSpec {
        command: Command::Ping,
        name: "ping",
        aliases: &[],
        description: "Check if bot is alive",
        group_only: false,
    },
    CommandSpec {
        command: Command::Time,
        name: "time",
        aliases: &[],
        description: "Get current time",
        group_only: false,
    },
    CommandSpec {
        command: Command::KickAll,
        name: "kickall",
        aliases: &[],
        description: "Remove everyone except the bot from the group (groups only)",
        group_only: true,
    },
    CommandSpec {
        command: Command::Help,
        name: "help",
        aliases: &[],
        description: "Show this menu",
        group_only: false,
    },
];

impl Command {
    /// Look up the command for a message text. At most one entry can match.
    pub fn parse(text: &str) -> Option<Command> {
        COMMANDS.iter().find(|c| c.matches(text)).map(|c| c.command)
    }

    pub fn spec(&self) -> &'static CommandSpec {
        COMMANDS
            .iter()
            .find(|c| c.command == *self)
            .unwrap_or(&COMMANDS[0])
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }
}
