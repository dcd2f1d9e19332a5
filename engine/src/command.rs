use indexmap::IndexMap;

/// Engine-level commands offered while the player party is in the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Fight,
    Rest,
    Inspect,
    Equip,
    Unequip,
    Quit,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Fight,
        Command::Rest,
        Command::Inspect,
        Command::Equip,
        Command::Unequip,
        Command::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::Fight => "Fight",
            Command::Rest => "Rest",
            Command::Inspect => "Inspect",
            Command::Equip => "Equip",
            Command::Unequip => "Unequip",
            Command::Quit => "Quit",
        }
    }

    /// Commands the player party may also use mid-fight.
    pub const COMBAT: [Command; 2] = [Command::Inspect, Command::Quit];

    /// Label to command table, in menu order.
    pub fn table() -> IndexMap<String, Command> {
        Self::table_of(&Self::ALL)
    }

    pub fn combat_table() -> IndexMap<String, Command> {
        Self::table_of(&Self::COMBAT)
    }

    fn table_of(commands: &[Command]) -> IndexMap<String, Command> {
        commands
            .iter()
            .map(|command| (command.label().to_string(), *command))
            .collect()
    }
}
