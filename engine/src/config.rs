use serde::{Deserialize, Serialize};

/// What happens when the chosen action cannot be paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unaffordable {
    /// Log the note and ask again; the turn is not spent.
    #[default]
    Reprompt,
    /// Narrate the note and end the actor's turn.
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct GameConfig {
    /// Parties on the field during a fight, the player's included.
    pub parties: usize,
    pub party_size: usize,
    pub player_budget: Option<u32>,
    pub enemy_budget: Option<u32>,
    /// Prompts per step before the actor gives up.
    pub max_prompts: u32,
    pub unaffordable: Unaffordable,
    /// Offer Inspect and Quit to the player party during combat.
    pub combat_commands: bool,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            parties: 2,
            party_size: 4,
            player_budget: None,
            enemy_budget: None,
            max_prompts: 8,
            unaffordable: Unaffordable::Reprompt,
            combat_commands: true,
            seed: 0,
        }
    }
}
