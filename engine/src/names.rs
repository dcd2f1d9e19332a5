use serde::{Deserialize, Serialize};

use crate::Dice;

/// Produces display names for freshly generated characters.
pub trait NameSource: Send + Sync {
    fn name(&self, dice: &mut Dice) -> String;
}

/// "First Last" from two word lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameList {
    pub first: Vec<String>,
    #[serde(default)]
    pub last: Vec<String>,
}

impl Default for NameList {
    fn default() -> Self {
        Self {
            first: vec!["Nameless".to_string()],
            last: Vec::new(),
        }
    }
}

impl NameSource for NameList {
    fn name(&self, dice: &mut Dice) -> String {
        let first = self
            .first
            .get(dice.pick(self.first.len()))
            .map_or("Nameless", String::as_str);
        match self.last.get(dice.pick(self.last.len())) {
            Some(last) => format!("{first} {last}"),
            None => first.to_string(),
        }
    }
}
