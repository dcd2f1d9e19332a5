//! Rule sets: how characters are made and which actions they know.

use anyhow::Result;

use crate::action::{Action, Filter, Participants, Scope};
use crate::character::Character;
use crate::content;
use crate::cost::{Cost, Costs};
use crate::entity::{Formula, Sheet};
use crate::item::Item;
use crate::names::{NameList, NameSource};
use crate::{Dice, Scalar};

pub trait Ruleset<T: Scalar>: Send + Sync {
    /// A fresh character with its actions bound and its pools full.
    fn recruit(&self, dice: &mut Dice) -> Character<T>;

    /// Attach the action table for `character.kind`. Used after a restore.
    fn bind(&self, character: &mut Character<T>);

    /// Attribute that receives party-generator points.
    fn points_attribute(&self) -> &str {
        "Experience"
    }

    /// Items the player party starts with in its stash.
    fn starter_items(&self) -> Vec<Item<T>> {
        Vec::new()
    }
}

/// Small demo rule set: attack, heal, a fire spell.
#[derive(Debug, Clone, Default)]
pub struct SimpleRules {
    names: NameList,
    starter: Vec<Item<i64>>,
}

impl SimpleRules {
    /// Rule set with the built-in name list and starter items.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            names: content::load_names("default")?,
            starter: content::load_items("starter")?,
        })
    }

    pub fn with_names(names: NameList) -> Self {
        Self {
            names,
            starter: Vec::new(),
        }
    }

    pub fn sheet() -> Sheet<i64> {
        Sheet::new()
            .with("Attack", 2)
            .with("Defence", 1)
            .with("Experience", 0)
            .derive("HP/Total", Formula::linear(5, [("Experience", 2)]))
            .derive("MP/Total", Formula::linear(3, [("Experience", 1)]))
            .with("HP/Current", 0)
            .with("MP/Current", 0)
    }

    pub fn attack() -> Action<i64> {
        Action::new("Attack")
            .visible()
            .scope(Scope::Enemy)
            .filter(Filter::OnlyAlive)
            .effect(strike)
    }

    pub fn heal() -> Action<i64> {
        Action::new("Heal")
            .visible()
            .scope(Scope::Ally)
            .filter(Filter::OnlyUnhealthy)
            .cost(Costs::new().with(Cost::subtract(2, "MP")))
            .effect(|p: &mut Participants<'_, i64>| {
                let healer = p.sources().first().map(|&s| p.name(s).to_string());
                let mut lines = Vec::new();
                for target in p.targets().to_vec() {
                    p.add(target, "HP/Current", 4);
                    lines.push(format!(
                        "{} heals {} to {} HP.",
                        healer.as_deref().unwrap_or("Someone"),
                        p.name(target),
                        p.get(target, "HP/Current")
                    ));
                }
                lines.join("\n")
            })
    }

    pub fn fire() -> Action<i64> {
        Action::new("Magic/Fire")
            .visible()
            .scope(Scope::Enemies)
            .filter(Filter::OnlyAlive)
            .cost(Costs::new().with(Cost::subtract(3, "MP")))
            .effect(|p: &mut Participants<'_, i64>| {
                let mut lines = Vec::new();
                for target in p.targets().to_vec() {
                    p.add(target, "HP/Current", -2);
                    lines.push(format!("{} is scorched for 2 damage.", p.name(target)));
                }
                lines.join("\n")
            })
    }

    pub fn wait() -> Action<i64> {
        Action::new("Wait").effect(|p: &mut Participants<'_, i64>| {
            let name = p.sources().first().map_or("", |&s| p.name(s));
            format!("{name} waits.")
        })
    }
}

fn strike(p: &mut Participants<'_, i64>) -> String {
    let Some(&source) = p.sources().first() else {
        return String::new();
    };
    let attacker = p.name(source).to_string();
    let power = p.get(source, "Attack");
    let mut lines = Vec::new();
    for target in p.targets().to_vec() {
        let damage = (power - p.get(target, "Defence") / 2).max(1);
        p.add(target, "HP/Current", -damage);
        lines.push(format!(
            "{attacker} attacks {} for {damage} damage.",
            p.name(target)
        ));
        if !p.alive(target) {
            let reward = p.get(target, "Experience") / 2 + 1;
            p.add(source, "Experience", reward);
            lines.push(format!(
                "{} falls! {attacker} gains {reward} experience.",
                p.name(target)
            ));
        }
    }
    lines.join("\n")
}

impl Ruleset<i64> for SimpleRules {
    fn recruit(&self, dice: &mut Dice) -> Character<i64> {
        let mut character = Character::new(&self.names.name(dice), "adventurer")
            .with_sheet(Self::sheet())
            .with_slot("hand", 2)
            .with_slot("body", 1)
            .with_slot("head", 1);
        self.bind(&mut character);
        character.restore();
        character
    }

    fn bind(&self, character: &mut Character<i64>) {
        character.learn(Self::attack());
        character.learn(Self::heal());
        character.learn(Self::fire());
        character.learn(Self::wait());
    }

    fn starter_items(&self) -> Vec<Item<i64>> {
        self.starter.clone()
    }
}
