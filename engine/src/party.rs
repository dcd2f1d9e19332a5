use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::Character;
use crate::entity::Entity;
use crate::error::EquipError;
use crate::item::Item;
use crate::rules::Ruleset;
use crate::{Dice, Scalar};

/// Where a character sits in the roster: party index, then member index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat {
    pub party: usize,
    pub member: usize,
}

impl Seat {
    pub fn new(party: usize, member: usize) -> Self {
        Self { party, member }
    }
}

/// Ordered members plus a shared stash of unequipped items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Scalar"))]
pub struct Party<T> {
    pub members: Vec<Character<T>>,
    #[serde(default)]
    pub inventory: Vec<Item<T>>,
}

impl<T: Scalar> Default for Party<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Scalar> Party<T> {
    pub fn new(members: Vec<Character<T>>) -> Self {
        Self {
            members,
            inventory: Vec::new(),
        }
    }

    /// Recruit `size` members and spread `budget` points unevenly among them.
    ///
    /// Each point goes to a uniformly chosen member's
    /// [`points_attribute`](Ruleset::points_attribute); pools are refilled
    /// afterwards so grown totals start full.
    pub fn generate(
        size: usize,
        budget: Option<u32>,
        rules: &dyn Ruleset<T>,
        dice: &mut Dice,
    ) -> Self {
        let mut members: Vec<Character<T>> = (0..size).map(|_| rules.recruit(dice)).collect();
        if let Some(budget) = budget {
            if !members.is_empty() {
                let attribute = rules.points_attribute();
                for _ in 0..budget {
                    let lucky = dice.pick(members.len());
                    members[lucky].add(attribute, T::one());
                }
            }
        }
        for member in &mut members {
            member.restore();
        }
        debug!(size, ?budget, "generated party");
        Self::new(members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, member: usize) -> Option<&Character<T>> {
        self.members.get(member)
    }

    pub fn get_mut(&mut self, member: usize) -> Option<&mut Character<T>> {
        self.members.get_mut(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character<T>> {
        self.members.iter()
    }

    /// True when every member is defeated; an empty party counts as defeated.
    pub fn defeated(&self) -> bool {
        self.members.iter().all(|member| member.defeated())
    }

    /// Move an item from the shared stash onto a member.
    pub fn equip_from_stash(&mut self, member: usize, index: usize) -> Result<(), EquipError> {
        let character = self
            .members
            .get_mut(member)
            .ok_or(EquipError::NoSuchMember(member))?;
        if index >= self.inventory.len() {
            return Err(EquipError::NoSuchItem(index));
        }
        let item = self.inventory.remove(index);
        character.wear(item).map_err(|(error, item)| {
            self.inventory.insert(index, item);
            error
        })
    }

    /// Move an equipped item from a member back into the shared stash.
    pub fn unequip_to_stash(&mut self, member: usize, index: usize) -> Result<(), EquipError> {
        let character = self
            .members
            .get_mut(member)
            .ok_or(EquipError::NoSuchMember(member))?;
        let item = character.take_off(index)?;
        self.inventory.push(item);
        Ok(())
    }
}
