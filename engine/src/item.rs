use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Scalar;
use crate::entity::{Entity, Sheet};

/// Slot name to count, e.g. `hand: 1`.
pub type Slots = BTreeMap<String, u32>;

/// Equipment or loot. Its attributes count toward the wearer while equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    pub name: String,
    #[serde(default)]
    pub sheet: Sheet<T>,
    /// Slots taken while equipped.
    #[serde(default)]
    pub slots: Slots,
}

impl<T: Scalar> Item<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sheet: Sheet::new(),
            slots: Slots::new(),
        }
    }

    pub fn with(mut self, attribute: &str, value: T) -> Self {
        self.sheet = self.sheet.with(attribute, value);
        self
    }

    pub fn occupies(mut self, slot: &str, count: u32) -> Self {
        self.slots.insert(slot.to_string(), count);
        self
    }
}

impl<T: Scalar> Entity<T> for Item<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, attribute: &str) -> T {
        self.sheet.get(attribute)
    }

    fn set(&mut self, attribute: &str, value: T) {
        self.sheet.set(attribute, value);
    }

    fn attributes(&self) -> BTreeSet<String> {
        self.sheet.keys()
    }

    // items have no life of their own
    fn alive(&self) -> bool {
        true
    }
}
