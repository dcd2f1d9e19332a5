use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Scalar;
use crate::action::Action;
use crate::entity::{CURRENT, Entity, Sheet, clamp, current_of, resource_of, total_of};
use crate::error::EquipError;
use crate::item::{Item, Slots};

/// How a character decides whether it is still standing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeRule {
    /// Alive while `HP/Current > 0`.
    #[default]
    HitPoints,
    /// Alive while the named attribute is above zero.
    Attribute(String),
}

/// A combatant: attributes, equipment and a table of bound actions.
///
/// Every lookup is `own + Σ equipped`. Actions are not persisted; a
/// [`Ruleset`](crate::Ruleset) binds them again by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Scalar"))]
pub struct Character<T> {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub sheet: Sheet<T>,
    #[serde(default)]
    pub life: LifeRule,
    /// Capacity per slot name.
    #[serde(default)]
    pub slots: Slots,
    #[serde(default)]
    pub equipment: Vec<Item<T>>,
    #[serde(default)]
    pub inventory: Vec<Item<T>>,
    #[serde(skip)]
    pub actions: IndexMap<String, Action<T>>,
}

impl<T: Scalar> Character<T> {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            sheet: Sheet::new(),
            life: LifeRule::default(),
            slots: Slots::new(),
            equipment: Vec::new(),
            inventory: Vec::new(),
            actions: IndexMap::new(),
        }
    }

    pub fn with_sheet(mut self, sheet: Sheet<T>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn with_slot(mut self, slot: &str, capacity: u32) -> Self {
        self.slots.insert(slot.to_string(), capacity);
        self
    }

    pub fn learn(&mut self, action: Action<T>) {
        self.actions.insert(action.name.clone(), action);
    }

    pub fn action(&self, name: &str) -> Option<&Action<T>> {
        self.actions.get(name)
    }

    pub fn visible_actions(&self) -> impl Iterator<Item = &Action<T>> {
        self.actions.values().filter(|action| action.visible)
    }

    /// Cost label of the named action for display next to a menu entry.
    /// Empty for unknown names and submenu prefixes.
    pub fn resource_label(&self, label: &str) -> String {
        self.action(label)
            .map(|action| action.cost.label(self))
            .unwrap_or_default()
    }

    fn equipment_bonus(&self, attribute: &str) -> T {
        self.equipment
            .iter()
            .fold(T::zero(), |acc, item| acc + item.get(attribute))
    }

    pub fn all_slots(&self) -> Slots {
        self.slots.clone()
    }

    pub fn used_slots(&self) -> Slots {
        let mut used = Slots::new();
        for (slot, count) in self.equipment.iter().flat_map(|item| item.slots.iter()) {
            *used.entry(slot.clone()).or_insert(0) += count;
        }
        used
    }

    pub fn free_slots(&self) -> Slots {
        let used = self.used_slots();
        self.slots
            .iter()
            .map(|(slot, capacity)| {
                let taken = used.get(slot).copied().unwrap_or(0);
                (slot.clone(), capacity.saturating_sub(taken))
            })
            .collect()
    }

    /// Checks that `item` fits into the currently free slots.
    pub fn fits(&self, item: &Item<T>) -> Result<(), EquipError> {
        let free = self.free_slots();
        for (slot, needed) in &item.slots {
            let available = free.get(slot).copied().unwrap_or(0);
            if available < *needed {
                return Err(EquipError::NoFreeSlot {
                    slot: slot.clone(),
                    needed: *needed,
                    free: available,
                });
            }
        }
        Ok(())
    }

    /// Equip `item` directly; on rejection the item is handed back untouched.
    /// Resource pools are settled against the new bonuses.
    pub fn wear(&mut self, item: Item<T>) -> Result<(), (EquipError, Item<T>)> {
        if let Err(error) = self.fits(&item) {
            return Err((error, item));
        }
        self.equipment.push(item);
        self.settle_all();
        Ok(())
    }

    /// Move an item from this character's inventory into its equipment.
    pub fn equip(&mut self, index: usize) -> Result<(), EquipError> {
        if index >= self.inventory.len() {
            return Err(EquipError::NoSuchItem(index));
        }
        let item = self.inventory.remove(index);
        self.wear(item).map_err(|(error, item)| {
            self.inventory.insert(index, item);
            error
        })
    }

    /// Take an item off and return it; resource pools shrink back under
    /// their totals.
    pub fn take_off(&mut self, index: usize) -> Result<Item<T>, EquipError> {
        if index >= self.equipment.len() {
            return Err(EquipError::NoSuchItem(index));
        }
        let item = self.equipment.remove(index);
        self.settle_all();
        Ok(item)
    }

    /// Move an equipped item back into this character's inventory.
    pub fn unequip(&mut self, index: usize) -> Result<(), EquipError> {
        let item = self.take_off(index)?;
        self.inventory.push(item);
        Ok(())
    }

    /// Refill every resource pool to its total.
    pub fn restore(&mut self) {
        for resource in self.resources() {
            let total = self.get(&total_of(&resource));
            self.set(&current_of(&resource), total);
        }
    }

    fn settle(&mut self, resource: &str) {
        let current = current_of(resource);
        if self.has(&current) {
            let value = self.get(&current);
            self.set(&current, value);
        }
    }

    /// Clamp every resource pool against its (possibly changed) total.
    fn settle_all(&mut self) {
        for resource in self.resources() {
            self.settle(&resource);
        }
    }

    /// One line per attribute, for inspection screens.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("{} ({})", self.name, self.kind)];
        for attribute in self.attributes() {
            lines.push(format!("  {attribute}: {}", self.get(&attribute)));
        }
        if !self.equipment.is_empty() {
            let worn: Vec<&str> = self.equipment.iter().map(|item| item.name.as_str()).collect();
            lines.push(format!("  equipped: {}", worn.join(", ")));
        }
        lines.join("\n")
    }
}

impl<T: Scalar> Entity<T> for Character<T> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Pool attributes never read below zero, whatever the equipment adds.
    fn get(&self, attribute: &str) -> T {
        let value = self.sheet.get(attribute) + self.equipment_bonus(attribute);
        if resource_of(attribute).is_some() && value < T::zero() {
            T::zero()
        } else {
            value
        }
    }

    /// Stores whatever makes `get` return the clamped value, equipment included.
    fn set(&mut self, attribute: &str, value: T) {
        let value = clamp(attribute, value, |total| self.get(total));
        let own = value - self.equipment_bonus(attribute);
        self.sheet.write(attribute, own);
        if !attribute.ends_with(CURRENT) {
            self.settle_all();
        }
    }

    fn attributes(&self) -> BTreeSet<String> {
        let mut attributes = self.sheet.keys();
        for item in &self.equipment {
            attributes.extend(item.attributes());
        }
        attributes
    }

    fn alive(&self) -> bool {
        match &self.life {
            LifeRule::HitPoints => self.get("HP/Current") > T::zero(),
            LifeRule::Attribute(attribute) => self.get(attribute) > T::zero(),
        }
    }
}
