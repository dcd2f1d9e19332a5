use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Scalar;
use crate::entity::{Entity, Formula, current_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Subtract,
    Add,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Magnitude<T> {
    Fixed(T),
    /// Evaluated against the paying entity, e.g. a price that grows with level.
    Scaled(Formula<T>),
}

/// A price on one resource: "subtract 2 from MP".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost<T> {
    pub resource: String,
    pub operation: Operation,
    pub magnitude: Magnitude<T>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl<T: Scalar> Cost<T> {
    pub fn subtract(value: T, resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            operation: Operation::Subtract,
            magnitude: Magnitude::Fixed(value),
            visible: true,
        }
    }

    pub fn add(value: T, resource: &str) -> Self {
        Self {
            operation: Operation::Add,
            ..Self::subtract(value, resource)
        }
    }

    pub fn scaled(formula: Formula<T>, resource: &str) -> Self {
        Self {
            magnitude: Magnitude::Scaled(formula),
            ..Self::subtract(T::zero(), resource)
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn resolve<E: Entity<T> + ?Sized>(&self, entity: &E) -> T {
        match &self.magnitude {
            Magnitude::Fixed(value) => *value,
            Magnitude::Scaled(formula) => formula.evaluate(|attribute| entity.get(attribute)),
        }
    }

    /// The attribute this cost mutates: the bare name if the entity has it,
    /// else the pool's `<R>/Current`.
    fn attribute<E: Entity<T> + ?Sized>(&self, entity: &E) -> Option<String> {
        let attributes = entity.attributes();
        if attributes.contains(&self.resource) {
            return Some(self.resource.clone());
        }
        let current = current_of(&self.resource);
        attributes.contains(&current).then_some(current)
    }

    /// Signed change this cost makes, resolved against `entity`.
    fn delta<E: Entity<T> + ?Sized>(&self, entity: &E) -> T {
        match self.operation {
            Operation::Subtract => -self.resolve(entity),
            Operation::Add => self.resolve(entity),
        }
    }

    pub fn can_apply<E: Entity<T> + ?Sized>(&self, entity: &E) -> bool {
        let Some(attribute) = self.attribute(entity) else {
            return false;
        };
        match self.operation {
            Operation::Subtract => entity.get(&attribute) >= self.resolve(entity),
            Operation::Add => true,
        }
    }

    pub fn apply<E: Entity<T> + ?Sized>(&self, entity: &mut E) -> bool {
        if !self.can_apply(entity) {
            return false;
        }
        let Some(attribute) = self.attribute(entity) else {
            return false;
        };
        let delta = self.delta(entity);
        entity.add(&attribute, delta);
        true
    }

    pub fn label<E: Entity<T> + ?Sized>(&self, entity: &E) -> String {
        format!("{} {}", self.resolve(entity), self.resource)
    }
}

/// Every cost of an action. Paid completely or not at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Costs<T>(Vec<Cost<T>>);

impl<T: Scalar> Costs<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with(mut self, cost: Cost<T>) -> Self {
        self.0.push(cost);
        self
    }

    pub fn push(&mut self, cost: Cost<T>) {
        self.0.push(cost);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cost<T>> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Visible costs joined as `"<amount> <resource>"`.
    pub fn label<E: Entity<T> + ?Sized>(&self, entity: &E) -> String {
        self.0
            .iter()
            .filter(|cost| cost.visible)
            .map(|cost| cost.label(entity))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn can_apply<E: Entity<T> + ?Sized>(&self, entity: &E) -> bool {
        // every member is checked, even after the first failure
        let each = self
            .0
            .iter()
            .map(|cost| cost.can_apply(entity))
            .fold(true, |acc, ok| acc & ok);
        each && self.covers_combined(entity)
    }

    /// Several costs on the same attribute must be affordable together.
    fn covers_combined<E: Entity<T> + ?Sized>(&self, entity: &E) -> bool {
        let mut owed: BTreeMap<String, T> = BTreeMap::new();
        for cost in self.0.iter().filter(|c| c.operation == Operation::Subtract) {
            if let Some(attribute) = cost.attribute(entity) {
                let amount = cost.resolve(entity);
                let entry = owed.entry(attribute).or_insert_with(T::zero);
                *entry = *entry + amount;
            }
        }
        owed.iter()
            .all(|(attribute, amount)| entity.get(attribute) >= *amount)
    }

    pub fn apply<E: Entity<T> + ?Sized>(&self, entity: &mut E) -> bool {
        if !self.can_apply(entity) {
            debug!(entity = entity.name(), "cost not affordable; nothing paid");
            return false;
        }
        // resolve against the entity as it was before paying anything
        let changes: Vec<(String, T)> = self
            .0
            .iter()
            .filter_map(|cost| Some((cost.attribute(entity)?, cost.delta(entity))))
            .collect();
        for (attribute, delta) in changes {
            debug!(entity = entity.name(), %attribute, %delta, "paying cost");
            entity.add(&attribute, delta);
        }
        true
    }
}

impl<T> From<Vec<Cost<T>>> for Costs<T> {
    fn from(costs: Vec<Cost<T>>) -> Self {
        Self(costs)
    }
}
