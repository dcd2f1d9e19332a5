use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Scalar;
use crate::cost::Costs;
use crate::entity::Entity;
use crate::game::Game;
use crate::party::{Party, Seat};
use crate::targeting;

/// Who an action may be aimed at, relative to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    #[serde(rename = "self")]
    SelfOnly,
    Ally,
    Enemy,
    Party,
    Enemies,
    Everyone,
}

impl Scope {
    /// Ally and Enemy pick exactly one target; the rest hit the whole group.
    pub fn is_singular(self) -> bool {
        matches!(self, Scope::Ally | Scope::Enemy)
    }
}

/// Health predicate narrowing a scope's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    None,
    OnlyHealthy,
    OnlyAlive,
    OnlyUnhealthy,
    OnlyDead,
    OnlyUndefeated,
}

impl Filter {
    pub fn matches<T: Scalar, E: Entity<T> + ?Sized>(self, entity: &E) -> bool {
        let hp = || (entity.get("HP/Current"), entity.get("HP/Total"));
        match self {
            Filter::None => true,
            Filter::OnlyHealthy => {
                let (current, total) = hp();
                current == total
            }
            Filter::OnlyAlive => entity.alive(),
            Filter::OnlyUnhealthy => {
                let (current, total) = hp();
                entity.alive() && current < total
            }
            Filter::OnlyDead => !entity.alive(),
            Filter::OnlyUndefeated => !entity.defeated(),
        }
    }
}

/// What an action does once it is paid for. Returns the narration.
pub trait Effect<T>: Send + Sync {
    fn apply(&self, participants: &mut Participants<'_, T>) -> String;
}

impl<T, F> Effect<T> for F
where
    F: Fn(&mut Participants<'_, T>) -> String + Send + Sync,
{
    fn apply(&self, participants: &mut Participants<'_, T>) -> String {
        self(participants)
    }
}

/// Sources and targets of one action, reachable only as entities.
pub struct Participants<'a, T> {
    parties: &'a mut [Party<T>],
    sources: Vec<Seat>,
    targets: Vec<Seat>,
}

impl<'a, T: Scalar> Participants<'a, T> {
    pub fn new(parties: &'a mut [Party<T>], sources: Vec<Seat>, targets: Vec<Seat>) -> Self {
        Self {
            parties,
            sources,
            targets,
        }
    }

    pub fn sources(&self) -> &[Seat] {
        &self.sources
    }

    pub fn targets(&self) -> &[Seat] {
        &self.targets
    }

    pub fn entity(&self, seat: Seat) -> Option<&dyn Entity<T>> {
        self.parties
            .get(seat.party)
            .and_then(|party| party.members.get(seat.member))
            .map(|character| character as &dyn Entity<T>)
    }

    pub fn entity_mut(&mut self, seat: Seat) -> Option<&mut dyn Entity<T>> {
        self.parties
            .get_mut(seat.party)
            .and_then(|party| party.members.get_mut(seat.member))
            .map(|character| character as &mut dyn Entity<T>)
    }

    pub fn name(&self, seat: Seat) -> &str {
        self.entity(seat).map_or("", |entity| entity.name())
    }

    pub fn get(&self, seat: Seat, attribute: &str) -> T {
        self.entity(seat)
            .map_or_else(T::zero, |entity| entity.get(attribute))
    }

    pub fn set(&mut self, seat: Seat, attribute: &str, value: T) {
        if let Some(entity) = self.entity_mut(seat) {
            entity.set(attribute, value);
        }
    }

    pub fn add(&mut self, seat: Seat, attribute: &str, delta: T) {
        if let Some(entity) = self.entity_mut(seat) {
            entity.add(attribute, delta);
        }
    }

    pub fn alive(&self, seat: Seat) -> bool {
        self.entity(seat).is_some_and(|entity| entity.alive())
    }
}

/// A named capability bound into a character's action table.
#[derive(Clone)]
pub struct Action<T> {
    pub name: String,
    pub visible: bool,
    pub scope: Scope,
    pub filter: Filter,
    pub cost: Costs<T>,
    effect: Option<Arc<dyn Effect<T>>>,
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("scope", &self.scope)
            .field("filter", &self.filter)
            .field("effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Action<T> {
    /// Hidden, self-targeted, free and without effect until configured.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visible: false,
            scope: Scope::SelfOnly,
            filter: Filter::None,
            cost: Costs::new(),
            effect: None,
        }
    }

    pub fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn cost(mut self, cost: Costs<T>) -> Self {
        self.cost = cost;
        self
    }

    pub fn effect<F>(self, effect: F) -> Self
    where
        F: Fn(&mut Participants<'_, T>) -> String + Send + Sync + 'static,
    {
        self.effect_with(effect)
    }

    pub fn effect_with(mut self, effect: impl Effect<T> + 'static) -> Self {
        self.effect = Some(Arc::new(effect));
        self
    }

    /// Run the effect. Paying the cost is the caller's job.
    pub fn invoke(&self, participants: &mut Participants<'_, T>) -> String {
        match &self.effect {
            Some(effect) => effect.apply(participants),
            None => String::new(),
        }
    }

    pub fn usable<E: Entity<T> + ?Sized>(&self, actor: &E) -> bool {
        !actor.defeated() && self.cost.can_apply(actor)
    }

    /// Usable and at least one legal target exists. Never prompts.
    pub fn usable_among(&self, parties: &[Party<T>], seat: Seat) -> bool {
        let Some(actor) = parties
            .get(seat.party)
            .and_then(|party| party.members.get(seat.member))
        else {
            return false;
        };
        self.usable(actor)
            && targeting::resolve(parties, seat, self.scope, self.filter, None).is_ok()
    }

    pub fn usable_in(&self, game: &Game<T>, seat: Seat) -> bool {
        self.usable_among(&game.parties, seat)
    }
}
