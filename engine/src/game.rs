//! Game engine: state machine, turn loop and action dispatch.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::action::{Action, Participants};
use crate::character::Character;
use crate::chooser::{Actor, Chooser};
use crate::command::Command;
use crate::config::{GameConfig, Unaffordable};
use crate::entity::Entity;
use crate::error::TargetError;
use crate::party::{Party, Seat};
use crate::rules::Ruleset;
use crate::targeting;
use crate::{Dice, Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Only the player party is on the field.
    Menu,
    Combat,
    /// Every party other than the player's is defeated.
    Victory,
    /// The player party is defeated.
    Defeat,
    Exit,
}

/// Result of one attempt to carry out a chosen label.
enum Dispatch {
    /// The step is over; narrate this.
    Done(String),
    /// Ask again, optionally logging a note first.
    Retry(Option<String>),
}

pub struct Game<T: Scalar> {
    pub parties: Vec<Party<T>>,
    turn_order: VecDeque<Seat>,
    turn: u64,
    exit: bool,
    config: GameConfig,
    rules: Arc<dyn Ruleset<T>>,
    dice: Dice,
    log: Vec<String>,
    menu: IndexMap<String, Command>,
    combat_menu: IndexMap<String, Command>,
}

impl<T: Scalar> Game<T> {
    /// A lobby holding a freshly generated player party.
    pub fn new(rules: Arc<dyn Ruleset<T>>, config: GameConfig) -> Self {
        let mut dice = Dice::from_seed(config.seed);
        let mut player = Party::generate(
            config.party_size,
            config.player_budget,
            rules.as_ref(),
            &mut dice,
        );
        player.inventory = rules.starter_items();
        Self::assemble(vec![player], rules, config, dice)
    }

    /// A game over an existing roster; party 0 is the player's.
    pub fn with_parties(
        parties: Vec<Party<T>>,
        rules: Arc<dyn Ruleset<T>>,
        config: GameConfig,
    ) -> Self {
        let dice = Dice::from_seed(config.seed);
        Self::assemble(parties, rules, config, dice)
    }

    fn assemble(
        parties: Vec<Party<T>>,
        rules: Arc<dyn Ruleset<T>>,
        config: GameConfig,
        dice: Dice,
    ) -> Self {
        Self {
            parties,
            turn_order: VecDeque::new(),
            turn: 0,
            exit: false,
            config,
            rules,
            dice,
            log: Vec::new(),
            menu: Command::table(),
            combat_menu: Command::combat_table(),
        }
    }

    pub(crate) fn restore_parts(&mut self, turn: u64, turn_order: VecDeque<Seat>, exit: bool) {
        self.turn = turn;
        self.turn_order = turn_order;
        self.exit = exit;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rules(&self) -> &Arc<dyn Ruleset<T>> {
        &self.rules
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn turn_order(&self) -> &VecDeque<Seat> {
        &self.turn_order
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }

    /// Recomputed from the roster on every call.
    pub fn state(&self) -> GameState {
        if self.exit {
            return GameState::Exit;
        }
        match self.parties.split_first() {
            None => GameState::Defeat,
            Some((player, _)) if player.defeated() => GameState::Defeat,
            Some((_, [])) => GameState::Menu,
            Some((_, others)) if others.iter().all(Party::defeated) => GameState::Victory,
            Some(_) => GameState::Combat,
        }
    }

    pub fn character(&self, seat: Seat) -> Option<&Character<T>> {
        self.parties
            .get(seat.party)
            .and_then(|party| party.members.get(seat.member))
    }

    pub fn character_mut(&mut self, seat: Seat) -> Option<&mut Character<T>> {
        self.parties
            .get_mut(seat.party)
            .and_then(|party| party.members.get_mut(seat.member))
    }

    /// See [`targeting::resolve`].
    pub fn resolve(
        &self,
        actor: Seat,
        action: &Action<T>,
        chooser: Option<&mut dyn Chooser<T>>,
    ) -> Result<Vec<Seat>, TargetError> {
        targeting::resolve(&self.parties, actor, action.scope, action.filter, chooser)
    }

    /// Visible actions `seat` could use right now, in table order.
    pub fn action_labels(&self, seat: Seat) -> Vec<String> {
        let Some(character) = self.character(seat) else {
            return Vec::new();
        };
        character
            .visible_actions()
            .filter(|action| action.usable_among(&self.parties, seat))
            .map(|action| action.name.clone())
            .collect()
    }

    /// Cost label of `action` for the character at `seat`.
    pub fn resource_label(&self, seat: Seat, action: &str) -> String {
        self.character(seat)
            .map(|character| character.resource_label(action))
            .unwrap_or_default()
    }

    /// Start a new round: bump the counter and queue every able character in
    /// random order.
    pub fn begin_round(&mut self) {
        self.turn += 1;
        let mut order: Vec<Seat> = self
            .parties
            .iter()
            .enumerate()
            .flat_map(|(p, party)| {
                party
                    .members
                    .iter()
                    .enumerate()
                    .filter(|(_, member)| member.able())
                    .map(move |(m, _)| Seat::new(p, m))
            })
            .collect();
        self.dice.shuffle(&mut order);
        debug!(turn = self.turn, ?order, "new turn order");
        self.turn_order = order.into();
    }

    /// Add enemy parties until the configured count is on the field.
    pub fn muster(&mut self) -> String {
        let mut arrivals = Vec::new();
        while self.parties.len() < self.config.parties.max(2) {
            let party = Party::generate(
                self.config.party_size,
                self.config.enemy_budget,
                self.rules.as_ref(),
                &mut self.dice,
            );
            let names: Vec<&str> = party.iter().map(|c| c.name.as_str()).collect();
            arrivals.push(names.join(", "));
            self.parties.push(party);
        }
        self.turn_order.clear();
        info!(parties = self.parties.len(), "fight begins");
        if arrivals.is_empty() {
            "The fight is on!".to_string()
        } else {
            format!("{} appear!", arrivals.join(" and "))
        }
    }

    /// Run one step of the state machine and return its narration.
    pub fn step(&mut self, chooser: &mut dyn Chooser<T>) -> String {
        let narration = match self.state() {
            GameState::Menu => self.menu_step(chooser),
            GameState::Combat => self.combat_step(chooser),
            GameState::Victory => self.victory_step(),
            GameState::Defeat => self.defeat_step(),
            GameState::Exit => String::new(),
        };
        self.narrate(&narration);
        narration
    }

    fn narrate(&mut self, narration: &str) {
        if !narration.is_empty() {
            self.log.push(narration.to_string());
        }
    }

    fn combat_step(&mut self, chooser: &mut dyn Chooser<T>) -> String {
        loop {
            let Some(seat) = self.turn_order.pop_front() else {
                self.begin_round();
                if self.turn_order.is_empty() {
                    return String::new();
                }
                continue;
            };
            // fell or was removed since being queued: the turn is lost
            if !self.character(seat).is_some_and(|c| c.able()) {
                continue;
            }
            return self.take_turn(seat, chooser);
        }
    }

    /// Labels offered to `seat` on its turn: usable actions, then the
    /// player party's combat commands.
    pub fn turn_labels(&self, seat: Seat) -> Vec<String> {
        let mut labels = self.action_labels(seat);
        if seat.party == 0 && self.config.combat_commands && !labels.is_empty() {
            labels.extend(self.combat_menu.keys().cloned());
        }
        labels
    }

    /// Prompt the actor until something happens or the prompt budget runs out.
    pub fn take_turn(&mut self, seat: Seat, chooser: &mut dyn Chooser<T>) -> String {
        for _ in 0..self.config.max_prompts {
            let labels = self.turn_labels(seat);
            let Some(actor) = Actor::at(&self.parties, seat) else {
                return String::new();
            };
            if labels.is_empty() {
                break;
            }
            let Some(label) = chooser.choose_label(actor, &labels) else {
                continue;
            };
            // visible but unusable actions still get their specific refusal
            let known = labels.contains(&label)
                || actor.character.action(&label).is_some_and(|action| action.visible);
            if !known {
                warn!(actor = %actor.character.name, %label, "label was not offered");
                return format!("{} looks bewildered.", actor.character.name);
            }
            let dispatch = match self.combat_menu.get(&label).copied() {
                Some(command) if seat.party == 0 && self.config.combat_commands => {
                    self.combat_command(command, chooser)
                }
                _ => self.perform(seat, &label, chooser),
            };
            match dispatch {
                Dispatch::Done(narration) => return narration,
                Dispatch::Retry(note) => {
                    if let Some(note) = note {
                        self.narrate(&note);
                    }
                }
            }
        }
        let name = self.character(seat).map_or("", |c| c.name.as_str());
        format!("{name} hesitates.")
    }

    /// Inspect narrates without spending the turn; Quit ends it.
    fn combat_command(&mut self, command: Command, chooser: &mut dyn Chooser<T>) -> Dispatch {
        match (command, self.run_command(command, chooser)) {
            (_, None) => Dispatch::Retry(None),
            (Command::Inspect, Some(narration)) => Dispatch::Retry(Some(narration)),
            (_, Some(narration)) => Dispatch::Done(narration),
        }
    }

    /// Resolve targets, pay, then run the effect.
    fn perform(&mut self, seat: Seat, label: &str, chooser: &mut dyn Chooser<T>) -> Dispatch {
        let Some(character) = self.character(seat) else {
            return Dispatch::Done(String::new());
        };
        let name = character.name.clone();
        let Some(action) = character.action(label).cloned() else {
            warn!(actor = %name, label, "unknown action");
            return Dispatch::Done(format!("{name} looks bewildered."));
        };

        let targets = match self.resolve(seat, &action, Some(chooser)) {
            Ok(targets) if !targets.is_empty() => targets,
            Ok(_) | Err(_) => return Dispatch::Retry(None),
        };

        let Some(character) = self.character_mut(seat) else {
            return Dispatch::Done(String::new());
        };
        if !action.cost.apply(character) {
            let note = format!(
                "{name} cannot afford {} ({}).",
                action.name,
                action.cost.label(&*character)
            );
            return match self.config.unaffordable {
                Unaffordable::Reprompt => Dispatch::Retry(Some(note)),
                Unaffordable::Forfeit => Dispatch::Done(note),
            };
        }

        debug!(actor = %name, action = %action.name, ?targets, "invoking action");
        let mut participants = Participants::new(&mut self.parties, vec![seat], targets);
        Dispatch::Done(action.invoke(&mut participants))
    }

    fn menu_step(&mut self, chooser: &mut dyn Chooser<T>) -> String {
        let leader = Seat::new(0, 0);
        let labels: Vec<String> = self.menu.keys().cloned().collect();
        for _ in 0..self.config.max_prompts {
            let Some(actor) = Actor::at(&self.parties, leader) else {
                return String::new();
            };
            let Some(label) = chooser.choose_label(actor, &labels) else {
                continue;
            };
            let Some(command) = self.menu.get(&label).copied() else {
                warn!(%label, "unknown command");
                return format!("{} looks bewildered.", actor.character.name);
            };
            if let Some(narration) = self.run_command(command, chooser) {
                return narration;
            }
        }
        String::new()
    }

    /// `None` when the command was backed out of.
    fn run_command(&mut self, command: Command, chooser: &mut dyn Chooser<T>) -> Option<String> {
        match command {
            Command::Fight => Some(self.muster()),
            Command::Rest => {
                let party = self.parties.first_mut()?;
                for member in &mut party.members {
                    member.restore();
                }
                Some("The party rests and recovers.".to_string())
            }
            Command::Inspect => {
                let member = self.pick_member(chooser)?;
                self.parties.first()?.get(member).map(Character::describe)
            }
            Command::Equip => self.equip_command(chooser),
            Command::Unequip => self.unequip_command(chooser),
            Command::Quit => {
                self.exit = true;
                info!("quit requested");
                Some("Farewell.".to_string())
            }
        }
    }

    /// Let the chooser point at a member of the player party.
    fn pick_member(&mut self, chooser: &mut dyn Chooser<T>) -> Option<usize> {
        let party = self.parties.first()?;
        let leader = Actor::at(&self.parties, Seat::new(0, 0))?;
        let members: Vec<Actor<'_, T>> = (0..party.len())
            .filter_map(|m| Actor::at(&self.parties, Seat::new(0, m)))
            .collect();
        let picks = chooser.choose_targets(leader, &members)?;
        picks.first().copied().filter(|&m| m < party.len())
    }

    fn equip_command(&mut self, chooser: &mut dyn Chooser<T>) -> Option<String> {
        let labels: Vec<String> = self
            .parties
            .first()?
            .inventory
            .iter()
            .map(|item| item.name.clone())
            .collect();
        if labels.is_empty() {
            return Some("The stash is empty.".to_string());
        }
        let member = self.pick_member(chooser)?;
        let actor = Actor::at(&self.parties, Seat::new(0, member))?;
        let label = chooser.choose_label(actor, &labels)?;
        let party = self.parties.first_mut()?;
        let Some(index) = party.inventory.iter().position(|item| item.name == label) else {
            return Some(format!("{} looks bewildered.", party.members[member].name));
        };
        let who = party.members[member].name.clone();
        Some(match party.equip_from_stash(member, index) {
            Ok(()) => format!("{who} equips {label}."),
            Err(error) => format!("{who} cannot equip {label}: {error}."),
        })
    }

    fn unequip_command(&mut self, chooser: &mut dyn Chooser<T>) -> Option<String> {
        let member = self.pick_member(chooser)?;
        let actor = Actor::at(&self.parties, Seat::new(0, member))?;
        let labels: Vec<String> = actor
            .character
            .equipment
            .iter()
            .map(|item| item.name.clone())
            .collect();
        if labels.is_empty() {
            return Some(format!("{} has nothing equipped.", actor.character.name));
        }
        let label = chooser.choose_label(actor, &labels)?;
        let party = self.parties.first_mut()?;
        let who = party.members[member].name.clone();
        let Some(index) = party.members[member]
            .equipment
            .iter()
            .position(|item| item.name == label)
        else {
            return Some(format!("{who} looks bewildered."));
        };
        Some(match party.unequip_to_stash(member, index) {
            Ok(()) => format!("{who} puts away {label}."),
            Err(error) => format!("{who} cannot put away {label}: {error}."),
        })
    }

    fn victory_step(&mut self) -> String {
        self.turn_order.clear();
        let before = self.parties.len();
        let mut index = 0;
        self.parties.retain(|party| {
            let keep = index == 0 || !party.defeated();
            index += 1;
            keep
        });
        let beaten = before - self.parties.len();
        info!(beaten, turn = self.turn, "victory");
        let noun = if beaten == 1 { "party" } else { "parties" };
        format!("Victory! {beaten} enemy {noun} defeated.")
    }

    fn defeat_step(&mut self) -> String {
        self.turn_order.clear();
        info!(turn = self.turn, "defeat");
        "The party has fallen. Game over.".to_string()
    }
}
