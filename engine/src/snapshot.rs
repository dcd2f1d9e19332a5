use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Scalar;
use crate::config::GameConfig;
use crate::error::SnapshotError;
use crate::game::{Game, GameState};
use crate::party::{Party, Seat};
use crate::rules::Ruleset;

/// Primitive state of a game: roster, turn counter, pending turn order.
///
/// Action tables are not part of it; [`Game::restore`] binds them again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Scalar"))]
pub struct Snapshot<T> {
    pub parties: Vec<Party<T>>,
    #[serde(default)]
    pub turn: u64,
    #[serde(default)]
    pub turn_order: Vec<Seat>,
    #[serde(default)]
    pub exit: bool,
}

impl<T: Scalar> Game<T> {
    pub fn dump(&self) -> Snapshot<T> {
        Snapshot {
            parties: self.parties.clone(),
            turn: self.turn(),
            turn_order: self.turn_order().iter().copied().collect(),
            exit: self.state() == GameState::Exit,
        }
    }

    pub fn restore(
        snapshot: Snapshot<T>,
        rules: Arc<dyn Ruleset<T>>,
        config: GameConfig,
    ) -> Result<Self, SnapshotError> {
        let Snapshot {
            mut parties,
            turn,
            turn_order,
            exit,
        } = snapshot;
        for &seat in &turn_order {
            let exists = parties
                .get(seat.party)
                .is_some_and(|party| seat.member < party.len());
            if !exists {
                return Err(SnapshotError::MissingSeat { seat });
            }
        }
        for character in parties.iter_mut().flat_map(|party| party.members.iter_mut()) {
            rules.bind(character);
        }
        let mut game = Game::with_parties(parties, rules, config);
        game.restore_parts(turn, turn_order.into(), exit);
        Ok(game)
    }
}
