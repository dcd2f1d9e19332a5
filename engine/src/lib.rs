use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod action;
pub mod ai;
pub mod api;
pub mod character;
pub mod chooser;
pub mod command;
pub mod config;
pub mod content;
pub mod cost;
pub mod entity;
pub mod error;
pub mod game;
pub mod item;
pub mod names;
pub mod party;
pub mod rules;
pub mod snapshot;
pub mod targeting;

pub use action::{Action, Effect, Filter, Participants, Scope};
pub use character::{Character, LifeRule};
pub use chooser::{Actor, Chooser};
pub use config::{GameConfig, Unaffordable};
pub use cost::{Cost, Costs, Magnitude, Operation};
pub use entity::{Entity, Formula, Sheet};
pub use error::{EquipError, SnapshotError, TargetError};
pub use game::{Game, GameState};
pub use item::Item;
pub use party::{Party, Seat};
pub use rules::{Ruleset, SimpleRules};
pub use snapshot::Snapshot;

/// Numeric type backing every attribute. `Default` is the numeric zero.
pub trait Scalar:
    Copy
    + PartialOrd
    + Default
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self {
        Self::default()
    }

    fn one() -> Self {
        Self::from_i64(1)
    }

    fn from_i64(value: i64) -> Self;
}

macro_rules! scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                fn from_i64(value: i64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

scalar!(i32, i64, f32, f64);

/// Seeded random source. Everything random in the engine draws from one of these.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..n`. Returns 0 for an empty range.
    pub fn pick(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform random permutation in place.
    pub fn shuffle<X>(&mut self, items: &mut [X]) {
        items.shuffle(&mut self.rng);
    }
}
