use crate::chooser::{Actor, Chooser};
use crate::{Dice, Scalar};

/// Picks uniformly at random: any label, exactly one target.
#[derive(Debug, Clone)]
pub struct RandomAi {
    dice: Dice,
}

impl RandomAi {
    pub fn new(seed: u64) -> Self {
        Self {
            dice: Dice::from_seed(seed),
        }
    }
}

impl<T: Scalar> Chooser<T> for RandomAi {
    fn choose_label(&mut self, _actor: Actor<'_, T>, labels: &[String]) -> Option<String> {
        if labels.is_empty() {
            return None;
        }
        labels.get(self.dice.pick(labels.len())).cloned()
    }

    fn choose_targets(
        &mut self,
        _actor: Actor<'_, T>,
        candidates: &[Actor<'_, T>],
    ) -> Option<Vec<usize>> {
        if candidates.is_empty() {
            return None;
        }
        Some(vec![self.dice.pick(candidates.len())])
    }
}
