use crate::Scalar;
use crate::character::Character;
use crate::party::{Party, Seat};

/// The character a choice is made for (or about), with its seat.
#[derive(Debug)]
pub struct Actor<'a, T> {
    pub seat: Seat,
    pub character: &'a Character<T>,
}

impl<T> Clone for Actor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Actor<'_, T> {}

impl<'a, T: Scalar> Actor<'a, T> {
    pub fn at(parties: &'a [Party<T>], seat: Seat) -> Option<Self> {
        parties
            .get(seat.party)
            .and_then(|party| party.members.get(seat.member))
            .map(|character| Actor { seat, character })
    }
}

/// The decision maker behind every prompt: a person at a terminal or an AI.
pub trait Chooser<T: Scalar> {
    /// Pick one of `labels`. `None` means "go back".
    fn choose_label(&mut self, actor: Actor<'_, T>, labels: &[String]) -> Option<String>;

    /// Pick targets by index into `candidates`. `None` means "go back".
    fn choose_targets(
        &mut self,
        actor: Actor<'_, T>,
        candidates: &[Actor<'_, T>],
    ) -> Option<Vec<usize>>;
}

impl<T: Scalar, C: Chooser<T> + ?Sized> Chooser<T> for &mut C {
    fn choose_label(&mut self, actor: Actor<'_, T>, labels: &[String]) -> Option<String> {
        (**self).choose_label(actor, labels)
    }

    fn choose_targets(
        &mut self,
        actor: Actor<'_, T>,
        candidates: &[Actor<'_, T>],
    ) -> Option<Vec<usize>> {
        (**self).choose_targets(actor, candidates)
    }
}

/// Routes party 0 to `player` and every other party to `ai`.
#[derive(Debug)]
pub struct Seated<P, A> {
    pub player: P,
    pub ai: A,
}

impl<T: Scalar, P: Chooser<T>, A: Chooser<T>> Chooser<T> for Seated<P, A> {
    fn choose_label(&mut self, actor: Actor<'_, T>, labels: &[String]) -> Option<String> {
        if actor.seat.party == 0 {
            self.player.choose_label(actor, labels)
        } else {
            self.ai.choose_label(actor, labels)
        }
    }

    fn choose_targets(
        &mut self,
        actor: Actor<'_, T>,
        candidates: &[Actor<'_, T>],
    ) -> Option<Vec<usize>> {
        if actor.seat.party == 0 {
            self.player.choose_targets(actor, candidates)
        } else {
            self.ai.choose_targets(actor, candidates)
        }
    }
}
