//! Scope × filter target resolution.
//!
//! Resolution is a pure function of the roster, the actor's seat, the
//! action's scope and filter, and (for singular scopes with more than one
//! candidate) the chooser's answer. Nothing here draws randomness.

use tracing::debug;

use crate::Scalar;
use crate::action::{Filter, Scope};
use crate::chooser::{Actor, Chooser};
use crate::error::TargetError;
use crate::party::{Party, Seat};

/// Seats the scope admits before filtering.
pub fn in_scope<T: Scalar>(parties: &[Party<T>], actor: Seat, scope: Scope) -> Vec<Seat> {
    let members = |party: usize| {
        parties
            .get(party)
            .map(|p| p.members.len())
            .unwrap_or(0)
    };
    let whole = |party: usize| (0..members(party)).map(move |member| Seat::new(party, member));

    match scope {
        Scope::SelfOnly => {
            if actor.member < members(actor.party) {
                vec![actor]
            } else {
                Vec::new()
            }
        }
        Scope::Ally | Scope::Party => whole(actor.party).collect(),
        Scope::Enemy | Scope::Enemies => (0..parties.len())
            .filter(|&party| party != actor.party)
            .flat_map(whole)
            .collect(),
        Scope::Everyone => (0..parties.len()).flat_map(whole).collect(),
    }
}

/// Seats the scope admits and the filter keeps.
pub fn candidates<T: Scalar>(
    parties: &[Party<T>],
    actor: Seat,
    scope: Scope,
    filter: Filter,
) -> Vec<Seat> {
    in_scope(parties, actor, scope)
        .into_iter()
        .filter(|seat| {
            parties
                .get(seat.party)
                .and_then(|party| party.members.get(seat.member))
                .is_some_and(|character| filter.matches::<T, _>(character))
        })
        .collect()
}

/// Resolve the targets of an action.
///
/// Without a chooser only the candidate set is computed, which is what
/// usability checks want. With one, singular scopes holding more than one
/// candidate are narrowed to the chooser's pick; an empty pick comes back as
/// `Ok(vec![])`, which callers can tell apart from
/// [`TargetError::NoCandidates`].
pub fn resolve<T: Scalar>(
    parties: &[Party<T>],
    actor: Seat,
    scope: Scope,
    filter: Filter,
    chooser: Option<&mut dyn Chooser<T>>,
) -> Result<Vec<Seat>, TargetError> {
    let seats = candidates(parties, actor, scope, filter);
    if seats.is_empty() {
        debug!(?actor, ?scope, ?filter, "no legal targets");
        return Err(TargetError::NoCandidates);
    }
    if !scope.is_singular() || seats.len() == 1 {
        return Ok(seats);
    }
    let Some(chooser) = chooser else {
        return Ok(seats);
    };

    let Some(acting) = Actor::at(parties, actor) else {
        return Err(TargetError::NoCandidates);
    };
    let offered: Vec<Actor<'_, T>> = seats
        .iter()
        .filter_map(|&seat| Actor::at(parties, seat))
        .collect();
    let picks = chooser
        .choose_targets(acting, &offered)
        .ok_or(TargetError::Cancelled)?;
    let chosen: Vec<Seat> = picks
        .into_iter()
        .filter_map(|index| seats.get(index).copied())
        .take(1)
        .collect();
    debug!(?actor, ?chosen, "targets chosen");
    Ok(chosen)
}
