use std::collections::VecDeque;

use engine::targeting::{candidates, resolve};
use engine::{
    Action, Actor, Character, Chooser, Entity, Filter, Party, Scope, Seat, Sheet, TargetError,
};

fn fighter(name: &str, hp: i64) -> Character<i64> {
    Character::new(name, "fighter").with_sheet(
        Sheet::new()
            .with("HP/Total", 10)
            .with("HP/Current", hp),
    )
}

/// Heroes (healthy, wounded, down) against goblins (two up, one down).
fn roster() -> Vec<Party<i64>> {
    vec![
        Party::new(vec![fighter("Ann", 10), fighter("Bo", 4), fighter("Cy", 0)]),
        Party::new(vec![fighter("Gob", 10), fighter("Nob", 7), fighter("Zog", 0)]),
    ]
}

/// Answers target prompts from a queue; `None` once it runs dry.
struct Picks(VecDeque<Vec<usize>>);

impl Chooser<i64> for Picks {
    fn choose_label(&mut self, _actor: Actor<'_, i64>, _labels: &[String]) -> Option<String> {
        None
    }

    fn choose_targets(
        &mut self,
        _actor: Actor<'_, i64>,
        _candidates: &[Actor<'_, i64>],
    ) -> Option<Vec<usize>> {
        self.0.pop_front()
    }
}

fn seats(list: &[(usize, usize)]) -> Vec<Seat> {
    list.iter().map(|&(p, m)| Seat::new(p, m)).collect()
}

#[test]
fn self_scope_is_the_actor() {
    let parties = roster();
    let got = resolve(&parties, Seat::new(0, 1), Scope::SelfOnly, Filter::None, None);
    assert_eq!(got, Ok(seats(&[(0, 1)])));
}

#[test]
fn group_scopes_take_everyone_the_filter_keeps() {
    let parties = roster();
    let actor = Seat::new(0, 0);
    assert_eq!(
        candidates(&parties, actor, Scope::Enemies, Filter::OnlyAlive),
        seats(&[(1, 0), (1, 1)])
    );
    assert_eq!(
        candidates(&parties, actor, Scope::Party, Filter::None),
        seats(&[(0, 0), (0, 1), (0, 2)])
    );
    assert_eq!(
        candidates(&parties, actor, Scope::Everyone, Filter::OnlyDead),
        seats(&[(0, 2), (1, 2)])
    );
}

#[test]
fn health_filters() {
    let parties = roster();
    let actor = Seat::new(1, 0);
    assert_eq!(
        candidates(&parties, actor, Scope::Enemies, Filter::OnlyHealthy),
        seats(&[(0, 0)])
    );
    assert_eq!(
        candidates(&parties, actor, Scope::Party, Filter::OnlyUnhealthy),
        seats(&[(1, 1)])
    );
    assert_eq!(
        candidates(&parties, actor, Scope::Party, Filter::OnlyUndefeated),
        seats(&[(1, 0), (1, 1)])
    );
}

#[test]
fn empty_candidate_set_is_an_error() {
    let mut parties = roster();
    parties[0].members.retain(|c| c.name == "Ann");
    let got = resolve(&parties, Seat::new(0, 0), Scope::Ally, Filter::OnlyUnhealthy, None);
    assert_eq!(got, Err(TargetError::NoCandidates));
}

#[test]
fn single_candidate_needs_no_prompt() {
    let parties = roster();
    let mut picks = Picks(VecDeque::new());
    let got = resolve(
        &parties,
        Seat::new(1, 0),
        Scope::Ally,
        Filter::OnlyUnhealthy,
        Some(&mut picks),
    );
    assert_eq!(got, Ok(seats(&[(1, 1)])));
}

#[test]
fn singular_scope_asks_the_chooser() {
    let parties = roster();
    let mut picks = Picks(VecDeque::from([vec![1]]));
    let got = resolve(
        &parties,
        Seat::new(0, 0),
        Scope::Enemy,
        Filter::OnlyAlive,
        Some(&mut picks),
    );
    assert_eq!(got, Ok(seats(&[(1, 1)])));
}

#[test]
fn existence_check_never_prompts() {
    let parties = roster();
    let got = resolve(&parties, Seat::new(0, 0), Scope::Enemy, Filter::OnlyAlive, None);
    assert_eq!(got, Ok(seats(&[(1, 0), (1, 1)])));
}

#[test]
fn backing_out_cancels() {
    let parties = roster();
    let mut picks = Picks(VecDeque::new());
    let got = resolve(
        &parties,
        Seat::new(0, 0),
        Scope::Enemy,
        Filter::OnlyAlive,
        Some(&mut picks),
    );
    assert_eq!(got, Err(TargetError::Cancelled));
}

#[test]
fn empty_or_bogus_pick_is_an_empty_list() {
    let parties = roster();
    let mut picks = Picks(VecDeque::from([vec![], vec![9]]));
    for _ in 0..2 {
        let got = resolve(
            &parties,
            Seat::new(0, 0),
            Scope::Enemy,
            Filter::OnlyAlive,
            Some(&mut picks),
        );
        assert_eq!(got, Ok(Vec::new()));
    }
}

#[test]
fn usable_needs_a_living_actor_and_a_target() {
    let parties = roster();
    let strike = Action::<i64>::new("Strike")
        .visible()
        .scope(Scope::Enemy)
        .filter(Filter::OnlyAlive);
    assert!(strike.usable_among(&parties, Seat::new(0, 0)));
    assert!(!strike.usable_among(&parties, Seat::new(0, 2)));

    let revive = Action::<i64>::new("Revive")
        .scope(Scope::Ally)
        .filter(Filter::OnlyDead);
    assert!(revive.usable_among(&parties, Seat::new(1, 0)));

    let mut cleared = roster();
    cleared[0].members[2].add("HP/Current", 10);
    assert!(!revive.usable_among(&cleared, Seat::new(0, 0)));
}

#[test]
fn scope_serializes_self_keyword() {
    let json = serde_json::to_string(&Scope::SelfOnly).expect("serializes");
    assert_eq!(json, "\"self\"");
    let back: Scope = serde_json::from_str("\"enemies\"").expect("parses");
    assert_eq!(back, Scope::Enemies);
}

#[test]
fn self_scope_ignores_everyone_else() {
    let parties = roster();
    let healthy = resolve(&parties, Seat::new(0, 0), Scope::SelfOnly, Filter::OnlyHealthy, None);
    assert_eq!(healthy, Ok(seats(&[(0, 0)])));
    let fallen = resolve(&parties, Seat::new(0, 2), Scope::SelfOnly, Filter::OnlyDead, None);
    assert_eq!(fallen, Ok(seats(&[(0, 2)])));
}
