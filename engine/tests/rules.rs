use engine::names::{NameList, NameSource};
use engine::{
    Action, Character, Dice, Effect, Entity, Participants, Party, Ruleset, Seat, SimpleRules,
};
use insta::assert_snapshot;

fn adventurer(rules: &SimpleRules, name: &str) -> Character<i64> {
    let mut c = Character::new(name, "adventurer").with_sheet(SimpleRules::sheet());
    rules.bind(&mut c);
    c.restore();
    c
}

#[test]
fn fresh_adventurer_has_full_pools() {
    let rules = SimpleRules::default();
    let c = rules.recruit(&mut Dice::from_seed(1));
    assert_eq!(c.get("HP/Total"), 5);
    assert_eq!(c.get("HP/Current"), 5);
    assert_eq!(c.get("MP/Current"), 3);
    assert_eq!(c.name, "Nameless");
    let labels: Vec<&str> = c.visible_actions().map(|a| a.name.as_str()).collect();
    assert_eq!(labels, vec!["Attack", "Heal", "Magic/Fire"]);
    assert!(c.action("Wait").is_some());
    assert_eq!(c.resource_label("Magic/Fire"), "3 MP");
    assert_eq!(c.resource_label("Attack"), "");
}

#[test]
fn attack_deals_attack_minus_half_defence() {
    let rules = SimpleRules::default();
    let mut parties = vec![
        Party::new(vec![adventurer(&rules, "Hero")]),
        Party::new(vec![adventurer(&rules, "Goblin")]),
    ];
    let mut p = Participants::new(&mut parties, vec![Seat::new(0, 0)], vec![Seat::new(1, 0)]);
    let text = SimpleRules::attack().invoke(&mut p);
    assert_snapshot!(text, @"Hero attacks Goblin for 2 damage.");
    assert_eq!(parties[1].members[0].get("HP/Current"), 3);
}

#[test]
fn killing_blow_grants_experience() {
    let rules = SimpleRules::default();
    let mut goblin = adventurer(&rules, "Goblin");
    goblin.set("HP/Current", 2);
    let mut parties = vec![
        Party::new(vec![adventurer(&rules, "Hero")]),
        Party::new(vec![goblin]),
    ];
    let mut p = Participants::new(&mut parties, vec![Seat::new(0, 0)], vec![Seat::new(1, 0)]);
    let text = SimpleRules::attack().invoke(&mut p);
    assert_eq!(
        text,
        "Hero attacks Goblin for 2 damage.\nGoblin falls! Hero gains 1 experience."
    );
    let hero = &parties[0].members[0];
    assert_eq!(hero.get("Experience"), 1);
    assert_eq!(hero.get("HP/Total"), 7);
    assert!(!parties[1].members[0].alive());
}

#[test]
fn heal_tops_up_the_target() {
    let rules = SimpleRules::default();
    let mut wounded = adventurer(&rules, "Bo");
    wounded.set("HP/Current", 2);
    let mut parties = vec![Party::new(vec![adventurer(&rules, "Ann"), wounded])];
    let mut p = Participants::new(&mut parties, vec![Seat::new(0, 0)], vec![Seat::new(0, 1)]);
    let text = SimpleRules::heal().invoke(&mut p);
    assert_snapshot!(text, @"Ann heals Bo to 5 HP.");
}

#[test]
fn fire_scorches_every_target() {
    let rules = SimpleRules::default();
    let mut parties = vec![
        Party::new(vec![adventurer(&rules, "Ann")]),
        Party::new(vec![adventurer(&rules, "Gob"), adventurer(&rules, "Nob")]),
    ];
    let targets = vec![Seat::new(1, 0), Seat::new(1, 1)];
    let mut p = Participants::new(&mut parties, vec![Seat::new(0, 0)], targets);
    let text = SimpleRules::fire().invoke(&mut p);
    assert_eq!(text, "Gob is scorched for 2 damage.\nNob is scorched for 2 damage.");
    assert!(parties[1].iter().all(|c| c.get("HP/Current") == 3));
}

#[test]
fn generated_party_spends_the_whole_budget() {
    let rules = SimpleRules::builtin().expect("built-in content");
    let mut dice = Dice::from_seed(99);
    let party: Party<i64> = Party::generate(4, Some(6), &rules, &mut dice);
    assert_eq!(party.len(), 4);
    let spent: i64 = party.iter().map(|c| c.get("Experience")).sum();
    assert_eq!(spent, 6);
    for member in party.iter() {
        assert_eq!(member.get("HP/Current"), member.get("HP/Total"));
        assert_eq!(member.get("HP/Total"), 5 + 2 * member.get("Experience"));
        assert!(!member.name.is_empty());
    }
    assert!(!party.defeated());
}

#[test]
fn generation_is_seeded() {
    let rules = SimpleRules::builtin().expect("built-in content");
    let names = |seed| {
        let party: Party<i64> =
            Party::generate(3, Some(2), &rules, &mut Dice::from_seed(seed));
        party.iter().map(|c| c.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(5), names(5));
}

#[test]
fn empty_party_is_defeated() {
    let party: Party<i64> = Party::default();
    assert!(party.is_empty());
    assert!(party.defeated());
}

#[test]
fn names_without_surnames() {
    let list = NameList {
        first: vec!["Ash".to_string()],
        last: Vec::new(),
    };
    assert_eq!(list.name(&mut Dice::from_seed(0)), "Ash");

    let full = NameList {
        first: vec!["Ash".to_string()],
        last: vec!["Vale".to_string()],
    };
    assert_eq!(full.name(&mut Dice::from_seed(0)), "Ash Vale");
}

#[test]
fn starter_stash_comes_with_the_builtin_rules() {
    let rules = SimpleRules::builtin().expect("built-in content");
    let stash = rules.starter_items();
    assert_eq!(stash.len(), 5);
    assert_eq!(rules.points_attribute(), "Experience");
}

struct Drain(i64);

impl Effect<i64> for Drain {
    fn apply(&self, p: &mut Participants<'_, i64>) -> String {
        for target in p.targets().to_vec() {
            p.add(target, "HP/Current", -self.0);
        }
        for source in p.sources().to_vec() {
            p.add(source, "HP/Current", self.0);
        }
        format!("{} drains {}.", p.name(p.sources()[0]), p.name(p.targets()[0]))
    }
}

#[test]
fn struct_effects_plug_into_actions() {
    let rules = SimpleRules::default();
    let mut hero = adventurer(&rules, "Hero");
    hero.set("HP/Current", 1);
    let mut parties = vec![
        Party::new(vec![hero]),
        Party::new(vec![adventurer(&rules, "Imp")]),
    ];
    let drain = Action::new("Drain").visible().effect_with(Drain(3));
    let mut p = Participants::new(&mut parties, vec![Seat::new(0, 0)], vec![Seat::new(1, 0)]);
    assert_eq!(drain.invoke(&mut p), "Hero drains Imp.");
    assert_eq!(parties[0].members[0].get("HP/Current"), 4);
    assert_eq!(parties[1].members[0].get("HP/Current"), 2);
}
