//! File-level entry points: configs, whole-battle simulation, snapshot I/O.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Scalar;
use crate::ai::RandomAi;
use crate::config::{GameConfig, Unaffordable};
use crate::entity::Entity;
use crate::game::{Game, GameState};
use crate::rules::{Ruleset, SimpleRules};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct BattleConfig {
    pub seed: u64,
    pub party_size: usize,
    pub player_budget: Option<u32>,
    pub enemy_budget: Option<u32>,
    /// Safety cap on engine steps per battle.
    pub max_steps: u32,
    pub max_prompts: u32,
    pub unaffordable: Unaffordable,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            party_size: 4,
            player_budget: None,
            enemy_budget: None,
            max_steps: 500,
            max_prompts: 8,
            unaffordable: Unaffordable::Reprompt,
        }
    }
}

impl BattleConfig {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            parties: 2,
            party_size: self.party_size,
            player_budget: self.player_budget,
            enemy_budget: self.enemy_budget,
            max_prompts: self.max_prompts,
            unaffordable: self.unaffordable,
            // the AI drives every side here
            combat_commands: false,
            seed: self.seed,
        }
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleResult {
    /// `"player"`, `"enemy"` or `"draw"` when the step cap was hit.
    pub winner: String,
    pub turns: u64,
    pub steps: u32,
    /// Names of every character still standing when the fight ended.
    pub survivors: Vec<String>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleStats {
    pub samples: u32,
    pub player_wins: u32,
    pub enemy_wins: u32,
    pub draws: u32,
    pub avg_turns: f64,
    pub median_turns: u64,
}

impl BattleStats {
    pub fn win_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.player_wins as f64 / self.samples as f64
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<BattleConfig> {
    read_structured(path.as_ref(), "battle config")
}

/// A built-in rule set game with both parties on the field.
pub fn start_battle(cfg: &BattleConfig) -> Result<Game<i64>> {
    let rules: Arc<dyn Ruleset<i64>> = Arc::new(SimpleRules::builtin()?);
    let mut game = Game::new(rules, cfg.game_config());
    let opening = game.muster();
    info!(seed = cfg.seed, "{opening}");
    Ok(game)
}

/// Let [`RandomAi`] drive every party until one side is beaten or
/// `max_steps` runs out.
pub fn simulate_battle(cfg: &BattleConfig) -> Result<BattleResult> {
    let game = start_battle(cfg)?;
    Ok(finish(game, cfg))
}

/// Continue a saved fight with AI on every side.
pub fn resume_battle(snapshot: Snapshot<i64>, cfg: &BattleConfig) -> Result<BattleResult> {
    let rules: Arc<dyn Ruleset<i64>> = Arc::new(SimpleRules::builtin()?);
    let game = Game::restore(snapshot, rules, cfg.game_config())
        .context("snapshot does not fit its roster")?;
    Ok(finish(game, cfg))
}

fn finish(mut game: Game<i64>, cfg: &BattleConfig) -> BattleResult {
    let mut ai = RandomAi::new(!cfg.seed);
    let mut steps = 0u32;
    while game.state() == GameState::Combat && steps < cfg.max_steps {
        game.step(&mut ai);
        steps += 1;
    }

    let survivors: Vec<String> = game
        .parties
        .iter()
        .flat_map(|party| party.iter())
        .filter(|member| member.alive())
        .map(|member| member.name.clone())
        .collect();
    let winner = match game.state() {
        GameState::Victory => "player",
        GameState::Defeat => "enemy",
        _ => "draw",
    };
    if winner != "draw" {
        // closing narration
        game.step(&mut ai);
    }
    info!(winner, turns = game.turn(), steps, "battle finished");

    BattleResult {
        winner: winner.to_string(),
        turns: game.turn(),
        steps,
        survivors,
        log: game.log().to_vec(),
    }
}

/// Run `samples` battles, sample `i` seeded with `seed + i`.
pub fn simulate_many(cfg: &BattleConfig, samples: u32) -> Result<BattleStats> {
    let mut stats = BattleStats {
        samples,
        ..BattleStats::default()
    };
    let mut turns: Vec<u64> = Vec::with_capacity(samples as usize);
    for i in 0..samples {
        let result = simulate_battle(&cfg.with_seed(cfg.seed.wrapping_add(u64::from(i))))?;
        match result.winner.as_str() {
            "player" => stats.player_wins += 1,
            "enemy" => stats.enemy_wins += 1,
            _ => stats.draws += 1,
        }
        turns.push(result.turns);
    }

    turns.sort_unstable();
    if !turns.is_empty() {
        stats.avg_turns = turns.iter().sum::<u64>() as f64 / turns.len() as f64;
        let m = turns.len() / 2;
        stats.median_turns = if turns.len() % 2 == 1 {
            turns[m]
        } else {
            (turns[m - 1] + turns[m]) / 2
        };
    }
    Ok(stats)
}

pub fn save_snapshot<T: Scalar>(path: impl AsRef<Path>, snapshot: &Snapshot<T>) -> Result<()> {
    let path = path.as_ref();
    let text = match Format::of(path)? {
        Format::Json => serde_json::to_string_pretty(snapshot)?,
        Format::Yaml => serde_yaml::to_string(snapshot)?,
    };
    fs::write(path, text).with_context(|| format!("failed to write snapshot: {}", path.display()))
}

pub fn load_snapshot<T: Scalar>(path: impl AsRef<Path>) -> Result<Snapshot<T>> {
    read_structured(path.as_ref(), "snapshot")
}

enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => bail!("unsupported file type (want .json or .yaml): {}", path.display()),
        }
    }
}

/// Parse a JSON or YAML file into `D`.
pub fn parse_structured<D: DeserializeOwned>(path: &Path, text: &str, what: &str) -> Result<D> {
    match Format::of(path)? {
        Format::Json => serde_json::from_str(text)
            .with_context(|| format!("failed to parse {what} JSON: {}", path.display())),
        Format::Yaml => serde_yaml::from_str(text)
            .with_context(|| format!("failed to parse {what} YAML: {}", path.display())),
    }
}

fn read_structured<D: DeserializeOwned>(path: &Path, what: &str) -> Result<D> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what}: {}", path.display()))?;
    parse_structured(path, &text, what)
}
