use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use encoding_rs::Encoding;
use engine::ai::RandomAi;
use engine::api::{
    BattleConfig, BattleResult, parse_structured, resume_battle, save_snapshot, simulate_battle,
    simulate_many, start_battle,
};
use engine::chooser::Seated;
use engine::{
    Actor, Chooser, Entity, Game, GameConfig, GameState, Ruleset, SimpleRules, Snapshot,
};
use tracing_subscriber::EnvFilter;

#[derive(Args, Clone)]
struct BattleOpts {
    /// JSON or YAML battle config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed for determinism
    #[arg(long)]
    seed: Option<u64>,
    /// Members per party
    #[arg(long)]
    party_size: Option<usize>,
    /// Generator points for the player party
    #[arg(long)]
    player_budget: Option<u32>,
    /// Generator points for each enemy party
    #[arg(long)]
    enemy_budget: Option<u32>,
    /// Safety cap on engine steps
    #[arg(long)]
    max_steps: Option<u32>,
}

impl BattleOpts {
    fn resolve(&self) -> Result<BattleConfig> {
        let mut cfg = match &self.config {
            Some(path) => read_structured(path, "battle config")?,
            None => BattleConfig::default(),
        };
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(size) = self.party_size {
            cfg.party_size = size;
        }
        if self.player_budget.is_some() {
            cfg.player_budget = self.player_budget;
        }
        if self.enemy_budget.is_some() {
            cfg.enemy_budget = self.enemy_budget;
        }
        if let Some(max_steps) = self.max_steps {
            cfg.max_steps = max_steps;
        }
        Ok(cfg)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Run one AI-vs-AI battle and print its narration
    Battle {
        #[command(flatten)]
        opts: BattleOpts,
        /// Print the result as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run many battles (sample i uses seed+i) and print win statistics
    Many {
        #[command(flatten)]
        opts: BattleOpts,
        /// Number of battles
        #[arg(long, default_value_t = 100)]
        samples: u32,
    },
    /// Lead the player party from the terminal; enemies are AI
    Play {
        #[command(flatten)]
        opts: BattleOpts,
    },
    /// Run a battle for a number of steps and write a snapshot
    Dump {
        #[command(flatten)]
        opts: BattleOpts,
        /// Engine steps before the snapshot is taken
        #[arg(long, default_value_t = 5)]
        steps: u32,
        /// Output file (.json or .yaml); stdout as JSON if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a snapshot and let the AI finish the fight
    Resume {
        /// Snapshot file (.json or .yaml)
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        opts: BattleOpts,
    },
}

#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Turn-based party battles")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn read_text_auto(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).with_context(|| format!("not UTF-8: {}", path.display()))
    }
}

fn read_structured<D: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<D> {
    let text = read_text_auto(path)?;
    parse_structured(path, &text, what)
}

fn print_result(result: &BattleResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    for line in &result.log {
        println!("{line}");
    }
    println!();
    println!(
        "winner: {} turns: {} steps: {}",
        result.winner, result.turns, result.steps
    );
    println!("survivors: {}", result.survivors.join(", "));
    Ok(())
}

/// Line-based prompts on stdin. Answers are a 1-based number or a label;
/// an empty line or "back" backs out.
struct Console<R> {
    input: R,
    closed: bool,
}

impl<R: BufRead> Console<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            closed: false,
        }
    }

    fn ask(&mut self) -> Option<String> {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.closed = true;
                None
            }
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() || answer.eq_ignore_ascii_case("back") {
                    None
                } else {
                    Some(answer.to_string())
                }
            }
        }
    }

    fn pick<'a>(answer: &str, options: impl Iterator<Item = &'a str>) -> Option<usize> {
        let options: Vec<&str> = options.collect();
        if let Ok(n) = answer.parse::<usize>() {
            return (1..=options.len()).contains(&n).then(|| n - 1);
        }
        options
            .iter()
            .position(|option| option.eq_ignore_ascii_case(answer))
    }
}

impl<R: BufRead> Chooser<i64> for Console<R> {
    fn choose_label(&mut self, actor: Actor<'_, i64>, labels: &[String]) -> Option<String> {
        if self.closed {
            return None;
        }
        println!("{}, choose:", actor.character.name);
        for (i, label) in labels.iter().enumerate() {
            let cost = actor.character.resource_label(label);
            if cost.is_empty() {
                println!("  {}) {label}", i + 1);
            } else {
                println!("  {}) {label} ({cost})", i + 1);
            }
        }
        let answer = self.ask()?;
        match Self::pick(&answer, labels.iter().map(String::as_str)) {
            Some(index) => labels.get(index).cloned(),
            // let the engine decide what an unknown label means
            None => Some(answer),
        }
    }

    fn choose_targets(
        &mut self,
        _actor: Actor<'_, i64>,
        candidates: &[Actor<'_, i64>],
    ) -> Option<Vec<usize>> {
        if self.closed {
            return None;
        }
        println!("target:");
        for (i, candidate) in candidates.iter().enumerate() {
            let c = candidate.character;
            println!(
                "  {}) {} ({}/{} HP)",
                i + 1,
                c.name,
                c.get("HP/Current"),
                c.get("HP/Total")
            );
        }
        let answer = self.ask()?;
        let index = Self::pick(&answer, candidates.iter().map(|c| c.character.name.as_str()))?;
        Some(vec![index])
    }
}

fn play(cfg: &BattleConfig) -> Result<()> {
    let rules: Arc<dyn Ruleset<i64>> = Arc::new(SimpleRules::builtin()?);
    let config = GameConfig {
        combat_commands: true,
        ..cfg.game_config()
    };
    let mut game = Game::new(rules, config);
    let stdin = io::stdin();
    let mut chooser = Seated {
        player: Console::new(stdin.lock()),
        ai: RandomAi::new(!cfg.seed),
    };
    let mut seen = 0;
    loop {
        let state = game.state();
        if state == GameState::Exit {
            break;
        }
        game.step(&mut chooser);
        for line in &game.log()[seen..] {
            println!("{line}");
        }
        seen = game.log().len();
        if state == GameState::Defeat || chooser.player.closed {
            break;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Battle { opts, json } => {
            let result = simulate_battle(&opts.resolve()?)?;
            print_result(&result, json)?;
        }
        Cmd::Many { opts, samples } => {
            let cfg = opts.resolve()?;
            let stats = simulate_many(&cfg, samples)?;
            println!("battle statistics");
            println!("-----------------");
            println!("samples:            {}", stats.samples);
            println!("party size:         {}", cfg.party_size);
            println!("player wins:        {}", stats.player_wins);
            println!("enemy wins:         {}", stats.enemy_wins);
            println!("draws:              {}", stats.draws);
            println!("win rate:           {:.1}%", stats.win_rate() * 100.0);
            println!("avg turns:          {:.2}", stats.avg_turns);
            println!("median turns:       {}", stats.median_turns);
        }
        Cmd::Play { opts } => play(&opts.resolve()?)?,
        Cmd::Dump { opts, steps, out } => {
            let cfg = opts.resolve()?;
            let mut game = start_battle(&cfg)?;
            let mut ai = RandomAi::new(!cfg.seed);
            for _ in 0..steps {
                if game.state() != GameState::Combat {
                    break;
                }
                game.step(&mut ai);
            }
            let snapshot = game.dump();
            match out {
                Some(path) => {
                    save_snapshot(&path, &snapshot)?;
                    println!("wrote {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            }
        }
        Cmd::Resume { file, opts } => {
            let snapshot: Snapshot<i64> = read_structured(&file, "snapshot")?;
            let result = resume_battle(snapshot, &opts.resolve()?)?;
            print_result(&result, false)?;
        }
    }
    Ok(())
}
