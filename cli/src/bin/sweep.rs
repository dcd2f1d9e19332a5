use clap::Parser;
use engine::api::{BattleConfig, simulate_many};

#[derive(Parser)]
#[command(name = "arena-sweep")]
#[command(about = "Monte Carlo sweep: player win rate across enemy budgets")]
struct Args {
    /// Lowest enemy budget
    #[arg(long, default_value_t = 0)]
    from: u32,

    /// Highest enemy budget (inclusive)
    #[arg(long, default_value_t = 8)]
    to: u32,

    /// Budget increment
    #[arg(long, default_value_t = 2)]
    by: u32,

    /// Battles per budget
    #[arg(long, default_value_t = 200)]
    samples: u32,

    /// Members per party
    #[arg(long, default_value_t = 4)]
    party_size: usize,

    /// Points for the player party
    #[arg(long)]
    player_budget: Option<u32>,

    /// RNG base seed (battle i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.from > args.to {
        anyhow::bail!("--from must not exceed --to");
    }

    println!("arena-sweep results");
    println!("-------------------");
    println!("samples per budget: {}", args.samples);
    println!("party size:         {}", args.party_size);
    println!();
    println!("{:>8} {:>9} {:>10} {:>7}", "budget", "win rate", "avg turns", "draws");

    let mut budget = args.from;
    while budget <= args.to {
        let cfg = BattleConfig {
            seed: args.seed,
            party_size: args.party_size,
            player_budget: args.player_budget,
            enemy_budget: Some(budget),
            ..BattleConfig::default()
        };
        let stats = simulate_many(&cfg, args.samples)?;
        println!(
            "{:>8} {:>8.1}% {:>10.2} {:>7}",
            budget,
            stats.win_rate() * 100.0,
            stats.avg_turns,
            stats.draws
        );
        match budget.checked_add(args.by.max(1)) {
            Some(next) => budget = next,
            None => break,
        }
    }

    Ok(())
}
