mod simulation;

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use log::debug;

use simulation::{RunRecord, SimulationConfig, SweepSummary, run_session, summarize};
use tipsy_game::ContentFilters;

#[derive(Debug, Parser)]
#[command(name = "tipsy-tester", version)]
#[command(about = "Playability sweeps for the Tipsy Trials turn engine")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Iterations per seed (each offsets the seed by its index)
    #[arg(long, default_value_t = 10)]
    iterations: u64,

    /// Roster size per simulated session
    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Stop a run after this many rounds
    #[arg(long, default_value_t = 25)]
    max_rounds: u32,

    /// Include adult prompts in the sweep catalog
    #[arg(long)]
    adult: bool,

    /// Include challenge prompts in the sweep catalog
    #[arg(long)]
    challenges: bool,

    /// Sweep only the adult prompts
    #[arg(long)]
    only_adult: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    announce_banner();

    let seeds = resolve_seeds(&split_csv(&args.seeds))?;
    let filters = ContentFilters {
        include_adult: args.adult,
        include_challenges: args.challenges,
        only_adult: args.only_adult,
    };

    let mut records = Vec::new();
    for seed in &seeds {
        for iteration in 0..args.iterations {
            let config = SimulationConfig::new(seed.wrapping_add(iteration))
                .with_players(args.players)
                .with_max_rounds(args.max_rounds)
                .with_filters(filters);
            debug!("running sweep seed={} iteration={iteration}", config.seed);
            let record = run_session(config)?;
            if args.verbose {
                print_record(&record);
            }
            records.push(record);
        }
    }

    let summary = summarize(&records);
    match args.report.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_summary(&summary),
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🍹 Tipsy Trials Playability Tester".bright_cyan().bold());
    println!("{}", "==================================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve CLI seed tokens into numeric seeds. Accepts literal integers,
/// negatives taken by magnitude.
fn resolve_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        if let Ok(value) = token.parse::<i64>() {
            seeds.push(value.unsigned_abs());
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
            continue;
        }
        bail!("Unrecognized seed token: {token}");
    }
    if seeds.is_empty() {
        bail!("No seeds to run");
    }
    Ok(seeds)
}

fn print_record(record: &RunRecord) {
    let outcome = if record.ran_dry {
        "dry".yellow()
    } else {
        "ok".green()
    };
    println!(
        "  seed {:>10} | rounds {:>3} | answered {:>4} | skips {:>2} | group turns {:>3} | {}",
        record.seed,
        record.rounds_completed,
        record.prompts_answered,
        record.skips_spent,
        record.group_turns,
        outcome
    );
}

fn print_summary(summary: &SweepSummary) {
    println!();
    println!("{}", "Sweep Summary".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    println!("  runs:            {}", summary.runs);
    println!("  mean rounds:     {:.1}", summary.mean_rounds);
    println!("  mean answered:   {:.1}", summary.mean_answered);
    println!("  skips spent:     {}", summary.total_skips_spent);
    let dry = format!("{}/{}", summary.dry_runs, summary.runs);
    if summary.dry_runs == 0 {
        println!("  dry runs:        {}", dry.green());
    } else {
        println!("  dry runs:        {}", dry.yellow());
    }
}
