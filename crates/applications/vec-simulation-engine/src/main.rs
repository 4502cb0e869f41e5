//! VEC Simulation Engine CLI
//!
//! Runs episodes of the VEC market under one or more action policies and
//! reports the per-episode score.

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vec_core::ServerKind;
use vec_simulation_engine::{
    config::{SimulationConfig, TopologyConfig},
    entities::EntityRegistry,
    environment::Environment,
    policies::{FullOffloadPolicy, LocalOnlyPolicy, OffloadPolicy, RandomPolicy},
    runner::{EpisodeRunner, RunSummary},
};

#[derive(Parser, Debug)]
#[command(name = "vec-sim")]
#[command(about = "Simulate a vehicular edge-computing market", long_about = None)]
struct Args {
    /// Number of episodes per policy
    #[arg(short, long, default_value_t = 5)]
    episodes: usize,

    /// Seed for topology sampling and random actions (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Policies to compare (comma-separated: random,local,vehicular,fixed)
    #[arg(short, long, default_value = "random")]
    policies: String,

    /// Number of UEs (sampled if omitted)
    #[arg(long)]
    ues: Option<usize>,

    /// Number of vehicular edge servers (sampled if omitted)
    #[arg(long)]
    ves: Option<usize>,

    /// Number of fixed edge servers (sampled if omitted)
    #[arg(long)]
    fes: Option<usize>,

    /// JSON config file (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

fn build_policy(name: &str) -> Option<Box<dyn OffloadPolicy>> {
    match name {
        "random" => Some(Box::new(RandomPolicy::new())),
        "local" => Some(Box::new(LocalOnlyPolicy::new())),
        "vehicular" => Some(Box::new(FullOffloadPolicy::new(ServerKind::Vehicular))),
        "fixed" => Some(Box::new(FullOffloadPolicy::new(ServerKind::Fixed))),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vec_sim=info,vec_simulation_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path);
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    // Explicit counts override whatever the config resolves to
    let resolved = config.topology.resolve(&mut rng)?;
    let topology = TopologyConfig::new(
        args.ues.unwrap_or(resolved.ue_count),
        args.ves.unwrap_or(resolved.ves_count),
        args.fes.unwrap_or(resolved.fes_count),
    );
    let registry = EntityRegistry::build(&topology, &config.entities, &config.task)?;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  VEC Simulation Engine                                   ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    println!("Configuration:");
    println!("  Seed: {}", seed);
    println!("  UEs: {}", topology.ue_count);
    println!("  Vehicular edge servers: {}", topology.ves_count);
    println!("  Fixed edge servers: {}", topology.fes_count);
    println!("  Episodes: {}", args.episodes);
    println!("  Time slots per episode: {}\n", config.episode.time_slot_max);

    let mut summaries: Vec<RunSummary> = Vec::new();

    for policy_name in args.policies.split(',').map(|s| s.trim()) {
        let Some(policy) = build_policy(policy_name) else {
            eprintln!("Unknown policy: {}", policy_name);
            continue;
        };

        info!("Running {} episodes with {} policy", args.episodes, policy.name());

        // Every policy sees the same action stream seed
        let mut policy_rng = StdRng::seed_from_u64(seed);
        let env = Environment::new(&registry, &config.channel, config.episode);
        let mut runner = EpisodeRunner::new(env, policy);
        summaries.push(runner.run(args.episodes, &mut policy_rng));
    }

    println!("{:<24} {:>8} {:>8} {:>16} {:>10}",
        "Policy", "Episode", "Score", "Mean utility", "Status");
    println!("{}", "-".repeat(70));

    for summary in &summaries {
        for result in &summary.episodes {
            let status = if result.is_complete() { "ok" } else { "failed" };
            println!("{:<24} {:>8} {:>8} {:>16.2} {:>10}",
                summary.policy_name,
                result.episode,
                result.score,
                result.mean_utility,
                status,
            );
        }
    }

    println!("\n{}", "-".repeat(70));
    for summary in &summaries {
        println!("  {:<22} mean score {:>7.2} ({} failed episodes)",
            summary.policy_name,
            summary.mean_score,
            summary.failed_episodes,
        );
        if let Some(error) = summary.episodes.iter().find_map(|e| e.error.as_deref()) {
            println!("    first error: {}", error);
        }
    }

    if let Some(output_path) = args.output {
        println!("\nWriting results to {}...", output_path);
        let json = serde_json::to_string_pretty(&summaries)?;
        fs::write(&output_path, json)?;
        println!("  Results saved");
    }

    println!("\n✅ Simulation complete!\n");
    Ok(())
}
