//! BIOTOPE - CLI Entry Point
//!
//! Headless artificial-life simulation runner.

use biotope::{benchmark, Config, World, WorldEvent, WorldState};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "biotope")]
#[command(version)]
#[command(about = "2D artificial-life simulation: foraging, mating and fading trails")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Output directory for the final state and stats history
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Initial population
        #[arg(short, long, default_value = "20")]
        population: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Summarize a saved world state
    Analyze {
        /// State file written by `run`
        state: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            output,
            seed,
            quiet,
        } => run_simulation(config, ticks, output, seed, quiet),

        Commands::Benchmark {
            ticks,
            population,
            seed,
        } => run_benchmark(ticks, population, seed),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { state } => analyze_state(state),
    }
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    std::fs::create_dir_all(&output)?;

    let mut world = if let Some(s) = seed {
        println!("Using seed: {}", s);
        World::new_with_seed(config.clone(), s)
    } else {
        World::new(config.clone())
    };

    println!("Starting simulation");
    println!("  Initial population: {}", world.population());
    println!("  Plants: {}", world.plants.len());
    println!("  World size: {}x{}", config.world.width, config.world.height);
    println!("  Ticks: {}", ticks);
    println!();

    let mut resets = 0u32;
    world.subscribe(move |event: &WorldEvent| match event {
        WorldEvent::StatsUpdate(stats) if !quiet => println!("{}", stats.summary()),
        WorldEvent::PopulationReset { tick } if !quiet => {
            resets += 1;
            println!("  Population extinct at tick {} (restart #{})", tick, resets);
        }
        _ => {}
    });

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", ticks);
    println!("Speed: {:.1} ticks/s", ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON));
    println!("Final population: {}", world.population());
    println!("Final plants: {}", world.plants.len());

    let state_path = output.join("state.json");
    std::fs::write(&state_path, serde_json::to_string_pretty(&world.state())?)?;
    println!("Final state: {:?}", state_path);

    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_benchmark(ticks: u64, population: usize, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== BIOTOPE Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let result = benchmark(ticks, population, seed);
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_state(state_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== State Analysis ===");
    println!("File: {:?}", state_path);
    println!();

    let json = std::fs::read_to_string(&state_path)?;
    let state: WorldState = serde_json::from_str(&json)?;

    println!("Tick: {}", state.tick);
    println!("Organisms: {}", state.organisms.len());
    println!("Plants: {}", state.plants.len());
    println!();
    println!("{}", state.stats.summary());

    if state.organisms.is_empty() {
        return Ok(());
    }

    // Hue distribution in 30 degree bands
    let mut bands = [0usize; 12];
    for org in &state.organisms {
        let band = (org.hue.degrees() / 30.0) as usize;
        bands[band.min(11)] += 1;
    }

    println!();
    println!("Hue bands:");
    for (i, count) in bands.iter().enumerate().filter(|(_, &c)| c > 0) {
        println!(
            "  {:3}-{:3}: {:4} ({:.1}%)",
            i * 30,
            i * 30 + 29,
            count,
            100.0 * *count as f64 / state.organisms.len() as f64
        );
    }

    if let Some(oldest) = state.organisms.iter().max_by_key(|o| o.age) {
        println!();
        println!(
            "Oldest: #{} age {} energy {:.1} (speed {:.2}, vision {:.1}, randomness {:.2})",
            oldest.id, oldest.age, oldest.energy, oldest.genes.speed, oldest.genes.vision, oldest.genes.randomness
        );
    }

    Ok(())
}
