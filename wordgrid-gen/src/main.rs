//! wordgrid-gen - puzzle generation CLI
//!
//! `generate` runs the five-stage pipeline and prints the puzzle;
//! `pool-stats` and `pool-show` read the local puzzle pool.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use wordgrid_common::config::{default_config_path, load_or_default};
use wordgrid_common::logging::init_tracing;
use wordgrid_gen::config::{resolve_logging, resolve_puzzle_config, resolve_settings, CliOverrides, ENV_POOL_DB};
use wordgrid_gen::db::PuzzlePool;
use wordgrid_gen::llm::AnthropicClient;
use wordgrid_gen::{PipelineEvent, Puzzle, PuzzleGenerator};

const MODULE_NAME: &str = "wordgrid-gen";

/// Command-line arguments for wordgrid-gen
#[derive(Parser, Debug)]
#[command(name = "wordgrid-gen")]
#[command(about = "Generate word-grouping puzzles")]
#[command(version)]
struct Cli {
    /// TOML config file (default: <config_dir>/wordgrid/wordgrid-gen.toml)
    #[arg(short, long, global = true, env = "WORDGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one puzzle
    Generate(GenerateArgs),
    /// Show puzzle pool counts by status
    PoolStats {
        /// Puzzle pool SQLite file
        #[arg(long)]
        pool_db: Option<PathBuf>,
    },
    /// Print the groups of one stored puzzle
    PoolShow {
        /// Puzzle id returned by `generate --seed-pool`
        puzzle_id: Uuid,

        /// Puzzle pool SQLite file
        #[arg(long)]
        pool_db: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of groups
    #[arg(long)]
    groups: Option<usize>,

    /// Words per group
    #[arg(long)]
    words_per_group: Option<usize>,

    /// Difficulty profile (easy, standard, hard)
    #[arg(long)]
    profile: Option<String>,

    /// Theme woven into at most half of the categories
    #[arg(long)]
    theme: Option<String>,

    /// API key for the generation service
    #[arg(long)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Print the puzzle as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Also write the puzzle JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed the generated puzzle into the pool as a draft
    #[arg(long)]
    seed_pool: bool,

    /// Puzzle pool SQLite file
    #[arg(long)]
    pool_db: Option<PathBuf>,

    /// Stream progress events to stderr as JSON lines
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| default_config_path(MODULE_NAME));
    let toml = load_or_default(config_path.as_deref()).context("Failed to load configuration")?;

    let mut overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        ..Default::default()
    };
    if let Command::Generate(args) = &cli.command {
        overrides.api_key = args.api_key.clone();
        overrides.model = args.model.clone();
        overrides.pool_database = args.pool_db.clone();
        overrides.num_groups = args.groups;
        overrides.words_per_group = args.words_per_group;
        overrides.difficulty_profile = args.profile.clone();
        overrides.theme_hint = args.theme.clone();
    }

    init_tracing("wordgrid_gen", &resolve_logging(&overrides, &toml)).context("Failed to initialize logging")?;

    match cli.command {
        Command::Generate(args) => generate(args, &overrides, &toml).await,
        Command::PoolStats { pool_db } => {
            overrides.pool_database = pool_db;
            pool_stats(&overrides, &toml).await
        }
        Command::PoolShow { puzzle_id, pool_db } => {
            overrides.pool_database = pool_db;
            pool_show(puzzle_id, &overrides, &toml).await
        }
    }
}

async fn generate(
    args: GenerateArgs,
    overrides: &CliOverrides,
    toml: &wordgrid_common::config::TomlConfig,
) -> Result<()> {
    let settings = resolve_settings(overrides, toml)?;
    let puzzle_config = resolve_puzzle_config(overrides, toml)?;

    info!(model = %settings.model, "Using generation model");
    let client = AnthropicClient::new(settings.api_key.clone(), &settings.model)
        .context("Failed to create generation client")?
        .with_base_url(&settings.base_url);

    let mut generator = PuzzleGenerator::new(Arc::new(client)).with_max_tokens(settings.max_tokens);

    let progress_task = if args.progress {
        let (tx, rx) = mpsc::channel(64);
        generator = generator.with_events(tx);
        Some(tokio::spawn(print_progress(rx)))
    } else {
        None
    };

    let result = generator.run(&puzzle_config).await;
    drop(generator);
    if let Some(task) = progress_task {
        let _ = task.await;
    }
    let puzzle = result.context("Puzzle generation failed")?;

    let json = serde_json::to_string_pretty(&puzzle).context("Failed to serialize puzzle")?;
    if args.json {
        println!("{}", json);
    } else {
        print_summary(&puzzle);
    }

    if let Some(path) = &args.output {
        std::fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Puzzle written to {}", path.display());
    }

    if args.seed_pool {
        let db_path = settings
            .pool_database
            .context(format!("No pool database configured (use --pool-db or {})", ENV_POOL_DB))?;
        let pool = PuzzlePool::open(&db_path).await.context("Failed to open puzzle pool")?;
        let puzzle_id = pool.seed_puzzle(&puzzle).await.context("Failed to seed puzzle")?;
        eprintln!("Seeded to pool as: {}", puzzle_id);
    }

    Ok(())
}

fn pool_path(overrides: &CliOverrides, toml: &wordgrid_common::config::TomlConfig) -> Result<PathBuf> {
    overrides
        .pool_database
        .clone()
        .or_else(|| wordgrid_common::config::env_value(ENV_POOL_DB).map(PathBuf::from))
        .or_else(|| toml.pool_database.clone())
        .context(format!("No pool database configured (use --pool-db or {})", ENV_POOL_DB))
}

async fn pool_stats(overrides: &CliOverrides, toml: &wordgrid_common::config::TomlConfig) -> Result<()> {
    let db_path = pool_path(overrides, toml)?;
    let pool = PuzzlePool::open(&db_path).await.context("Failed to open puzzle pool")?;
    let stats = pool.stats().await.context("Failed to read pool stats")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn pool_show(
    puzzle_id: Uuid,
    overrides: &CliOverrides,
    toml: &wordgrid_common::config::TomlConfig,
) -> Result<()> {
    let db_path = pool_path(overrides, toml)?;
    let pool = PuzzlePool::open(&db_path).await.context("Failed to open puzzle pool")?;
    let groups = pool
        .puzzle_words(puzzle_id)
        .await
        .with_context(|| format!("Failed to read puzzle {}", puzzle_id))?;

    if groups.is_empty() {
        anyhow::bail!("Puzzle {} not found in pool", puzzle_id);
    }
    for (category, words) in groups {
        println!("{}", category);
        println!("    {}", words.join(", "));
    }
    Ok(())
}

async fn print_progress(mut rx: mpsc::Receiver<PipelineEvent>) {
    while let Some(event) = rx.recv().await {
        if let Ok(line) = serde_json::to_string(&event) {
            eprintln!("{}", line);
        }
    }
}

fn print_summary(puzzle: &Puzzle) {
    const TIERS: [&str; 4] = ["YELLOW", "GREEN", "BLUE", "PURPLE"];

    for group in &puzzle.groups {
        let tier = TIERS
            .get(usize::from(group.difficulty_rank).saturating_sub(1))
            .copied()
            .unwrap_or("UNKNOWN");
        println!("[{}] {}", tier, group.category_name);
        println!("    {}", group.words.join(", "));
    }

    let meta = &puzzle.generation_metadata;
    println!();
    println!("Model:       {}", meta.model);
    println!("Seed words:  {}", meta.seed_words.join(", "));
    println!("Profile:     {}", meta.difficulty_profile);
    println!("Theme:       {}", meta.theme_hint.as_deref().unwrap_or("none"));
    println!(
        "API calls:   {} ({} input / {} output tokens, stages 1, 2, 4)",
        meta.total_api_calls, meta.total_input_tokens, meta.total_output_tokens
    );
    println!("Swaps:       {}", meta.refinement.applied_swaps.len());
    println!();
    println!("{}", meta.red_herring_analysis);
}
