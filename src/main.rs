use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchlater::categorizer::Categorizer;
use watchlater::config::Config;
use watchlater::error::{Error, ErrorKind, ErrorReport, WatchlaterErrorTrait};
use watchlater::filter::filter_available;
use watchlater::models::{build_all, Category};
use watchlater::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
use watchlater::report::{calendar_events, document_rows, plan_playlists};
use watchlater::scheduler::{allocate_time, PackingPolicy, SlotPreset};
use watchlater::source::{JsonFileExporter, JsonFileSource, MetadataSource, ReportExporter};
use watchlater::utils::{format_duration, truncate_text};

#[derive(Parser)]
#[command(
    name = "watchlater",
    version,
    about = "Turn a Watch Later queue into a prioritized viewing schedule",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the report
    Plan {
        /// Queue file (JSON array or {"videos": [...]})
        #[arg(short, long)]
        input: PathBuf,

        /// Scheduling request (slot array or full request object)
        #[arg(short, long)]
        slots: Option<PathBuf>,

        /// Named slot preset, repeatable
        #[arg(short, long)]
        preset: Vec<String>,

        /// Categories preset sessions are restricted to (comma-separated)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<Category>,

        /// Cap on each preset session, in minutes (default 120)
        #[arg(long)]
        duration_limit: Option<u64>,

        /// Rule set override (TOML or JSON)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Packing policy (priority_first, duration_first)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<PackingPolicy>,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,

        /// Which view of the result to print
        #[arg(long, value_enum, default_value = "report")]
        view: PlanView,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a queue into reachable and unreachable videos
    Filter {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Categorize every reachable video
    Categorize {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Print the active rule set as TOML
    Rules {
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// List the named slot presets
    Presets,

    /// List the category vocabulary with descriptions and rule weights
    Categories {
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Split a time budget across categories
    Allocate {
        /// Available minutes
        #[arg(short, long)]
        minutes: u64,

        /// Comma-separated categories
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<Category>,
    },

    /// Plan per-category playlists
    Playlists {
        #[arg(short, long)]
        input: PathBuf,

        /// Comma-separated categories
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<Category>,

        /// Maximum videos per playlist
        #[arg(long, default_value = "50")]
        max: usize,

        #[arg(long)]
        as_of: Option<DateTime<Utc>>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanView {
    Report,
    Summary,
    Rows,
    Calendar,
}

fn parse_policy(s: &str) -> std::result::Result<PackingPolicy, String> {
    PackingPolicy::parse(s)
        .ok_or_else(|| format!("unknown packing policy '{s}' (priority_first, duration_first)"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(err) => exit_with(&anyhow::Error::new(err)),
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    tracing::info!("watchlater starting");

    if let Err(err) = run(cli.command, config) {
        exit_with(&err);
    }

    tracing::info!("watchlater completed successfully");
    Ok(())
}

/// Print the tagged error report as JSON on stderr and exit non-zero
fn exit_with(err: &anyhow::Error) -> ! {
    let report = match err.downcast_ref::<Error>() {
        Some(inner) => ErrorReport {
            kind: inner.kind(),
            message: format!("{err:#}"),
        },
        None => ErrorReport {
            kind: if err.downcast_ref::<std::io::Error>().is_some() {
                ErrorKind::Io
            } else {
                ErrorKind::InvalidInput
            },
            message: format!("{err:#}"),
        },
    };
    tracing::error!(kind = %report.kind, "{}", report.message);
    match serde_json::to_string(&report) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{}: {}", report.kind, report.message),
    }
    std::process::exit(1);
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("watchlater=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("watchlater={level},warn"))
            .context("Invalid log level")?
    };

    // stdout carries command output, logs go to stderr
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn run(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Plan {
            input,
            slots,
            preset,
            categories,
            duration_limit,
            rules,
            policy,
            as_of,
            view,
            output,
        } => {
            tracing::info!(
                input = %input.display(),
                slots = ?slots,
                presets = ?preset,
                "Starting plan command"
            );
            if rules.is_some() {
                config.pipeline.rules_path = rules;
            }
            let sessions = PresetSessions {
                names: preset,
                categories,
                duration_limit,
            };
            plan(config, input, slots, sessions, policy, as_of, view, output)
        }

        Commands::Filter { input } => filter(input),

        Commands::Categorize { input, rules } => {
            if rules.is_some() {
                config.pipeline.rules_path = rules;
            }
            categorize(config, input)
        }

        Commands::Rules { rules } => {
            if rules.is_some() {
                config.pipeline.rules_path = rules;
            }
            let rules = config.load_rules()?;
            print!("{}", rules.to_toml_string()?);
            Ok(())
        }

        Commands::Presets => {
            for preset in SlotPreset::all() {
                let best_for: Vec<&str> = preset.best_for.iter().map(|c| c.as_str()).collect();
                println!(
                    "{:<18} {:>4} min  {:<40} [{}]",
                    preset.name,
                    preset.focus_minutes,
                    preset.description,
                    best_for.join(", ")
                );
            }
            Ok(())
        }

        Commands::Categories { rules } => {
            if rules.is_some() {
                config.pipeline.rules_path = rules;
            }
            let rules = config.load_rules()?;
            for category in Category::all() {
                println!(
                    "{:<14} {:>5.2}  {}",
                    category.as_str(),
                    rules.weight_of(category),
                    category.description()
                );
            }
            Ok(())
        }

        Commands::Allocate {
            minutes,
            categories,
        } => {
            tracing::info!(minutes, categories = ?categories, "Starting allocate command");
            let rules = config.load_rules()?;
            let allocation = allocate_time(minutes, &categories, &rules)?;
            println!("{}", serde_json::to_string_pretty(&allocation)?);
            Ok(())
        }

        Commands::Playlists {
            input,
            categories,
            max,
            as_of,
        } => {
            tracing::info!(input = %input.display(), max, "Starting playlists command");
            let pipeline = Pipeline::new(config)?;
            let videos = JsonFileSource::new(&input).fetch()?;
            let (_, scored) = pipeline.score_queue(videos, as_of.unwrap_or_else(Utc::now))?;
            let plans = plan_playlists(&scored, &categories, max)?;
            println!("{}", serde_json::to_string_pretty(&plans)?);
            Ok(())
        }
    }
}

/// Preset options given on the command line
struct PresetSessions {
    names: Vec<String>,
    categories: Vec<Category>,
    duration_limit: Option<u64>,
}

#[allow(clippy::too_many_arguments)]
fn plan(
    config: Config,
    input: PathBuf,
    slots: Option<PathBuf>,
    presets: PresetSessions,
    policy: Option<PackingPolicy>,
    as_of: Option<DateTime<Utc>>,
    view: PlanView,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let videos = JsonFileSource::new(&input).fetch()?;

    let mut schedule = match &slots {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read slots file: {}", path.display()))?;
            ScheduleRequest::from_json_str(&content)?
        }
        None => ScheduleRequest::default(),
    };
    schedule.presets.extend(presets.names);
    if !presets.categories.is_empty() {
        schedule.preset_categories = presets.categories;
    }
    if let Some(limit) = presets.duration_limit {
        schedule.duration_limit_minutes = limit;
    }
    if policy.is_some() {
        schedule.packing_policy = policy;
    }

    let request = PipelineRequest::new(videos, schedule, as_of.unwrap_or_else(Utc::now));
    let report = pipeline.run(request)?;

    if let Some(path) = output {
        JsonFileExporter::new(path).export(&report)?;
        return Ok(());
    }

    match view {
        PlanView::Report => println!("{}", report.to_json()?),
        PlanView::Rows => println!("{}", serde_json::to_string_pretty(&document_rows(&report))?),
        PlanView::Calendar => println!(
            "{}",
            serde_json::to_string_pretty(&calendar_events(&report.schedule))?
        ),
        PlanView::Summary => {
            let summary = report.schedule.summary();
            println!(
                "{} kept, {} removed, {} scheduled, {} unscheduled ({:.0}% of budget used)",
                report.counts.kept,
                report.counts.removed_unavailable,
                report.counts.scheduled,
                report.counts.unscheduled,
                summary.utilization() * 100.0
            );
            for assignment in &report.schedule.assignments {
                println!(
                    "\n{} ({} / {})",
                    assignment.slot.label,
                    format_duration(assignment.used_seconds),
                    format_duration(assignment.slot.budget_seconds)
                );
                for video in &assignment.videos {
                    println!(
                        "  {:<50} {:>10}  {:.2}",
                        truncate_text(video.display_title(), 50),
                        format_duration(video.duration_seconds.unwrap_or(0)),
                        video.priority_score().unwrap_or(0.0)
                    );
                }
            }
            if !report.schedule.unscheduled.is_empty() {
                println!("\nUnscheduled");
                for item in &report.schedule.unscheduled {
                    println!(
                        "  {:<50} {}",
                        truncate_text(item.video.display_title(), 50),
                        item.reason.as_str()
                    );
                }
            }
        }
    }
    Ok(())
}

fn filter(input: PathBuf) -> Result<()> {
    let videos = build_all(JsonFileSource::new(&input).fetch()?)?;
    let outcome = filter_available(videos)?;
    let kept: Vec<&str> = outcome.kept.iter().map(|v| v.id.as_str()).collect();
    let value = serde_json::json!({
        "kept": kept,
        "removed": outcome.removed_ids(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn categorize(config: Config, input: PathBuf) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let categorizer = Categorizer::new(
        pipeline.rules(),
        pipeline.config().pipeline.confidence_threshold,
    )?;

    let videos = build_all(JsonFileSource::new(&input).fetch()?)?;
    let outcome = filter_available(videos)?;
    for video in &outcome.kept {
        let matched = categorizer.evaluate(video)?;
        println!(
            "{:<16} {:<14} {:.2}  {}",
            video.id,
            matched.category.as_str(),
            matched.confidence,
            truncate_text(video.display_title(), 60)
        );
    }
    Ok(())
}
