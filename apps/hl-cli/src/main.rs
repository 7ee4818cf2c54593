use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hl_app::{AppResult, ReplayOptions, load_scenario, replay, validate_scenario};
use hl_coupling::CouplingEvent;

#[derive(Parser)]
#[command(name = "hl-cli")]
#[command(about = "Hoselock CLI - scripted hose-coupling interaction replays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and tuning
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Replay a scenario's pointer timeline and summarize the outcome
    Replay {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Fixed tick length in seconds
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        /// Write the full transcript to this file (YAML, or JSON with --json)
        #[arg(short, long)]
        transcript: Option<PathBuf>,
        /// Emit the transcript as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Replay {
            scenario_path,
            dt,
            transcript,
            json,
        } => cmd_replay(&scenario_path, dt, transcript.as_deref(), json),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    validate_scenario(&scenario)?;
    println!(
        "✓ Scenario is valid: {} ({} timeline samples)",
        scenario.name,
        scenario.timeline.len()
    );
    Ok(())
}

fn cmd_replay(
    scenario_path: &Path,
    dt: f64,
    transcript_path: Option<&Path>,
    json: bool,
) -> AppResult<()> {
    let scenario = load_scenario(scenario_path)?;
    println!("Replaying scenario: {}", scenario.name);

    let options = ReplayOptions {
        dt,
        ..Default::default()
    };
    let transcript = replay(&scenario, options)?;

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entry in &transcript.entries {
        *counts.entry(event_label(&entry.event)).or_default() += 1;
    }

    println!("✓ Replay finished in state: {}", transcript.final_state);
    println!("  {} events over {} entries:", counts.len(), transcript.entries.len());
    for (label, count) in &counts {
        println!("    {label}: {count}");
    }

    if let Some(path) = transcript_path {
        let text = if json {
            transcript.to_json()?
        } else {
            transcript.to_yaml()?
        };
        std::fs::write(path, text)?;
        println!("  Transcript written to {}", path.display());
    }
    Ok(())
}

fn event_label(event: &CouplingEvent) -> &'static str {
    match event {
        CouplingEvent::AlignmentSampled { .. } => "alignment_sampled",
        CouplingEvent::AlignedChanged { .. } => "aligned_changed",
        CouplingEvent::Connected => "connected",
        CouplingEvent::ConnectFailed => "connect_failed",
        CouplingEvent::Progress { .. } => "progress",
        CouplingEvent::LinkageMoved { .. } => "linkage_moved",
        CouplingEvent::Locked => "locked",
        CouplingEvent::Unlocked => "unlocked",
        CouplingEvent::DragEnabled { .. } => "drag_enabled",
        CouplingEvent::RotationEnabled { .. } => "rotation_enabled",
    }
}
