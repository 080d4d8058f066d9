use anyhow::Result;
use clap::{Parser, Subcommand};

use super::commands;
use crate::log::{set_log_level, LevelFilter};

#[derive(Parser)]
#[command(name = "roomrisk")]
#[command(about = "Estimate airborne infection risk and safe occupancy for indoor rooms")]
struct Cli {
    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "off", value_parser = parse_level)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infection risk for one occupant of a registered room
    Risk(commands::RiskArgs),
    /// Largest occupancy that keeps expected transmissions under the tolerance
    MaxOccupancy {
        /// Exposure duration in hours
        #[arg(long)]
        hours: f64,
        /// Account for the concentration build-up at the start of the exposure
        #[arg(long)]
        transient: bool,
        #[command(flatten)]
        planner: commands::PlannerArgs,
    },
    /// Longest exposure that keeps expected transmissions under the tolerance
    MaxTime {
        /// Number of occupants
        #[arg(long)]
        occupants: f64,
        #[command(flatten)]
        planner: commands::PlannerArgs,
    },
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level `{level}`"))
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    set_log_level(cli.log_level);

    match cli.command {
        Commands::Risk(args) => commands::risk(&args),
        Commands::MaxOccupancy {
            hours,
            transient,
            planner,
        } => commands::max_occupancy(hours, transient, &planner),
        Commands::MaxTime { occupants, planner } => commands::max_time(occupants, &planner),
    }
}
