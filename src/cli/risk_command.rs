use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use super::utils::{load_parameters, print_json};
use crate::room::CsvRoomRegistry;
use crate::scenario::{assess, ExposureScenario};
use crate::ventilation::RequestedVentilation;

#[derive(Args, Debug)]
pub struct RiskArgs {
    /// Room registry CSV with Room, Area, Height, VAV and Windows columns
    #[arg(long)]
    pub rooms: PathBuf,

    /// Room identifier, e.g. "CENTR 101"
    #[arg(long)]
    pub room: String,

    /// Number of people in the room
    #[arg(long)]
    pub occupants: u32,

    /// Exposure duration in hours
    #[arg(long)]
    pub hours: f64,

    /// Activity label: Lecture, Studying, Singing or "Social Event"
    #[arg(long, default_value = "Lecture")]
    pub activity: String,

    /// Ventilation rate in CFM; "nan" marks it as unavailable. Defaults to the room minimum
    #[arg(long)]
    pub cfm: Option<String>,

    /// Optional JSON file overriding model parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn risk(args: &RiskArgs) -> Result<()> {
    let parameters = load_parameters(args.config.as_deref())?;
    let rooms = CsvRoomRegistry::from_path(&args.rooms)
        .with_context(|| format!("reading rooms from {}", args.rooms.display()))?;
    let ventilation = RequestedVentilation::from_raw(args.cfm.as_deref());
    let scenario =
        ExposureScenario::from_label(args.hours, &args.room, args.occupants, &args.activity)?;
    let result = assess(&scenario.with_ventilation(ventilation), &rooms, &parameters)?;
    print_json(&result)
}
