use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use log::info;
use serde::Serialize;

use super::utils::{load_parameters, print_json};
use crate::activity::ActivityLabel;
use crate::emission::emission_rate;
use crate::imputation::Imputations;
use crate::planner::{
    air_filtration_rate, CapacityPlanner, PlannerInputs, TransmissionRates,
    DEFAULT_OUTDOOR_AIR_FRACTION,
};
use crate::room::{resolve_room, CsvRoomRegistry};

/// Room and air inputs shared by the planner subcommands.
#[derive(Args, Debug)]
pub struct PlannerArgs {
    /// Room registry CSV; with --room, supplies volume and ceiling height
    #[arg(long, requires = "room")]
    pub rooms: Option<PathBuf>,

    /// Room identifier in the registry
    #[arg(long, requires = "rooms")]
    pub room: Option<String>,

    /// Room volume in m³ (when no registry is given)
    #[arg(long, conflicts_with = "rooms")]
    pub volume: Option<f64>,

    /// Mean ceiling height in m (when no registry is given)
    #[arg(long, conflicts_with = "rooms")]
    pub ceiling_height: Option<f64>,

    /// Outdoor air exchange rate, 1/h
    #[arg(long)]
    pub air_exchange_rate: f64,

    /// Removal rate by filtration, 1/h
    #[arg(long, conflicts_with = "filter_efficiency")]
    pub filtration_rate: Option<f64>,

    /// Filter efficiency in [0, 1] applied to recirculated air
    #[arg(long)]
    pub filter_efficiency: Option<f64>,

    /// Fraction of supply air drawn from outdoors
    #[arg(long, default_value_t = DEFAULT_OUTDOOR_AIR_FRACTION)]
    pub outdoor_fraction: f64,

    /// Relative humidity as a fraction in [0, 1)
    #[arg(long, default_value_t = 0.6)]
    pub humidity: f64,

    /// Largest exhaled aerosol radius, µm
    #[arg(long, default_value_t = 2.0)]
    pub max_aerosol_radius: f64,

    /// Quanta emission rate per infectious occupant; derived from --activity when absent
    #[arg(long)]
    pub emission_rate: Option<f64>,

    /// Activity label used to derive the emission rate
    #[arg(long, default_value = "Lecture")]
    pub activity: String,

    /// Mask passage factor; 1 for no masks
    #[arg(long, default_value_t = 1.0)]
    pub mask_factor: f64,

    /// Optional JSON file overriding model parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl PlannerArgs {
    /// Builds the planner inputs, with any substitutions made while resolving the room.
    fn planner_inputs(&self) -> Result<(PlannerInputs, Imputations)> {
        let filtration = match (self.filtration_rate, self.filter_efficiency) {
            (Some(rate), _) => rate,
            (None, Some(efficiency)) => {
                air_filtration_rate(efficiency, self.air_exchange_rate, self.outdoor_fraction)?
            }
            (None, None) => 0.0,
        };
        let emission = match self.emission_rate {
            Some(rate) => rate,
            None => {
                let parameters = load_parameters(self.config.as_deref())?;
                emission_rate(&parameters, ActivityLabel::parse(&self.activity)?.profile())?
            }
        };

        if let (Some(path), Some(room_id)) = (&self.rooms, &self.room) {
            let rooms = CsvRoomRegistry::from_path(path)
                .with_context(|| format!("reading rooms from {}", path.display()))?;
            let mut imputations = Imputations::new();
            let room = resolve_room(&rooms, room_id, &mut imputations)?;
            let inputs = PlannerInputs::for_room(
                &room,
                self.air_exchange_rate,
                filtration,
                self.humidity,
                self.max_aerosol_radius,
                emission,
                self.mask_factor,
            );
            return Ok((inputs, imputations));
        }

        let (Some(volume), Some(height)) = (self.volume, self.ceiling_height) else {
            return Err(anyhow!(
                "either --rooms/--room or both --volume and --ceiling-height are required"
            ));
        };
        let inputs = PlannerInputs {
            relative_humidity: self.humidity,
            max_aerosol_radius: self.max_aerosol_radius,
            room_volume_m3: volume,
            air_exchange_rate: self.air_exchange_rate,
            air_filtration_rate: filtration,
            ceiling_height_m: height,
            emission_rate: emission,
            mask_factor: self.mask_factor,
        };
        Ok((inputs, Imputations::new()))
    }
}

#[derive(Serialize)]
struct OccupancyReport {
    inputs: PlannerInputs,
    rates: TransmissionRates,
    exposure_hours: f64,
    transient: bool,
    max_occupancy: f64,
    imputations: Imputations,
}

#[derive(Serialize)]
struct ExposureReport {
    inputs: PlannerInputs,
    rates: TransmissionRates,
    occupants: f64,
    max_exposure_hours: f64,
    imputations: Imputations,
}

pub fn max_occupancy(hours: f64, transient: bool, args: &PlannerArgs) -> Result<()> {
    let (inputs, imputations) = args.planner_inputs()?;
    let planner = CapacityPlanner::new(&inputs)?;
    let max_occupancy = if transient {
        planner.max_occupancy_transient(hours)?
    } else {
        planner.max_occupancy_steady_state(hours)?
    };
    info!("max occupancy for {hours} h: {max_occupancy}");
    print_json(&OccupancyReport {
        inputs,
        rates: *planner.rates(),
        exposure_hours: hours,
        transient,
        max_occupancy,
        imputations,
    })
}

pub fn max_time(occupants: f64, args: &PlannerArgs) -> Result<()> {
    let (inputs, imputations) = args.planner_inputs()?;
    let planner = CapacityPlanner::new(&inputs)?;
    let max_exposure_hours = planner.max_exposure_time(occupants)?;
    info!("max exposure for {occupants} occupants: {max_exposure_hours} h");
    print_json(&ExposureReport {
        inputs,
        rates: *planner.rates(),
        occupants,
        max_exposure_hours,
        imputations,
    })
}
