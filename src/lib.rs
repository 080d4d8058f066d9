//! Airborne infection risk for occupants of indoor rooms.
//!
//! The room air is treated as well mixed. Infectious occupants emit quanta
//! at a rate set by their activity, the quanta are removed by ventilation,
//! deposition and viral inactivation, and a susceptible occupant's chance of
//! infection follows the Wells-Riley dose-response relation applied to the
//! quanta they inhale over the exposure.
//!
//! The crate is organised as a pipeline of small modules:
//! * [`room`] resolves a room identifier to its geometry and ventilation range,
//!   imputing a missing ceiling height.
//! * [`ventilation`] turns a requested CFM into an effective rate and
//!   air changes per hour.
//! * [`emission`] computes the quanta emission rate of one infectious
//!   occupant for an [`activity::ActivityProfile`].
//! * [`concentration`] models quanta concentration over time.
//! * [`integrator`] integrates the inhaled dose and converts it to risk.
//! * [`scenario`] runs the whole chain for one [`scenario::ExposureScenario`].
//!
//! Alongside the risk pipeline, [`planner`] gives closed-form occupancy and
//! exposure-time limits, and [`occupants`] draws seeded synthetic occupants.
//!
//! Every substitution for a missing or invalid input is recorded as an
//! [`imputation::Imputation`] on the result and logged at `warn`.
pub mod activity;
pub mod cli;
pub mod concentration;
pub mod droplets;
pub mod emission;
pub mod error;
pub mod imputation;
pub mod integrator;
pub mod log;
pub mod numeric;
pub mod occupants;
pub mod parameters;
pub mod planner;
pub mod room;
pub mod scenario;
pub mod units;
pub mod ventilation;

mod macros;

pub use activity::{Activity, ActivityLabel, ActivityProfile, ExpiratoryActivity};
pub use error::RiskError;
pub use imputation::{Imputation, Imputations};
pub use integrator::{DoseIntegration, RiskIntegrator};
pub use parameters::ModelParameters;
pub use planner::{CapacityPlanner, PlannerInputs};
pub use room::{resolve_room, CsvRoomRegistry, RoomProfile, RoomRecord, RoomTable};
pub use scenario::{assess, assess_room, ExposureScenario, RiskResult};
pub use ventilation::RequestedVentilation;
