//! The end-to-end risk calculation for one exposure scenario.
//!
//! room lookup → ventilation rate → air changes → emission rate → concentration
//! → integrated dose → infection probability.

use log::info;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityLabel, ActivityProfile};
use crate::concentration::{infected_count, removal_rate, QuantaConcentration};
use crate::emission::emission_rate;
use crate::error::{require_non_negative, RiskError};
use crate::imputation::Imputations;
use crate::integrator::{DoseIntegration, RiskIntegrator};
use crate::parameters::ModelParameters;
use crate::room::{resolve_room, RoomProfile, RoomTable};
use crate::ventilation::{air_changes_per_hour, resolve_ventilation_rate, RequestedVentilation};

/// One risk query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureScenario {
    /// Exposure duration, hours.
    pub time_hours: f64,
    pub room_id: String,
    pub occupants: u32,
    pub activity: ActivityProfile,
    #[serde(default)]
    pub ventilation: RequestedVentilation,
}

impl ExposureScenario {
    #[must_use]
    pub fn new(
        time_hours: f64,
        room_id: impl Into<String>,
        occupants: u32,
        activity: ActivityProfile,
    ) -> Self {
        ExposureScenario {
            time_hours,
            room_id: room_id.into(),
            occupants,
            activity,
            ventilation: RequestedVentilation::Unspecified,
        }
    }

    /// Builds a scenario from a boundary activity label such as `"Lecture"`.
    ///
    /// # Errors
    /// `UnknownActivity` if the label is not recognised.
    pub fn from_label(
        time_hours: f64,
        room_id: impl Into<String>,
        occupants: u32,
        label: &str,
    ) -> Result<Self, RiskError> {
        let activity = ActivityLabel::parse(label)?.profile();
        Ok(ExposureScenario::new(time_hours, room_id, occupants, activity))
    }

    #[must_use]
    pub fn with_ventilation(mut self, ventilation: RequestedVentilation) -> Self {
        self.ventilation = ventilation;
        self
    }
}

/// The outcome of a risk calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResult {
    /// Per-occupant infection probability, in `[0, 1)`.
    pub risk: f64,
    /// `risk × occupants`.
    pub expected_infections: f64,
    pub occupants: u32,
    /// Infectious sources assumed present.
    pub infected_sources: f64,
    /// Effective ventilation, CFM.
    pub ventilation_cfm: f64,
    pub air_changes_per_hour: f64,
    /// Quanta/h per source.
    pub emission_rate: f64,
    /// Infectious virus removal rate, 1/h.
    pub removal_rate: f64,
    /// Substitutions made on the way; empty when all inputs were on record.
    pub imputations: Imputations,
}

/// Computes the risk for `scenario` in an already-resolved `room`.
///
/// # Errors
/// `InvalidParameter` for a negative time or zero occupants, or
/// `UnknownActivity` if the parameter tables lack the scenario's activities.
pub fn assess_room(
    scenario: &ExposureScenario,
    room: &RoomProfile,
    parameters: &ModelParameters,
    method: DoseIntegration,
    mut imputations: Imputations,
) -> Result<RiskResult, RiskError> {
    require_non_negative("exposure time", scenario.time_hours)?;
    let infected = infected_count(scenario.occupants, parameters.background_prevalence)?;

    let cfm = resolve_ventilation_rate(scenario.ventilation, room.ventilation(), &mut imputations);
    let ach = air_changes_per_hour(Some(cfm), room.volume_ft3(), &mut imputations)?;
    let erq = emission_rate(parameters, scenario.activity)?;
    let ivrr = removal_rate(ach, parameters);

    let model = QuantaConcentration::new(
        erq,
        infected,
        ivrr,
        room.volume_m3(),
        parameters.initial_quanta,
    )?;
    let inhalation_rate = parameters.inhalation_rate(scenario.activity.activity)?;
    let risk = RiskIntegrator::new(model, inhalation_rate, method)?.risk(scenario.time_hours)?;

    info!(
        "room {}: {} occupants, {} for {} h -> risk {risk}",
        room.room_id(),
        scenario.occupants,
        scenario.activity,
        scenario.time_hours
    );
    Ok(RiskResult {
        risk,
        expected_infections: risk * f64::from(scenario.occupants),
        occupants: scenario.occupants,
        infected_sources: infected,
        ventilation_cfm: cfm,
        air_changes_per_hour: ach,
        emission_rate: erq,
        removal_rate: ivrr,
        imputations,
    })
}

/// Looks up the scenario's room in `rooms` and computes its risk.
///
/// # Errors
/// Any error from [`resolve_room`] or [`assess_room`].
pub fn assess<T: RoomTable + ?Sized>(
    scenario: &ExposureScenario,
    rooms: &T,
    parameters: &ModelParameters,
) -> Result<RiskResult, RiskError> {
    let mut imputations = Imputations::new();
    let room = resolve_room(rooms, &scenario.room_id, &mut imputations)?;
    assess_room(
        scenario,
        &room,
        parameters,
        DoseIntegration::default(),
        imputations,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Activity, ExpiratoryActivity};
    use crate::assert_rel_eq;
    use crate::imputation::Imputation;
    use crate::room::{CsvRoomRegistry, VentilationRange};

    fn room() -> RoomProfile {
        let range = VentilationRange::new(600.0, 1200.0).unwrap();
        RoomProfile::new("CENTR 101", 900.0, 10.0, range, true).unwrap()
    }

    fn lecture(occupants: u32, hours: f64) -> ExposureScenario {
        ExposureScenario::new(
            hours,
            "CENTR 101",
            occupants,
            ActivityProfile::new(Activity::Standing, ExpiratoryActivity::Speaking),
        )
    }

    fn run(scenario: &ExposureScenario) -> RiskResult {
        assess_room(
            scenario,
            &room(),
            &ModelParameters::default(),
            DoseIntegration::ClosedForm,
            Imputations::new(),
        )
        .unwrap()
    }

    #[test]
    fn reference_room_pipeline() {
        let result = run(&lecture(30, 1.0));
        assert_eq!(result.ventilation_cfm, 600.0);
        assert_rel_eq!(result.air_changes_per_hour, 4.0, 1e-12);
        assert_rel_eq!(result.removal_rate, 4.87, 1e-12);
        assert_eq!(result.infected_sources, 1.0);
        assert!(result.risk > 0.0 && result.risk < 1.0);
        assert_rel_eq!(result.expected_infections, result.risk * 30.0, 1e-15);
        assert!(result.imputations.is_empty());
    }

    #[test]
    fn repeated_runs_are_bitwise_identical() {
        let first = run(&lecture(30, 1.0));
        for _ in 0..10 {
            assert_eq!(run(&lecture(30, 1.0)).risk.to_bits(), first.risk.to_bits());
        }
    }

    #[test]
    fn zero_time_has_zero_risk() {
        assert_eq!(run(&lecture(30, 0.0)).risk, 0.0);
    }

    #[test]
    fn risk_does_not_decrease_with_occupancy() {
        let mut previous = 0.0;
        for occupants in [1, 10, 50, 80, 100, 200, 400] {
            let risk = run(&lecture(occupants, 1.0)).risk;
            assert!(risk >= previous, "{occupants} occupants");
            previous = risk;
        }
        assert!(run(&lecture(400, 1.0)).risk > run(&lecture(1, 1.0)).risk);
    }

    #[test]
    fn out_of_range_ventilation_is_recorded() {
        let scenario = lecture(30, 1.0).with_ventilation(RequestedVentilation::Cfm(2000.0));
        let result = run(&scenario);
        assert_eq!(result.ventilation_cfm, 600.0);
        assert!(matches!(
            result.imputations.iter().next(),
            Some(Imputation::VentilationOutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_label_fails_before_calculation() {
        let result = ExposureScenario::from_label(1.0, "CENTR 101", 30, "Dancing");
        assert!(matches!(result, Err(RiskError::UnknownActivity(_))));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let parameters = ModelParameters::default();
        let fails = |scenario: ExposureScenario| {
            matches!(
                assess_room(
                    &scenario,
                    &room(),
                    &parameters,
                    DoseIntegration::ClosedForm,
                    Imputations::new()
                ),
                Err(RiskError::InvalidParameter(_))
            )
        };
        assert!(fails(lecture(0, 1.0)));
        assert!(fails(lecture(30, -1.0)));
    }

    #[test]
    fn assess_looks_up_the_room() {
        let csv = "Room,Area,Height,VAV,Windows\nCENTR 101,900,,\"600,1200\",Y\n";
        let rooms = CsvRoomRegistry::from_reader(csv.as_bytes()).unwrap();
        let scenario = ExposureScenario::from_label(1.0, "CENTR 101", 30, "Lecture").unwrap();
        let result = assess(&scenario, &rooms, &ModelParameters::default()).unwrap();
        // height imputed to 10 ft gives the reference room
        assert_eq!(result.risk.to_bits(), run(&lecture(30, 1.0)).risk.to_bits());
        assert_eq!(result.imputations.len(), 1);

        let missing = ExposureScenario::from_label(1.0, "NOPE", 30, "Lecture").unwrap();
        assert!(matches!(
            assess(&missing, &rooms, &ModelParameters::default()),
            Err(RiskError::RoomNotFound(_))
        ));
    }
}
