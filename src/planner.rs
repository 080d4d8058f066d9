//! Occupancy and exposure-time limits for a room.
//!
//! The planner keeps the expected number of transmissions per infectious
//! occupant below [`RISK_TOLERANCE`]. It shares a derivation chain:
//!
//! ```text
//! r_eff  = (0.4 / (1 − RH))^(1/3) · r_max                 effective aerosol radius, µm
//! v_s    = 3 · (r_eff / 5)² · 3600 / 1000                  settling speed, m/h
//! λ_v    = 0.3 · RH                                        viral deactivation, 1/h
//! λ_c    = λ_a + λ_f + λ_v + v_s / H                       concentration relaxation, 1/h
//! β_a    = (0.5 · f_mask)² · 5·ERq / (V · λ_c)             airborne transmission, 1/h
//! ```
//!
//! From which the steady-state and transient limits follow:
//!
//! ```text
//! N_ss(τ) = 1 + ε / (β_a τ)
//! N_t(τ)  = 1 + ε (1 + 1/(λ_c τ)) / (β_a τ)
//! τ_ss(N) = ε / ((N − 1) β_a)
//! τ_t(N)  = τ_ss (1 + √(1 + 4/(λ_c τ_ss))) / 2
//! ```
//!
//! `τ_t` solves `N_t(τ) = N` exactly, so the transient functions are mutual inverses.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, RiskError};
use crate::room::RoomProfile;
use crate::units::{MINUTES_PER_HOUR, MM_TO_M, SECONDS_PER_HOUR};

/// Tolerated expected transmissions per infectious occupant (ε).
pub const RISK_TOLERANCE: f64 = 0.1;

/// Outdoor share of supply air assumed when deriving recirculation.
pub const DEFAULT_OUTDOOR_AIR_FRACTION: f64 = 0.5;

/// Exhaled infectious aerosol per quantum emitted.
const EXHALED_AEROSOL_PER_QUANTUM: f64 = 5.0;

/// Removal rate (1/h) from filtering recirculated air.
///
/// Fresh-air flow is `V·λ_a/60` per minute and recirculated flow is
/// `fresh·(1/outdoor_fraction − 1)`; the filter removes `efficiency` of the
/// recirculated aerosol, so the volume cancels.
///
/// # Errors
/// `InvalidParameter` if `efficiency` is outside `[0, 1]`, `outdoor_air_fraction`
/// is outside `(0, 1]`, or the air exchange rate is negative.
pub fn air_filtration_rate(
    efficiency: f64,
    air_exchange_rate: f64,
    outdoor_air_fraction: f64,
) -> Result<f64, RiskError> {
    if !(0.0..=1.0).contains(&efficiency) {
        return Err(RiskError::InvalidParameter(format!(
            "filtration efficiency must be in [0, 1], got {efficiency}"
        )));
    }
    if !(outdoor_air_fraction > 0.0 && outdoor_air_fraction <= 1.0) {
        return Err(RiskError::InvalidParameter(format!(
            "outdoor air fraction must be in (0, 1], got {outdoor_air_fraction}"
        )));
    }
    require_non_negative("air exchange rate", air_exchange_rate)?;
    let fresh_per_minute = air_exchange_rate / MINUTES_PER_HOUR;
    let recirculated_per_minute = fresh_per_minute * (1.0 / outdoor_air_fraction - 1.0);
    Ok(efficiency * recirculated_per_minute * MINUTES_PER_HOUR)
}

/// Inputs to the capacity planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerInputs {
    /// Relative humidity as a fraction in `[0, 1)`.
    pub relative_humidity: f64,
    /// Largest exhaled aerosol radius, µm.
    pub max_aerosol_radius: f64,
    /// Room volume, m³.
    pub room_volume_m3: f64,
    /// Outdoor air exchange rate, 1/h.
    pub air_exchange_rate: f64,
    /// Removal by filtration, 1/h.
    pub air_filtration_rate: f64,
    /// Mean ceiling height, m.
    pub ceiling_height_m: f64,
    /// Quanta emission rate of an infectious occupant, quanta/h.
    pub emission_rate: f64,
    /// Mask passage factor; 1 for no masks.
    pub mask_factor: f64,
}

impl PlannerInputs {
    /// Planner inputs for `room`, taking volume and ceiling height from its profile.
    #[must_use]
    pub fn for_room(
        room: &RoomProfile,
        air_exchange_rate: f64,
        air_filtration_rate: f64,
        relative_humidity: f64,
        max_aerosol_radius: f64,
        emission_rate: f64,
        mask_factor: f64,
    ) -> Self {
        PlannerInputs {
            relative_humidity,
            max_aerosol_radius,
            room_volume_m3: room.volume_m3(),
            air_exchange_rate,
            air_filtration_rate,
            ceiling_height_m: room.height_m(),
            emission_rate,
            mask_factor,
        }
    }

    /// # Errors
    /// `InvalidParameter` naming the first non-physical input.
    pub fn validate(&self) -> Result<(), RiskError> {
        if !(self.relative_humidity >= 0.0 && self.relative_humidity < 1.0) {
            return Err(RiskError::InvalidParameter(format!(
                "relative humidity must be in [0, 1), got {}",
                self.relative_humidity
            )));
        }
        require_positive("max aerosol radius", self.max_aerosol_radius)?;
        require_positive("room volume", self.room_volume_m3)?;
        require_non_negative("air exchange rate", self.air_exchange_rate)?;
        require_non_negative("air filtration rate", self.air_filtration_rate)?;
        require_positive("ceiling height", self.ceiling_height_m)?;
        require_positive("emission rate", self.emission_rate)?;
        require_positive("mask factor", self.mask_factor)?;
        Ok(())
    }
}

/// Rates derived from [`PlannerInputs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransmissionRates {
    /// µm
    pub effective_aerosol_radius: f64,
    /// m/h
    pub settling_speed: f64,
    /// 1/h
    pub viral_deactivation_rate: f64,
    /// 1/h
    pub concentration_relaxation_rate: f64,
    /// 1/h
    pub airborne_transmission_rate: f64,
}

impl TransmissionRates {
    /// # Errors
    /// `InvalidParameter` if `inputs` fail validation.
    pub fn derive(inputs: &PlannerInputs) -> Result<Self, RiskError> {
        inputs.validate()?;
        let effective_aerosol_radius =
            (0.4 / (1.0 - inputs.relative_humidity)).cbrt() * inputs.max_aerosol_radius;
        // mm/s -> m/h
        let settling_speed =
            3.0 * (effective_aerosol_radius / 5.0).powi(2) * SECONDS_PER_HOUR * MM_TO_M;
        let viral_deactivation_rate = 0.3 * inputs.relative_humidity;
        let concentration_relaxation_rate = inputs.air_exchange_rate
            + inputs.air_filtration_rate
            + viral_deactivation_rate
            + settling_speed / inputs.ceiling_height_m;
        let airborne_transmission_rate = (0.5 * inputs.mask_factor).powi(2)
            * (inputs.emission_rate * EXHALED_AEROSOL_PER_QUANTUM)
            / (inputs.room_volume_m3 * concentration_relaxation_rate);
        let rates = TransmissionRates {
            effective_aerosol_radius,
            settling_speed,
            viral_deactivation_rate,
            concentration_relaxation_rate,
            airborne_transmission_rate,
        };
        debug!("{rates:?}");
        Ok(rates)
    }
}

/// Capacity limits for one set of validated inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlanner {
    rates: TransmissionRates,
}

impl CapacityPlanner {
    /// # Errors
    /// `InvalidParameter` if `inputs` fail validation.
    pub fn new(inputs: &PlannerInputs) -> Result<Self, RiskError> {
        Ok(CapacityPlanner {
            rates: TransmissionRates::derive(inputs)?,
        })
    }

    #[must_use]
    pub fn rates(&self) -> &TransmissionRates {
        &self.rates
    }

    /// Steady-state occupancy limit for `exposure_time` hours.
    ///
    /// # Errors
    /// `InvalidParameter` if `exposure_time` is not positive.
    pub fn max_occupancy_steady_state(&self, exposure_time: f64) -> Result<f64, RiskError> {
        require_positive("exposure time", exposure_time)?;
        Ok(1.0 + RISK_TOLERANCE / (self.rates.airborne_transmission_rate * exposure_time))
    }

    /// Occupancy limit for `exposure_time` hours, allowing for the concentration
    /// not yet having reached steady state. Never below the steady-state limit.
    ///
    /// # Errors
    /// `InvalidParameter` if `exposure_time` is not positive.
    pub fn max_occupancy_transient(&self, exposure_time: f64) -> Result<f64, RiskError> {
        require_positive("exposure time", exposure_time)?;
        let relax = self.rates.concentration_relaxation_rate;
        Ok(1.0
            + RISK_TOLERANCE * (1.0 + 1.0 / (relax * exposure_time))
                / (self.rates.airborne_transmission_rate * exposure_time))
    }

    /// Longest exposure (hours) for `n_max` occupants, transient-corrected.
    ///
    /// # Errors
    /// `InvalidParameter` if `n_max <= 1`.
    pub fn max_exposure_time(&self, n_max: f64) -> Result<f64, RiskError> {
        if !(n_max.is_finite() && n_max > 1.0) {
            return Err(RiskError::InvalidParameter(format!(
                "occupancy must be finite and > 1, got {n_max}"
            )));
        }
        let steady_state =
            RISK_TOLERANCE / ((n_max - 1.0) * self.rates.airborne_transmission_rate);
        let relax = self.rates.concentration_relaxation_rate;
        Ok(steady_state * (1.0 + (1.0 + 4.0 / (relax * steady_state)).sqrt()) / 2.0)
    }
}

/// See [`CapacityPlanner::max_occupancy_steady_state`].
///
/// # Errors
/// `InvalidParameter` for invalid inputs or a non-positive exposure time.
pub fn max_occupancy_steady_state(
    exposure_time: f64,
    inputs: &PlannerInputs,
) -> Result<f64, RiskError> {
    CapacityPlanner::new(inputs)?.max_occupancy_steady_state(exposure_time)
}

/// See [`CapacityPlanner::max_occupancy_transient`].
///
/// # Errors
/// `InvalidParameter` for invalid inputs or a non-positive exposure time.
pub fn max_occupancy_transient(
    exposure_time: f64,
    inputs: &PlannerInputs,
) -> Result<f64, RiskError> {
    CapacityPlanner::new(inputs)?.max_occupancy_transient(exposure_time)
}

/// See [`CapacityPlanner::max_exposure_time`].
///
/// # Errors
/// `InvalidParameter` for invalid inputs or `n_max <= 1`.
pub fn max_exposure_time(n_max: f64, inputs: &PlannerInputs) -> Result<f64, RiskError> {
    CapacityPlanner::new(inputs)?.max_exposure_time(n_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::VentilationRange;
    use crate::{assert_almost_eq, assert_rel_eq};

    fn inputs() -> PlannerInputs {
        PlannerInputs {
            relative_humidity: 0.6,
            max_aerosol_radius: 2.0,
            room_volume_m3: 254.85,
            air_exchange_rate: 4.0,
            air_filtration_rate: 0.0,
            ceiling_height_m: 3.048,
            emission_rate: 15.0,
            mask_factor: 1.0,
        }
    }

    #[test]
    fn derivation_chain() {
        let rates = TransmissionRates::derive(&inputs()).unwrap();
        // (0.4 / 0.4)^(1/3) = 1
        assert_almost_eq!(rates.effective_aerosol_radius, 2.0, 1e-12);
        assert_almost_eq!(rates.settling_speed, 3.0 * 0.16 * 3.6, 1e-12);
        assert_almost_eq!(rates.viral_deactivation_rate, 0.18, 1e-12);
        let relax = 4.0 + 0.18 + 1.728 / 3.048;
        assert_rel_eq!(rates.concentration_relaxation_rate, relax, 1e-12);
        assert_rel_eq!(
            rates.airborne_transmission_rate,
            0.25 * 75.0 / (254.85 * relax),
            1e-12
        );
    }

    #[test]
    fn steady_state_formula() {
        let planner = CapacityPlanner::new(&inputs()).unwrap();
        let beta = planner.rates().airborne_transmission_rate;
        assert_rel_eq!(
            planner.max_occupancy_steady_state(2.0).unwrap(),
            1.0 + 0.1 / (beta * 2.0),
            1e-12
        );
    }

    #[test]
    fn transient_is_never_below_steady_state() {
        let planner = CapacityPlanner::new(&inputs()).unwrap();
        for t in [0.05, 0.5, 1.0, 2.0, 8.0, 100.0] {
            let steady = planner.max_occupancy_steady_state(t).unwrap();
            let transient = planner.max_occupancy_transient(t).unwrap();
            assert!(transient >= steady, "t = {t}");
        }
    }

    #[test]
    fn max_exposure_time_inverts_transient_occupancy() {
        let planner = CapacityPlanner::new(&inputs()).unwrap();
        for t0 in [0.25, 1.0, 3.0, 12.0] {
            let n_max = planner.max_occupancy_transient(t0).unwrap();
            assert_rel_eq!(planner.max_exposure_time(n_max).unwrap(), t0, 1e-9);
        }
    }

    #[test]
    fn transient_time_exceeds_steady_state_time() {
        let planner = CapacityPlanner::new(&inputs()).unwrap();
        let beta = planner.rates().airborne_transmission_rate;
        let steady = 0.1 / (24.0 * beta);
        assert!(planner.max_exposure_time(25.0).unwrap() > steady);
    }

    #[test]
    fn masks_raise_capacity() {
        let unmasked = max_occupancy_transient(1.0, &inputs()).unwrap();
        let masked = max_occupancy_transient(
            1.0,
            &PlannerInputs {
                mask_factor: 0.5,
                ..inputs()
            },
        )
        .unwrap();
        assert!(masked > unmasked);
    }

    #[test]
    fn invalid_arguments() {
        let p = inputs();
        assert!(matches!(
            max_occupancy_steady_state(0.0, &p),
            Err(RiskError::InvalidParameter(_))
        ));
        assert!(max_occupancy_transient(-1.0, &p).is_err());
        assert!(matches!(
            max_exposure_time(1.0, &p),
            Err(RiskError::InvalidParameter(_))
        ));
        assert!(max_exposure_time(0.5, &p).is_err());
        let humid = PlannerInputs {
            relative_humidity: 1.0,
            ..p
        };
        assert!(max_exposure_time(10.0, &humid).is_err());
    }

    #[test]
    fn filtration_from_recirculation() {
        // half outdoor air: recirculated flow equals fresh flow
        assert_almost_eq!(air_filtration_rate(0.9, 4.0, 0.5).unwrap(), 3.6, 1e-12);
        assert_almost_eq!(air_filtration_rate(0.9, 4.0, 1.0).unwrap(), 0.0, 1e-12);
        assert!(air_filtration_rate(1.2, 4.0, 0.5).is_err());
        assert!(air_filtration_rate(0.5, 4.0, 0.0).is_err());
    }

    #[test]
    fn inputs_from_room_profile() {
        let range = VentilationRange::new(600.0, 1200.0).unwrap();
        let room = RoomProfile::new("CENTR 101", 900.0, 10.0, range, true).unwrap();
        let p = PlannerInputs::for_room(&room, 4.0, 0.0, 0.6, 2.0, 15.0, 1.0);
        assert_almost_eq!(p.room_volume_m3, room.volume_m3(), 1e-12);
        assert_almost_eq!(p.ceiling_height_m, 3.048, 1e-12);
        assert!(p.validate().is_ok());
    }
}
