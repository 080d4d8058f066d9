//! Airborne quanta concentration in a well-mixed room.
//!
//! With `A = ERq·I/IVRR` the concentration at time `t` (hours) is
//!
//! ```text
//! C(t) = A/V + (n0 + A)·e^(−IVRR·t)/V
//! ```
//!
//! and its integral over `[0, t]` is `A·t/V + (n0 + A)·(1 − e^(−IVRR·t))/(IVRR·V)`.

use log::debug;
use serde::Serialize;

use crate::error::{require_non_negative, require_positive, RiskError};
use crate::parameters::ModelParameters;

/// Number of infectious occupants assumed among `occupants`.
///
/// This is `occupants × background_prevalence`, floored at one so an occupied
/// room always holds at least one source.
///
/// # Errors
/// `InvalidParameter` if `occupants` is zero.
pub fn infected_count(occupants: u32, background_prevalence: f64) -> Result<f64, RiskError> {
    if occupants == 0 {
        return Err(RiskError::InvalidParameter(
            "occupant count must be at least 1".to_string(),
        ));
    }
    require_non_negative("background prevalence", background_prevalence)?;
    Ok((f64::from(occupants) * background_prevalence).max(1.0))
}

/// Infectious virus removal rate (per hour): ventilation plus deposition plus inactivation.
#[must_use]
pub fn removal_rate(air_changes_per_hour: f64, parameters: &ModelParameters) -> f64 {
    air_changes_per_hour + parameters.deposition_rate + parameters.inactivation_rate
}

/// Time course of the quanta concentration for one emitter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantaConcentration {
    /// Quanta emission rate per infectious occupant, quanta/h.
    pub emission_rate: f64,
    /// Number of infectious occupants.
    pub infected: f64,
    /// Infectious virus removal rate, per hour.
    pub removal_rate: f64,
    /// Room volume, m³.
    pub volume_m3: f64,
    /// Quanta present at `t = 0`.
    pub initial_quanta: f64,
}

impl QuantaConcentration {
    /// # Errors
    /// `InvalidParameter` if the removal rate or volume is not positive, or any
    /// other input is negative.
    pub fn new(
        emission_rate: f64,
        infected: f64,
        removal_rate: f64,
        volume_m3: f64,
        initial_quanta: f64,
    ) -> Result<Self, RiskError> {
        require_non_negative("emission rate", emission_rate)?;
        require_non_negative("infected count", infected)?;
        require_positive("removal rate", removal_rate)?;
        require_positive("room volume", volume_m3)?;
        require_non_negative("initial quanta", initial_quanta)?;
        let model = QuantaConcentration {
            emission_rate,
            infected,
            removal_rate,
            volume_m3,
            initial_quanta,
        };
        debug!("{model:?}");
        Ok(model)
    }

    /// `ERq·I/IVRR`, the steady-state quanta count.
    fn source_term(&self) -> f64 {
        self.emission_rate * self.infected / self.removal_rate
    }

    /// Concentration (quanta/m³) the room approaches as `t → ∞`.
    #[must_use]
    pub fn steady_state(&self) -> f64 {
        self.source_term() / self.volume_m3
    }

    /// Concentration (quanta/m³) at `t` hours.
    #[must_use]
    pub fn at(&self, t: f64) -> f64 {
        let decay = (-self.removal_rate * t).exp();
        self.steady_state() + (self.initial_quanta + self.source_term()) * decay / self.volume_m3
    }

    /// `∫₀ᵗ C(τ) dτ` in quanta·h/m³, in closed form.
    #[must_use]
    pub fn integral(&self, t: f64) -> f64 {
        // 1 - e^{-kt}, accurate for small kt
        let relaxed = -(-self.removal_rate * t).exp_m1();
        self.steady_state() * t
            + (self.initial_quanta + self.source_term()) * relaxed
                / (self.removal_rate * self.volume_m3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_almost_eq, assert_rel_eq};
    use assert_approx_eq::assert_approx_eq;

    fn model() -> QuantaConcentration {
        QuantaConcentration::new(15.0, 1.0, 4.87, 254.85, 0.0).unwrap()
    }

    #[test]
    fn infected_count_has_a_floor_of_one() {
        assert_eq!(infected_count(1, 0.0124).unwrap(), 1.0);
        assert_eq!(infected_count(30, 0.0124).unwrap(), 1.0);
        assert_almost_eq!(infected_count(200, 0.0124).unwrap(), 2.48, 1e-12);
    }

    #[test]
    fn zero_occupants_is_invalid() {
        assert!(matches!(
            infected_count(0, 0.0124),
            Err(RiskError::InvalidParameter(_))
        ));
    }

    #[test]
    fn removal_rate_sums_components() {
        let parameters = ModelParameters::default();
        assert_almost_eq!(removal_rate(4.0, &parameters), 4.87, 1e-12);
    }

    #[test]
    fn concentration_closed_form() {
        let m = model();
        let a = 15.0 / 4.87;
        assert_rel_eq!(m.at(0.0), 2.0 * a / 254.85, 1e-12);
        assert_rel_eq!(m.at(1.0), a / 254.85 + a * (-4.87f64).exp() / 254.85, 1e-12);
        assert_rel_eq!(m.at(50.0), m.steady_state(), 1e-12);
    }

    #[test]
    fn initial_quanta_add_to_transient() {
        let base = model();
        let seeded = QuantaConcentration::new(15.0, 1.0, 4.87, 254.85, 10.0).unwrap();
        assert_rel_eq!(seeded.at(0.0) - base.at(0.0), 10.0 / 254.85, 1e-12);
        assert_rel_eq!(seeded.steady_state(), base.steady_state(), 1e-15);
    }

    #[test]
    fn long_exposure_integral_approaches_steady_state_line() {
        let m = model();
        // after relaxation, the integral is C_ss·t plus the settled transient
        let transient = (m.initial_quanta + m.emission_rate * m.infected / m.removal_rate)
            / (m.removal_rate * m.volume_m3);
        assert_approx_eq!(m.integral(40.0), m.steady_state() * 40.0 + transient, 1e-12);
    }

    #[test]
    fn integral_is_zero_at_start_and_grows() {
        let m = model();
        assert_eq!(m.integral(0.0), 0.0);
        assert!(m.integral(0.5) < m.integral(1.0));
    }

    #[test]
    fn derivative_of_integral_is_concentration() {
        let m = model();
        let h = 1e-6;
        let numeric = (m.integral(1.0 + h) - m.integral(1.0 - h)) / (2.0 * h);
        assert_rel_eq!(numeric, m.at(1.0), 1e-7);
    }

    #[test]
    fn rejects_non_physical_inputs() {
        assert!(QuantaConcentration::new(15.0, 1.0, 0.0, 254.85, 0.0).is_err());
        assert!(QuantaConcentration::new(15.0, 1.0, 4.87, -1.0, 0.0).is_err());
        assert!(QuantaConcentration::new(-15.0, 1.0, 4.87, 254.85, 0.0).is_err());
    }
}
