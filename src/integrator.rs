//! Cumulative dose and Wells-Riley infection probability.
//!
//! The dose inhaled over `[0, t]` is `IR · ∫₀ᵗ C(τ) dτ` and the probability of
//! infection is `1 − e^(−dose)`.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::concentration::QuantaConcentration;
use crate::error::{require_non_negative, require_positive, RiskError};
use crate::numeric::{find_root, integrate_windows};

/// How `∫ C(τ) dτ` is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseIntegration {
    /// Exact antiderivative of the concentration curve.
    #[default]
    ClosedForm,
    /// Simpson quadrature on windows no longer than a quarter of the decay time.
    Quadrature,
}

/// Upper bound on quadrature windows; past a few thousand relaxation times the
/// integrand is flat at its steady state.
const MAX_QUADRATURE_WINDOWS: f64 = 4096.0;

/// Tolerance for the time-to-threshold root search.
const ROOT_TOLERANCE: f64 = 1e-12;

/// Converts an inhaled quanta dose into an infection probability in `[0, 1)`.
#[must_use]
pub fn infection_probability(inhaled_quanta: f64) -> f64 {
    -(-inhaled_quanta).exp_m1()
}

/// Integrates the concentration of `model` over `[0, t]` (quanta·h/m³).
#[must_use]
pub fn integrated_concentration(
    model: &QuantaConcentration,
    t: f64,
    method: DoseIntegration,
) -> f64 {
    match method {
        DoseIntegration::ClosedForm => model.integral(t),
        DoseIntegration::Quadrature => {
            let m = *model;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pieces = (4.0 * m.removal_rate * t)
                .ceil()
                .clamp(1.0, MAX_QUADRATURE_WINDOWS) as usize;
            trace!("integrating concentration over {pieces} windows");
            integrate_windows(move |tau| m.at(tau), 0.0, t, pieces)
        }
    }
}

/// Infection risk for one susceptible occupant breathing at `inhalation_rate`
/// (m³/h) in the room described by `model`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskIntegrator {
    model: QuantaConcentration,
    inhalation_rate: f64,
    method: DoseIntegration,
}

impl RiskIntegrator {
    /// # Errors
    /// `InvalidParameter` if the inhalation rate is not positive.
    pub fn new(
        model: QuantaConcentration,
        inhalation_rate: f64,
        method: DoseIntegration,
    ) -> Result<Self, RiskError> {
        require_positive("inhalation rate", inhalation_rate)?;
        Ok(RiskIntegrator {
            model,
            inhalation_rate,
            method,
        })
    }

    #[must_use]
    pub fn model(&self) -> &QuantaConcentration {
        &self.model
    }

    /// Quanta inhaled over `time` hours.
    ///
    /// # Errors
    /// `InvalidParameter` if `time` is negative or not finite.
    pub fn inhaled_quanta(&self, time: f64) -> Result<f64, RiskError> {
        require_non_negative("exposure time", time)?;
        Ok(self.inhalation_rate * integrated_concentration(&self.model, time, self.method))
    }

    /// Probability of infection after `time` hours of exposure.
    ///
    /// # Errors
    /// `InvalidParameter` if `time` is negative or not finite.
    pub fn risk(&self, time: f64) -> Result<f64, RiskError> {
        let dose = self.inhaled_quanta(time)?;
        let risk = infection_probability(dose);
        debug!("t = {time} h: dose {dose} quanta, risk {risk}");
        Ok(risk)
    }

    /// Exposure time (hours) at which the risk reaches `target`, searched over
    /// `[0, horizon]`.
    ///
    /// # Errors
    /// - `InvalidParameter` if `target` is outside `(0, 1)` or `horizon` is not positive.
    /// - `NumericalError` if the risk stays below `target` for the whole horizon.
    pub fn time_to_risk(&self, target: f64, horizon: f64) -> Result<f64, RiskError> {
        if !(target > 0.0 && target < 1.0) {
            return Err(RiskError::InvalidParameter(format!(
                "target risk must be in (0, 1), got {target}"
            )));
        }
        require_positive("search horizon", horizon)?;
        if self.risk(horizon)? < target {
            return Err(RiskError::NumericalError(format!(
                "risk does not reach {target} within {horizon} h"
            )));
        }
        // Root of the dose equation rather than the risk: it is smoother near 1.
        let target_dose = -(-target).ln_1p();
        let model = self.model;
        let inhalation_rate = self.inhalation_rate;
        let method = self.method;
        find_root(
            0.0,
            horizon,
            move |t| inhalation_rate * integrated_concentration(&model, t, method) - target_dose,
            ROOT_TOLERANCE,
        )
    }
}

/// Risk after `time` hours for a susceptible occupant inhaling `inhalation_rate`
/// m³/h in `model`, using the closed-form dose.
///
/// # Errors
/// `InvalidParameter` for a negative time or non-positive inhalation rate.
pub fn risk(
    time: f64,
    model: &QuantaConcentration,
    inhalation_rate: f64,
) -> Result<f64, RiskError> {
    RiskIntegrator::new(*model, inhalation_rate, DoseIntegration::ClosedForm)?.risk(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::REL_ACC;
    use crate::{assert_almost_eq, assert_rel_eq};

    fn integrator(method: DoseIntegration) -> RiskIntegrator {
        let model = QuantaConcentration::new(15.0, 1.0, 4.87, 254.85, 0.0).unwrap();
        RiskIntegrator::new(model, 0.54, method).unwrap()
    }

    #[test]
    fn zero_time_is_zero_risk() {
        assert_eq!(integrator(DoseIntegration::ClosedForm).risk(0.0).unwrap(), 0.0);
        assert_eq!(integrator(DoseIntegration::Quadrature).risk(0.0).unwrap(), 0.0);
    }

    #[test]
    fn risk_is_a_probability_below_one() {
        let risk = integrator(DoseIntegration::ClosedForm);
        for t in [0.01, 0.5, 1.0, 8.0, 1000.0] {
            let r = risk.risk(t).unwrap();
            assert!(r > 0.0 && r < 1.0, "t = {t}: {r}");
        }
    }

    #[test]
    fn risk_strictly_increases_with_time() {
        let risk = integrator(DoseIntegration::ClosedForm);
        let mut previous = 0.0;
        for step in 1..=48 {
            let r = risk.risk(f64::from(step) * 0.25).unwrap();
            assert!(r > previous);
            previous = r;
        }
    }

    #[test]
    fn risk_increases_with_infected_and_emission() {
        let base = QuantaConcentration::new(15.0, 1.0, 4.87, 254.85, 0.0).unwrap();
        let more_infected = QuantaConcentration { infected: 2.0, ..base };
        let louder = QuantaConcentration { emission_rate: 30.0, ..base };
        let r0 = risk(1.0, &base, 0.54).unwrap();
        assert!(risk(1.0, &more_infected, 0.54).unwrap() > r0);
        assert!(risk(1.0, &louder, 0.54).unwrap() > r0);
    }

    #[test]
    fn quadrature_agrees_with_closed_form() {
        let exact = integrator(DoseIntegration::ClosedForm);
        let numeric = integrator(DoseIntegration::Quadrature);
        for t in [0.01, 0.1, 1.0, 3.0, 10.0] {
            let dose = numeric.inhaled_quanta(t).unwrap();
            assert!(dose > 0.0, "t = {t}");
            assert_rel_eq!(dose, exact.inhaled_quanta(t).unwrap(), REL_ACC);
            assert!(numeric.risk(t).unwrap() > 0.0);
        }
    }

    #[test]
    fn quadrature_window_count_is_bounded() {
        let numeric = integrator(DoseIntegration::Quadrature);
        let exact = integrator(DoseIntegration::ClosedForm);
        // 4·k·t would ask for 19 480 windows
        let t = 1000.0;
        assert_rel_eq!(
            numeric.inhaled_quanta(t).unwrap(),
            exact.inhaled_quanta(t).unwrap(),
            REL_ACC
        );
    }

    #[test]
    fn dose_response() {
        assert_eq!(infection_probability(0.0), 0.0);
        assert_almost_eq!(infection_probability(1.0), 1.0 - (-1.0f64).exp(), 1e-15);
        assert!(infection_probability(1e-12) > 0.0);
    }

    #[test]
    fn negative_time_is_invalid() {
        assert!(matches!(
            integrator(DoseIntegration::ClosedForm).risk(-1.0),
            Err(RiskError::InvalidParameter(_))
        ));
        assert!(integrator(DoseIntegration::ClosedForm).risk(f64::NAN).is_err());
    }

    #[test]
    fn time_to_risk_inverts_risk() {
        let risk = integrator(DoseIntegration::ClosedForm);
        let target = risk.risk(2.5).unwrap();
        let t = risk.time_to_risk(target, 24.0).unwrap();
        assert_almost_eq!(t, 2.5, 1e-6);
    }

    #[test]
    fn time_to_risk_reports_unreachable_target() {
        let risk = integrator(DoseIntegration::ClosedForm);
        assert!(matches!(
            risk.time_to_risk(0.999, 0.1),
            Err(RiskError::NumericalError(_))
        ));
        assert!(matches!(
            risk.time_to_risk(1.5, 10.0),
            Err(RiskError::InvalidParameter(_))
        ));
    }
}
