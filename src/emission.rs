//! Quanta emission rate of an infectious occupant.
//!
//! `ERq = cv · ci · IR · Σ_b (Nd_b · Vd_b)` where `Nd_b` is the expired droplet
//! number concentration (particles/cm³) and `Vd_b` the droplet volume in bucket
//! `b`. Droplet volumes are converted µm³ → cm³ and the inhalation rate
//! m³/h → mL/h, giving quanta per hour.

use log::trace;

use crate::activity::ActivityProfile;
use crate::error::RiskError;
use crate::parameters::ModelParameters;
use crate::units::{CUBIC_M_TO_ML, CUBIC_UM_TO_CUBIC_CM};

/// Expired droplet volume per unit volume of exhaled air (cm³/cm³) for the
/// expiratory activity of `profile`.
///
/// # Errors
/// `UnknownActivity` if the parameter tables lack the expiratory activity.
pub fn expired_droplet_volume_fraction(
    parameters: &ModelParameters,
    profile: ActivityProfile,
) -> Result<f64, RiskError> {
    let concentrations = parameters.droplet_concentration(profile.expiratory)?;
    Ok(concentrations.weighted_sum(&parameters.droplet_volumes) * CUBIC_UM_TO_CUBIC_CM)
}

/// Quanta emission rate (quanta/h) for an emitter engaged in `profile`.
///
/// # Errors
/// `UnknownActivity` if either activity has no table entry.
pub fn emission_rate(
    parameters: &ModelParameters,
    profile: ActivityProfile,
) -> Result<f64, RiskError> {
    let inhalation_ml = parameters.inhalation_rate(profile.activity)? * CUBIC_M_TO_ML;
    let droplet_fraction = expired_droplet_volume_fraction(parameters, profile)?;
    let rate =
        parameters.viral_load * parameters.quanta_per_copy * inhalation_ml * droplet_fraction;
    trace!("emission rate for {profile}: {rate} quanta/h");
    Ok(rate)
}
