//! The immutable parameter bundle for the deterministic risk pipeline.
//!
//! Every model function takes a `&ModelParameters` explicitly, so scenarios with
//! different pathogen parameters can be evaluated side by side. A bundle can be
//! loaded from a JSON file whose fields override the defaults:
//!
//! ```json
//! {
//!     "viral_load": 5e8,
//!     "inhalation_rates": { "standing": 0.6 }
//! }
//! ```
//!
//! Table entries given in a file replace the default entry for that key only.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ExpiratoryActivity};
use crate::droplets::DropletProfile;
use crate::error::{require_non_negative, require_positive, RiskError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParameters {
    /// Viral load in the emitter's respiratory fluid, RNA copies per mL (cv).
    pub viral_load: f64,
    /// Quanta per RNA copy (ci).
    pub quanta_per_copy: f64,
    /// Particle deposition rate onto surfaces, per hour.
    pub deposition_rate: f64,
    /// Viral inactivation rate, per hour.
    pub inactivation_rate: f64,
    /// Quanta present in the room at `t = 0`.
    pub initial_quanta: f64,
    /// Fraction of occupants assumed infectious.
    pub background_prevalence: f64,
    /// Inhalation rate by activity, m³/h.
    pub inhalation_rates: BTreeMap<Activity, f64>,
    /// Expired droplet number concentration by expiratory activity, particles/cm³.
    pub droplet_concentrations: BTreeMap<ExpiratoryActivity, DropletProfile>,
    /// Droplet volume per bucket, µm³.
    pub droplet_volumes: DropletProfile,
}

impl Default for ModelParameters {
    fn default() -> Self {
        let inhalation_rates = BTreeMap::from([
            (Activity::Resting, 0.49),
            (Activity::Standing, 0.54),
            (Activity::LightExercise, 1.38),
            (Activity::ModerateExercise, 2.35),
            (Activity::HeavyExercise, 3.30),
        ]);
        let droplet_concentrations = BTreeMap::from([
            (
                ExpiratoryActivity::Breathing,
                DropletProfile::new(0.084, 0.009, 0.003, 0.002),
            ),
            (
                ExpiratoryActivity::Whispering,
                DropletProfile::new(0.110, 0.014, 0.004, 0.002),
            ),
            (
                ExpiratoryActivity::Speaking,
                DropletProfile::new(0.236, 0.068, 0.007, 0.011),
            ),
            (
                ExpiratoryActivity::Singing,
                DropletProfile::new(0.751, 0.139, 0.139, 0.059),
            ),
        ]);
        ModelParameters {
            viral_load: 1e9,
            quanta_per_copy: 0.02,
            deposition_rate: 0.24,
            inactivation_rate: 0.63,
            initial_quanta: 0.0,
            background_prevalence: 0.0124,
            inhalation_rates,
            droplet_concentrations,
            droplet_volumes: DropletProfile::sphere_volumes_um3(),
        }
    }
}

/// Mirror of [`ModelParameters`] where every field is optional, used so that a
/// file can override single table entries without restating the whole table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterOverrides {
    viral_load: Option<f64>,
    quanta_per_copy: Option<f64>,
    deposition_rate: Option<f64>,
    inactivation_rate: Option<f64>,
    initial_quanta: Option<f64>,
    background_prevalence: Option<f64>,
    #[serde(default)]
    inhalation_rates: BTreeMap<Activity, f64>,
    #[serde(default)]
    droplet_concentrations: BTreeMap<ExpiratoryActivity, DropletProfile>,
    droplet_volumes: Option<DropletProfile>,
}

impl ModelParameters {
    /// Loads parameter overrides from a JSON file on top of [`ModelParameters::default`]
    /// and validates the result.
    ///
    /// # Errors
    /// I/O or JSON errors from reading the file, or `InvalidParameter` from validation.
    pub fn from_json_file(path: &Path) -> Result<Self, RiskError> {
        info!("Loading model parameters from: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let overrides: ParameterOverrides = serde_json::from_reader(reader)?;
        let parameters = ModelParameters::default().with_overrides(overrides);
        parameters.validate()?;
        debug!("{parameters:?}");
        Ok(parameters)
    }

    /// Parses a JSON document of overrides, as [`ModelParameters::from_json_file`] does.
    ///
    /// # Errors
    /// JSON errors, or `InvalidParameter` from validation.
    pub fn from_json_str(json: &str) -> Result<Self, RiskError> {
        let overrides: ParameterOverrides = serde_json::from_str(json)?;
        let parameters = ModelParameters::default().with_overrides(overrides);
        parameters.validate()?;
        Ok(parameters)
    }

    fn with_overrides(mut self, overrides: ParameterOverrides) -> Self {
        let scalars = [
            (&mut self.viral_load, overrides.viral_load),
            (&mut self.quanta_per_copy, overrides.quanta_per_copy),
            (&mut self.deposition_rate, overrides.deposition_rate),
            (&mut self.inactivation_rate, overrides.inactivation_rate),
            (&mut self.initial_quanta, overrides.initial_quanta),
            (
                &mut self.background_prevalence,
                overrides.background_prevalence,
            ),
        ];
        for (field, value) in scalars {
            if let Some(value) = value {
                *field = value;
            }
        }
        self.inhalation_rates.extend(overrides.inhalation_rates);
        self.droplet_concentrations
            .extend(overrides.droplet_concentrations);
        if let Some(volumes) = overrides.droplet_volumes {
            self.droplet_volumes = volumes;
        }
        self
    }

    /// Checks every value is physical.
    ///
    /// # Errors
    /// `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), RiskError> {
        require_positive("viral_load", self.viral_load)?;
        require_positive("quanta_per_copy", self.quanta_per_copy)?;
        require_non_negative("deposition_rate", self.deposition_rate)?;
        require_non_negative("inactivation_rate", self.inactivation_rate)?;
        require_non_negative("initial_quanta", self.initial_quanta)?;
        require_non_negative("background_prevalence", self.background_prevalence)?;
        if self.background_prevalence > 1.0 {
            return Err(RiskError::InvalidParameter(format!(
                "background_prevalence must be <= 1, got {}",
                self.background_prevalence
            )));
        }
        for (activity, rate) in &self.inhalation_rates {
            require_positive(&format!("inhalation_rates.{activity}"), *rate)?;
        }
        for (expiratory, profile) in &self.droplet_concentrations {
            if !profile.is_physical() {
                return Err(RiskError::InvalidParameter(format!(
                    "droplet_concentrations.{expiratory} must be finite and >= 0"
                )));
            }
        }
        if !self.droplet_volumes.is_physical() {
            return Err(RiskError::InvalidParameter(
                "droplet_volumes must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Inhalation rate (m³/h) for `activity`.
    ///
    /// # Errors
    /// `UnknownActivity` if the table has no entry.
    pub fn inhalation_rate(&self, activity: Activity) -> Result<f64, RiskError> {
        self.inhalation_rates.get(&activity).copied().ok_or_else(|| {
            RiskError::UnknownActivity(format!("no inhalation rate for '{activity}'"))
        })
    }

    /// Droplet concentration profile for `expiratory`.
    ///
    /// # Errors
    /// `UnknownActivity` if the table has no entry.
    pub fn droplet_concentration(
        &self,
        expiratory: ExpiratoryActivity,
    ) -> Result<&DropletProfile, RiskError> {
        self.droplet_concentrations.get(&expiratory).ok_or_else(|| {
            RiskError::UnknownActivity(format!(
                "no droplet concentrations for '{expiratory}'"
            ))
        })
    }
}
