//! Stochastic per-occupant generator.
//!
//! This is a simulation mode for studies of individual variability. It is
//! seeded explicitly, has its own parameters, and is not used by the
//! deterministic risk pipeline in [`crate::scenario`].

use std::cmp::Ordering;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::units::CUBIC_CM_TO_CUBIC_M;

/// Upper bound on rejection-sampling attempts per draw.
const MAX_REJECTIONS: usize = 10_000;

/// A normal distribution restricted to `[low, high]` by rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedNormal {
    pub mean: f64,
    pub sd: f64,
    pub low: f64,
    pub high: f64,
}

impl BoundedNormal {
    #[must_use]
    pub const fn new(mean: f64, sd: f64, low: f64, high: f64) -> Self {
        BoundedNormal {
            mean,
            sd,
            low,
            high,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TruncatedNormal {
    normal: Normal<f64>,
    low: f64,
    high: f64,
}

impl TruncatedNormal {
    fn new(bounds: BoundedNormal) -> Result<Self, RiskError> {
        if bounds.low.partial_cmp(&bounds.high) != Some(Ordering::Less) {
            return Err(RiskError::InvalidParameter(format!(
                "truncation bounds [{}, {}] are empty",
                bounds.low, bounds.high
            )));
        }
        let normal = Normal::new(bounds.mean, bounds.sd)
            .map_err(|e| RiskError::InvalidParameter(format!("normal distribution: {e}")))?;
        Ok(TruncatedNormal {
            normal,
            low: bounds.low,
            high: bounds.high,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        for _ in 0..MAX_REJECTIONS {
            let x = self.normal.sample(rng);
            if x >= self.low && x <= self.high {
                return x;
            }
        }
        // bounds far out in a tail: fall back to the clamped mean
        self.normal.mean().clamp(self.low, self.high)
    }
}

/// Parameters of the occupant generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupantSamplingParameters {
    /// Weights for ages 18 through 24, followed by the weight of the 25–30 band.
    pub age_weights: [f64; 8],
    /// Droplet volume exhaled while breathing, cm³ (converted to m³ on output).
    pub breathing_volume_cm3: BoundedNormal,
    /// Droplet volume exhaled while speaking, cm³.
    pub speaking_volume_cm3: BoundedNormal,
    /// Respiratory rate, L/min.
    pub respiratory_rate: BoundedNormal,
    pub mask_efficacy: f64,
    pub tested_weekly: bool,
}

impl Default for OccupantSamplingParameters {
    /// Age mix of a university classroom.
    fn default() -> Self {
        OccupantSamplingParameters {
            age_weights: [
                0.198, 0.195, 0.195, 0.1875, 0.09375, 0.046875, 0.023875, 0.06,
            ],
            breathing_volume_cm3: BoundedNormal::new(0.1, 0.02, 0.06, 1.0),
            speaking_volume_cm3: BoundedNormal::new(1.1, 0.02, 0.06, 6.0),
            respiratory_rate: BoundedNormal::new(10.0, 5.0, 5.0, 20.0),
            mask_efficacy: 0.0,
            tested_weekly: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occupant {
    pub id: usize,
    pub age: u8,
    /// m³
    pub breathing_droplet_volume: f64,
    /// m³
    pub speaking_droplet_volume: f64,
    /// L/min
    pub respiratory_rate: f64,
    pub mask_efficacy: f64,
    pub tested_weekly: bool,
    pub infected: bool,
}

/// Draws occupants one at a time from a seeded generator.
pub struct OccupantGenerator {
    rng: SmallRng,
    ages: WeightedIndex<f64>,
    breathing: TruncatedNormal,
    speaking: TruncatedNormal,
    respiratory_rate: TruncatedNormal,
    mask_efficacy: f64,
    tested_weekly: bool,
    next_id: usize,
}

impl OccupantGenerator {
    /// # Errors
    /// `InvalidParameter` if the age weights or any distribution are invalid.
    pub fn new(parameters: &OccupantSamplingParameters, seed: u64) -> Result<Self, RiskError> {
        let ages = WeightedIndex::new(parameters.age_weights)
            .map_err(|e| RiskError::InvalidParameter(format!("age weights: {e}")))?;
        if !(0.0..=1.0).contains(&parameters.mask_efficacy) {
            return Err(RiskError::InvalidParameter(format!(
                "mask efficacy must be in [0, 1], got {}",
                parameters.mask_efficacy
            )));
        }
        Ok(OccupantGenerator {
            rng: SmallRng::seed_from_u64(seed),
            ages,
            breathing: TruncatedNormal::new(parameters.breathing_volume_cm3)?,
            speaking: TruncatedNormal::new(parameters.speaking_volume_cm3)?,
            respiratory_rate: TruncatedNormal::new(parameters.respiratory_rate)?,
            mask_efficacy: parameters.mask_efficacy,
            tested_weekly: parameters.tested_weekly,
            next_id: 0,
        })
    }

    fn sample_age(&mut self) -> u8 {
        match self.ages.sample(&mut self.rng) {
            // ages 18..=24 carry their own weight; the last weight covers 25..=30
            #[allow(clippy::cast_possible_truncation)]
            index @ 0..=6 => 18 + index as u8,
            _ => self.rng.random_range(25..=30),
        }
    }

    /// Draws the next occupant, flagged as `infected` if requested.
    pub fn next_occupant(&mut self, infected: bool) -> Occupant {
        let id = self.next_id;
        self.next_id += 1;
        let age = self.sample_age();
        Occupant {
            id,
            age,
            breathing_droplet_volume: self.breathing.sample(&mut self.rng) * CUBIC_CM_TO_CUBIC_M,
            speaking_droplet_volume: self.speaking.sample(&mut self.rng) * CUBIC_CM_TO_CUBIC_M,
            respiratory_rate: self.respiratory_rate.sample(&mut self.rng),
            mask_efficacy: self.mask_efficacy,
            tested_weekly: self.tested_weekly,
            infected,
        }
    }
}

/// Generates `n_occupants` occupants, the first `n_infected` of whom are infected.
///
/// # Errors
/// `InvalidParameter` if `n_infected > n_occupants` or the parameters are invalid.
pub fn generate_occupants(
    n_occupants: usize,
    n_infected: usize,
    parameters: &OccupantSamplingParameters,
    seed: u64,
) -> Result<Vec<Occupant>, RiskError> {
    if n_infected > n_occupants {
        return Err(RiskError::InvalidParameter(format!(
            "{n_infected} infected exceeds {n_occupants} occupants"
        )));
    }
    let mut generator = OccupantGenerator::new(parameters, seed)?;
    Ok((0..n_occupants)
        .map(|i| generator.next_occupant(i < n_infected))
        .collect())
}
