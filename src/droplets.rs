//! Droplet size buckets and per-bucket values.
//!
//! A [`DropletProfile`] stores exactly one value per [`DropletBucket`], so the
//! concentration and volume tables always share the same key set.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Droplet diameter buckets, in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DropletBucket {
    #[strum(serialize = "0.8um")]
    D0_8,
    #[strum(serialize = "1.8um")]
    D1_8,
    #[strum(serialize = "3.5um")]
    D3_5,
    #[strum(serialize = "5.5um")]
    D5_5,
}

impl DropletBucket {
    /// Nominal diameter in micrometres.
    #[must_use]
    pub fn diameter_um(self) -> f64 {
        match self {
            DropletBucket::D0_8 => 0.8,
            DropletBucket::D1_8 => 1.8,
            DropletBucket::D3_5 => 3.5,
            DropletBucket::D5_5 => 5.5,
        }
    }

    /// Volume of a sphere with the bucket's diameter, in cubic micrometres.
    #[must_use]
    pub fn sphere_volume_um3(self) -> f64 {
        std::f64::consts::PI / 6.0 * self.diameter_um().powi(3)
    }
}

/// One value per droplet bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropletProfile {
    #[serde(rename = "0.8um")]
    pub d0_8: f64,
    #[serde(rename = "1.8um")]
    pub d1_8: f64,
    #[serde(rename = "3.5um")]
    pub d3_5: f64,
    #[serde(rename = "5.5um")]
    pub d5_5: f64,
}

impl DropletProfile {
    #[must_use]
    pub fn new(d0_8: f64, d1_8: f64, d3_5: f64, d5_5: f64) -> Self {
        DropletProfile {
            d0_8,
            d1_8,
            d3_5,
            d5_5,
        }
    }

    /// Droplet volumes for each bucket computed from the bucket diameters.
    #[must_use]
    pub fn sphere_volumes_um3() -> Self {
        DropletProfile::new(
            DropletBucket::D0_8.sphere_volume_um3(),
            DropletBucket::D1_8.sphere_volume_um3(),
            DropletBucket::D3_5.sphere_volume_um3(),
            DropletBucket::D5_5.sphere_volume_um3(),
        )
    }

    #[must_use]
    pub fn get(&self, bucket: DropletBucket) -> f64 {
        match bucket {
            DropletBucket::D0_8 => self.d0_8,
            DropletBucket::D1_8 => self.d1_8,
            DropletBucket::D3_5 => self.d3_5,
            DropletBucket::D5_5 => self.d5_5,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DropletBucket, f64)> + '_ {
        DropletBucket::iter().map(move |bucket| (bucket, self.get(bucket)))
    }

    /// `Σ self[bucket] × other[bucket]` over all buckets.
    #[must_use]
    pub fn weighted_sum(&self, other: &DropletProfile) -> f64 {
        self.iter().map(|(bucket, v)| v * other.get(bucket)).sum()
    }

    /// True when every bucket holds a finite, non-negative value.
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite() && v >= 0.0)
    }
}
