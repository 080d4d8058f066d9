//! Occupant posture and expiratory behaviour, plus the fixed mapping from the
//! activity labels offered at the request boundary to an activity pairing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::RiskError;

/// Occupant posture / physical activity. Indexes the inhalation rate table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Activity {
    Resting,
    Standing,
    LightExercise,
    ModerateExercise,
    HeavyExercise,
}

/// Vocalisation while exhaling. Indexes the droplet concentration table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExpiratoryActivity {
    Breathing,
    Whispering,
    Speaking,
    Singing,
}

/// An (activity, expiratory activity) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub activity: Activity,
    pub expiratory: ExpiratoryActivity,
}

impl ActivityProfile {
    #[must_use]
    pub fn new(activity: Activity, expiratory: ExpiratoryActivity) -> Self {
        ActivityProfile {
            activity,
            expiratory,
        }
    }

    /// Builds a pairing from its two snake_case names, e.g. `("standing", "speaking")`.
    ///
    /// # Errors
    /// `UnknownActivity` if either name is not recognised.
    pub fn from_names(activity: &str, expiratory: &str) -> Result<Self, RiskError> {
        let activity = Activity::from_str(activity)
            .map_err(|_| RiskError::UnknownActivity(format!("activity '{activity}'")))?;
        let expiratory = ExpiratoryActivity::from_str(expiratory).map_err(|_| {
            RiskError::UnknownActivity(format!("expiratory activity '{expiratory}'"))
        })?;
        Ok(ActivityProfile::new(activity, expiratory))
    }
}

impl fmt::Display for ActivityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.activity, self.expiratory)
    }
}

/// Event types a caller may select. Each maps to exactly one [`ActivityProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ActivityLabel {
    Lecture,
    Studying,
    Singing,
    #[strum(serialize = "Social Event")]
    SocialEvent,
}

impl ActivityLabel {
    /// Parses a boundary label. Unrecognised labels are rejected, never defaulted.
    ///
    /// # Errors
    /// `UnknownActivity` naming the rejected label.
    pub fn parse(label: &str) -> Result<Self, RiskError> {
        ActivityLabel::from_str(label.trim())
            .map_err(|_| RiskError::UnknownActivity(format!("label '{label}'")))
    }

    #[must_use]
    pub fn profile(self) -> ActivityProfile {
        use Activity::{LightExercise, Standing};
        use ExpiratoryActivity::{Singing, Speaking, Whispering};
        match self {
            ActivityLabel::Lecture => ActivityProfile::new(Standing, Speaking),
            ActivityLabel::Studying => ActivityProfile::new(Standing, Whispering),
            ActivityLabel::Singing => ActivityProfile::new(Standing, Singing),
            ActivityLabel::SocialEvent => ActivityProfile::new(LightExercise, Speaking),
        }
    }
}
