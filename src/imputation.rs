//! Non-fatal substitutions made while resolving a scenario.
//!
//! Each substitution is logged at `warn` when it is recorded and is carried on
//! the final result, since it changes the number produced.

use std::fmt;

use log::warn;
use serde::Serialize;

/// Height substituted when a room has none on record, in feet.
pub const IMPUTED_ROOM_HEIGHT_FT: f64 = 10.0;

/// Ventilation rate substituted when the requested rate is unavailable, in CFM.
pub const IMPUTED_AVERAGE_CFM: f64 = 1200.0;

/// Ventilation rate substituted by the air-change helper when its CFM is unknown.
pub const IMPUTED_AIR_CHANGE_CFM: f64 = 800.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Imputation {
    /// The room had no usable height.
    RoomHeight { room: String, substitute_ft: f64 },
    /// The requested ventilation rate was not available.
    VentilationUnavailable { substitute_cfm: f64 },
    /// The requested ventilation rate was outside the room's range and was
    /// replaced by the range minimum.
    VentilationOutOfRange {
        requested_cfm: f64,
        min_cfm: f64,
        max_cfm: f64,
    },
    /// The air-change helper was given no CFM.
    AirChangeCfm { substitute_cfm: f64 },
}

impl fmt::Display for Imputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imputation::RoomHeight {
                room,
                substitute_ft,
            } => write!(
                f,
                "height unknown for room {room}; imputed with {substitute_ft} ft"
            ),
            Imputation::VentilationUnavailable { substitute_cfm } => write!(
                f,
                "ventilation rate not available; imputed with average of {substitute_cfm} CFM"
            ),
            Imputation::VentilationOutOfRange {
                requested_cfm,
                min_cfm,
                max_cfm,
            } => write!(
                f,
                "ventilation rate {requested_cfm} CFM outside [{min_cfm}, {max_cfm}]; \
                 using minimum of {min_cfm} CFM"
            ),
            Imputation::AirChangeCfm { substitute_cfm } => write!(
                f,
                "VAV unknown; imputed with arbitrary VAV of {substitute_cfm} CFM"
            ),
        }
    }
}

/// Ordered record of the imputations made during one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Imputations(Vec<Imputation>);

impl Imputations {
    #[must_use]
    pub fn new() -> Self {
        Imputations::default()
    }

    /// Logs `imputation` and appends it.
    pub fn record(&mut self, imputation: Imputation) {
        warn!("{imputation}");
        self.0.push(imputation);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Imputation> {
        self.0.iter()
    }
}
