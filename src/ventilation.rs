//! Ventilation rate resolution and air-change conversion.
//!
//! Two separate entry points impute a missing rate, each with its own fixed
//! substitute: [`resolve_ventilation_rate`] works against a room's ventilation
//! range, and [`air_changes_per_hour`] is the standalone conversion helper.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, RiskError};
use crate::imputation::{Imputation, Imputations, IMPUTED_AIR_CHANGE_CFM, IMPUTED_AVERAGE_CFM};
use crate::room::VentilationRange;
use crate::units::MINUTES_PER_HOUR;

/// The ventilation rate a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedVentilation {
    /// No rate given: the room's minimum is used.
    #[default]
    Unspecified,
    /// A rate was given but is not available (e.g. `"nan"` or unparseable).
    Unavailable,
    Cfm(f64),
}

impl RequestedVentilation {
    /// Interprets an optional raw boundary value.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => RequestedVentilation::Unspecified,
            Some(raw) => raw.parse().unwrap_or(RequestedVentilation::Unavailable),
        }
    }
}

impl FromStr for RequestedVentilation {
    type Err = RiskError;

    /// Parses any numeric CFM value, in range or not. `"nan"` parses to `Unavailable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(cfm) if cfm.is_nan() => Ok(RequestedVentilation::Unavailable),
            Ok(cfm) => Ok(RequestedVentilation::Cfm(cfm)),
            Err(_) => Err(RiskError::InvalidParameter(format!(
                "ventilation rate '{s}' is not a CFM value"
            ))),
        }
    }
}

impl fmt::Display for RequestedVentilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedVentilation::Unspecified => write!(f, "unspecified"),
            RequestedVentilation::Unavailable => write!(f, "nan"),
            RequestedVentilation::Cfm(cfm) => write!(f, "{cfm}"),
        }
    }
}

/// Picks the effective ventilation rate (CFM) for a room.
///
/// - `Unspecified` uses `range.min()`.
/// - `Unavailable` uses [`IMPUTED_AVERAGE_CFM`].
/// - A rate outside the range is clamped to `range.min()`, on either side.
pub fn resolve_ventilation_rate(
    requested: RequestedVentilation,
    range: VentilationRange,
    imputations: &mut Imputations,
) -> f64 {
    let cfm = match requested {
        RequestedVentilation::Unspecified => range.min(),
        RequestedVentilation::Unavailable => {
            imputations.record(Imputation::VentilationUnavailable {
                substitute_cfm: IMPUTED_AVERAGE_CFM,
            });
            IMPUTED_AVERAGE_CFM
        }
        RequestedVentilation::Cfm(cfm) if range.contains(cfm) => cfm,
        RequestedVentilation::Cfm(cfm) => {
            imputations.record(Imputation::VentilationOutOfRange {
                requested_cfm: cfm,
                min_cfm: range.min(),
                max_cfm: range.max(),
            });
            range.min()
        }
    };
    debug!("requested ventilation {requested}, effective {cfm} CFM");
    cfm
}

/// Air changes per hour for `cfm` in a room of `room_volume_ft3`.
///
/// An unknown `cfm` is replaced by [`IMPUTED_AIR_CHANGE_CFM`].
///
/// # Errors
/// `InvalidParameter` if the volume is not positive or `cfm` is negative.
pub fn air_changes_per_hour(
    cfm: Option<f64>,
    room_volume_ft3: f64,
    imputations: &mut Imputations,
) -> Result<f64, RiskError> {
    require_positive("room volume", room_volume_ft3)?;
    let cfm = match cfm {
        Some(cfm) if cfm.is_nan() => None,
        other => other,
    };
    let cfm = match cfm {
        Some(cfm) if cfm.is_finite() && cfm >= 0.0 => cfm,
        Some(cfm) => {
            return Err(RiskError::InvalidParameter(format!(
                "ventilation rate must be a finite CFM >= 0, got {cfm}"
            )))
        }
        None => {
            imputations.record(Imputation::AirChangeCfm {
                substitute_cfm: IMPUTED_AIR_CHANGE_CFM,
            });
            IMPUTED_AIR_CHANGE_CFM
        }
    };
    Ok(cfm * MINUTES_PER_HOUR / room_volume_ft3)
}
