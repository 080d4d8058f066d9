//! Room geometry: the registry rows, the lookup seam over them, and the
//! resolved [`RoomProfile`] the models consume.
//!
//! The registry is reference data with the columns `Room`, `Area` (ft²),
//! `Height` (ft), `VAV` (ventilation range in CFM as `"min,max"`) and `Windows`.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, RiskError};
use crate::imputation::{Imputation, Imputations, IMPUTED_ROOM_HEIGHT_FT};
use crate::units::{cubic_feet_to_cubic_metres, feet_to_metres};

/// Minimum and maximum ventilation airflow for a room, in CFM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VentilationRange {
    min: f64,
    max: f64,
}

impl VentilationRange {
    /// Builds a range from two bounds given in either order.
    ///
    /// # Errors
    /// `DataFormat` if a bound is negative or not finite.
    pub fn new(a: f64, b: f64) -> Result<Self, RiskError> {
        for bound in [a, b] {
            if !bound.is_finite() || bound < 0.0 {
                return Err(RiskError::DataFormat(format!(
                    "ventilation bound {bound} is not a non-negative CFM"
                )));
            }
        }
        Ok(VentilationRange {
            min: a.min(b),
            max: a.max(b),
        })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn contains(&self, cfm: f64) -> bool {
        cfm >= self.min && cfm <= self.max
    }
}

impl FromStr for VentilationRange {
    type Err = RiskError;

    /// Parses `"600,1200"`. Surrounding brackets or parentheses are tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RiskError::DataFormat(format!("malformed ventilation range '{s}'"));
        let inner = s
            .trim()
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']);
        let mut parts = inner.split(',');
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let a: f64 = a.trim().parse().map_err(|_| malformed())?;
        let b: f64 = b.trim().parse().map_err(|_| malformed())?;
        VentilationRange::new(a, b)
    }
}

impl fmt::Display for VentilationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

/// Resolved geometry for one room. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomProfile {
    room_id: String,
    area_ft2: f64,
    height_ft: f64,
    volume_ft3: f64,
    volume_m3: f64,
    ventilation: VentilationRange,
    has_windows: bool,
}

impl RoomProfile {
    /// # Errors
    /// `InvalidParameter` if `area_ft2` or `height_ft` is not positive.
    pub fn new(
        room_id: impl Into<String>,
        area_ft2: f64,
        height_ft: f64,
        ventilation: VentilationRange,
        has_windows: bool,
    ) -> Result<Self, RiskError> {
        require_positive("room area", area_ft2)?;
        require_positive("room height", height_ft)?;
        let volume_ft3 = area_ft2 * height_ft;
        Ok(RoomProfile {
            room_id: room_id.into(),
            area_ft2,
            height_ft,
            volume_ft3,
            volume_m3: cubic_feet_to_cubic_metres(volume_ft3),
            ventilation,
            has_windows,
        })
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn area_ft2(&self) -> f64 {
        self.area_ft2
    }

    #[must_use]
    pub fn height_ft(&self) -> f64 {
        self.height_ft
    }

    #[must_use]
    pub fn height_m(&self) -> f64 {
        feet_to_metres(self.height_ft)
    }

    #[must_use]
    pub fn volume_ft3(&self) -> f64 {
        self.volume_ft3
    }

    #[must_use]
    pub fn volume_m3(&self) -> f64 {
        self.volume_m3
    }

    #[must_use]
    pub fn ventilation(&self) -> VentilationRange {
        self.ventilation
    }

    #[must_use]
    pub fn has_windows(&self) -> bool {
        self.has_windows
    }
}

/// One row of the room registry, as stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomRecord {
    #[serde(rename = "Room")]
    pub room: String,
    #[serde(rename = "Area")]
    pub area: String,
    #[serde(rename = "Height", default)]
    pub height: Option<String>,
    #[serde(rename = "VAV")]
    pub vav: String,
    #[serde(rename = "Windows", default)]
    pub windows: Option<String>,
}

/// Read-only lookup over room registry rows.
pub trait RoomTable {
    /// Returns the first row whose identifier equals `room_id`.
    fn find(&self, room_id: &str) -> Option<&RoomRecord>;
}

impl RoomTable for [RoomRecord] {
    fn find(&self, room_id: &str) -> Option<&RoomRecord> {
        self.iter().find(|record| record.room.trim() == room_id.trim())
    }
}

/// The room registry loaded from CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvRoomRegistry {
    records: Vec<RoomRecord>,
}

impl CsvRoomRegistry {
    /// # Errors
    /// I/O or CSV errors from reading the file.
    pub fn from_path(path: &Path) -> Result<Self, RiskError> {
        info!("Loading room registry from: {}", path.display());
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    /// # Errors
    /// CSV errors from reading `reader`.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, RiskError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, RiskError> {
        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: RoomRecord = result?;
            records.push(record);
        }
        debug!("loaded {} rooms", records.len());
        Ok(CsvRoomRegistry { records })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RoomTable for CsvRoomRegistry {
    fn find(&self, room_id: &str) -> Option<&RoomRecord> {
        self.records.as_slice().find(room_id)
    }
}

fn parse_height(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_windows(room: &str, raw: Option<&str>) -> Result<bool, RiskError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    match raw.to_ascii_lowercase().as_str() {
        "" | "n" | "no" | "false" | "0" => Ok(false),
        "y" | "yes" | "true" | "1" => Ok(true),
        _ => Err(RiskError::DataFormat(format!(
            "room {room}: unrecognised Windows value '{raw}'"
        ))),
    }
}

/// Looks up `room_id` in `table` and resolves its geometry.
///
/// A missing or unparseable height is replaced by [`IMPUTED_ROOM_HEIGHT_FT`] and
/// recorded in `imputations`.
///
/// # Errors
/// - `RoomNotFound` if no row matches.
/// - `DataFormat` if the area, ventilation range or window flag is malformed.
pub fn resolve_room<T: RoomTable + ?Sized>(
    table: &T,
    room_id: &str,
    imputations: &mut Imputations,
) -> Result<RoomProfile, RiskError> {
    let record = table
        .find(room_id)
        .ok_or_else(|| RiskError::RoomNotFound(room_id.to_string()))?;
    trace!("resolving room {room_id} from {record:?}");

    let area: f64 = record
        .area
        .trim()
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite() && *a > 0.0)
        .ok_or_else(|| {
            RiskError::DataFormat(format!("room {room_id}: invalid Area '{}'", record.area))
        })?;

    let height = match parse_height(record.height.as_deref()) {
        Some(height) => height,
        None => {
            imputations.record(Imputation::RoomHeight {
                room: room_id.to_string(),
                substitute_ft: IMPUTED_ROOM_HEIGHT_FT,
            });
            IMPUTED_ROOM_HEIGHT_FT
        }
    };

    let ventilation: VentilationRange = record.vav.parse()?;
    let has_windows = parse_windows(room_id, record.windows.as_deref())?;

    let profile = RoomProfile::new(room_id, area, height, ventilation, has_windows)?;
    debug!(
        "room {room_id}: volume {:.1} ft³ ({:.2} m³), VAV {}",
        profile.volume_ft3(),
        profile.volume_m3(),
        profile.ventilation()
    );
    Ok(profile)
}
