use crate::error::LightCurveError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kepler mission offset: BKJD = BJD - 2454833
pub const BKJD_OFFSET: f64 = 2_454_833.0;

/// TESS mission offset: BTJD = BJD - 2457000
pub const BTJD_OFFSET: f64 = 2_457_000.0;

/// Epoch system of a light curve time axis, all of them are in days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
pub enum TimeFormat {
    /// Barycentric Julian Date
    Bjd,
    /// Barycentric Kepler Julian Date
    Bkjd,
    /// Barycentric TESS Julian Date
    Btjd,
    /// Days from an arbitrary zero point, e.g. simulated or phase-folded data
    #[default]
    Relative,
}

impl TimeFormat {
    /// Value to add to a time in this format to get BJD
    pub fn bjd_offset(self) -> Option<f64> {
        match self {
            Self::Bjd => Some(0.0),
            Self::Bkjd => Some(BKJD_OFFSET),
            Self::Btjd => Some(BTJD_OFFSET),
            Self::Relative => None,
        }
    }

    /// Shift to add to a time in `self` format to express it in `other` format
    pub fn shift_to(self, other: Self) -> Result<f64, LightCurveError> {
        if self == other {
            return Ok(0.0);
        }
        match (self.bjd_offset(), other.bjd_offset()) {
            (Some(from), Some(to)) => Ok(from - to),
            _ => Err(LightCurveError::RelativeTime),
        }
    }
}

pub fn bjd_to_bkjd(bjd: f64) -> f64 {
    bjd - BKJD_OFFSET
}

pub fn bkjd_to_bjd(bkjd: f64) -> f64 {
    bkjd + BKJD_OFFSET
}

pub fn bjd_to_btjd(bjd: f64) -> f64 {
    bjd - BTJD_OFFSET
}

pub fn btjd_to_bjd(btjd: f64) -> f64 {
    btjd + BTJD_OFFSET
}
