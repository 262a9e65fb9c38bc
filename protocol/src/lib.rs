#![cfg_attr(not(any(test, feature = "std")), no_std)]

use core::fmt;
use serde::{Deserialize, Serialize};

/// Which physical quantity a reading represents.
#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "std"), derive(Debug))]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Soil,
    Light,
}

impl SensorKind {
    pub const ALL: [SensorKind; 2] = [SensorKind::Soil, SensorKind::Light];

    pub fn thresholds(&self) -> &'static Thresholds {
        match self {
            SensorKind::Soil => &SOIL_THRESHOLDS,
            SensorKind::Light => &LIGHT_THRESHOLDS,
        }
    }
}

/// Condition of a raw reading, ordered worst to best.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "std"), derive(Debug))]
pub enum ConditionStatus {
    Bad,
    Okay,
    Good,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::Good => "Good",
            ConditionStatus::Okay => "Okay",
            ConditionStatus::Bad => "Bad",
        }
    }

    /// Marker shown next to the condition on a sensor card.
    pub fn trend(&self) -> char {
        match self {
            ConditionStatus::Good => '↑',
            ConditionStatus::Okay => '–',
            ConditionStatus::Bad => '↓',
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of the ADC range is healthy for a sensor kind.
#[derive(Clone, Copy, Eq, PartialEq)]
#[cfg_attr(any(test, feature = "std"), derive(Debug))]
pub enum Direction {
    /// Soil moisture: a low reading means wet soil.
    LowerIsBetter,
    /// Light: a high reading means bright light.
    HigherIsBetter,
}

/// Boundary pair for one sensor kind.
///
/// With [`Direction::LowerIsBetter`] the bounds are the inclusive maxima of
/// `Good` and `Okay`; with [`Direction::HigherIsBetter`] they are the
/// inclusive minima of `Okay` and `Good`.
#[derive(Clone, Eq, PartialEq)]
#[cfg_attr(any(test, feature = "std"), derive(Debug))]
pub struct Thresholds {
    pub lower: u16,
    pub upper: u16,
    pub direction: Direction,
}

impl Thresholds {
    pub fn classify(&self, value: u16) -> ConditionStatus {
        match self.direction {
            Direction::LowerIsBetter => {
                if value <= self.lower {
                    ConditionStatus::Good
                } else if value <= self.upper {
                    ConditionStatus::Okay
                } else {
                    ConditionStatus::Bad
                }
            }
            Direction::HigherIsBetter => {
                if value >= self.upper {
                    ConditionStatus::Good
                } else if value >= self.lower {
                    ConditionStatus::Okay
                } else {
                    ConditionStatus::Bad
                }
            }
        }
    }
}

/// Legend of the three condition zones, e.g. `≤1500: Good  1501-2500: Okay  >2500: Bad`.
impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::LowerIsBetter => write!(
                f,
                "≤{}: Good  {}-{}: Okay  >{}: Bad",
                self.lower,
                self.lower + 1,
                self.upper,
                self.upper
            ),
            Direction::HigherIsBetter => write!(
                f,
                "<{}: Bad  {}-{}: Okay  ≥{}: Good",
                self.lower,
                self.lower,
                self.upper - 1,
                self.upper
            ),
        }
    }
}

pub const ADC_MAX: u16 = 4095;

pub const SOIL_THRESHOLDS: Thresholds = Thresholds {
    lower: 1500,
    upper: 2500,
    direction: Direction::LowerIsBetter,
};

pub const LIGHT_THRESHOLDS: Thresholds = Thresholds {
    lower: 1500,
    upper: 3000,
    direction: Direction::HigherIsBetter,
};

pub fn classify(kind: SensorKind, value: u16) -> ConditionStatus {
    kind.thresholds().classify(value)
}
