//! Vehicle and ECU variant identifiers
//!
//! Resolved once from the settings file; every layout or formula difference
//! downstream dispatches on these enums, never on per-frame string matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported vehicle platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vehicle {
    Honda,
    Mazda,
}

impl Vehicle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vehicle::Honda => "honda",
            Vehicle::Mazda => "mazda",
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vehicle {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "honda" => Ok(Vehicle::Honda),
            "mazda" => Ok(Vehicle::Mazda),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Engine-control-unit family, which determines frame layout and id
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcuVariant {
    S300,
    KPro,
}

impl EcuVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcuVariant::S300 => "s300",
            EcuVariant::KPro => "kpro",
        }
    }
}

impl fmt::Display for EcuVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EcuVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s300" => Ok(EcuVariant::S300),
            "kpro" => Ok(EcuVariant::KPro),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Error for an unrecognized vehicle or ECU spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle/ECU variant: {0:?}")]
pub struct UnknownVariant(pub String);
