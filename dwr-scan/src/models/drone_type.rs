//! Canonical drone labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of canonical drone labels
///
/// Only these values are ever persisted. Raw labels from the dataset go
/// through [`crate::services::type_normalizer`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneType {
    /// Parrot Bebop
    Bebop,
    /// Parrot Mambo (spelled "membo" in older dataset folders)
    Mambo,
    /// Ambient/background recording without a drone
    #[serde(rename = "none")]
    Unlabeled,
    /// Label not recognized; kept for manual follow-up
    Unknown,
}

impl DroneType {
    /// All variants in canonical order
    pub const ALL: [DroneType; 4] = [
        DroneType::Bebop,
        DroneType::Mambo,
        DroneType::Unlabeled,
        DroneType::Unknown,
    ];

    /// Serialized label
    pub fn as_str(&self) -> &'static str {
        match self {
            DroneType::Bebop => "bebop",
            DroneType::Mambo => "mambo",
            DroneType::Unlabeled => "none",
            DroneType::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DroneType::Unknown)
    }
}

impl fmt::Display for DroneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of a canonical label
///
/// Used for configuration values, where a typo must be reported rather than
/// normalized away.
impl FromStr for DroneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DroneType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "'{}' is not a canonical drone type (expected one of: {})",
                    s,
                    DroneType::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&DroneType::Mambo).unwrap(), "\"mambo\"");
        assert_eq!(serde_json::to_string(&DroneType::Unlabeled).unwrap(), "\"none\"");
        let parsed: DroneType = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, DroneType::Unknown);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("Bebop".parse::<DroneType>().unwrap(), DroneType::Bebop);
        assert_eq!(" none ".parse::<DroneType>().unwrap(), DroneType::Unlabeled);
        assert!("membo".parse::<DroneType>().is_err());
    }

    #[test]
    fn test_as_str_matches_display() {
        for t in DroneType::ALL {
            assert_eq!(t.to_string(), t.as_str());
        }
    }
}
