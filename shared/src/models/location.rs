//! Physical stock locations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A site that owns one finished-goods ledger and one active Poka set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Production site
    Biratnagar,
    /// Godown receiving transfers from Biratnagar
    Birgunj,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Biratnagar, Location::Birgunj];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Biratnagar => "biratnagar",
            Location::Birgunj => "birgunj",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Biratnagar => write!(f, "Biratnagar"),
            Location::Birgunj => write!(f, "Birgunj"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown location: {0}. Use biratnagar or birgunj")]
pub struct ParseLocationError(pub String);

impl std::str::FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "biratnagar" => Ok(Location::Biratnagar),
            // The godown is also spelled "Birgun" on older stock sheets
            "birgunj" | "birgun" => Ok(Location::Birgunj),
            _ => Err(ParseLocationError(s.to_string())),
        }
    }
}
