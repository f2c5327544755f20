use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two assets tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Btc,
    Eth,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Btc, Asset::Eth];

    /// Returns the other asset of the pair.
    pub fn other(&self) -> Self {
        match self {
            Asset::Btc => Asset::Eth,
            Asset::Eth => Asset::Btc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Btc => "btc",
            Asset::Eth => "eth",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "btc" | "bitcoin" | "btcusdt" => Ok(Asset::Btc),
            "eth" | "ethereum" | "ethusdt" => Ok(Asset::Eth),
            other => Err(CoreError::UnknownAsset(other.to_string())),
        }
    }
}
