use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of a trade against the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// Quote in, coin out.
    Buy,
    /// Coin in, quote out.
    Sell,
}

impl TradeDirection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown trade direction: {other}")),
        }
    }
}

/// Migration lifecycle of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    /// Real quote reserve is below the target.
    Bonding,
    /// Target reached; waiting for `migrate()`.
    Migratable,
    /// Handed off to external liquidity. Terminal.
    Migrated,
}

impl MigrationState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bonding => "bonding",
            Self::Migratable => "migratable",
            Self::Migrated => "migrated",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bonding" => Ok(Self::Bonding),
            "migratable" => Ok(Self::Migratable),
            "migrated" => Ok(Self::Migrated),
            other => Err(format!("unknown migration state: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("BUY".parse::<TradeDirection>().unwrap(), TradeDirection::Buy);
        assert_eq!("sell".parse::<TradeDirection>().unwrap(), TradeDirection::Sell);
        assert!("hold".parse::<TradeDirection>().is_err());
    }

    #[test]
    fn test_state_roundtrip_str() {
        for state in [
            MigrationState::Bonding,
            MigrationState::Migratable,
            MigrationState::Migrated,
        ] {
            assert_eq!(state.as_str().parse::<MigrationState>().unwrap(), state);
        }
    }
}
