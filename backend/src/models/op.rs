//! Active operations
//!
//! Player-initiated schemes (pump campaigns, wash trading) that run for a
//! fixed number of ticks. While active they inflate an asset's hype and the
//! player's exposure and scrutiny; the tick loop resolves them when their
//! duration elapses.

use serde::{Deserialize, Serialize};

/// The operation flavors a player can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Coordinated shilling: boosts hype hard, raises exposure
    PumpCampaign,
    /// Fake volume: boosts hype mildly, raises scrutiny faster
    WashTrading,
}

impl OpKind {
    /// Hype added to the target asset per tick while active
    pub fn hype_per_tick(&self) -> f64 {
        match self {
            OpKind::PumpCampaign => 0.0008,
            OpKind::WashTrading => 0.0003,
        }
    }

    /// Exposure added to the player per tick while active
    pub fn exposure_per_tick(&self) -> f64 {
        match self {
            OpKind::PumpCampaign => 0.0004,
            OpKind::WashTrading => 0.0002,
        }
    }

    /// Scrutiny added to the player per tick while active
    pub fn scrutiny_per_tick(&self) -> f64 {
        match self {
            OpKind::PumpCampaign => 0.0001,
            OpKind::WashTrading => 0.0003,
        }
    }

    /// How long the operation runs
    pub fn duration_ticks(&self) -> usize {
        match self {
            OpKind::PumpCampaign => 300,
            OpKind::WashTrading => 600,
        }
    }
}

/// A running operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOp {
    /// Deterministic id (e.g. "op_00000003")
    pub id: String,
    pub kind: OpKind,
    pub asset_id: String,
    pub started_tick: usize,
}

impl ActiveOp {
    /// Whether the op has run its course by `tick`
    pub fn is_finished(&self, tick: usize) -> bool {
        tick >= self.started_tick + self.kind.duration_ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_lifecycle() {
        let op = ActiveOp {
            id: "op_00000001".to_string(),
            kind: OpKind::PumpCampaign,
            asset_id: "a".to_string(),
            started_tick: 100,
        };

        assert!(!op.is_finished(399));
        assert!(op.is_finished(400));
    }
}
