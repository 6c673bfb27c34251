use std::ops::Not;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::transmute_enum_masked;

#[repr(u8)]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Gold,
    Silver,
}

impl Default for Side {
    fn default() -> Self {
        Side::Gold
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self {
        transmute_enum_masked!(self as u8 ^ 1, 1)
    }
}

impl Side {
    /// Rank index (0-based) a rabbit of this side must reach.
    pub const fn goal_rank(self) -> usize {
        match self {
            Side::Gold => 7,
            Side::Silver => 0,
        }
    }

    /// Ranks still to travel from `rank` to this side's goal.
    pub const fn rank_distance(self, rank: usize) -> usize {
        match self {
            Side::Gold => 7 - rank,
            Side::Silver => rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_negation() {
        let side = Side::Gold;
        assert_eq!(!side, Side::Silver);
        assert_eq!(!!side, Side::Gold);
    }

    #[test]
    fn test_rank_distance() {
        assert_eq!(Side::Gold.rank_distance(6), 1);
        assert_eq!(Side::Silver.rank_distance(6), 6);
        assert_eq!(Side::Silver.rank_distance(Side::Silver.goal_rank()), 0);
    }
}
