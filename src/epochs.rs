//! Task epochs of the bimanual learning experiment.

use crate::error::{FigureError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Epoch {
    LeftBaseline,
    RightBaseline,
    RightLearningEarly,
    RightLearningLate,
    LeftTransferEarly,
    LeftTransferLate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Slot in the `hand` palette.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Epoch {
    /// Chronological order.
    pub const ALL: [Epoch; 6] = [
        Epoch::LeftBaseline,
        Epoch::RightBaseline,
        Epoch::RightLearningEarly,
        Epoch::RightLearningLate,
        Epoch::LeftTransferEarly,
        Epoch::LeftTransferLate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Epoch::LeftBaseline => "leftbaseline",
            Epoch::RightBaseline => "rightbaseline",
            Epoch::RightLearningEarly => "rightlearning-early",
            Epoch::RightLearningLate => "rightlearning-late",
            Epoch::LeftTransferEarly => "lefttransfer-early",
            Epoch::LeftTransferLate => "lefttransfer-late",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Epoch::LeftBaseline => "LH Baseline",
            Epoch::RightBaseline => "RH Baseline",
            Epoch::RightLearningEarly => "RH Learning Early",
            Epoch::RightLearningLate => "RH Learning Late",
            Epoch::LeftTransferEarly => "LH Transfer Early",
            Epoch::LeftTransferLate => "LH Transfer Late",
        }
    }

    pub fn hand(&self) -> Hand {
        match self {
            Epoch::LeftBaseline | Epoch::LeftTransferEarly | Epoch::LeftTransferLate => Hand::Left,
            _ => Hand::Right,
        }
    }

    /// Position on a chronological epoch axis.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Epoch {
    type Err = FigureError;

    fn from_str(s: &str) -> Result<Self> {
        Epoch::ALL
            .iter()
            .copied()
            .find(|e| e.key() == s.trim())
            .ok_or_else(|| FigureError::schema("epoch", format!("unknown epoch '{s}'")))
    }
}

/// Rank used to orient pairwise contrasts so the later condition is positive.
///
/// Covers the full epoch keys plus the collapsed factors (`baseline`/`early`/
/// `late`, `left`/`right`) that main-effect tables use.
pub fn contrast_rank(name: &str) -> Result<u32> {
    let rank = match name.trim() {
        "rest" | "baseline" | "left" => 1,
        "leftbaseline" | "early" | "right" => 2,
        "rightbaseline" | "late" => 3,
        "rightlearning-early" => 4,
        "rightlearning-late" => 5,
        "lefttransfer-early" => 6,
        "lefttransfer-late" => 7,
        other => {
            return Err(FigureError::schema(
                "contrast",
                format!("unknown condition '{other}'"),
            ))
        }
    };
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_in_chronological_order() {
        for (i, epoch) in Epoch::ALL.iter().enumerate() {
            assert_eq!(epoch.index(), i);
            assert_eq!(epoch.key().parse::<Epoch>().unwrap(), *epoch);
        }
    }

    #[test]
    fn unknown_epoch_is_schema_error() {
        let err = "midlearning".parse::<Epoch>().unwrap_err();
        assert!(matches!(err, FigureError::Schema { .. }));
    }

    #[test]
    fn contrast_rank_orders_later_conditions_higher() {
        assert!(contrast_rank("right").unwrap() > contrast_rank("left").unwrap());
        assert!(contrast_rank("late").unwrap() > contrast_rank("early").unwrap());
        assert!(
            contrast_rank("lefttransfer-early").unwrap()
                > contrast_rank("rightlearning-late").unwrap()
        );
        assert!(contrast_rank("sideways").is_err());
    }

    #[test]
    fn hands() {
        assert_eq!(Epoch::RightLearningLate.hand(), Hand::Right);
        assert_eq!(Epoch::LeftTransferEarly.hand(), Hand::Left);
        assert_eq!(Hand::Left.index(), 0);
        assert_eq!(Hand::Right.index(), 1);
    }
}
