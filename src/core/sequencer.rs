//! Turn sequencing - Derives which team is on the clock.
//!
//! Everything here is pure: the acting team is a function of the first-round
//! turn order, the draft style and the overall pick number. In a snake draft
//! even rounds run in reverse, so the team picking last in round one picks
//! first in round two.

use crate::{
    core::TeamId,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ordering rule applied between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStyle {
    /// Order reverses on every even round
    #[default]
    Snake,
    /// Every round uses the first-round order
    Linear,
    /// Nomination/bidding draft; stored but not sequenced by this engine
    Auction,
}

impl DraftStyle {
    /// Database representation of the style.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Linear => "linear",
            Self::Auction => "auction",
        }
    }
}

impl fmt::Display for DraftStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snake" => Ok(Self::Snake),
            "linear" => Ok(Self::Linear),
            "auction" => Ok(Self::Auction),
            other => Err(Error::invariant(format!("unknown draft style \"{other}\""))),
        }
    }
}

/// Round containing `pick_number`: `floor((pick - 1) / team_count) + 1`.
pub fn round_for_pick(pick_number: i32, team_count: i32) -> Result<i32> {
    if team_count < 1 {
        return Err(Error::invariant("turn order has no teams"));
    }
    if pick_number < 1 {
        return Err(Error::invariant(format!(
            "pick number {pick_number} is not 1-based"
        )));
    }
    Ok((pick_number - 1) / team_count + 1)
}

/// Whether `round` runs in reverse order under `style`.
#[must_use]
pub const fn is_reversed_round(style: DraftStyle, round: i32) -> bool {
    matches!(style, DraftStyle::Snake) && round % 2 == 0
}

/// Returns the team on the clock for `pick_number`.
///
/// Fails with `InvariantViolation` for an empty turn order, a pick number below
/// one, or an auction-style session.
pub fn acting_team(turn_order: &[TeamId], style: DraftStyle, pick_number: i32) -> Result<TeamId> {
    if style == DraftStyle::Auction {
        return Err(Error::invariant("auction drafts have no fixed turn order"));
    }
    let team_count = i32::try_from(turn_order.len())
        .map_err(|_| Error::invariant("turn order is too long"))?;
    let round = round_for_pick(pick_number, team_count)?;

    // Both values are non-negative after round_for_pick validated the inputs.
    let index = usize::try_from((pick_number - 1) % team_count)
        .map_err(|_| Error::invariant("negative index in turn order"))?;
    let team = if is_reversed_round(style, round) {
        turn_order.iter().rev().nth(index)
    } else {
        turn_order.get(index)
    };

    team.copied()
        .ok_or_else(|| Error::invariant("turn order index out of range"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const A: TeamId = 10;
    const B: TeamId = 20;
    const C: TeamId = 30;
    const D: TeamId = 40;

    fn picks_for_round(order: &[TeamId], style: DraftStyle, round: i32) -> Vec<TeamId> {
        let team_count = i32::try_from(order.len()).unwrap();
        let first = (round - 1) * team_count + 1;
        (first..first + team_count)
            .map(|pick| acting_team(order, style, pick).unwrap())
            .collect()
    }

    #[test]
    fn test_snake_order_reverses_on_even_rounds() {
        let order = [A, B, C, D];
        assert_eq!(picks_for_round(&order, DraftStyle::Snake, 1), vec![A, B, C, D]);
        assert_eq!(picks_for_round(&order, DraftStyle::Snake, 2), vec![D, C, B, A]);
        assert_eq!(picks_for_round(&order, DraftStyle::Snake, 3), vec![A, B, C, D]);
        assert_eq!(picks_for_round(&order, DraftStyle::Snake, 4), vec![D, C, B, A]);
    }

    #[test]
    fn test_linear_order_never_reverses() {
        let order = [A, B, C, D];
        for round in 1..=4 {
            assert_eq!(
                picks_for_round(&order, DraftStyle::Linear, round),
                vec![A, B, C, D]
            );
        }
    }

    #[test]
    fn test_acting_team_is_deterministic() {
        let order = [C, A, D, B];
        for pick in 1..=44 {
            let first = acting_team(&order, DraftStyle::Snake, pick).unwrap();
            let second = acting_team(&order, DraftStyle::Snake, pick).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_round_boundaries() -> Result<()> {
        assert_eq!(round_for_pick(1, 4)?, 1);
        assert_eq!(round_for_pick(4, 4)?, 1);
        assert_eq!(round_for_pick(5, 4)?, 2);
        assert_eq!(round_for_pick(8, 4)?, 2);
        assert_eq!(round_for_pick(9, 4)?, 3);
        assert_eq!(round_for_pick(7, 1)?, 7);
        Ok(())
    }

    #[test]
    fn test_snake_turn_wraps_to_same_team() {
        // The last team of an odd round also opens the following even round.
        let order = [A, B, C];
        assert_eq!(acting_team(&order, DraftStyle::Snake, 3).unwrap(), C);
        assert_eq!(acting_team(&order, DraftStyle::Snake, 4).unwrap(), C);
        assert_eq!(acting_team(&order, DraftStyle::Snake, 6).unwrap(), A);
        assert_eq!(acting_team(&order, DraftStyle::Snake, 7).unwrap(), A);
    }

    #[test]
    fn test_single_team_always_acts() {
        for pick in 1..=5 {
            assert_eq!(acting_team(&[A], DraftStyle::Snake, pick).unwrap(), A);
        }
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(matches!(
            acting_team(&[], DraftStyle::Snake, 1),
            Err(Error::InvariantViolation { .. })
        ));
        assert!(matches!(
            acting_team(&[A, B], DraftStyle::Linear, 0),
            Err(Error::InvariantViolation { .. })
        ));
        assert!(matches!(
            acting_team(&[A, B], DraftStyle::Auction, 1),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_style_round_trips_through_strings() {
        for style in [DraftStyle::Snake, DraftStyle::Linear, DraftStyle::Auction] {
            assert_eq!(style.as_str().parse::<DraftStyle>().unwrap(), style);
        }
        assert!("serpentine".parse::<DraftStyle>().is_err());
    }
}
