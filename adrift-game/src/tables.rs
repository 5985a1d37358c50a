//! The d20 resolution tables.
//!
//! Pure functions, total over every input. Out-of-range rolls are logged
//! and clamped so a buggy caller degrades to a slightly wrong result
//! instead of a panic mid-session.

use crate::rng::ModifierGrants;

fn clamped_d20(roll: u32, table: &str) -> u32 {
    if (1..=20).contains(&roll) {
        roll
    } else {
        log::error!("{table} received d20 roll {roll}; clamping into range");
        roll.clamp(1, 20)
    }
}

/// How many cards this round's task roll demands. Averages exactly 3.5
/// cards over a fair d20.
#[must_use]
pub fn cards_to_draw(roll: u32) -> u32 {
    match clamped_d20(roll, "cards_to_draw") {
        1 => 1,
        2..=5 => 2,
        6..=10 => 3,
        11..=15 => 4,
        16..=19 => 5,
        _ => 6,
    }
}

/// Result of a hull damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityOutcome {
    pub loss: u32,
    pub gain: u32,
    pub grants: ModifierGrants,
}

/// Hull damage table. A natural 20 patches a point of hull and leaves the
/// keeper lucid; a natural 1 bites for three and leaves them surreal.
#[must_use]
pub fn stability_loss(roll: u32) -> StabilityOutcome {
    match clamped_d20(roll, "stability_loss") {
        20 => StabilityOutcome {
            loss: 0,
            gain: 1,
            grants: ModifierGrants::LUCID,
        },
        11..=19 => StabilityOutcome {
            loss: 0,
            gain: 0,
            grants: ModifierGrants::NONE,
        },
        6..=10 => StabilityOutcome {
            loss: 1,
            gain: 0,
            grants: ModifierGrants::NONE,
        },
        2..=5 => StabilityOutcome {
            loss: 2,
            gain: 0,
            grants: ModifierGrants::NONE,
        },
        _ => StabilityOutcome {
            loss: 3,
            gain: 0,
            grants: ModifierGrants::SURREAL,
        },
    }
}

/// Hull damage for a failure check, capped by the provoking card's rank
/// value so the low cards stay survivable.
#[must_use]
pub fn rank_scaled_loss(roll: u32, rank_value: u32) -> StabilityOutcome {
    let mut outcome = stability_loss(roll);
    outcome.loss = outcome.loss.min(rank_value);
    outcome
}

/// Salvation difficulty for the number of aces revealed so far. Threshold 0
/// means every roll rescues.
#[must_use]
pub fn salvation_threshold(aces_revealed: u32) -> u32 {
    match aces_revealed {
        0 => 20,
        1 => 17,
        2 => 14,
        3 => 11,
        4 => 0,
        other => {
            log::error!("salvation_threshold saw {other} aces; treating as 4");
            0
        }
    }
}

/// Result of a salvation roll, as a signed change to the token pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalvationOutcome {
    pub token_change: i32,
    pub grants: ModifierGrants,
}

/// Salvation table. Rolling at or above the threshold removes a token; the
/// natural extremes swing two and leave a modifier behind.
#[must_use]
pub fn salvation_result(roll: u32, threshold: u32) -> SalvationOutcome {
    if threshold == 0 {
        return SalvationOutcome {
            token_change: -1,
            grants: ModifierGrants::NONE,
        };
    }
    let roll = clamped_d20(roll, "salvation_result");
    if roll == 20 {
        SalvationOutcome {
            token_change: -2,
            grants: ModifierGrants::LUCID,
        }
    } else if roll >= threshold {
        SalvationOutcome {
            token_change: -1,
            grants: ModifierGrants::NONE,
        }
    } else if roll >= 6 {
        SalvationOutcome {
            token_change: 0,
            grants: ModifierGrants::NONE,
        }
    } else if roll >= 2 {
        SalvationOutcome {
            token_change: 1,
            grants: ModifierGrants::NONE,
        }
    } else {
        SalvationOutcome {
            token_change: 2,
            grants: ModifierGrants::SURREAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_to_draw_matches_the_curve() {
        assert_eq!(cards_to_draw(1), 1);
        assert_eq!(cards_to_draw(2), 2);
        assert_eq!(cards_to_draw(5), 2);
        assert_eq!(cards_to_draw(6), 3);
        assert_eq!(cards_to_draw(10), 3);
        assert_eq!(cards_to_draw(11), 4);
        assert_eq!(cards_to_draw(15), 4);
        assert_eq!(cards_to_draw(16), 5);
        assert_eq!(cards_to_draw(19), 5);
        assert_eq!(cards_to_draw(20), 6);
    }

    #[test]
    fn cards_to_draw_averages_three_and_a_half() {
        let total: u32 = (1..=20).map(cards_to_draw).sum();
        assert_eq!(total, 70);
    }

    #[test]
    fn cards_to_draw_clamps_out_of_range_rolls() {
        assert_eq!(cards_to_draw(0), 1);
        assert_eq!(cards_to_draw(99), 6);
    }

    #[test]
    fn stability_loss_bands() {
        let crit = stability_loss(20);
        assert_eq!((crit.loss, crit.gain), (0, 1));
        assert_eq!(crit.grants, ModifierGrants::LUCID);

        for roll in 11..=19 {
            assert_eq!(stability_loss(roll).loss, 0);
            assert_eq!(stability_loss(roll).gain, 0);
        }
        for roll in 6..=10 {
            assert_eq!(stability_loss(roll).loss, 1);
        }
        for roll in 2..=5 {
            assert_eq!(stability_loss(roll).loss, 2);
        }

        let fumble = stability_loss(1);
        assert_eq!((fumble.loss, fumble.gain), (3, 0));
        assert_eq!(fumble.grants, ModifierGrants::SURREAL);
    }

    #[test]
    fn rank_scaled_loss_caps_at_the_rank_value() {
        assert_eq!(rank_scaled_loss(1, 2).loss, 2);
        assert_eq!(rank_scaled_loss(1, 13).loss, 3);
        assert_eq!(rank_scaled_loss(4, 3).loss, 2);
        let crit = rank_scaled_loss(20, 3);
        assert_eq!((crit.loss, crit.gain), (0, 1));
    }

    #[test]
    fn thresholds_ease_as_aces_surface() {
        assert_eq!(salvation_threshold(0), 20);
        assert_eq!(salvation_threshold(1), 17);
        assert_eq!(salvation_threshold(2), 14);
        assert_eq!(salvation_threshold(3), 11);
        assert_eq!(salvation_threshold(4), 0);
        assert_eq!(salvation_threshold(9), 0);
    }

    #[test]
    fn salvation_bands() {
        let crit = salvation_result(20, 17);
        assert_eq!(crit.token_change, -2);
        assert_eq!(crit.grants, ModifierGrants::LUCID);

        assert_eq!(salvation_result(17, 17).token_change, -1);
        assert_eq!(salvation_result(19, 17).token_change, -1);
        assert_eq!(salvation_result(16, 17).token_change, 0);
        assert_eq!(salvation_result(6, 17).token_change, 0);
        assert_eq!(salvation_result(5, 17).token_change, 1);
        assert_eq!(salvation_result(2, 17).token_change, 1);

        let fumble = salvation_result(1, 17);
        assert_eq!(fumble.token_change, 2);
        assert_eq!(fumble.grants, ModifierGrants::SURREAL);
    }

    #[test]
    fn zero_threshold_always_rescues() {
        for roll in 1..=20 {
            assert_eq!(salvation_result(roll, 0).token_change, -1);
        }
    }

    #[test]
    fn salvation_is_total_over_the_roll_space() {
        for threshold in [20, 17, 14, 11, 0] {
            for roll in 0..=25 {
                let outcome = salvation_result(roll, threshold);
                assert!((-2..=2).contains(&outcome.token_change));
            }
        }
    }
}
