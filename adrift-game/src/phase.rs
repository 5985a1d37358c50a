//! Screen phases and the legal-transition table.
//!
//! Every screen the player can be on is a [`Phase`], and the edges between
//! them live in one exhaustive match. Adding a phase without wiring its
//! targets is a compile error, which is the point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    LoadGame,
    Options,
    Intro,
    InitialDamageRoll,
    StartRound,
    RollForTasks,
    DrawCard,
    FailureCheck,
    Log,
    SuccessCheck,
    FinalDamageRoll,
    GameOver,
    FinalLog,
    ExitGame,
    ErrorScreen,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadGame => "load_game",
            Self::Options => "options",
            Self::Intro => "intro",
            Self::InitialDamageRoll => "initial_damage_roll",
            Self::StartRound => "start_round",
            Self::RollForTasks => "roll_for_tasks",
            Self::DrawCard => "draw_card",
            Self::FailureCheck => "failure_check",
            Self::Log => "log",
            Self::SuccessCheck => "success_check",
            Self::FinalDamageRoll => "final_damage_roll",
            Self::GameOver => "game_over",
            Self::FinalLog => "final_log",
            Self::ExitGame => "exit_game",
            Self::ErrorScreen => "error_screen",
        }
    }

    /// Escape hatches reachable from everywhere.
    #[must_use]
    pub const fn is_emergency(self) -> bool {
        matches!(self, Self::ExitGame | Self::ErrorScreen)
    }

    /// Legal forward edges out of this phase, not counting the implicit
    /// self-loop and the emergency targets.
    #[must_use]
    pub const fn targets(self) -> &'static [Self] {
        match self {
            Self::LoadGame => &[Self::Options, Self::Intro],
            Self::Options => &[Self::LoadGame, Self::Intro],
            Self::Intro => &[Self::InitialDamageRoll],
            Self::InitialDamageRoll => &[Self::StartRound, Self::GameOver],
            Self::StartRound => &[Self::RollForTasks],
            Self::RollForTasks => &[Self::DrawCard],
            Self::DrawCard => &[Self::FailureCheck, Self::Log, Self::GameOver],
            Self::FailureCheck => &[Self::DrawCard, Self::Log, Self::GameOver],
            Self::Log => &[Self::SuccessCheck, Self::StartRound],
            Self::SuccessCheck => &[Self::StartRound, Self::FinalDamageRoll, Self::GameOver],
            Self::FinalDamageRoll => &[Self::GameOver],
            Self::GameOver => &[Self::FinalLog, Self::Intro],
            Self::FinalLog => &[Self::Intro, Self::LoadGame],
            Self::ExitGame => &[Self::LoadGame],
            Self::ErrorScreen => &[Self::LoadGame],
        }
    }

    /// Whether `to` is a legal destination from `from`. Staying put is
    /// always allowed, as are the emergency phases.
    #[must_use]
    pub fn can_transition(from: Self, to: Self) -> bool {
        to == from || to.is_emergency() || from.targets().contains(&to)
    }

    /// Like [`Self::can_transition`] but with the rejection details.
    pub fn validate_transition(from: Self, to: Self) -> Result<(), TransitionError> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(TransitionError::Invalid {
                from,
                to,
                valid: from.targets(),
            })
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load_game" => Ok(Self::LoadGame),
            "options" => Ok(Self::Options),
            "intro" => Ok(Self::Intro),
            "initial_damage_roll" => Ok(Self::InitialDamageRoll),
            "start_round" => Ok(Self::StartRound),
            "roll_for_tasks" => Ok(Self::RollForTasks),
            "draw_card" => Ok(Self::DrawCard),
            "failure_check" => Ok(Self::FailureCheck),
            "log" => Ok(Self::Log),
            "success_check" => Ok(Self::SuccessCheck),
            "final_damage_roll" => Ok(Self::FinalDamageRoll),
            "game_over" => Ok(Self::GameOver),
            "final_log" => Ok(Self::FinalLog),
            "exit_game" => Ok(Self::ExitGame),
            "error_screen" => Ok(Self::ErrorScreen),
            _ => Err(()),
        }
    }
}

impl From<Phase> for String {
    fn from(value: Phase) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move from {from} to {to}; legal targets are {valid:?}")]
    Invalid {
        from: Phase,
        to: Phase,
        valid: &'static [Phase],
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gameplay_loop_edges_are_legal() {
        assert!(Phase::can_transition(Phase::Intro, Phase::InitialDamageRoll));
        assert!(Phase::can_transition(Phase::StartRound, Phase::RollForTasks));
        assert!(Phase::can_transition(Phase::RollForTasks, Phase::DrawCard));
        assert!(Phase::can_transition(Phase::DrawCard, Phase::FailureCheck));
        assert!(Phase::can_transition(Phase::FailureCheck, Phase::DrawCard));
        assert!(Phase::can_transition(Phase::DrawCard, Phase::Log));
        assert!(Phase::can_transition(Phase::Log, Phase::SuccessCheck));
        assert!(Phase::can_transition(Phase::SuccessCheck, Phase::StartRound));
        assert!(Phase::can_transition(Phase::SuccessCheck, Phase::FinalDamageRoll));
        assert!(Phase::can_transition(Phase::FinalDamageRoll, Phase::GameOver));
        assert!(Phase::can_transition(Phase::GameOver, Phase::FinalLog));
    }

    #[test]
    fn log_cannot_jump_back_to_drawing() {
        assert!(!Phase::can_transition(Phase::Log, Phase::DrawCard));
        let err = Phase::validate_transition(Phase::Log, Phase::DrawCard).unwrap_err();
        let TransitionError::Invalid { from, to, valid } = err;
        assert_eq!(from, Phase::Log);
        assert_eq!(to, Phase::DrawCard);
        assert_eq!(valid, &[Phase::SuccessCheck, Phase::StartRound]);
    }

    #[test]
    fn emergency_phases_are_reachable_from_anywhere() {
        for from in [
            Phase::LoadGame,
            Phase::Intro,
            Phase::DrawCard,
            Phase::SuccessCheck,
            Phase::GameOver,
            Phase::ErrorScreen,
        ] {
            assert!(Phase::can_transition(from, Phase::ExitGame));
            assert!(Phase::can_transition(from, Phase::ErrorScreen));
        }
    }

    #[test]
    fn self_transitions_are_always_legal() {
        for phase in [Phase::DrawCard, Phase::Log, Phase::FinalLog] {
            assert!(Phase::can_transition(phase, phase));
        }
    }

    #[test]
    fn skipping_the_task_roll_is_rejected() {
        assert!(!Phase::can_transition(Phase::StartRound, Phase::DrawCard));
        assert!(!Phase::can_transition(Phase::Intro, Phase::StartRound));
    }

    #[test]
    fn phase_names_round_trip() {
        for phase in [
            Phase::LoadGame,
            Phase::Options,
            Phase::Intro,
            Phase::InitialDamageRoll,
            Phase::StartRound,
            Phase::RollForTasks,
            Phase::DrawCard,
            Phase::FailureCheck,
            Phase::Log,
            Phase::SuccessCheck,
            Phase::FinalDamageRoll,
            Phase::GameOver,
            Phase::FinalLog,
            Phase::ExitGame,
            Phase::ErrorScreen,
        ] {
            assert_eq!(phase.as_str().parse::<Phase>(), Ok(phase));
        }
    }
}
