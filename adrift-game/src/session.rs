//! Player-facing actions: rolls, staged updates, and phase commits.
//!
//! A [`Session`] binds a roller to a mutable [`SessionState`] and exposes
//! every move the interface layer can make. Rolls stage their consequences
//! in `state.pending`; nothing lands until the matching apply runs, which
//! is what lets an animation play out over a result that is already known.

use thiserror::Error;

use crate::cards::{Card, Deck, Rank, Suit};
use crate::constants::TASK_DIE_SIDES;
use crate::phase::{Phase, TransitionError};
use crate::rng::{RollOutcome, Roller, RollerBundle, roll_with_modifiers};
use crate::state::{Difficulty, Options, OptionsError, PendingRoll, SessionState};
use crate::tables;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("a named player is required")]
    MissingPlayer,
    #[error("journal entries cannot be empty")]
    EmptyJournalEntry,
    #[error("{action} is not available during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: Phase,
    },
    #[error("the voyage is already decided")]
    GameOver,
    #[error("expected a staged {expected} update, found {found}")]
    WrongPending {
        expected: &'static str,
        found: &'static str,
    },
    #[error("no drawn card is awaiting confirmation")]
    NoCurrentCard,
    #[error("the drawn card must be confirmed before drawing again")]
    UnconfirmedCard,
    #[error("no card rank is recorded for the stability check")]
    MissingCheckRank,
    #[error("salvation rolls are locked until the beacon card surfaces")]
    SalvationLocked,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Snapshot returned by the apply family so callers can branch on the
/// outcome without re-borrowing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub phase: Phase,
    pub game_over: bool,
    pub win: bool,
}

/// What came off the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Display copy of the drawn card; `None` when the deck was empty.
    pub card: Option<Card>,
    pub deck_exhausted: bool,
    /// True when this draw revealed the fourth king.
    pub kings_complete: bool,
}

/// High-level session wrapper binding a roller to a mutable session state.
#[derive(Debug, Clone)]
pub struct Session<R: Roller = RollerBundle> {
    state: SessionState,
    roller: R,
}

impl<R: Roller> Session<R> {
    /// A session parked at the load screen, ready for [`Self::start_game`].
    #[must_use]
    pub fn new(roller: R, seed: u64) -> Self {
        let state = SessionState {
            seed,
            ..SessionState::default()
        };
        Self { state, roller }
    }

    /// Build a session from an existing state, e.g. a restored save.
    #[must_use]
    pub fn from_state(state: SessionState, roller: R) -> Self {
        Self { state, roller }
    }

    /// Borrow the underlying immutable session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Borrow the underlying mutable session state.
    pub const fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Apply a closure to the mutable session state.
    pub fn with_state_mut<T>(&mut self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        f(&mut self.state)
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn roller(&self) -> &R {
        &self.roller
    }

    /// Navigate between screens. Game actions commit their own phases;
    /// this is for pure navigation like intro, menus, and the error screen.
    pub fn transition_to(&mut self, to: Phase) -> Result<(), TransitionError> {
        self.state.transition_to(to)
    }

    /// Begin a fresh voyage. Validates everything before touching state, so
    /// a rejected start leaves the current session exactly as it was.
    pub fn start_game(
        &mut self,
        player: &str,
        options: Options,
        deck: Deck,
    ) -> Result<(), ActionError> {
        let name = player.trim();
        if name.is_empty() {
            return Err(ActionError::MissingPlayer);
        }
        options.validate()?;
        Phase::validate_transition(self.state.phase, Phase::Intro)?;

        let mut state = SessionState::fresh(name, options, self.state.seed);
        state.source_deck = deck.clone();
        let mut live = deck;
        if options.difficulty == Difficulty::Respite {
            live.remove(Rank::Ace, Suit::Hearts);
        }
        live.shuffle(&mut self.roller);
        state.deck = live;
        self.state = state;
        log::debug!("voyage started for {name} on {}", options.difficulty);
        Ok(())
    }

    /// Start over with the previous player, options, and content deck.
    /// Only legal from the phases that can reach the intro screen.
    pub fn restart_game(&mut self) -> Result<(), ActionError> {
        if self.state.player.trim().is_empty() {
            return Err(ActionError::MissingPlayer);
        }
        let player = self.state.player.clone();
        let options = self.state.options;
        let deck = self.state.source_deck.clone();
        self.start_game(&player, options, deck)
    }

    /// Abandon the voyage. Only the player's name survives.
    pub fn exit_game(&mut self) {
        log::debug!("voyage abandoned during {}", self.state.phase);
        let player = std::mem::take(&mut self.state.player);
        self.state = SessionState {
            player,
            phase: Phase::ExitGame,
            ..SessionState::default()
        };
    }

    /// Roll the arrival damage that batters the station before round one.
    pub fn initial_damage_roll(&mut self) -> Result<RollOutcome, ActionError> {
        self.ensure_active("initial_damage_roll")?;
        self.ensure_phase("initial_damage_roll", Phase::InitialDamageRoll)?;
        let roll = self.roll_d20();
        let outcome = tables::stability_loss(roll.value);
        self.stage(PendingRoll::InitialDamage {
            roll,
            loss: outcome.loss,
            gain: outcome.gain,
            grants: outcome.grants,
        });
        Ok(roll)
    }

    /// Commit the staged arrival damage and move into the first round, or
    /// straight to game over if the station never stood a chance.
    pub fn apply_initial_damage(&mut self) -> Result<ApplyOutcome, ActionError> {
        let Some(pending) = self.begin_apply("apply_initial_damage", Phase::InitialDamageRoll)?
        else {
            return Ok(self.snapshot());
        };
        let PendingRoll::InitialDamage {
            loss, gain, grants, ..
        } = pending
        else {
            return Err(self.restore_mismatch("initial_damage", pending));
        };

        self.state.apply_hull_delta(loss, gain);
        self.state.modifiers.absorb(grants);
        let next = if self.state.hull <= 0 {
            self.state.fail();
            Phase::GameOver
        } else {
            Phase::StartRound
        };
        self.state.transition_to(next)?;
        Ok(self.snapshot())
    }

    /// Roll the day's task die. The result decides how many cards the round
    /// will demand once applied.
    pub fn roll_for_tasks(&mut self) -> Result<RollOutcome, ActionError> {
        self.ensure_active("roll_for_tasks")?;
        self.ensure_phase("roll_for_tasks", Phase::RollForTasks)?;
        let roll = self.roll_d20();
        self.stage(PendingRoll::TaskRoll {
            roll,
            cards_to_draw: tables::cards_to_draw(roll.value),
        });
        Ok(roll)
    }

    /// Commit the staged task roll and open the draw phase.
    pub fn apply_task_roll(&mut self) -> Result<ApplyOutcome, ActionError> {
        let Some(pending) = self.begin_apply("apply_task_roll", Phase::RollForTasks)? else {
            return Ok(self.snapshot());
        };
        let PendingRoll::TaskRoll { cards_to_draw, .. } = pending else {
            return Err(self.restore_mismatch("task_roll", pending));
        };

        self.state.cards_to_draw = cards_to_draw;
        self.state.transition_to(Phase::DrawCard)?;
        Ok(self.snapshot())
    }

    /// Turn over the top card. The card is journaled immediately and held
    /// as `current_card` until the player confirms it. An empty deck or a
    /// fourth king decides the voyage on the spot.
    pub fn draw_card(&mut self) -> Result<DrawOutcome, ActionError> {
        self.ensure_active("draw_card")?;
        self.ensure_phase("draw_card", Phase::DrawCard)?;
        if self.state.current_card.is_some() {
            return Err(ActionError::UnconfirmedCard);
        }

        let Some(card) = self.state.deck.draw() else {
            log::debug!("deck exhausted; the sea outlasted the keeper");
            self.state.pending = None;
            self.state.fail();
            self.state.transition_to(Phase::GameOver)?;
            return Ok(DrawOutcome {
                card: None,
                deck_exhausted: true,
                kings_complete: false,
            });
        };

        self.state.cards_to_draw = self.state.cards_to_draw.saturating_sub(1);
        if card.rank.is_ace() {
            self.state.record_ace(card.suit);
        } else if card.rank.is_king() {
            self.state.record_king(card.suit);
        }
        self.state.push_card_entry(card.clone());
        self.state.current_card = Some(card.clone());

        let kings_complete = self.state.all_kings_revealed();
        if kings_complete {
            log::debug!("fourth king revealed; the station goes down");
            self.state.pending = None;
            self.state.fail();
        }
        Ok(DrawOutcome {
            card: Some(card),
            deck_exhausted: false,
            kings_complete,
        })
    }

    /// Dismiss the shown card and route to whatever it provoked: the next
    /// draw, a stability check, the journal, or game over.
    pub fn confirm_card(&mut self) -> Result<Phase, ActionError> {
        self.ensure_phase("confirm_card", Phase::DrawCard)?;
        let Some(card) = self.state.current_card.take() else {
            return Err(ActionError::NoCurrentCard);
        };

        // A decided voyage outranks whatever the card would have caused.
        let next = if self.state.game_over {
            Phase::GameOver
        } else if card.rank.triggers_check() {
            self.state.pending_check_rank = Some(card.rank);
            Phase::FailureCheck
        } else if self.state.cards_to_draw > 0 {
            Phase::DrawCard
        } else {
            Phase::Log
        };
        self.state.transition_to(next)?;
        Ok(self.state.phase)
    }

    /// Roll against the hull for the card that provoked a check.
    pub fn stability_roll(&mut self) -> Result<RollOutcome, ActionError> {
        self.ensure_active("stability_roll")?;
        self.ensure_phase("stability_roll", Phase::FailureCheck)?;
        let Some(rank) = self.state.pending_check_rank else {
            return Err(ActionError::MissingCheckRank);
        };
        let roll = self.roll_d20();
        let outcome = tables::rank_scaled_loss(roll.value, rank.value());
        self.stage(PendingRoll::StabilityCheck {
            roll,
            loss: outcome.loss,
            gain: outcome.gain,
            grants: outcome.grants,
        });
        Ok(roll)
    }

    /// Commit the staged stability check. Routes back into the draw phase
    /// while cards remain, otherwise on to the journal.
    pub fn apply_stability_check(&mut self) -> Result<ApplyOutcome, ActionError> {
        let Some(pending) = self.begin_apply("apply_stability_check", Phase::FailureCheck)? else {
            return Ok(self.snapshot());
        };
        let PendingRoll::StabilityCheck {
            loss, gain, grants, ..
        } = pending
        else {
            return Err(self.restore_mismatch("stability_check", pending));
        };

        self.state.apply_hull_delta(loss, gain);
        self.state.modifiers.absorb(grants);
        self.state.pending_check_rank = None;
        let next = if self.state.hull <= 0 {
            self.state.fail();
            Phase::GameOver
        } else if self.state.cards_to_draw > 0 {
            Phase::DrawCard
        } else {
            Phase::Log
        };
        self.state.transition_to(next)?;
        Ok(self.snapshot())
    }

    /// Write the round's journal entry. Locked voyages head to the next
    /// round; once salvation is unlocked the round ends with its check.
    pub fn record_journal_entry(&mut self, text: &str) -> Result<Phase, ActionError> {
        self.ensure_active("record_journal_entry")?;
        self.ensure_phase("record_journal_entry", Phase::Log)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ActionError::EmptyJournalEntry);
        }
        self.state.push_journal_text(trimmed.to_string());
        let next = if self.state.salvation_unlocked {
            Phase::SuccessCheck
        } else {
            self.state.advance_round();
            Phase::StartRound
        };
        self.state.transition_to(next)?;
        Ok(self.state.phase)
    }

    /// Roll toward rescue. The threshold eases with every ace revealed.
    pub fn salvation_roll(&mut self) -> Result<RollOutcome, ActionError> {
        self.ensure_active("salvation_roll")?;
        self.ensure_phase("salvation_roll", Phase::SuccessCheck)?;
        if !self.state.salvation_unlocked {
            return Err(ActionError::SalvationLocked);
        }
        let threshold = tables::salvation_threshold(self.state.aces_revealed());
        let roll = self.roll_d20();
        let outcome = tables::salvation_result(roll.value, threshold);
        self.stage(PendingRoll::SalvationCheck {
            roll,
            token_change: outcome.token_change,
            grants: outcome.grants,
        });
        Ok(roll)
    }

    /// Commit the staged salvation check. Emptying the token pool ends the
    /// voyage; on the hardest difficulty it first routes through one last
    /// damage roll.
    pub fn apply_salvation_check(&mut self) -> Result<ApplyOutcome, ActionError> {
        let Some(pending) = self.begin_apply("apply_salvation_check", Phase::SuccessCheck)? else {
            return Ok(self.snapshot());
        };
        let PendingRoll::SalvationCheck {
            token_change,
            grants,
            ..
        } = pending
        else {
            return Err(self.restore_mismatch("salvation_check", pending));
        };

        self.state.apply_token_change(token_change);
        self.state.modifiers.absorb(grants);
        let next = if self.state.tokens == 0 {
            if self.state.options.difficulty == Difficulty::Abyssal {
                Phase::FinalDamageRoll
            } else {
                self.state.succeed();
                Phase::GameOver
            }
        } else {
            self.state.advance_round();
            Phase::StartRound
        };
        self.state.transition_to(next)?;
        Ok(self.snapshot())
    }

    /// The hardest difficulty's last hull roll, taken as rescue arrives.
    pub fn final_damage_roll(&mut self) -> Result<RollOutcome, ActionError> {
        self.ensure_active("final_damage_roll")?;
        self.ensure_phase("final_damage_roll", Phase::FinalDamageRoll)?;
        let roll = self.roll_d20();
        let outcome = tables::stability_loss(roll.value);
        self.stage(PendingRoll::FinalDamage {
            roll,
            loss: outcome.loss,
            gain: outcome.gain,
            grants: outcome.grants,
        });
        Ok(roll)
    }

    /// Commit the final damage roll and decide the voyage: a hull still
    /// above zero means the keeper is pulled out alive.
    pub fn apply_final_damage(&mut self) -> Result<ApplyOutcome, ActionError> {
        let Some(pending) = self.begin_apply("apply_final_damage", Phase::FinalDamageRoll)? else {
            return Ok(self.snapshot());
        };
        let PendingRoll::FinalDamage {
            loss, gain, grants, ..
        } = pending
        else {
            return Err(self.restore_mismatch("final_damage", pending));
        };

        self.state.apply_hull_delta(loss, gain);
        self.state.modifiers.absorb(grants);
        if self.state.hull > 0 {
            self.state.succeed();
        } else {
            self.state.fail();
        }
        self.state.transition_to(Phase::GameOver)?;
        Ok(self.snapshot())
    }

    /// Append the closing journal entry on the final screen. Works after
    /// game over; it touches nothing but the journal.
    pub fn record_final_entry(&mut self, text: &str) -> Result<(), ActionError> {
        self.ensure_phase("record_final_entry", Phase::FinalLog)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ActionError::EmptyJournalEntry);
        }
        self.state.push_final_text(trimmed.to_string());
        Ok(())
    }

    /// Drop whatever is staged without applying it. Returns true when
    /// something was actually discarded.
    pub fn discard_pending(&mut self) -> bool {
        match self.state.pending.take() {
            Some(pending) => {
                log::warn!("discarding staged {} update", pending.kind());
                true
            }
            None => false,
        }
    }

    fn roll_d20(&mut self) -> RollOutcome {
        roll_with_modifiers(&mut self.roller, TASK_DIE_SIDES, &mut self.state.modifiers)
    }

    fn stage(&mut self, pending: PendingRoll) {
        if let Some(old) = self.state.pending.replace(pending) {
            log::debug!("restaging over a {} update", old.kind());
        }
    }

    /// Common apply preamble. An empty stage is a logged no-op (`None`);
    /// the phase and game-over guards run before the stage is taken, so a
    /// rejected apply leaves the staged update where it was.
    fn begin_apply(
        &mut self,
        action: &'static str,
        expected: Phase,
    ) -> Result<Option<PendingRoll>, ActionError> {
        if self.state.pending.is_none() {
            log::warn!("{action} called with nothing staged; ignoring");
            return Ok(None);
        }
        self.ensure_active(action)?;
        self.ensure_phase(action, expected)?;
        Ok(self.state.pending.take())
    }

    fn restore_mismatch(&mut self, expected: &'static str, pending: PendingRoll) -> ActionError {
        let found = pending.kind();
        self.state.pending = Some(pending);
        ActionError::WrongPending { expected, found }
    }

    const fn snapshot(&self) -> ApplyOutcome {
        ApplyOutcome {
            phase: self.state.phase,
            game_over: self.state.game_over,
            win: self.state.win,
        }
    }

    fn ensure_active(&self, action: &'static str) -> Result<(), ActionError> {
        if self.state.game_over {
            log::warn!("{action} rejected; the voyage is already decided");
            return Err(ActionError::GameOver);
        }
        Ok(())
    }

    fn ensure_phase(&self, action: &'static str, expected: Phase) -> Result<(), ActionError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                action,
                phase: self.state.phase,
            })
        }
    }
}
