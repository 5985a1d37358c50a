//! Session state: the single record of a voyage in progress.
//!
//! Owned, serializable, and passed by value between the engine and its
//! callers. Nothing in here touches randomness; rolls come in from the
//! session layer and land here as staged updates.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::cards::{Card, Deck, Rank, Suit};
use crate::constants::{
    DEFAULT_STARTING_TOKENS, HULL_MAX, HULL_START, JOURNAL_FINAL_ID, JOURNAL_TEXT_SUFFIX,
    KINGS_LOSS_COUNT, MAX_STARTING_TOKENS, MIN_STARTING_TOKENS, SUIT_COUNT,
};
use crate::phase::{Phase, TransitionError};
use crate::rng::{ModifierFlags, ModifierGrants, RollOutcome};
use thiserror::Error;

/// Per-suit reveal list. Four suits, so the inline capacity never spills.
pub type SuitSet = SmallVec<[Suit; SUIT_COUNT]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// The beacon card is removed before play and salvation starts unlocked.
    Respite,
    #[default]
    Standard,
    /// Emptying the token pool forces one last hull roll before rescue.
    Abyssal,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Respite => "respite",
            Self::Standard => "standard",
            Self::Abyssal => "abyssal",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "respite" => Ok(Self::Respite),
            "standard" => Ok(Self::Standard),
            "abyssal" => Ok(Self::Abyssal),
            _ => Err(()),
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

fn default_starting_tokens() -> u32 {
    DEFAULT_STARTING_TOKENS
}

/// Pre-game choices. Validated before a session starts; a stored options
/// blob that fails validation is rejected, not silently patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_starting_tokens")]
    pub starting_tokens: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            starting_tokens: DEFAULT_STARTING_TOKENS,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(MIN_STARTING_TOKENS..=MAX_STARTING_TOKENS).contains(&self.starting_tokens) {
            return Err(OptionsError::RangeViolation {
                field: "starting_tokens",
                min: MIN_STARTING_TOKENS,
                max: MAX_STARTING_TOKENS,
                value: self.starting_tokens,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("{field} must be within {min}..={max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

/// One staged roll result, held between the roll action and its apply.
/// Each variant carries everything the apply consumes, so a mismatched
/// apply can be rejected without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingRoll {
    TaskRoll {
        roll: RollOutcome,
        cards_to_draw: u32,
    },
    StabilityCheck {
        roll: RollOutcome,
        loss: u32,
        gain: u32,
        grants: ModifierGrants,
    },
    SalvationCheck {
        roll: RollOutcome,
        token_change: i32,
        grants: ModifierGrants,
    },
    InitialDamage {
        roll: RollOutcome,
        loss: u32,
        gain: u32,
        grants: ModifierGrants,
    },
    FinalDamage {
        roll: RollOutcome,
        loss: u32,
        gain: u32,
        grants: ModifierGrants,
    },
}

impl PendingRoll {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TaskRoll { .. } => "task_roll",
            Self::StabilityCheck { .. } => "stability_check",
            Self::SalvationCheck { .. } => "salvation_check",
            Self::InitialDamage { .. } => "initial_damage",
            Self::FinalDamage { .. } => "final_damage",
        }
    }

    /// The roll that produced this update, for the animation layer.
    #[must_use]
    pub const fn roll(&self) -> RollOutcome {
        match self {
            Self::TaskRoll { roll, .. }
            | Self::StabilityCheck { roll, .. }
            | Self::SalvationCheck { roll, .. }
            | Self::InitialDamage { roll, .. }
            | Self::FinalDamage { roll, .. } => *roll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntryKind {
    CardDrawn { card: Card },
    Journal { text: String },
    Final { text: String },
}

/// One journal line. Card entries get ids like `"3.2"` (second card of
/// round three); text entries use the round plus a fixed suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub round: u32,
    #[serde(flatten)]
    pub kind: LogEntryKind,
}

fn default_hull() -> i32 {
    HULL_START
}

fn default_round() -> u32 {
    1
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub seed: u64,
    /// Station hull, the stability pool. Clamped to `0..=20`.
    #[serde(default = "default_hull")]
    pub hull: i32,
    /// Rescue countdown. The voyage is won by emptying it.
    #[serde(default = "default_starting_tokens")]
    pub tokens: u32,
    #[serde(default)]
    pub ace_suits: SuitSet,
    #[serde(default)]
    pub king_suits: SuitSet,
    #[serde(default)]
    pub salvation_unlocked: bool,
    #[serde(default)]
    pub modifiers: ModifierFlags,
    /// The live draw pile.
    #[serde(default)]
    pub deck: Deck,
    /// Pristine copy of the content deck, kept for restarts.
    #[serde(default)]
    pub source_deck: Deck,
    /// The drawn card being shown; cleared when the player confirms it.
    #[serde(default)]
    pub current_card: Option<Card>,
    #[serde(default)]
    pub cards_to_draw: u32,
    /// Rank backing a queued stability check.
    #[serde(default)]
    pub pending_check_rank: Option<Rank>,
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default)]
    pub cards_this_round: u32,
    #[serde(default)]
    pub journal: Vec<LogEntry>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub win: bool,
    /// Staged roll awaiting its apply.
    #[serde(default)]
    pub pending: Option<PendingRoll>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::default(),
            player: String::new(),
            options: Options::default(),
            seed: 0,
            hull: HULL_START,
            tokens: DEFAULT_STARTING_TOKENS,
            ace_suits: SuitSet::new(),
            king_suits: SuitSet::new(),
            salvation_unlocked: false,
            modifiers: ModifierFlags::default(),
            deck: Deck::default(),
            source_deck: Deck::default(),
            current_card: None,
            cards_to_draw: 0,
            pending_check_rank: None,
            round: 1,
            cards_this_round: 0,
            journal: Vec::new(),
            game_over: false,
            win: false,
            pending: None,
        }
    }
}

impl SessionState {
    /// A brand-new voyage for `player`, positioned at the intro screen.
    /// The caller supplies the deck afterwards.
    #[must_use]
    pub fn fresh(player: &str, options: Options, seed: u64) -> Self {
        Self {
            phase: Phase::Intro,
            player: player.to_string(),
            options,
            seed,
            tokens: options.starting_tokens,
            salvation_unlocked: options.difficulty == Difficulty::Respite,
            ..Self::default()
        }
    }

    /// Parse a stored session from JSON. Every field is defaulted, so saves
    /// from older layouts rehydrate instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a session state.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize for the storage collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn aces_revealed(&self) -> u32 {
        self.ace_suits.len() as u32
    }

    #[must_use]
    pub fn kings_revealed(&self) -> u32 {
        self.king_suits.len() as u32
    }

    #[must_use]
    pub fn all_kings_revealed(&self) -> bool {
        self.king_suits.len() >= KINGS_LOSS_COUNT
    }

    /// Record a revealed ace. Hearts unlocks salvation. Returns false when
    /// the suit was already recorded, which keeps the counters monotone
    /// even against a malformed deck.
    pub fn record_ace(&mut self, suit: Suit) -> bool {
        if self.ace_suits.contains(&suit) {
            return false;
        }
        self.ace_suits.push(suit);
        if suit == Suit::Hearts {
            self.salvation_unlocked = true;
        }
        true
    }

    /// Record a revealed king. Same duplicate rule as [`Self::record_ace`].
    pub fn record_king(&mut self, suit: Suit) -> bool {
        if self.king_suits.contains(&suit) {
            return false;
        }
        self.king_suits.push(suit);
        true
    }

    /// Move to `to` if the transition table allows it. Staying put is a
    /// silent no-op; an illegal target leaves the phase untouched.
    pub fn transition_to(&mut self, to: Phase) -> Result<(), TransitionError> {
        Phase::validate_transition(self.phase, to)?;
        if self.phase != to {
            log::debug!("phase {} -> {}", self.phase, to);
            self.phase = to;
        }
        Ok(())
    }

    pub(crate) fn apply_hull_delta(&mut self, loss: u32, gain: u32) {
        let next = i64::from(self.hull) - i64::from(loss) + i64::from(gain);
        self.hull = next.clamp(0, i64::from(HULL_MAX)) as i32;
    }

    pub(crate) fn apply_token_change(&mut self, change: i32) {
        let next = i64::from(self.tokens) + i64::from(change);
        self.tokens = next.clamp(0, i64::from(u32::MAX)) as u32;
    }

    pub(crate) fn fail(&mut self) {
        self.game_over = true;
        self.win = false;
    }

    pub(crate) fn succeed(&mut self) {
        self.game_over = true;
        self.win = true;
    }

    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
        self.cards_this_round = 0;
    }

    pub(crate) fn push_card_entry(&mut self, card: Card) {
        self.cards_this_round += 1;
        let id = format!("{}.{}", self.round, self.cards_this_round);
        self.journal.push(LogEntry {
            id,
            round: self.round,
            kind: LogEntryKind::CardDrawn { card },
        });
    }

    pub(crate) fn push_journal_text(&mut self, text: String) {
        let id = format!("{}.{}", self.round, JOURNAL_TEXT_SUFFIX);
        self.journal.push(LogEntry {
            id,
            round: self.round,
            kind: LogEntryKind::Journal { text },
        });
    }

    pub(crate) fn push_final_text(&mut self, text: String) {
        self.journal.push(LogEntry {
            id: JOURNAL_FINAL_ID.to_string(),
            round: self.round,
            kind: LogEntryKind::Final { text },
        });
    }
}
