//! Centralized balance and tuning constants for the Adrift rules engine.
//!
//! These values define the deterministic math for the core game. Keeping
//! them together ensures that the odds can only be adjusted via code
//! changes reviewed in version control, rather than through external
//! JSON assets.

// Hull ----------------------------------------------------------------------
pub(crate) const HULL_MAX: i32 = 20;
pub(crate) const HULL_START: i32 = 20;

// Rescue tokens -------------------------------------------------------------
pub(crate) const DEFAULT_STARTING_TOKENS: u32 = 10;
pub(crate) const MIN_STARTING_TOKENS: u32 = 1;
pub(crate) const MAX_STARTING_TOKENS: u32 = 24;

// Dice ----------------------------------------------------------------------
pub(crate) const TASK_DIE_SIDES: u32 = 20;

// Deck ----------------------------------------------------------------------
pub(crate) const SUIT_COUNT: usize = 4;
pub(crate) const KINGS_LOSS_COUNT: usize = 4;

// Journal -------------------------------------------------------------------
pub(crate) const JOURNAL_TEXT_SUFFIX: &str = "journal";
pub(crate) const JOURNAL_FINAL_ID: &str = "final";
