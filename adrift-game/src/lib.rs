//! Adrift Game Engine
//!
//! Platform-agnostic core rules for Adrift, a solo card-and-dice journaling
//! game about the lone keeper of a failing deep-sea research station. This
//! crate provides deck handling, phase flow, dice tables, and session
//! lifecycle without any UI or platform-specific dependencies.

pub mod cards;
pub mod constants;
pub mod phase;
pub mod rng;
pub mod seed;
pub mod session;
pub mod state;
pub mod tables;

// Re-export commonly used types
pub use cards::{Card, Deck, Rank, Suit};
pub use phase::{Phase, TransitionError};
pub use rng::{
    CountingRng, ModifierFlags, ModifierGrants, RollOutcome, Roller, RollerBundle, ScriptedRoller,
    roll_with_modifiers, shuffle,
};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use session::{ActionError, ApplyOutcome, DrawOutcome, Session};
pub use state::{
    Difficulty, LogEntry, LogEntryKind, Options, OptionsError, PendingRoll, SessionState, SuitSet,
};
pub use tables::{
    SalvationOutcome, StabilityOutcome, cards_to_draw, rank_scaled_loss, salvation_result,
    salvation_threshold, stability_loss,
};

/// Trait for abstracting deck and options content loading.
/// Platform-specific implementations should provide this.
pub trait ContentSource {
    /// Error type returned by the source
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the prompt deck.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck data cannot be loaded or parsed.
    fn load_deck(&self) -> Result<Deck, Self::Error>;

    /// Load the player's stored options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded or parsed.
    fn load_options(&self) -> Result<Options, Self::Error>;
}

/// Trait for abstracting session persistence.
/// Platform-specific implementations should provide this.
pub trait SessionStorage {
    /// Error type returned by the storage layer
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session state under `save_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    fn save_session(&self, save_name: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Load a previously saved session state, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails; a missing save is
    /// `Ok(None)`.
    fn load_session(&self, save_name: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Delete a saved session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be removed.
    fn delete_session(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main engine facade tying content, persistence, and sessions together
pub struct GameEngine<C, S>
where
    C: ContentSource,
    S: SessionStorage,
{
    content: C,
    storage: S,
}

impl<C, S> GameEngine<C, S>
where
    C: ContentSource,
    S: SessionStorage,
{
    /// Create a new game engine instance
    pub const fn new(content: C, storage: S) -> Self {
        Self { content, storage }
    }

    /// Start a new voyage for `player` with the given options and seed.
    ///
    /// Loads the deck from the content source and runs the full session
    /// setup, leaving the returned session at the intro.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot be loaded, the options are out
    /// of range, or the player name is blank.
    pub fn new_session(
        &self,
        player: &str,
        options: Options,
        seed: u64,
    ) -> Result<Session, anyhow::Error>
    where
        C::Error: Into<anyhow::Error>,
    {
        let deck = self.content.load_deck().map_err(Into::into)?;
        let mut session = Session::new(RollerBundle::from_user_seed(seed), seed);
        session.start_game(player, options, deck)?;
        Ok(session)
    }

    /// Start a voyage from a share code, which fixes both the difficulty
    /// and the seed. The player's stored options supply everything else.
    ///
    /// Returns `Ok(None)` when the code does not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if loading content or starting the session fails.
    pub fn session_from_code(
        &self,
        player: &str,
        code: &str,
    ) -> Result<Option<Session>, anyhow::Error>
    where
        C::Error: Into<anyhow::Error>,
    {
        let Some((difficulty, seed)) = decode_to_seed(code) else {
            return Ok(None);
        };
        let mut options = self.content.load_options().map_err(Into::into)?;
        options.difficulty = difficulty;
        self.new_session(player, options, seed).map(Some)
    }

    /// Save a session state under `save_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn save_session(&self, save_name: &str, state: &SessionState) -> Result<(), S::Error> {
        self.storage.save_session(save_name, state)
    }

    /// Load a saved session state without rehydrating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn load_session(&self, save_name: &str) -> Result<Option<SessionState>, S::Error> {
        self.storage.load_session(save_name)
    }

    /// Resume a saved voyage, re-deriving the dice and deck streams from
    /// the seed stored in the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn resume_session(&self, save_name: &str) -> Result<Option<Session>, S::Error> {
        Ok(self.load_session(save_name)?.map(|state| {
            let roller = RollerBundle::from_user_seed(state.seed);
            Session::from_state(state, roller)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    struct FixtureSource;

    impl ContentSource for FixtureSource {
        type Error = Infallible;

        fn load_deck(&self) -> Result<Deck, Self::Error> {
            Ok(Deck::standard())
        }

        fn load_options(&self) -> Result<Options, Self::Error> {
            Ok(Options::default())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, SessionState>>>,
    }

    impl SessionStorage for MemoryStorage {
        type Error = Infallible;

        fn save_session(&self, save_name: &str, state: &SessionState) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(save_name.to_string(), state.clone());
            Ok(())
        }

        fn load_session(&self, save_name: &str) -> Result<Option<SessionState>, Self::Error> {
            Ok(self.saves.borrow().get(save_name).cloned())
        }

        fn delete_session(&self, save_name: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(save_name);
            Ok(())
        }
    }

    fn engine() -> GameEngine<FixtureSource, MemoryStorage> {
        GameEngine::new(FixtureSource, MemoryStorage::default())
    }

    #[test]
    fn engine_starts_and_roundtrips_sessions() {
        let engine = engine();
        let session = engine.new_session("mara", Options::default(), 0xABCD).unwrap();
        assert_eq!(session.state().phase, Phase::Intro);
        assert_eq!(session.state().player, "mara");

        let mut state = session.into_state();
        state.hull = 13;
        engine.save_session("slot-one", &state).unwrap();

        let resumed = engine.resume_session("slot-one").unwrap().unwrap();
        assert_eq!(resumed.state().hull, 13);
        assert_eq!(resumed.state().phase, Phase::Intro);
        assert_eq!(resumed.state().seed, 0xABCD);

        assert!(engine.resume_session("missing").unwrap().is_none());
    }

    #[test]
    fn share_codes_fix_difficulty_and_seed() {
        let engine = engine();
        let code = encode_friendly(Difficulty::Abyssal, 99);
        let session = engine.session_from_code("mara", &code).unwrap().unwrap();
        assert_eq!(session.state().options.difficulty, Difficulty::Abyssal);
        let expected = decode_to_seed(&code).map(|(_, seed)| seed);
        assert_eq!(Some(session.state().seed), expected);

        assert!(engine.session_from_code("mara", "garbage").unwrap().is_none());
    }

    #[test]
    fn blank_player_names_are_rejected() {
        let engine = engine();
        assert!(engine.new_session("  ", Options::default(), 1).is_err());
    }

    #[test]
    fn deleted_saves_stay_gone() {
        let storage = MemoryStorage::default();
        let engine = GameEngine::new(FixtureSource, storage.clone());
        let state = engine
            .new_session("mara", Options::default(), 5)
            .unwrap()
            .into_state();
        engine.save_session("slot", &state).unwrap();
        storage.delete_session("slot").unwrap();
        assert!(engine.load_session("slot").unwrap().is_none());
    }
}
