//! Dice, single-use roll modifiers, and seeded random streams.
//!
//! Everything that consumes randomness goes through the [`Roller`] trait,
//! so the whole engine can be driven by a seeded generator or a scripted
//! sequence without touching game code.

use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::VecDeque;

/// One die roll as the animation layer sees it: the kept value plus which
/// modifier, if any, shaped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub value: u32,
    pub was_lucid: bool,
    pub was_surreal: bool,
}

impl RollOutcome {
    #[must_use]
    pub const fn plain(value: u32) -> Self {
        Self {
            value,
            was_lucid: false,
            was_surreal: false,
        }
    }
}

/// Single-use advantage (`lucid`) and disadvantage (`surreal`) flags held on
/// the session. At most one is meaningfully set; if both are, lucid wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierFlags {
    #[serde(default)]
    pub lucid: bool,
    #[serde(default)]
    pub surreal: bool,
}

impl ModifierFlags {
    /// Fold freshly earned grants into the live flags.
    pub fn absorb(&mut self, grants: ModifierGrants) {
        if grants.lucid {
            self.lucid = true;
        }
        if grants.surreal {
            self.surreal = true;
        }
    }
}

/// Flags earned by a roll. They ride inside the staged update and only reach
/// [`ModifierFlags`] when the update is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierGrants {
    #[serde(default)]
    pub lucid: bool,
    #[serde(default)]
    pub surreal: bool,
}

impl ModifierGrants {
    pub const NONE: Self = Self {
        lucid: false,
        surreal: false,
    };
    pub const LUCID: Self = Self {
        lucid: true,
        surreal: false,
    };
    pub const SURREAL: Self = Self {
        lucid: false,
        surreal: true,
    };
}

/// Source of die rolls.
///
/// Any [`rand::Rng`] is a roller via the blanket impl. [`RollerBundle`]
/// overrides [`Roller::deck_die`] to keep shuffles on their own stream, and
/// [`ScriptedRoller`] replays fixed sequences in tests.
pub trait Roller {
    /// Uniform roll in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Die used for deck operations. Defaults to the ordinary die; bundles
    /// with a dedicated deck stream override it so shuffles never disturb
    /// the dice sequence.
    fn deck_die(&mut self, sides: u32) -> u32 {
        self.roll_die(sides)
    }

    /// Roll twice, keep the higher. Ties stand, nothing is rerolled.
    fn roll_advantage(&mut self, sides: u32) -> u32 {
        let first = self.roll_die(sides);
        let second = self.roll_die(sides);
        first.max(second)
    }

    /// Roll twice, keep the lower.
    fn roll_disadvantage(&mut self, sides: u32) -> u32 {
        let first = self.roll_die(sides);
        let second = self.roll_die(sides);
        first.min(second)
    }
}

impl<R: Rng> Roller for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.gen_range(1..=sides.max(1))
    }
}

/// Roll a die honoring the single-use modifier flags. Lucid is checked
/// first, so a state somehow carrying both burns lucid and keeps surreal
/// for the roll after. Exactly one flag is consumed per call.
pub fn roll_with_modifiers<R: Roller + ?Sized>(
    roller: &mut R,
    sides: u32,
    flags: &mut ModifierFlags,
) -> RollOutcome {
    if flags.lucid {
        flags.lucid = false;
        RollOutcome {
            value: roller.roll_advantage(sides),
            was_lucid: true,
            was_surreal: false,
        }
    } else if flags.surreal {
        flags.surreal = false;
        RollOutcome {
            value: roller.roll_disadvantage(sides),
            was_lucid: false,
            was_surreal: true,
        }
    } else {
        RollOutcome::plain(roller.roll_die(sides))
    }
}

/// In-place Fisher-Yates shuffle driven by the roller's deck die. Uniform
/// over permutations given a uniform die, and a scripted roller can pin an
/// exact order.
pub fn shuffle<T, R: Roller + ?Sized>(items: &mut [T], roller: &mut R) {
    for i in (1..items.len()).rev() {
        let sides = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let j = (roller.deck_die(sides) - 1) as usize;
        items.swap(i, j);
    }
}

/// Roller that plays back a fixed script. An exhausted script logs and
/// returns 1 rather than panicking; out-of-range entries are clamped into
/// the die's range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<u32>,
}

impl ScriptedRoller {
    #[must_use]
    pub fn new(rolls: &[u32]) -> Self {
        Self {
            rolls: rolls.iter().copied().collect(),
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Roller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        match self.rolls.pop_front() {
            Some(roll) => roll.clamp(1, sides.max(1)),
            None => {
                log::warn!("scripted roller exhausted; returning 1");
                1
            }
        }
    }
}

/// Counting wrapper for RNG streams providing draw instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn from_stream_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Deterministic bundle of RNG streams segregated by game domain. Dice and
/// deck draws never interleave, so rolling one extra check cannot shift how
/// the next deck shuffles.
#[derive(Debug, Clone)]
pub struct RollerBundle {
    dice: CountingRng<ChaCha20Rng>,
    deck: CountingRng<ChaCha20Rng>,
}

impl RollerBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            dice: CountingRng::from_stream_seed(derive_stream_seed(seed, b"dice")),
            deck: CountingRng::from_stream_seed(derive_stream_seed(seed, b"deck")),
        }
    }

    /// Draw counts per stream, `(dice, deck)`.
    #[must_use]
    pub const fn draw_counts(&self) -> (u64, u64) {
        (self.dice.draws(), self.deck.draws())
    }
}

impl Roller for RollerBundle {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.dice.gen_range(1..=sides.max(1))
    }

    fn deck_die(&mut self, sides: u32) -> u32 {
        self.deck.gen_range(1..=sides.max(1))
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is a valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
