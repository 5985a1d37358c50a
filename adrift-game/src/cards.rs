//! Card primitives and the draw deck.
//!
//! The deck is an ordered stack drawn from the end. Content packs supply the
//! card text; the engine only ever looks at rank and suit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::rng::Roller;

/// Card rank. Serialized with the short card codes content packs use
/// (`"A"`, `"2"` .. `"10"`, `"J"`, `"Q"`, `"K"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Ace,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ace => "A",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }

    /// Numeric value used to scale stability-check damage. Aces count as 1,
    /// face cards continue past ten (J=11, Q=12, K=13).
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Ace => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten => 10,
            Self::Jack => 11,
            Self::Queen => 12,
            Self::King => 13,
        }
    }

    /// Whether drawing this rank queues a stability check. Kings and the odd
    /// numerals above the ace (3, 5, 7, 9) are the dangerous draws; aces,
    /// even numerals, jacks and queens resolve without one.
    #[must_use]
    pub const fn triggers_check(self) -> bool {
        matches!(
            self,
            Self::Three | Self::Five | Self::Seven | Self::Nine | Self::King
        )
    }

    #[must_use]
    pub const fn is_king(self) -> bool {
        matches!(self, Self::King)
    }

    #[must_use]
    pub const fn is_ace(self) -> bool {
        matches!(self, Self::Ace)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::Ace),
            "2" => Ok(Self::Two),
            "3" => Ok(Self::Three),
            "4" => Ok(Self::Four),
            "5" => Ok(Self::Five),
            "6" => Ok(Self::Six),
            "7" => Ok(Self::Seven),
            "8" => Ok(Self::Eight),
            "9" => Ok(Self::Nine),
            "10" => Ok(Self::Ten),
            "J" => Ok(Self::Jack),
            "Q" => Ok(Self::Queen),
            "K" => Ok(Self::King),
            _ => Err(()),
        }
    }
}

impl From<Rank> for String {
    fn from(value: Rank) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Hearts, Self::Diamonds, Self::Clubs, Self::Spades];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hearts => "hearts",
            Self::Diamonds => "diamonds",
            Self::Clubs => "clubs",
            Self::Spades => "spades",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hearts" => Ok(Self::Hearts),
            "diamonds" => Ok(Self::Diamonds),
            "clubs" => Ok(Self::Clubs),
            "spades" => Ok(Self::Spades),
            _ => Err(()),
        }
    }
}

impl From<Suit> for String {
    fn from(value: Suit) -> Self {
        value.as_str().to_string()
    }
}

/// A single card. `description`, `story` and `modifier` come straight from
/// the content pack and are never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub story: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

impl Card {
    #[must_use]
    pub fn bare(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            description: String::new(),
            story: String::new(),
            modifier: None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank, self.suit)
    }
}

/// The draw pile. Cards leave from the end of the backing vector, so the
/// last element is the top of the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A full 52-card deck with no content text, ordered suit-major. Useful
    /// for tests and as a fallback when no content pack is loaded.
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::bare(rank, suit));
            }
        }
        Self { cards }
    }

    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Take the top card, or `None` when the pile is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Remove the first card matching `rank` and `suit`, returning it.
    /// Difficulty rules use this to pull specific cards before play.
    pub fn remove(&mut self, rank: Rank, suit: Suit) -> Option<Card> {
        let idx = self
            .cards
            .iter()
            .position(|c| c.rank == rank && c.suit == suit)?;
        Some(self.cards.remove(idx))
    }

    #[must_use]
    pub fn contains(&self, rank: Rank, suit: Suit) -> bool {
        self.cards.iter().any(|c| c.rank == rank && c.suit == suit)
    }

    /// Shuffle in place. Goes through the roller's deck die so seeded
    /// bundles keep deck order independent of the dice stream.
    pub fn shuffle<R: Roller + ?Sized>(&mut self, roller: &mut R) {
        crate::rng::shuffle(&mut self.cards, roller);
    }
}
