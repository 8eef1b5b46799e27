//! Card and deck primitives.
//!
//! A card is a single index 0-51 (`rank * 4 + suit`). The ranking table
//! consumed by the evaluator addresses cards through a 1-52 code instead,
//! exposed here as [`Card::code`]; the numeric side of the public API speaks
//! the same code space.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Rank index of an ace (ranks run 0-12 for 2-A).
pub const RANK_ACE: u8 = 12;

/// Suit index of diamonds.
pub const SUIT_DIAMONDS: u8 = 1;
/// Suit index of spades.
pub const SUIT_SPADES: u8 = 3;

/// Rank characters in ascending order.
const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters: clubs, diamonds, hearts, spades.
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    /// Card index 0-51: rank * 4 + suit.
    id: u8,
}

impl Card {
    /// Create a card from rank (0-12) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { id: rank * 4 + suit }
    }

    /// Create a card from its index (0-51).
    #[inline]
    pub fn from_id(id: u8) -> Self {
        debug_assert!(id < 52, "card id must be 0-51");
        Self { id }
    }

    /// Create a card from its 1-52 table code.
    ///
    /// Returns `None` for codes outside the deck.
    pub fn from_code(code: u8) -> Option<Self> {
        if (1..=52).contains(&code) {
            Some(Self { id: code - 1 })
        } else {
            None
        }
    }

    /// Parse a card from a two-character string like "As", "kh", "2C".
    ///
    /// Both characters are case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return None;
        }

        let rank = RANK_CHARS.iter().position(|&c| c == chars[0].to_ascii_uppercase())?;
        let suit = SUIT_CHARS.iter().position(|&c| c == chars[1].to_ascii_lowercase())?;

        Some(Self::new(rank as u8, suit as u8))
    }

    /// Get the card's index (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Get the card's 1-52 code, the value the ranking table is keyed by.
    #[inline]
    pub fn code(&self) -> u8 {
        self.id + 1
    }

    /// Get the card's rank (0-12: 2-A).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    /// Get the card's suit (0-3: clubs, diamonds, hearts, spades).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }

    /// Get rank character for display.
    pub fn rank_char(&self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    /// Get suit character for display.
    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// The undealt portion of a 52-card deck.
///
/// A deck is built once per simulation run with the known cards removed, then
/// reshuffled and redealt from the front every cycle. Known cards never
/// re-enter the pool.
#[derive(Clone)]
pub struct Deck {
    /// Undealt cards occupy `0..len` in current order.
    cards: [Card; 52],
    /// Number of usable cards (52 minus removed cards).
    len: usize,
    /// Index of the next card to deal.
    index: usize,
}

impl Deck {
    /// Create a full deck in index order.
    pub fn new() -> Self {
        let mut cards = [Card::from_id(0); 52];
        for (i, slot) in cards.iter_mut().enumerate() {
            *slot = Card::from_id(i as u8);
        }
        Self { cards, len: 52, index: 0 }
    }

    /// Create a deck with the given cards removed.
    pub fn without(dead: &[Card]) -> Self {
        let mut deck = Self::new();
        let mut write = 0;
        for id in 0..52u8 {
            let card = Card::from_id(id);
            if !dead.contains(&card) {
                deck.cards[write] = card;
                write += 1;
            }
        }
        deck.len = write;
        deck
    }

    /// Uniformly permute all undealt cards and rewind the deal position.
    ///
    /// Dealt cards from a previous cycle return to the pool; cards removed at
    /// construction do not.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards[..self.len].shuffle(rng);
        self.index = 0;
    }

    /// Deal the next card from the front of the deck.
    pub fn deal(&mut self) -> Option<Card> {
        if self.index >= self.len {
            return None;
        }
        let card = self.cards[self.index];
        self.index += 1;
        Some(card)
    }

    /// Number of cards left to deal this cycle.
    pub fn remaining(&self) -> usize {
        self.len - self.index
    }

    /// Number of usable cards in the deck (excluding removed cards).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the deck holds no usable cards.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if a card is in the usable portion of the deck.
    pub fn contains(&self, card: Card) -> bool {
        self.cards[..self.len].contains(&card)
    }

    /// Undealt cards in current order.
    pub fn undealt(&self) -> &[Card] {
        &self.cards[self.index..self.len]
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} of {} undealt)", self.remaining(), self.len)
    }
}
