//! Table-driven poker hand evaluation.
//!
//! The evaluator walks a precomputed transition table: starting from a fixed
//! initial state, each card's 1-52 code offsets the current state, and the
//! table entry at that offset is the next state. After the last card, 5- and
//! 6-card hands take one extra lookup on the bare state to resolve the
//! encoding; 7-card hands resolve directly. The final state packs the hand
//! category in the bits above 12 and the within-category rank in the low 12
//! bits, and is itself the cross-category comparable strength value.
//!
//! The table is an external artifact (flat little-endian u32 slots), loaded
//! once and shared read-only for the life of the process.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::card::Card;
use super::complete::fill_hand;

/// State the table walk starts from.
const INITIAL_STATE: u32 = 53;

/// Slot count of the canonical ranking table artifact.
const CANONICAL_TABLE_SLOTS: usize = 32_487_834;

/// Hand categories, ordered from worst to best.
///
/// `Invalid` is the sentinel a degenerate hand (duplicate physical cards)
/// resolves to; it is a representable result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandType {
    /// Degenerate hand, e.g. duplicate physical cards.
    Invalid = 0,
    /// No made hand.
    HighCard = 1,
    /// One pair.
    OnePair = 2,
    /// Two pair.
    TwoPair = 3,
    /// Three of a kind.
    ThreeOfAKind = 4,
    /// Five consecutive ranks.
    Straight = 5,
    /// Five cards of one suit.
    Flush = 6,
    /// Trips plus a pair.
    FullHouse = 7,
    /// Four of a kind.
    FourOfAKind = 8,
    /// Straight in one suit.
    StraightFlush = 9,
}

impl HandType {
    /// Map a category index (the packed value shifted right by 12) to a type.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => HandType::HighCard,
            2 => HandType::OnePair,
            3 => HandType::TwoPair,
            4 => HandType::ThreeOfAKind,
            5 => HandType::Straight,
            6 => HandType::Flush,
            7 => HandType::FullHouse,
            8 => HandType::FourOfAKind,
            9 => HandType::StraightFlush,
            _ => HandType::Invalid,
        }
    }

    /// Get the display label for this category.
    pub fn name(&self) -> &'static str {
        match self {
            HandType::Invalid => "invalid hand",
            HandType::HighCard => "high card",
            HandType::OnePair => "one pair",
            HandType::TwoPair => "two pair",
            HandType::ThreeOfAKind => "three of a kind",
            HandType::Straight => "straight",
            HandType::Flush => "flush",
            HandType::FullHouse => "full house",
            HandType::FourOfAKind => "four of a kind",
            HandType::StraightFlush => "straight flush",
        }
    }
}

/// Result of evaluating one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedHand {
    /// Hand category.
    pub hand_type: HandType,
    /// Strength within the category (low 12 bits of the packed value).
    pub hand_rank: u16,
    /// Packed strength value; higher always beats lower, across categories.
    pub value: u32,
}

impl EvaluatedHand {
    /// Unpack a final table state into its parts.
    fn from_value(value: u32) -> Self {
        Self {
            hand_type: HandType::from_index(value >> 12),
            hand_rank: (value & 0xFFF) as u16,
            value,
        }
    }

    /// Get the display label for the hand's category.
    pub fn hand_name(&self) -> &'static str {
        self.hand_type.name()
    }
}

/// Errors from hand evaluation and table loading.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// Card count was not 3, 5, 6, or 7.
    InvalidHandSize(usize),
    /// A card string did not parse as `<rank><suit>`.
    InvalidCard(String),
    /// A numeric card code fell outside 1-52.
    InvalidCardCode(u8),
    /// 3-card hands are only accepted as strings; completion works on the
    /// symbolic rank/suit structure.
    ThreeCardCodes,
    /// Reading the table artifact failed.
    Io(String),
    /// The table artifact was smaller than the canonical table.
    TruncatedTable {
        /// Number of u32 slots actually present.
        slots: usize,
    },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandSize(n) => {
                write!(f, "hand must be 3, 5, 6, or 7 cards ({} provided)", n)
            }
            Self::InvalidCard(s) => write!(f, "invalid card string: {:?}", s),
            Self::InvalidCardCode(c) => write!(f, "invalid card code: {} (expected 1-52)", c),
            Self::ThreeCardCodes => {
                write!(f, "3-card hands must be supplied as strings, not card codes")
            }
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::TruncatedTable { slots } => write!(
                f,
                "ranking table has {} slots, expected at least {}",
                slots, CANONICAL_TABLE_SLOTS
            ),
        }
    }
}

impl std::error::Error for EvalError {}

/// Hand evaluator backed by the precomputed ranking table.
///
/// Load once at startup and share behind an `Arc`; evaluation itself is a
/// pure read of the table.
#[derive(Clone)]
pub struct Evaluator {
    slots: Vec<u32>,
}

impl Evaluator {
    /// Load the ranking table from its flat little-endian u32 artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EvalError> {
        let bytes = fs::read(path).map_err(|e| EvalError::Io(e.to_string()))?;
        if bytes.len() % 4 != 0 {
            return Err(EvalError::TruncatedTable { slots: bytes.len() / 4 });
        }

        let mut slots = vec![0u32; bytes.len() / 4];
        LittleEndian::read_u32_into(&bytes, &mut slots);

        if slots.len() < CANONICAL_TABLE_SLOTS {
            return Err(EvalError::TruncatedTable { slots: slots.len() });
        }
        Ok(Self { slots })
    }

    /// Build an evaluator from in-memory table slots.
    ///
    /// The slots must form a complete transition table: the walk indexes them
    /// directly. Intended for synthetic tables in tests; production code loads
    /// the artifact with [`Evaluator::load`].
    pub fn from_entries(slots: Vec<u32>) -> Self {
        Self { slots }
    }

    /// Evaluate a hand of 3, 5, 6, or 7 cards.
    ///
    /// A 3-card hand is first completed to 5 cards (see
    /// [`fill_hand`](super::complete::fill_hand)) so its category is the
    /// weakest the 3 cards already guarantee. Duplicate physical cards are not
    /// detected; such a hand resolves to [`HandType::Invalid`].
    pub fn evaluate(&self, cards: &[Card]) -> Result<EvaluatedHand, EvalError> {
        match cards.len() {
            3 => {
                let filled = fill_hand([cards[0], cards[1], cards[2]]);
                Ok(EvaluatedHand::from_value(self.value_of(&filled)))
            }
            5 | 6 | 7 => Ok(EvaluatedHand::from_value(self.value_of(cards))),
            n => Err(EvalError::InvalidHandSize(n)),
        }
    }

    /// Evaluate a hand given as card strings like `["As", "kd", "7c"]`.
    pub fn eval_hand(&self, cards: &[&str]) -> Result<EvaluatedHand, EvalError> {
        if !matches!(cards.len(), 3 | 5 | 6 | 7) {
            return Err(EvalError::InvalidHandSize(cards.len()));
        }
        let parsed = parse_cards(cards)?;
        self.evaluate(&parsed)
    }

    /// Evaluate a hand given as numeric 1-52 table codes.
    ///
    /// 3-card hands are rejected here: completion needs the symbolic
    /// rank/suit form, so they must go through [`Evaluator::eval_hand`].
    pub fn eval_hand_codes(&self, codes: &[u8]) -> Result<EvaluatedHand, EvalError> {
        match codes.len() {
            3 => Err(EvalError::ThreeCardCodes),
            5 | 6 | 7 => {
                let mut cards = Vec::with_capacity(codes.len());
                for &code in codes {
                    cards.push(Card::from_code(code).ok_or(EvalError::InvalidCardCode(code))?);
                }
                Ok(EvaluatedHand::from_value(self.value_of(&cards)))
            }
            n => Err(EvalError::InvalidHandSize(n)),
        }
    }

    /// Raw table walk over a 5-, 6-, or 7-card hand.
    ///
    /// The final value is order-independent for a given card multiset; that is
    /// a property of the table, not of this traversal.
    pub(crate) fn value_of(&self, cards: &[Card]) -> u32 {
        debug_assert!(matches!(cards.len(), 5 | 6 | 7));

        let mut p = INITIAL_STATE;
        for card in cards {
            p = self.slots[(p + card.code() as u32) as usize];
        }
        // 5- and 6-card walks need one extra lookup to resolve the encoding.
        if cards.len() < 7 {
            p = self.slots[p as usize];
        }
        p
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Evaluator({} table slots)", self.slots.len())
    }
}

/// Parse a slice of card strings, failing on the first bad one.
pub(crate) fn parse_cards(cards: &[&str]) -> Result<Vec<Card>, EvalError> {
    cards
        .iter()
        .map(|s| Card::from_str(s).ok_or_else(|| EvalError::InvalidCard(s.to_string())))
        .collect()
}
