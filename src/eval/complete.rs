//! Deterministic completion of 3-card hands.
//!
//! The evaluator's table only resolves 5-, 6-, and 7-card walks, so a 3-card
//! hand is first extended with two filler cards. The fillers must not lift the
//! hand into a better category than the 3 cards already guarantee: no new
//! pair, no straight, no flush. Completion is a closed-form rule over the
//! hand's rank/suit structure; it never consults the ranking table.

use super::card::{Card, RANK_ACE, SUIT_DIAMONDS, SUIT_SPADES};

/// Rank-multiplicity pattern of a 3-card hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankPattern {
    /// All three ranks equal.
    Trips,
    /// Exactly two ranks equal.
    Pair,
    /// Three distinct ranks.
    Distinct,
}

impl RankPattern {
    fn of(cards: &[Card; 3]) -> Self {
        let (a, b, c) = (cards[0].rank(), cards[1].rank(), cards[2].rank());
        if a == b && b == c {
            Self::Trips
        } else if a == b || a == c || b == c {
            Self::Pair
        } else {
            Self::Distinct
        }
    }
}

/// Extend a 3-card hand to 5 cards without improving its category.
///
/// The output keeps the input cards in order, followed by the two fillers.
/// Filler ranks are the lowest ranks that match no rank already in the hand,
/// do not pair each other, and do not finish a straight; the first filler is
/// dealt as a spade and the second as a diamond, which caps every suit at four
/// of the five cards so no flush can form. Filler ranks never collide with the
/// input ranks, so those two physical cards are always still in the deck.
pub fn fill_hand(cards: [Card; 3]) -> [Card; 5] {
    let present = cards.iter().fold(0u16, |m, c| m | 1 << c.rank());

    let (r1, r2) = match RankPattern::of(&cards) {
        // One or two distinct ranks in the hand: with two fillers that is at
        // most four distinct ranks, so no straight can assemble. The fillers
        // only need to dodge the ranks already present, and each other.
        RankPattern::Trips | RankPattern::Pair => {
            let r1 = lowest_unblocked(present);
            let r2 = lowest_unblocked(present | 1 << r1);
            (r1, r2)
        }
        // Three distinct ranks: the second filler brings the hand to five
        // distinct ranks, so straight completion (wheel included) must be
        // dodged as well. The first filler alone leaves only four distinct
        // ranks and cannot finish one.
        RankPattern::Distinct => {
            let r1 = lowest_unblocked(present);
            let r2 = lowest_straight_safe(present | 1 << r1);
            (r1, r2)
        }
    };

    [
        cards[0],
        cards[1],
        cards[2],
        Card::new(r1, SUIT_SPADES),
        Card::new(r2, SUIT_DIAMONDS),
    ]
}

/// Lowest rank whose bit is not set in `blocked`.
fn lowest_unblocked(blocked: u16) -> u8 {
    for rank in 0..13 {
        if blocked & (1 << rank) == 0 {
            return rank;
        }
    }
    // At most five ranks are ever blocked out of thirteen.
    unreachable!("no rank available for hand completion")
}

/// Lowest rank not in `present` that does not finish a straight with it.
///
/// Every legal 3-card hand leaves such a rank; if a caller ever hands in a
/// rank set where none exists, the lowest free rank is taken anyway so the
/// completion stays total.
fn lowest_straight_safe(present: u16) -> u8 {
    for rank in 0..13 {
        let bit = 1 << rank;
        if present & bit == 0 && !makes_straight(present | bit) {
            return rank;
        }
    }
    lowest_unblocked(present)
}

/// Check whether a rank set contains five consecutive ranks, counting the
/// ace-low wheel (A-2-3-4-5).
fn makes_straight(ranks: u16) -> bool {
    const WHEEL: u16 = (1 << RANK_ACE) | 0b1111;
    if ranks & WHEEL == WHEEL {
        return true;
    }
    (0..=8).any(|lo| {
        let window = 0b11111 << lo;
        ranks & window == window
    })
}
