//! # Poker Odds
//!
//! Table-driven poker hand ranking and Monte Carlo win-odds estimation.
//!
//! ## Features
//!
//! - **Table-Driven Evaluation**: 3/5/6/7-card hands rank through a
//!   precomputed transition table, not per-hand combinatorics
//! - **Safe 3-Card Completion**: partial hands extend to 5 cards without
//!   inflating their category
//! - **Monte Carlo Equity**: win and split-pot odds from repeated random
//!   deals, with per-batch RNGs for reproducible seeded runs
//! - **Parallel Simulation**: cycles spread over a rayon pool and tallies
//!   merge by summation
//!
//! ## Quick Start
//!
//! ```ignore
//! use poker_odds::{OddsEngine, SimConfig};
//!
//! // 1. Load the ranking table artifact once
//! let engine = OddsEngine::load("data/HandRanks.dat")?;
//!
//! // 2. Rank a hand
//! let hand = engine.evaluator().eval_hand(&["As", "Ks", "Qs", "Js", "Ts"])?;
//! println!("{} (value {})", hand.hand_name(), hand.value);
//!
//! // 3. Estimate odds of pocket aces at a 5-player table
//! let odds = engine.winning_odds_for_player(&["As", "Ac"], &[], 5, 10_000)?;
//! println!("win rate: {:.3}", odds.win_rate);
//! ```
//!
//! ## Modules
//!
//! - [`eval`]: cards, the ranking-table evaluator, 3-card completion
//! - [`sim`]: the Monte Carlo equity engine and odds aggregation
//!
//! ## Data Flow
//!
//! ```text
//! card strings / codes ──▶ Card ──┬──▶ Evaluator ──▶ EvaluatedHand
//!                                 │        ▲
//!                                 │        │ every cycle
//!                                 └──▶ OddsEngine ──▶ SimulationTally ──▶ TableOdds
//! ```

#![warn(missing_docs)]

/// Hand evaluation module.
///
/// Cards, the table-driven evaluator, and 3-card hand completion.
pub mod eval;

/// Simulation module.
///
/// The Monte Carlo equity engine, its configuration, and odds aggregation.
pub mod sim;

// Re-export commonly used types at crate root for convenience
pub use eval::{Card, Deck, EvalError, EvaluatedHand, Evaluator, HandType};
pub use sim::{OddsEngine, PlayerOdds, SimConfig, SimError, SimulationTally, TableOdds};
