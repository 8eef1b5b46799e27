//! Simulation tallies and odds aggregation.
//!
//! A [`SimulationTally`] accumulates raw win and split counts over the cycles
//! of a run; [`TableOdds::from_tally`] turns the counts into per-player rates.
//! No smoothing or rounding is applied: the rates are raw sampled frequencies
//! whose precision is bounded by the cycle count.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Raw per-player win and split counts for one simulation run.
///
/// Split counts are bucketed by how many players tied: bucket 0 counts 2-way
/// splits, bucket 1 counts 3-way splits, up to a `player_count`-way split.
/// Tallies from independent batches combine by plain summation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTally {
    /// Outright wins per player.
    wins: Vec<u64>,
    /// Split counts per player, indexed by ways-tied minus two.
    splits: Vec<Vec<u64>>,
}

impl SimulationTally {
    /// Create an empty tally for `player_count` players.
    pub fn new(player_count: usize) -> Self {
        Self {
            wins: vec![0; player_count],
            splits: vec![vec![0; player_count.saturating_sub(1)]; player_count],
        }
    }

    /// Number of players tallied.
    pub fn player_count(&self) -> usize {
        self.wins.len()
    }

    /// Outright wins recorded for a player.
    pub fn wins(&self, player: usize) -> u64 {
        self.wins[player]
    }

    /// Splits of a given width recorded for a player.
    pub fn splits(&self, player: usize, ways: usize) -> u64 {
        self.splits[player][ways - 2]
    }

    /// Record the outcome of one completed cycle.
    ///
    /// A single winner takes a win; tied winners each take one split of the
    /// tie's width, and nobody takes a win.
    pub fn record_cycle(&mut self, winners: &[usize]) {
        debug_assert!(!winners.is_empty(), "every cycle has at least one winner");
        if let [winner] = winners {
            self.wins[*winner] += 1;
        } else {
            let bucket = winners.len() - 2;
            for &player in winners {
                self.splits[player][bucket] += 1;
            }
        }
    }

    /// Combine two tallies by summing their counts.
    pub fn merge(mut self, other: Self) -> Self {
        debug_assert_eq!(self.player_count(), other.player_count());
        for (a, b) in self.wins.iter_mut().zip(other.wins) {
            *a += b;
        }
        for (row_a, row_b) in self.splits.iter_mut().zip(other.splits) {
            for (a, b) in row_a.iter_mut().zip(row_b) {
                *a += b;
            }
        }
        self
    }
}

/// One split-rate bucket of a player's odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRate {
    /// Fraction of cycles that ended in a split of this width.
    pub rate: f64,
    /// How many players shared the pot.
    pub ways: usize,
}

/// Estimated odds for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerOdds {
    /// Fraction of cycles this player won outright.
    pub win_rate: f64,
    /// Split frequency per tie width (2-way up to table size).
    pub split_rates: Vec<SplitRate>,
}

/// Estimated odds for every player at the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOdds {
    /// Odds per player, in the order hands were supplied.
    pub players: Vec<PlayerOdds>,
}

impl TableOdds {
    /// Convert raw tallies into per-player rates.
    pub fn from_tally(tally: &SimulationTally, cycles: u32) -> Self {
        debug_assert!(cycles > 0);
        let cycles = cycles as f64;
        let players = (0..tally.player_count())
            .map(|p| PlayerOdds {
                win_rate: tally.wins[p] as f64 / cycles,
                split_rates: tally.splits[p]
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| SplitRate {
                        rate: count as f64 / cycles,
                        ways: i + 2,
                    })
                    .collect(),
            })
            .collect();
        Self { players }
    }

    /// Save the odds report to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_winner_counts_as_win() {
        let mut tally = SimulationTally::new(3);
        tally.record_cycle(&[1]);
        tally.record_cycle(&[1]);
        tally.record_cycle(&[2]);

        assert_eq!(tally.wins(0), 0);
        assert_eq!(tally.wins(1), 2);
        assert_eq!(tally.wins(2), 1);
    }

    #[test]
    fn test_split_counts_each_tied_player_once() {
        let mut tally = SimulationTally::new(4);
        tally.record_cycle(&[0, 2, 3]);

        for player in [0, 2, 3] {
            assert_eq!(tally.splits(player, 3), 1);
            assert_eq!(tally.splits(player, 2), 0);
            assert_eq!(tally.splits(player, 4), 0);
            assert_eq!(tally.wins(player), 0, "a split is not a win");
        }
        assert_eq!(tally.splits(1, 3), 0);
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut a = SimulationTally::new(2);
        a.record_cycle(&[0]);
        a.record_cycle(&[0, 1]);

        let mut b = SimulationTally::new(2);
        b.record_cycle(&[0]);
        b.record_cycle(&[1]);
        b.record_cycle(&[0, 1]);

        let merged = a.merge(b);
        assert_eq!(merged.wins(0), 2);
        assert_eq!(merged.wins(1), 1);
        assert_eq!(merged.splits(0, 2), 2);
        assert_eq!(merged.splits(1, 2), 2);
    }

    #[test]
    fn test_rates_are_counts_over_cycles() {
        let mut tally = SimulationTally::new(3);
        for _ in 0..5 {
            tally.record_cycle(&[0]);
        }
        for _ in 0..2 {
            tally.record_cycle(&[0, 1]);
        }
        tally.record_cycle(&[0, 1, 2]);
        // 8 cycles total
        let odds = TableOdds::from_tally(&tally, 8);

        assert_eq!(odds.players.len(), 3);
        assert_eq!(odds.players[0].win_rate, 5.0 / 8.0);
        assert_eq!(odds.players[1].win_rate, 0.0);

        let p0 = &odds.players[0].split_rates;
        assert_eq!(p0.len(), 2);
        assert_eq!(p0[0].ways, 2);
        assert_eq!(p0[0].rate, 2.0 / 8.0);
        assert_eq!(p0[1].ways, 3);
        assert_eq!(p0[1].rate, 1.0 / 8.0);

        let p2 = &odds.players[2].split_rates;
        assert_eq!(p2[0].rate, 0.0);
        assert_eq!(p2[1].rate, 1.0 / 8.0);
    }

    #[test]
    fn test_heads_up_tally_has_single_split_bucket() {
        let tally = SimulationTally::new(2);
        let odds = TableOdds::from_tally(&tally, 1);
        assert_eq!(odds.players[0].split_rates.len(), 1);
        assert_eq!(odds.players[0].split_rates[0].ways, 2);
    }
}
