//! Win-odds demo binary.
//!
//! Estimates one hand's winning odds against unknown opponents:
//!
//! ```text
//! odds [hole] [community] [players] [cycles]
//! odds AsAc "" 5 20000
//! odds 9d8c 3hTcJd 4 50000
//! ```
//!
//! The ranking table is read from `HANDRANKS_PATH` (default
//! `data/HandRanks.dat`).

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use poker_odds::eval::Card;
use poker_odds::{OddsEngine, SimulationTally, TableOdds};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let hole = args.get(1).map(String::as_str).unwrap_or("AsAc");
    let community = args.get(2).map(String::as_str).unwrap_or("");
    let players: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(5);
    let cycles: u32 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(10_000);

    let table_path = std::env::var("HANDRANKS_PATH")
        .unwrap_or_else(|_| "data/HandRanks.dat".to_string());

    println!("=== Poker Odds ===");
    println!(
        "Hand: {} | Board: {} | Players: {} | Cycles: {}\n",
        hole,
        if community.is_empty() { "-" } else { community },
        players,
        cycles
    );

    let engine = match OddsEngine::load(&table_path) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("failed to load ranking table from {}: {}", table_path, e);
            std::process::exit(1);
        }
    };

    let hole_cards = parse_cards_arg(hole);
    let community_cards = parse_cards_arg(community);
    let known_hands = vec![hole_cards];

    let start = Instant::now();
    let pb = ProgressBar::new(cycles as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} cycles ({eta})").unwrap(),
    );

    // Run in slices so the bar moves; tallies merge by summation.
    let slice = (cycles / 100).max(1);
    let mut tally = SimulationTally::new(players);
    let mut remaining = cycles;
    while remaining > 0 {
        let n = remaining.min(slice);
        match engine.simulate(&known_hands, &community_cards, players, n) {
            Ok(part) => tally = tally.merge(part),
            Err(e) => {
                pb.finish_and_clear();
                eprintln!("simulation failed: {}", e);
                std::process::exit(1);
            }
        }
        pb.inc(n as u64);
        remaining -= n;
    }
    pb.finish_and_clear();

    let odds = TableOdds::from_tally(&tally, cycles);
    let player = &odds.players[0];

    println!("Win rate: {:.4}", player.win_rate);
    for split in &player.split_rates {
        if split.rate > 0.0 {
            println!("{}-way split rate: {:.4}", split.ways, split.rate);
        }
    }
    println!("\nElapsed: {:.2}s", start.elapsed().as_secs_f64());

    match serde_json::to_string_pretty(player) {
        Ok(json) => println!("\n{}", json),
        Err(e) => eprintln!("failed to serialize odds: {}", e),
    }
}

/// Parse a run of concatenated cards like "AsAc" or "3h Tc jd".
fn parse_cards_arg(s: &str) -> Vec<Card> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if !compact.is_ascii() || compact.len() % 2 != 0 {
        eprintln!("cannot read card list {:?}", s);
        std::process::exit(1);
    }

    let mut cards = Vec::with_capacity(compact.len() / 2);
    for i in (0..compact.len()).step_by(2) {
        let chunk = &compact[i..i + 2];
        match Card::from_str(chunk) {
            Some(card) => cards.push(card),
            None => {
                eprintln!("invalid card {:?} in {:?}", chunk, s);
                std::process::exit(1);
            }
        }
    }
    cards
}
