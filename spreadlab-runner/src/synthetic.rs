//! Synthetic price tables for demos and tests.
//!
//! Three venues over one asset: a base random walk, and per-venue premiums
//! following a mean-reverting path with occasional spikes — the shape the
//! strategy hunts for. Everything derives from an explicit seed; the same
//! seed always produces byte-identical tables.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spreadlab_core::domain::PriceTable;

/// Venue column names produced by the generator, in order.
pub const VENUES: [&str; 3] = ["venue_a", "venue_b", "venue_c"];

/// Generate a three-venue price table of `days` daily rows.
pub fn synthetic_table(days: usize, seed: u64) -> PriceTable {
    assert!(days >= 2, "synthetic table needs at least 2 days");
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..days)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();

    // Base venue: geometric random walk around 2% daily vol
    let mut base = Vec::with_capacity(days);
    let mut price = 40_000.0;
    for _ in 0..days {
        price *= 1.0 + rng.gen_range(-0.02..0.02);
        base.push(price);
    }

    // Other venues: base price times (1 + premium), premium mean-reverting
    let venue_b = premium_path(&mut rng, &base, 0.01, 0.25, 0.004);
    let venue_c = premium_path(&mut rng, &base, -0.002, 0.2, 0.003);

    PriceTable::new(
        dates,
        vec![
            (VENUES[0].to_string(), base),
            (VENUES[1].to_string(), venue_b),
            (VENUES[2].to_string(), venue_c),
        ],
    )
    .expect("generator produces a valid table")
}

/// Price path for one venue: premium follows an Ornstein–Uhlenbeck-style
/// walk toward `mean` with reversion speed `theta`, plus a rare jump.
fn premium_path(
    rng: &mut StdRng,
    base: &[f64],
    mean: f64,
    theta: f64,
    vol: f64,
) -> Vec<f64> {
    let mut premium = mean;
    base.iter()
        .map(|&price| {
            premium += theta * (mean - premium) + rng.gen_range(-vol..vol);
            if rng.gen_bool(0.03) {
                // Occasional dislocation — what the strategy trades
                premium += rng.gen_range(-0.03..0.03);
            }
            price * (1.0 + premium)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_table() {
        let a = synthetic_table(120, 7);
        let b = synthetic_table(120, 7);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn different_seeds_differ() {
        let a = synthetic_table(120, 7);
        let b = synthetic_table(120, 8);
        assert_ne!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn has_all_venues_and_no_gaps() {
        let table = synthetic_table(60, 1);
        assert_eq!(table.len(), 60);
        for venue in VENUES {
            assert!(table.has_column(venue));
            for i in 0..table.len() {
                assert!(table.price(venue, i).is_some());
            }
        }
    }

    #[test]
    fn premiums_stay_plausible() {
        let table = synthetic_table(250, 42);
        for i in 0..table.len() {
            let a = table.price("venue_a", i).unwrap();
            let b = table.price("venue_b", i).unwrap();
            let premium = (b - a) / a;
            assert!(premium.abs() < 0.5, "premium blew up: {premium}");
        }
    }
}
