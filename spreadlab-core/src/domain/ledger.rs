//! Capital ledger — the one piece of mutable state in a simulation run.
//!
//! The ledger is owned by the simulation loop and threaded through each
//! date step: it records one capital point per simulated date and settles
//! closed positions into trades. Nothing else mutates capital.

use super::pair::Direction;
use super::position::Position;
use super::trade::{ExitReason, Trade};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One equity-curve point. Appended every simulated date regardless of
/// position state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCapitalRecord {
    pub date: NaiveDate,
    pub capital: f64,
}

/// Capital accumulator plus the trade log and daily equity curve.
#[derive(Debug, Clone)]
pub struct CapitalLedger {
    initial_capital: f64,
    capital: f64,
    trades: Vec<Trade>,
    daily: Vec<DailyCapitalRecord>,
}

impl CapitalLedger {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            capital: initial_capital,
            trades: Vec::new(),
            daily: Vec::new(),
        }
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn daily_capital(&self) -> &[DailyCapitalRecord] {
        &self.daily
    }

    /// Append the equity point for one simulated date.
    pub fn record_day(&mut self, date: NaiveDate) {
        self.daily.push(DailyCapitalRecord {
            date,
            capital: self.capital,
        });
    }

    /// Settle a closing position: compound capital and append the trade.
    pub fn settle(
        &mut self,
        position: &Position,
        exit_date: NaiveDate,
        gross_return: f64,
        net_return: f64,
        exit_reason: ExitReason,
    ) -> &Trade {
        let profit = self.capital * net_return;
        self.capital += profit;
        self.trades.push(Trade {
            pair_id: position.pair_id.clone(),
            direction: position.direction,
            entry_date: position.entry_date,
            exit_date,
            holding_days: position.holding_days(exit_date),
            gross_return,
            net_return,
            profit,
            capital_after: self.capital,
            exit_reason,
        });
        self.trades.last().expect("trade was just pushed")
    }

    /// Consume the ledger into its outputs.
    pub fn into_parts(self) -> (Vec<Trade>, Vec<DailyCapitalRecord>, f64) {
        (self.trades, self.daily, self.capital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn open_position(entry_day: u32) -> Position {
        Position {
            pair_index: 0,
            pair_id: "a_b".into(),
            direction: Direction::ShortPremium,
            entry_index: 0,
            entry_date: d(entry_day),
            entry_price_high: 110.0,
            entry_price_low: 100.0,
        }
    }

    #[test]
    fn settle_compounds_capital() {
        let mut ledger = CapitalLedger::new(1_000_000.0);
        ledger.settle(&open_position(1), d(6), 0.02, 0.01, ExitReason::ZScoreReversion);
        assert!((ledger.capital() - 1_010_000.0).abs() < 1e-6);

        // Second trade compounds on the new capital, not the initial
        ledger.settle(&open_position(7), d(9), 0.02, 0.01, ExitReason::StopLoss);
        assert!((ledger.capital() - 1_020_100.0).abs() < 1e-6);
        assert_eq!(ledger.trades().len(), 2);
        assert_eq!(ledger.trades()[1].capital_after, ledger.capital());
    }

    #[test]
    fn trade_fields_derive_from_position() {
        let mut ledger = CapitalLedger::new(100.0);
        let trade = ledger
            .settle(&open_position(1), d(11), -0.02, -0.031, ExitReason::StopLoss)
            .clone();
        assert_eq!(trade.holding_days, 10);
        assert_eq!(trade.entry_date, d(1));
        assert_eq!(trade.exit_date, d(11));
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert!(trade.profit < 0.0);
    }

    #[test]
    fn record_day_tracks_flat_capital() {
        let mut ledger = CapitalLedger::new(500.0);
        ledger.record_day(d(1));
        ledger.record_day(d(2));
        assert_eq!(ledger.daily_capital().len(), 2);
        assert!(ledger.daily_capital().iter().all(|r| r.capital == 500.0));
    }
}
