//! The position state machine and date loop.
//!
//! States: FLAT and OPEN. One pass over the dates in ascending order; a
//! date's decision uses only information up to and including that date.
//! The loop owns the capital ledger and the single optional position —
//! there is no other mutable state.
//!
//! Per date, in this order:
//! 1. FLAT and a qualifying signal → open a position at today's prices.
//! 2. OPEN → evaluate exits for the held pair: mean reversion, then
//!    stop-loss, then max holding. The first hit wins; an exit leaves the
//!    machine FLAT for the *next* date (no same-date re-entry).
//! 3. Append the daily capital record either way.

use crate::domain::{
    CapitalLedger, DailyCapitalRecord, Direction, ExitReason, PairConfig, Position, PriceTable,
    Trade,
};
use crate::engine::config::{apply_exclusions, StrategyParams};
use crate::error::ConfigError;
use crate::indicators::{compute_indicators, IndicatorSet};
use crate::signal::{select, Candidate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result of a simulation attempt. Too little data is a structured
/// outcome, not an error: the caller decides how to explain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SimulationOutcome {
    InsufficientData { rows: usize, required: usize },
    Completed(SimulationReport),
}

/// A position still open when the date range ran out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPositionReport {
    pub position: Position,
    pub holding_days: i64,
    /// Unrealized returns at the last date both legs were priced; None if
    /// no such date existed after entry.
    pub unrealized_gross_return: Option<f64>,
    pub unrealized_net_return: Option<f64>,
}

/// Everything a completed simulation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub trades: Vec<Trade>,
    pub daily_capital: Vec<DailyCapitalRecord>,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub open_position: Option<OpenPositionReport>,
}

/// Run the full simulation over a price table.
///
/// Errors only for configuration mistakes (invalid parameters, empty or
/// unknown pair universe). Data conditions come back as
/// [`SimulationOutcome::InsufficientData`] or inside the report.
pub fn run_simulation(
    table: &PriceTable,
    pairs: &[PairConfig],
    params: &StrategyParams,
) -> Result<SimulationOutcome, ConfigError> {
    params.validate()?;
    let active = apply_exclusions(pairs, &params.exclude_pairs);
    if active.is_empty() {
        return Err(ConfigError::EmptyPairList);
    }
    let required = params.rolling_window + 1;
    if table.len() < required {
        return Ok(SimulationOutcome::InsufficientData {
            rows: table.len(),
            required,
        });
    }
    let indicators = compute_indicators(table, &active, params.rolling_window)?;

    let mut ledger = CapitalLedger::new(params.initial_capital);
    let mut position: Option<Position> = None;

    for index in indicators.tradeable_start()..table.len() {
        let date = table.date_at(index);

        if let Some(pos) = &position {
            let pair = &active[pos.pair_index];
            if let Some(exit) = evaluate_exit(pos, pair, table, &indicators, index, params) {
                ledger.settle(pos, date, exit.gross_return, exit.net_return, exit.reason);
                position = None;
            }
        } else if let Some(candidate) = select(&indicators, index, params.entry_z).actionable {
            position = open_position(&active, table, &candidate, index, date);
        }

        ledger.record_day(date);
    }

    let open_position = position.and_then(|pos| {
        finish_open_position(pos, &active, table, params, &mut ledger)
    });

    let (trades, daily_capital, final_capital) = ledger.into_parts();
    Ok(SimulationOutcome::Completed(SimulationReport {
        trades,
        daily_capital,
        initial_capital: params.initial_capital,
        final_capital,
        open_position,
    }))
}

/// Forward projection of a single hypothetical trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionProjection {
    pub pair_id: String,
    pub direction: Direction,
    pub entry_date: NaiveDate,
    /// None when no exit fired inside the loaded window.
    pub exit_date: Option<NaiveDate>,
    pub exit_reason: Option<ExitReason>,
    pub holding_days: i64,
    pub gross_return: f64,
    pub net_return: f64,
}

/// Open a position at `start_index` and walk forward until its first exit;
/// mark to market at the window end if none fires.
///
/// This is the single-trade mode used by recommendation surfaces. It shares
/// the exit logic with the main loop, so a projection can never disagree
/// with what a real run would have done.
pub fn project_position(
    table: &PriceTable,
    indicators: &IndicatorSet,
    active: &[PairConfig],
    candidate: &Candidate,
    start_index: usize,
    params: &StrategyParams,
) -> Option<PositionProjection> {
    let entry_date = table.date_at(start_index);
    let position = open_position(active, table, candidate, start_index, entry_date)?;
    let pair = &active[position.pair_index];

    for index in (start_index + 1)..table.len() {
        if let Some(exit) = evaluate_exit(&position, pair, table, indicators, index, params) {
            let exit_date = table.date_at(index);
            return Some(PositionProjection {
                pair_id: position.pair_id,
                direction: position.direction,
                entry_date,
                exit_date: Some(exit_date),
                exit_reason: Some(exit.reason),
                holding_days: (exit_date - entry_date).num_days(),
                gross_return: exit.gross_return,
                net_return: exit.net_return,
            });
        }
    }

    // No exit inside the window: mark to market at the last priceable date.
    let (last_index, gross) = last_markable(&position, pair, table, start_index)?;
    let last_date = table.date_at(last_index);
    Some(PositionProjection {
        pair_id: position.pair_id.clone(),
        direction: position.direction,
        entry_date,
        exit_date: None,
        exit_reason: None,
        holding_days: (last_date - entry_date).num_days(),
        gross_return: gross,
        net_return: gross - params.round_trip_cost(),
    })
}

struct ExitEvaluation {
    reason: ExitReason,
    gross_return: f64,
    net_return: f64,
}

/// Exit check for one date, in strict priority order. None means hold —
/// including when the held pair has no prices for this date.
fn evaluate_exit(
    position: &Position,
    pair: &PairConfig,
    table: &PriceTable,
    indicators: &IndicatorSet,
    index: usize,
    params: &StrategyParams,
) -> Option<ExitEvaluation> {
    let current_high = table.price(&pair.high_column, index)?;
    let current_low = table.price(&pair.low_column, index)?;

    let gross_return = position.gross_return(current_high, current_low);
    let net_return = gross_return - params.round_trip_cost();
    let z = indicators.series()[position.pair_index].z_score[index];

    // NaN |z| fails the comparison, so a gap in the statistics can never
    // fire the reversion exit.
    let reason = if z.abs() < params.exit_z {
        ExitReason::ZScoreReversion
    } else if net_return <= params.stop_loss {
        ExitReason::StopLoss
    } else if position.holding_days(table.date_at(index)) >= params.max_holding_days {
        ExitReason::MaxHoldingDays
    } else {
        return None;
    };

    Some(ExitEvaluation {
        reason,
        gross_return,
        net_return,
    })
}

/// Open a position for a selected candidate. The candidate's z-score was
/// computed from today's prices, so both legs are priced; the lookups stay
/// checked anyway rather than panicking on a violated assumption.
fn open_position(
    active: &[PairConfig],
    table: &PriceTable,
    candidate: &Candidate,
    index: usize,
    date: NaiveDate,
) -> Option<Position> {
    let pair = &active[candidate.pair_index];
    let entry_price_high = table.price(&pair.high_column, index)?;
    let entry_price_low = table.price(&pair.low_column, index)?;
    Some(Position {
        pair_index: candidate.pair_index,
        pair_id: pair.pair_id.clone(),
        direction: candidate.direction,
        entry_index: index,
        entry_date: date,
        entry_price_high,
        entry_price_low,
    })
}

/// Last index at or after entry where both legs are priced, with the gross
/// return there.
fn last_markable(
    position: &Position,
    pair: &PairConfig,
    table: &PriceTable,
    from_index: usize,
) -> Option<(usize, f64)> {
    (from_index..table.len()).rev().find_map(|i| {
        let high = table.price(&pair.high_column, i)?;
        let low = table.price(&pair.low_column, i)?;
        Some((i, position.gross_return(high, low)))
    })
}

/// Resolve a position still open at range end: either mark-to-market close
/// it into the ledger (`close_at_end`) or report it unrealized.
fn finish_open_position(
    position: Position,
    active: &[PairConfig],
    table: &PriceTable,
    params: &StrategyParams,
    ledger: &mut CapitalLedger,
) -> Option<OpenPositionReport> {
    let pair = &active[position.pair_index];
    let marked = last_markable(&position, pair, table, position.entry_index);

    if params.close_at_end {
        if let Some((index, gross)) = marked {
            let net = gross - params.round_trip_cost();
            ledger.settle(&position, table.date_at(index), gross, net, ExitReason::EndOfData);
            return None;
        }
        // Nothing to mark against; fall through to an unrealized report.
    }

    let (gross, net) = match marked {
        Some((_, gross)) => (Some(gross), Some(gross - params.round_trip_cost())),
        None => (None, None),
    };
    Some(OpenPositionReport {
        holding_days: position.holding_days(table.last_date()),
        position,
        unrealized_gross_return: gross,
        unrealized_net_return: net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    /// One pair over a flat low leg; premium = high/100 − 1.
    fn table_from_highs(highs: &[f64]) -> PriceTable {
        PriceTable::new(
            (0..highs.len()).map(d).collect(),
            vec![
                ("alpha".into(), highs.to_vec()),
                ("beta".into(), vec![100.0; highs.len()]),
            ],
        )
        .unwrap()
    }

    fn pairs() -> Vec<PairConfig> {
        vec![PairConfig::new("alpha", "beta")]
    }

    fn params(window: usize, entry_z: f64, exit_z: f64) -> StrategyParams {
        StrategyParams {
            rolling_window: window,
            entry_z,
            exit_z,
            ..Default::default()
        }
    }

    #[test]
    fn too_few_rows_is_structured_not_an_error() {
        let table = table_from_highs(&[101.0; 10]);
        let outcome = run_simulation(&table, &pairs(), &params(30, 2.0, 0.5)).unwrap();
        match outcome {
            SimulationOutcome::InsufficientData { rows, required } => {
                assert_eq!(rows, 10);
                assert_eq!(required, 31);
            }
            SimulationOutcome::Completed(_) => panic!("expected insufficient data"),
        }
    }

    #[test]
    fn fully_excluded_universe_is_a_config_error() {
        let table = table_from_highs(&[101.0; 40]);
        let mut p = params(30, 2.0, 0.5);
        p.exclude_pairs.insert("alpha_beta".into());
        assert_eq!(
            run_simulation(&table, &pairs(), &p).unwrap_err(),
            ConfigError::EmptyPairList
        );
    }

    #[test]
    fn invalid_params_fail_before_data_is_touched() {
        let table = table_from_highs(&[101.0; 2]);
        let mut p = params(30, 2.0, 0.5);
        p.exit_z = 3.0;
        assert!(run_simulation(&table, &pairs(), &p).is_err());
    }

    #[test]
    fn flat_premium_produces_no_trades_and_full_equity_curve() {
        // |premium| > 0 throughout, but constant ⇒ zero variance ⇒ no z
        let table = table_from_highs(&[105.0; 20]);
        let outcome = run_simulation(&table, &pairs(), &params(8, 2.0, 0.5)).unwrap();
        let report = match outcome {
            SimulationOutcome::Completed(r) => r,
            _ => panic!("enough rows"),
        };
        assert!(report.trades.is_empty());
        assert!(report.open_position.is_none());
        // One capital record per simulated (post-warmup) date
        assert_eq!(report.daily_capital.len(), 20 - 8);
        assert!(report
            .daily_capital
            .iter()
            .all(|r| r.capital == report.initial_capital));
    }

    #[test]
    fn missing_prices_hold_but_still_record_capital() {
        // Spike at index 8 opens a short; indices 9..=10 have a NaN leg, so
        // exit evaluation is skipped while capital keeps being recorded.
        // With max_holding_days = 1 the time exit is due on day 9, but it
        // can only fire on day 11 — the first date the pair is priced again.
        let mut highs = vec![101.0, 101.5, 101.0, 101.5, 101.0, 101.5, 101.0, 101.5, 112.0];
        highs.extend([f64::NAN, f64::NAN, 101.0, 101.0, 101.0]);
        let table = table_from_highs(&highs);
        let mut p = params(8, 2.0, 0.5);
        p.max_holding_days = 1;
        let outcome = run_simulation(&table, &pairs(), &p).unwrap();
        let report = match outcome {
            SimulationOutcome::Completed(r) => r,
            _ => panic!("enough rows"),
        };
        assert_eq!(report.daily_capital.len(), highs.len() - 8);
        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_date, d(8));
        assert_eq!(trade.exit_date, d(11));
        assert_eq!(trade.exit_reason, ExitReason::MaxHoldingDays);
        // Short premium gained as the gap closed
        assert!(trade.gross_return > 0.0);
    }

    #[test]
    fn close_at_end_realizes_the_open_position() {
        // Spike on the final date: position opens and the range ends.
        let highs = vec![101.0, 101.5, 101.0, 101.5, 101.0, 101.5, 101.0, 101.5, 112.0];
        let table = table_from_highs(&highs);

        let open_run = run_simulation(&table, &pairs(), &params(8, 2.0, 0.5)).unwrap();
        let report = match open_run {
            SimulationOutcome::Completed(r) => r,
            _ => panic!("enough rows"),
        };
        assert!(report.trades.is_empty());
        let open = report.open_position.expect("position left open");
        assert_eq!(open.position.entry_date, d(8));
        assert_eq!(open.unrealized_gross_return, Some(0.0));

        let mut p = params(8, 2.0, 0.5);
        p.close_at_end = true;
        let closed_run = run_simulation(&table, &pairs(), &p).unwrap();
        let report = match closed_run {
            SimulationOutcome::Completed(r) => r,
            _ => panic!("enough rows"),
        };
        assert!(report.open_position.is_none());
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].exit_reason, ExitReason::EndOfData);
    }
}
