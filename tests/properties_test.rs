//! Property tests for the analytics invariants.

mod common;

use approx::assert_abs_diff_eq;
use chrono::{Duration, NaiveDate};
use common::make_record;
use proptest::prelude::*;
use tradejournal::domain::analytics;
use tradejournal::domain::calculator::{self, RiskReward};
use tradejournal::domain::trade::TradeEntry;

fn entries_strategy() -> impl Strategy<Value = Vec<TradeEntry>> {
    prop::collection::vec(
        (0i64..60, prop::option::weighted(0.9, -5_000i32..5_000)),
        0..40,
    )
    .prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (offset, cents))| {
                let day = (base + Duration::days(offset)).format("%Y-%m-%d").to_string();
                let pnl = cents.map(|c| c as f64 / 100.0);
                TradeEntry::new(format!("t{i:03}"), make_record(&day, "EURUSD", pnl))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn winners_and_losers_cover_all(entries in entries_strategy()) {
        let s = analytics::summary_stats(&entries);
        prop_assert_eq!(s.winners + s.losers, s.total_trades);
        let b = analytics::win_loss_breakdown(&entries);
        prop_assert_eq!(b.winners, s.winners);
        prop_assert_eq!(b.losers, s.losers);
        prop_assert!(s.break_even_trades <= s.total_trades);
    }

    #[test]
    fn win_rate_is_a_percentage(entries in entries_strategy()) {
        let s = analytics::summary_stats(&entries);
        prop_assert!(s.win_rate <= 100);
        if s.total_trades == 0 {
            prop_assert_eq!(s.win_rate, 0);
        }
    }

    #[test]
    fn profit_factor_absent_only_without_losses(entries in entries_strategy()) {
        let s = analytics::summary_stats(&entries);
        prop_assert_eq!(s.profit_factor.is_none(), s.gross_loss == 0.0);
        if let Some(pf) = s.profit_factor {
            prop_assert!(pf >= 0.0);
        }
    }

    #[test]
    fn cumulative_ends_at_total(entries in entries_strategy()) {
        let s = analytics::summary_stats(&entries);
        let daily = analytics::daily_cumulative_pnl(&entries);
        match daily.last() {
            Some(last) => assert_abs_diff_eq!(last.cumulative_pnl, s.total_pnl, epsilon = 0.011),
            None => prop_assert!(entries.is_empty()),
        }
        for pair in daily.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn sorting_is_by_date(mut entries in entries_strategy()) {
        analytics::sort_by_date(&mut entries);
        for pair in entries.windows(2) {
            prop_assert!(pair[0].date() <= pair[1].date());
        }
    }

    #[test]
    fn risk_reward_is_non_negative(
        entry in 1.0f64..3000.0,
        stop_offset in -50.0f64..50.0,
        target_offset in -50.0f64..50.0,
    ) {
        match calculator::risk_reward(Some(entry), Some(entry + stop_offset), Some(entry + target_offset)) {
            RiskReward::Ratio(r) => prop_assert!(r >= 0.0 && r.is_finite()),
            RiskReward::NotApplicable => prop_assert!(entry + stop_offset == entry),
        }
    }
}
