use super::models::{OptionQuote, OptionSide, RankedStrike};
use super::processor::{annualized_yield, otm_rows};
use crate::config::{self, SelectorConfig};
use tracing::debug;

/// Rank out-of-the-money strikes by a composite income score and keep the top `top_n`.
///
/// Score = weighted yield, safety (low |delta|) and liquidity (tight spread),
/// each normalized by its table-wide maximum.
pub fn rank_strikes_for_income(
    table: &[OptionQuote],
    side: OptionSide,
    top_n: usize,
    config: &SelectorConfig,
) -> Vec<RankedStrike> {
    let Some(first) = table.first() else {
        return Vec::new();
    };

    // Chain-wide values
    let underlying = first.underlying_price;
    let dte = first.dte;

    let candidates = otm_rows(table, side, underlying);
    if candidates.is_empty() {
        return Vec::new();
    }

    let yields: Vec<f64> = candidates
        .iter()
        .map(|q| annualized_yield(q, side, underlying, dte))
        .collect();

    let max_yield = yields.iter().copied().fold(0.0, f64::max);
    let max_delta = candidates.iter().map(|q| q.abs_delta()).fold(0.0, f64::max);
    let max_spread = candidates
        .iter()
        .filter_map(|q| q.spread_pct)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))));

    let mut ranked: Vec<RankedStrike> = candidates
        .into_iter()
        .zip(yields)
        .map(|(quote, annual_yield)| {
            let yield_score = ratio_or_zero(annual_yield, max_yield);
            let delta_score = if max_delta > 0.0 {
                1.0 - quote.abs_delta() / max_delta
            } else {
                0.0
            };
            let spread_score = spread_score(quote.spread_pct, max_spread);

            let income_score = (config.yield_weight * yield_score
                + config.delta_weight * delta_score
                + config.spread_weight * spread_score)
                .clamp(0.0, 1.0);

            RankedStrike {
                quote: quote.clone(),
                annual_yield,
                yield_score,
                delta_score,
                spread_score,
                income_score,
            }
        })
        .collect();

    // Stable: equal scores keep chain order
    ranked.sort_by(|a, b| b.income_score.total_cmp(&a.income_score));
    ranked.truncate(top_n);

    debug!(%side, dte, ranked = ranked.len(), top_n, "strikes ranked for income");
    ranked
}

fn ratio_or_zero(value: f64, max: f64) -> f64 {
    if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 }
}

fn spread_score(spread: Option<f64>, max_spread: Option<f64>) -> f64 {
    match (spread, max_spread) {
        (Some(spread), Some(max)) if max > 0.0 => (1.0 - spread / max).clamp(0.0, 1.0),
        (Some(_), Some(_)) => 0.0,
        _ => config::NEUTRAL_SPREAD_SCORE,
    }
}
