use super::models::{DeltaCriteria, OptimalStrike, OptionQuote, OptionSide};
use super::processor::{annualized_yield, breakeven, otm_rows};
use crate::config::{self, SelectorConfig};
use crate::error::Result;
use tracing::{debug, warn};

/// Keep rows inside the delta window that clear the premium, volume and
/// spread thresholds, closest to the window midpoint first.
pub fn filter_by_delta(
    table: &[OptionQuote],
    side: OptionSide,
    criteria: &DeltaCriteria,
) -> Result<Vec<OptionQuote>> {
    criteria.validate()?;

    let mut filtered: Vec<OptionQuote> = table
        .iter()
        .filter(|q| q.matches_side(side))
        .filter(|q| passes_criteria(q, criteria))
        .cloned()
        .collect();

    // Stable: rows equally close keep their input order
    let target = criteria.target_delta();
    filtered.sort_by(|a, b| {
        let da = (a.abs_delta() - target).abs();
        let db = (b.abs_delta() - target).abs();
        da.total_cmp(&db)
    });

    debug!(
        %side,
        input = table.len(),
        kept = filtered.len(),
        min_delta = criteria.min_delta,
        max_delta = criteria.max_delta,
        "delta filter applied"
    );

    Ok(filtered)
}

fn passes_criteria(quote: &OptionQuote, criteria: &DeltaCriteria) -> bool {
    let abs_delta = quote.abs_delta();
    if abs_delta < criteria.min_delta || abs_delta > criteria.max_delta {
        return false;
    }
    if quote.mid_price < criteria.min_premium {
        return false;
    }

    // Volume only counts when the feed actually reports it
    if let Some(volume) = quote.volume.filter(|v| *v > 0.0) {
        if volume < criteria.min_volume {
            return false;
        }
    }

    quote.spread_pct.is_none_or(|spread| spread <= criteria.max_spread_pct)
}

/// Pick the out-of-the-money strike whose |delta| is closest to `target_delta`.
///
/// `underlying_price` defaults to the chain-wide value carried by the rows.
/// Returns `None` for an empty table, a target outside (0, 1) or when no
/// OTM row exists. Equal distances resolve to the earlier row.
pub fn select_optimal_strike(
    table: &[OptionQuote],
    side: OptionSide,
    target_delta: f64,
    underlying_price: Option<f64>,
    config: &SelectorConfig,
) -> Option<OptimalStrike> {
    let first = table.first()?;

    if !(target_delta > 0.0 && target_delta < 1.0) {
        warn!(target_delta, "target delta outside (0, 1), no strike selected");
        return None;
    }

    let underlying = underlying_price.unwrap_or(first.underlying_price);
    let candidates = otm_rows(table, side, underlying);

    let mut best: Option<(&OptionQuote, f64)> = None;
    for quote in candidates {
        let distance = (quote.abs_delta() - target_delta).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((quote, distance)),
        }
    }

    let Some((selected, distance)) = best else {
        debug!(%side, underlying, "no out-of-the-money rows");
        return None;
    };

    let optimal = build_optimal_strike(selected, side, underlying, config);
    debug!(
        %side,
        strike = optimal.quote.strike,
        delta = optimal.quote.delta,
        distance,
        annual_return = optimal.annual_return,
        "optimal strike selected"
    );
    Some(optimal)
}

fn build_optimal_strike(
    quote: &OptionQuote,
    side: OptionSide,
    underlying_price: f64,
    config: &SelectorConfig,
) -> OptimalStrike {
    let annual_return = annualized_yield(quote, side, underlying_price, quote.dte);
    let assignment_probability = quote.abs_delta() * 100.0;

    OptimalStrike {
        side,
        quote: quote.clone(),
        underlying_price,
        implied_volatility: quote.implied_volatility.unwrap_or(config.default_implied_volatility),
        theta: quote.theta.unwrap_or(config.default_theta),
        assignment_probability,
        annual_return,
        return_over_risk_free: annual_return - config.risk_free_rate,
        breakeven: breakeven(quote, side, underlying_price),
        premium_per_contract: quote.mid_price * config.contract_multiplier,
        reason: selection_reason(assignment_probability),
    }
}

/// Human-readable rationale tiered by assignment probability (percent)
pub fn selection_reason(assignment_probability: f64) -> String {
    if assignment_probability < config::CONSERVATIVE_TIER {
        format!(
            "Conservative: {:.1}% assignment probability, lower premium with a wide cushion",
            assignment_probability
        )
    } else if assignment_probability < config::BALANCED_TIER {
        format!(
            "Balanced: {:.1}% assignment probability, solid premium with moderate risk",
            assignment_probability
        )
    } else {
        format!(
            "Aggressive: {:.1}% assignment probability, maximum premium with higher assignment risk",
            assignment_probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(strike: f64, delta: f64, mid: f64) -> OptionQuote {
        OptionQuote::new(strike, mid - 0.05, mid + 0.05, delta, 30, 100.0)
    }

    #[test]
    fn test_select_tie_keeps_first_row() {
        let table = vec![put(94.0, -0.125, 1.5), put(92.0, -0.375, 1.1)];
        let strike = select_optimal_strike(&table, OptionSide::Put, 0.25, None, &SelectorConfig::default()).unwrap();
        assert_eq!(strike.quote.strike, 94.0);
    }

    #[test]
    fn test_select_rejects_out_of_range_target() {
        let table = vec![put(95.0, -0.30, 2.0)];
        let config = SelectorConfig::default();
        assert!(select_optimal_strike(&table, OptionSide::Put, 0.0, None, &config).is_none());
        assert!(select_optimal_strike(&table, OptionSide::Put, 1.0, None, &config).is_none());
    }

    #[test]
    fn test_select_applies_greek_defaults_from_config() {
        let table = vec![put(95.0, -0.30, 2.0)];
        let config = SelectorConfig {
            default_implied_volatility: 0.42,
            risk_free_rate: 0.05,
            ..SelectorConfig::default()
        };
        let strike = select_optimal_strike(&table, OptionSide::Put, 0.25, None, &config).unwrap();
        assert_eq!(strike.implied_volatility, 0.42);
        assert_eq!(strike.theta, 0.0);
        assert!((strike.return_over_risk_free - (strike.annual_return - 0.05)).abs() < 1e-12);
        assert!((strike.premium_per_contract - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_reason_tiers() {
        assert!(selection_reason(15.0).starts_with("Conservative"));
        assert!(selection_reason(20.0).starts_with("Balanced"));
        assert!(selection_reason(29.9).starts_with("Balanced"));
        assert!(selection_reason(30.0).starts_with("Aggressive"));
        assert!(selection_reason(15.0).contains("15.0%"));
    }

    #[test]
    fn test_filter_skips_rows_of_other_side() {
        let table = vec![
            put(95.0, -0.25, 2.0).with_side(OptionSide::Put),
            OptionQuote::new(105.0, 1.9, 2.1, 0.25, 30, 100.0).with_side(OptionSide::Call),
        ];
        let kept = filter_by_delta(&table, OptionSide::Put, &DeltaCriteria::window(0.1, 0.4)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].strike, 95.0);
    }
}
