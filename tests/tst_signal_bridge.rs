use chrono::NaiveDate;
use income_analyzer::strikes::{
    parse_option_chain,
    recommend_batch,
    recommend_from_signal,
    AgentSignal,
    OptionChain,
    OptionSide,
    SignalDirection,
};
use income_analyzer::SelectorConfig;

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_JSON: &str = r#"{
        "symbol": "AAPL",
        "underlyingPrice": 100.0,
        "expiration": "2025-12-19",
        "calls": [
            {"strike": 95,  "bid": 5.9,  "ask": 6.1,  "delta": 0.75},
            {"strike": 105, "bid": 0.9,  "ask": 1.1,  "delta": 0.30},
            {"strike": 110, "bid": 0.35, "ask": 0.45, "delta": 0.18}
        ],
        "puts": [
            {"strike": 95, "bid": 1.9, "ask": 2.1, "delta": -0.30},
            {"strike": 90, "bid": 0.7, "ask": 0.9, "delta": -0.15}
        ]
    }"#;

    fn chain() -> OptionChain {
        let today = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
        parse_option_chain(CHAIN_JSON, today).unwrap()
    }

    fn signal(ticker: &str, direction: SignalDirection, confidence: f64) -> AgentSignal {
        AgentSignal {
            ticker: ticker.to_string(),
            direction,
            confidence,
        }
    }

    #[test]
    fn test_bullish_signal_sells_put() {
        let rec = recommend_from_signal(&signal("AAPL", SignalDirection::Bullish, 0.75), &chain(), &SelectorConfig::default())
            .unwrap();

        assert_eq!(rec.side, OptionSide::Put);
        assert_eq!(rec.strategy, "cash-secured put");
        assert!((rec.target_delta - 0.25).abs() < 1e-12);

        let strike = rec.strike.unwrap();
        assert_eq!(strike.quote.strike, 95.0);
        assert_eq!(strike.quote.dte, 30);
        assert!((strike.breakeven - 93.0).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_signal_sells_conservative_call() {
        let rec = recommend_from_signal(&signal("AAPL", SignalDirection::Neutral, 0.9), &chain(), &SelectorConfig::default())
            .unwrap();

        assert_eq!(rec.side, OptionSide::Call);
        assert_eq!(rec.target_delta, 0.20);
        assert_eq!(rec.strike.unwrap().quote.strike, 110.0);
    }

    #[test]
    fn test_low_confidence_signal_has_no_trade() {
        let rec = recommend_from_signal(&signal("AAPL", SignalDirection::Bearish, 0.2), &chain(), &SelectorConfig::default());
        assert!(rec.is_none());
    }

    #[test]
    fn test_batch_preserves_order_and_skips_mismatched_ticker() {
        let batch = vec![
            (signal("AAPL", SignalDirection::Bearish, 0.8), chain()),
            (signal("MSFT", SignalDirection::Bullish, 0.9), chain()),
            (signal("aapl", SignalDirection::Bullish, 0.6), chain()),
        ];
        let recs = recommend_batch(&batch, &SelectorConfig::default());

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].side, OptionSide::Call);
        assert_eq!(recs[1].side, OptionSide::Put);
        assert_eq!(recs[1].ticker, "aapl");
    }
}
