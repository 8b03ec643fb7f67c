use super::models::{OptimalStrike, OptionSide};
use super::processor::OptionChain;
use super::selector::select_optimal_strike;
use crate::config::{self, SelectorConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// Stock view emitted by an analyst agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSignal {
    pub ticker: String,
    #[serde(alias = "signal")]
    pub direction: SignalDirection,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecommendation {
    pub ticker: String,
    pub direction: SignalDirection,
    pub confidence: f64,
    pub strategy: String,
    pub side: OptionSide,
    pub target_delta: f64,
    pub strike: Option<OptimalStrike>,
}

/// Side to sell and the delta to aim for, or `None` when the signal is too weak
pub fn plan_for_signal(signal: &AgentSignal, config: &SelectorConfig) -> Option<(OptionSide, f64)> {
    if !signal.confidence.is_finite() || signal.confidence < config.min_signal_confidence {
        return None;
    }

    let confidence = signal.confidence.min(1.0);
    let scaled_delta = (config::CONSERVATIVE_DELTA
        + config::SIGNAL_DELTA_RANGE * (confidence - 0.5) / 0.5)
        .clamp(config::SIGNAL_MIN_DELTA, config::SIGNAL_MAX_DELTA);

    match signal.direction {
        // Bullish: happy to own the shares lower, sell puts
        SignalDirection::Bullish => Some((OptionSide::Put, scaled_delta)),
        // Bearish: happy to let shares go higher, sell calls
        SignalDirection::Bearish => Some((OptionSide::Call, scaled_delta)),
        SignalDirection::Neutral => Some((OptionSide::Call, config.conservative_delta)),
    }
}

/// Turn an agent signal into a strike recommendation on the ticker's chain
pub fn recommend_from_signal(
    signal: &AgentSignal,
    chain: &OptionChain,
    config: &SelectorConfig,
) -> Option<SignalRecommendation> {
    let Some((side, target_delta)) = plan_for_signal(signal, config) else {
        info!(
            ticker = %signal.ticker,
            confidence = signal.confidence,
            "signal below confidence threshold, no trade"
        );
        return None;
    };

    let strike = select_optimal_strike(
        chain.side(side),
        side,
        target_delta,
        Some(chain.underlying_price),
        config,
    );

    Some(SignalRecommendation {
        ticker: signal.ticker.clone(),
        direction: signal.direction,
        confidence: signal.confidence,
        strategy: side.strategy().to_string(),
        side,
        target_delta,
        strike,
    })
}

/// Run recommendations for many (signal, chain) pairs, keeping input order
pub fn recommend_batch(
    batch: &[(AgentSignal, OptionChain)],
    config: &SelectorConfig,
) -> Vec<SignalRecommendation> {
    batch
        .par_iter()
        .filter_map(|(signal, chain)| {
            if !signal.ticker.eq_ignore_ascii_case(&chain.symbol) {
                warn!(
                    ticker = %signal.ticker,
                    chain = %chain.symbol,
                    "signal ticker does not match chain symbol, skipped"
                );
                return None;
            }
            recommend_from_signal(signal, chain, config)
        })
        .collect()
}
