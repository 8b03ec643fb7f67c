use serde::{Deserialize, Serialize};

// -----------------------------------------------
// TEXT CHUNKING
// -----------------------------------------------
pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;

// Page separator emitted by most PDF-to-text extractors
pub const PAGE_BREAK: char = '\u{000C}';

// -----------------------------------------------
// GREEKS DEFAULTS
// -----------------------------------------------
pub const DEFAULT_IMPLIED_VOLATILITY: f64 = 0.3;
pub const DEFAULT_THETA: f64 = 0.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

// -----------------------------------------------
// INCOME SCORE WEIGHTS
// -----------------------------------------------
pub const YIELD_WEIGHT: f64 = 0.5;
pub const DELTA_WEIGHT: f64 = 0.3;
pub const SPREAD_WEIGHT: f64 = 0.2;

// Spread score used when no row carries a spread
pub const NEUTRAL_SPREAD_SCORE: f64 = 0.5;

// -----------------------------------------------
// STRIKE SELECTION DEFAULTS
// -----------------------------------------------
pub const DEFAULT_TARGET_DELTA: f64 = 0.25;
pub const DEFAULT_TOP_N: usize = 5;

pub const DEFAULT_MIN_DELTA: f64 = 0.15;
pub const DEFAULT_MAX_DELTA: f64 = 0.35;
pub const DEFAULT_MIN_PREMIUM: f64 = 0.10;
pub const DEFAULT_MIN_VOLUME: f64 = 0.0;
pub const DEFAULT_MAX_SPREAD_PCT: f64 = 0.25;

// Assignment probability tiers (|delta| x 100)
pub const CONSERVATIVE_TIER: f64 = 20.0;
pub const BALANCED_TIER: f64 = 30.0;

// -----------------------------------------------
// SIGNAL BRIDGE
// -----------------------------------------------
pub const MIN_SIGNAL_CONFIDENCE: f64 = 0.5;
pub const CONSERVATIVE_DELTA: f64 = 0.20;
pub const SIGNAL_DELTA_RANGE: f64 = 0.10;
pub const SIGNAL_MIN_DELTA: f64 = 0.15;
pub const SIGNAL_MAX_DELTA: f64 = 0.30;

// -----------------------------------------------
// SERVER / LOGGING
// -----------------------------------------------
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const LOG_FILE_NAME: &str = "income-analyzer.log";

/// Knobs shared by every strike-selection call.
///
/// Passed explicitly instead of living in module statics so callers (and
/// tests) can vary the risk-free rate or the IV fallback per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub default_implied_volatility: f64,
    pub default_theta: f64,
    pub risk_free_rate: f64,
    pub contract_multiplier: f64,
    pub yield_weight: f64,
    pub delta_weight: f64,
    pub spread_weight: f64,
    pub min_signal_confidence: f64,
    pub conservative_delta: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            default_implied_volatility: DEFAULT_IMPLIED_VOLATILITY,
            default_theta: DEFAULT_THETA,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            contract_multiplier: CONTRACT_MULTIPLIER,
            yield_weight: YIELD_WEIGHT,
            delta_weight: DELTA_WEIGHT,
            spread_weight: SPREAD_WEIGHT,
            min_signal_confidence: MIN_SIGNAL_CONFIDENCE,
            conservative_delta: CONSERVATIVE_DELTA,
        }
    }
}

impl SelectorConfig {
    /// Defaults, overridden by `INCOME_RISK_FREE_RATE` / `INCOME_DEFAULT_IV`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            risk_free_rate: env_f64("INCOME_RISK_FREE_RATE").unwrap_or(defaults.risk_free_rate),
            default_implied_volatility: env_f64("INCOME_DEFAULT_IV")
                .filter(|iv| *iv >= 0.0)
                .unwrap_or(defaults.default_implied_volatility),
            ..defaults
        }
    }
}

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to select
pub fn get_execution_mode() -> String {
    std::env::var("INCOME_MODE").unwrap_or_else(|_| "select".to_string())
}

/// Path of the option chain JSON file
pub fn get_chain_file() -> String {
    std::env::var("INCOME_CHAIN_FILE").unwrap_or_else(|_| "chain.json".to_string())
}

/// Option side to work on ("put" or "call")
pub fn get_side() -> String {
    std::env::var("INCOME_SIDE").unwrap_or_else(|_| "put".to_string())
}

pub fn get_target_delta() -> f64 {
    env_f64("INCOME_TARGET_DELTA").unwrap_or(DEFAULT_TARGET_DELTA)
}

pub fn get_top_n() -> usize {
    std::env::var("INCOME_TOP_N")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_N)
}

/// Path of the extracted text to chunk
pub fn get_text_file() -> String {
    std::env::var("INCOME_TEXT_FILE").unwrap_or_else(|_| "document.txt".to_string())
}

/// Source identifier stamped on chunks; falls back to the text file name
pub fn get_source() -> Option<String> {
    std::env::var("INCOME_SOURCE").ok()
}

/// Signal JSON file for signal mode
pub fn get_signal_file() -> String {
    std::env::var("INCOME_SIGNAL_FILE").unwrap_or_else(|_| "signal.json".to_string())
}

pub fn get_chunk_size() -> usize {
    std::env::var("INCOME_CHUNK_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(CHUNK_SIZE)
}

pub fn get_chunk_overlap() -> usize {
    std::env::var("INCOME_CHUNK_OVERLAP")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(CHUNK_OVERLAP)
}

pub fn get_port() -> u16 {
    std::env::var("INCOME_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn get_log_dir() -> String {
    std::env::var("INCOME_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse::<f64>().ok())
}
