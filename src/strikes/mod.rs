pub mod models;
pub mod processor;
pub mod ranking;
pub mod selector;
pub mod signal_bridge;

// Re-exports (public API)
pub use models::{DeltaCriteria, OptimalStrike, OptionQuote, OptionSide, RankedStrike, RawQuote};
pub use processor::{
    annualized_yield,
    breakeven,
    calculate_days_to_expiry,
    parse_option_chain,
    process_option_chain,
    verify_uniform,
    OptionChain,
    RawOptionChain,
};
pub use ranking::rank_strikes_for_income;
pub use selector::{filter_by_delta, select_optimal_strike, selection_reason};
pub use signal_bridge::{
    plan_for_signal,
    recommend_batch,
    recommend_from_signal,
    AgentSignal,
    SignalDirection,
    SignalRecommendation,
};
