pub mod api_server_axum;
pub mod config;
pub mod error;
pub mod logging;
pub mod rag;
pub mod strikes;
pub mod utility;

// Re-exports for convenience
pub use config::SelectorConfig;
pub use error::{AnalyzerError, Result};
pub use rag::{chunk_text, TextChunk, TextChunker};
pub use strikes::{
    filter_by_delta, rank_strikes_for_income, select_optimal_strike, DeltaCriteria, OptimalStrike, OptionChain,
    OptionQuote, OptionSide, RankedStrike,
};
