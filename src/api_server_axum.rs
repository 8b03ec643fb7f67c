use crate::config::{self, SelectorConfig};
use crate::error::AnalyzerError;
use crate::rag::{TextChunk, TextChunker};
use crate::strikes::{
    self, AgentSignal, DeltaCriteria, OptimalStrike, OptionChain, OptionQuote, OptionSide, RankedStrike,
    RawOptionChain, RawQuote, SignalRecommendation,
};
use crate::utility::Timer;
use anyhow::Result;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub side: String,
    pub quotes: Vec<RawQuote>,
    #[serde(default)]
    pub criteria: DeltaCriteria,
}

#[derive(Debug, Deserialize)]
pub struct OptimalStrikeRequest {
    pub side: String,
    pub quotes: Vec<RawQuote>,
    #[serde(default = "default_target_delta")]
    pub target_delta: f64,
    #[serde(default)]
    pub underlying_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub side: String,
    pub quotes: Vec<RawQuote>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Deserialize)]
pub struct SignalRequest {
    pub signal: AgentSignal,
    pub chain: RawOptionChain,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub side: OptionSide,
    pub count: usize,
    pub quotes: Vec<OptionQuote>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub side: OptionSide,
    pub ranked: Vec<RankedStrike>,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub count: usize,
    pub chunks: Vec<TextChunk>,
}

fn default_target_delta() -> f64 {
    config::DEFAULT_TARGET_DELTA
}

fn default_top_n() -> usize {
    config::DEFAULT_TOP_N
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    selector: Arc<SelectorConfig>,
    chunker: TextChunker,
}

impl AppState {
    pub fn new(selector: SelectorConfig, chunker: TextChunker) -> Self {
        Self {
            selector: Arc::new(selector),
            chunker,
        }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/health
async fn get_health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse {
        success: true,
        data: Some(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
        error: None,
        processing_time_ms: Some(0),
    })
}

/// POST /api/strikes/filter - Delta window filter
async fn filter_strikes(
    Json(request): Json<FilterRequest>,
) -> Result<Json<ApiResponse<FilterResponse>>, StatusCode> {
    let timer = Timer::start_with_threshold("api.filter", 250);

    let outcome = parse_table(&request.side, request.quotes).and_then(|(side, table)| {
        let quotes = strikes::filter_by_delta(&table, side, &request.criteria)?;
        Ok(FilterResponse {
            side,
            count: quotes.len(),
            quotes,
        })
    });

    Ok(Json(respond(outcome, &timer)))
}

/// POST /api/strikes/optimal - Single recommended strike
async fn optimal_strike(
    State(app_state): State<AppState>,
    Json(request): Json<OptimalStrikeRequest>,
) -> Result<Json<ApiResponse<Option<OptimalStrike>>>, StatusCode> {
    let timer = Timer::start_with_threshold("api.optimal", 250);

    let outcome = check_underlying_override(request.underlying_price)
        .and_then(|_| parse_table(&request.side, request.quotes))
        .map(|(side, table)| {
            strikes::select_optimal_strike(
                &table,
                side,
                request.target_delta,
                request.underlying_price,
                &app_state.selector,
            )
        });

    Ok(Json(respond(outcome, &timer)))
}

/// POST /api/strikes/rank - Top strikes by income score
async fn rank_strikes(
    State(app_state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<ApiResponse<RankResponse>>, StatusCode> {
    let timer = Timer::start_with_threshold("api.rank", 250);

    let outcome = parse_table(&request.side, request.quotes).map(|(side, table)| RankResponse {
        side,
        ranked: strikes::rank_strikes_for_income(&table, side, request.top_n, &app_state.selector),
    });

    Ok(Json(respond(outcome, &timer)))
}

/// POST /api/signals/recommend - Agent signal to strike recommendation
async fn recommend_signal(
    State(app_state): State<AppState>,
    Json(request): Json<SignalRequest>,
) -> Result<Json<ApiResponse<Option<SignalRecommendation>>>, StatusCode> {
    let timer = Timer::start_with_threshold("api.signal", 250);
    let today = chrono::Local::now().date_naive();

    let outcome = strikes::process_option_chain(request.chain, today).map(|chain: OptionChain| {
        strikes::recommend_from_signal(&request.signal, &chain, &app_state.selector)
    });

    Ok(Json(respond(outcome, &timer)))
}

/// POST /api/chunks - Split text into embedding windows
async fn chunk_text(
    State(app_state): State<AppState>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<ApiResponse<ChunkResponse>>, StatusCode> {
    let timer = Timer::start_with_threshold("api.chunks", 250);

    let chunks = app_state.chunker.chunk_text(&request.text, &request.source, request.page);

    Ok(Json(respond(
        Ok(ChunkResponse {
            count: chunks.len(),
            chunks,
        }),
        &timer,
    )))
}

// -----------------------------------------------
// HELPER FUNCTIONS
// -----------------------------------------------

/// Validate the side and every row of a request table
fn parse_table(side: &str, quotes: Vec<RawQuote>) -> Result<(OptionSide, Vec<OptionQuote>), AnalyzerError> {
    let side = side.parse::<OptionSide>()?;
    let table = quotes
        .into_iter()
        .map(OptionQuote::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(first) = table.first() {
        strikes::verify_uniform(&table, first.underlying_price, first.dte)?;
    }
    Ok((side, table))
}

fn check_underlying_override(underlying_price: Option<f64>) -> Result<(), AnalyzerError> {
    match underlying_price {
        Some(price) if !(price.is_finite() && price > 0.0) => Err(AnalyzerError::invalid(
            "underlying_price",
            format!("{} must be a positive number", price),
        )),
        _ => Ok(()),
    }
}

fn respond<T>(outcome: Result<T, AnalyzerError>, timer: &Timer) -> ApiResponse<T> {
    match outcome {
        Ok(data) => ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(timer.elapsed_ms()),
        },
        Err(e) => ApiResponse {
            success: false,
            data: None,
            error: Some(e.to_string()),
            processing_time_ms: Some(timer.elapsed_ms()),
        },
    }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/strikes/filter", post(filter_strikes))
        .route("/api/strikes/optimal", post(optimal_strike))
        .route("/api/strikes/rank", post(rank_strikes))
        .route("/api/signals/recommend", post(recommend_signal))
        .route("/api/chunks", post(chunk_text))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(app_state)
}

pub async fn start_server(port: u16, app_state: AppState) -> Result<()> {
    let app = build_router(app_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "income analyzer API listening");
    println!("Income Analyzer API running on http://{}", addr);
    println!("Available endpoints:");
    println!("   GET  /api/health");
    println!("   POST /api/strikes/filter");
    println!("   POST /api/strikes/optimal");
    println!("   POST /api/strikes/rank");
    println!("   POST /api/signals/recommend");
    println!("   POST /api/chunks");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
