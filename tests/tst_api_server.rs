use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use income_analyzer::api_server_axum::{build_router, AppState};
use income_analyzer::rag::TextChunker;
use income_analyzer::SelectorConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> axum::Router {
        build_router(AppState::new(
            SelectorConfig::default(),
            TextChunker::new(4, 1).unwrap(),
        ))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn put_rows() -> Value {
        json!([
            {"strike": 95, "bid": 2.0, "ask": 2.0, "delta": -0.30, "dte": 30, "underlyingPrice": 100},
            {"strike": 90, "bid": 0.8, "ask": 0.8, "delta": -0.15, "dte": 30, "underlyingPrice": 100}
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_optimal_strike_endpoint() {
        let (status, body) = post_json(
            "/api/strikes/optimal",
            json!({"side": "put", "quotes": put_rows(), "target_delta": 0.25}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["quote"]["strike"], 95.0);
        assert_eq!(body["data"]["breakeven"], 93.0);
    }

    #[tokio::test]
    async fn test_invalid_side_reports_error() {
        let (status, body) = post_json(
            "/api/strikes/rank",
            json!({"side": "straddle", "quotes": put_rows()}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("straddle"));
    }

    #[tokio::test]
    async fn test_missing_field_reports_error() {
        let (_, body) = post_json(
            "/api/strikes/filter",
            json!({"side": "put", "quotes": [{"strike": 95, "bid": 1.9, "ask": 2.1, "dte": 30, "underlyingPrice": 100}]}),
        )
        .await;

        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("delta"));
    }

    #[tokio::test]
    async fn test_rank_endpoint() {
        let (_, body) = post_json(
            "/api/strikes/rank",
            json!({"side": "put", "quotes": put_rows(), "top_n": 1}),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["ranked"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_filter_endpoint_orders_by_window_midpoint() {
        let (status, body) = post_json(
            "/api/strikes/filter",
            json!({"side": "put", "quotes": [
                {"strike": 95, "bid": 2.0, "ask": 2.0, "delta": -0.30, "dte": 30, "underlyingPrice": 100},
                {"strike": 92.5, "bid": 1.2, "ask": 1.2, "delta": -0.22, "dte": 30, "underlyingPrice": 100},
                {"strike": 90, "bid": 0.8, "ask": 0.8, "delta": -0.16, "dte": 30, "underlyingPrice": 100},
                {"strike": 85, "bid": 0.3, "ask": 0.3, "delta": -0.06, "dte": 30, "underlyingPrice": 100}
            ]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["side"], "put");
        assert_eq!(body["data"]["count"], 3);
        let strikes: Vec<f64> = body["data"]["quotes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["strike"].as_f64().unwrap())
            .collect();
        assert_eq!(strikes, vec![92.5, 95.0, 90.0]);
    }

    #[tokio::test]
    async fn test_mixed_table_is_rejected() {
        let (_, body) = post_json(
            "/api/strikes/rank",
            json!({"side": "put", "quotes": [
                {"strike": 95, "bid": 2.0, "ask": 2.0, "delta": -0.30, "dte": 30, "underlyingPrice": 100},
                {"strike": 90, "bid": 0.8, "ask": 0.8, "delta": -0.15, "dte": 7, "underlyingPrice": 120}
            ]}),
        )
        .await;

        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Inconsistent option chain"));
    }

    #[tokio::test]
    async fn test_non_positive_underlying_override_is_rejected() {
        for price in [0.0, -5.0] {
            let (_, body) = post_json(
                "/api/strikes/optimal",
                json!({"side": "call", "quotes": put_rows(), "underlying_price": price}),
            )
            .await;

            assert_eq!(body["success"], false);
            assert!(body["error"].as_str().unwrap().contains("underlying_price"));
        }
    }

    #[tokio::test]
    async fn test_signal_endpoint_recommends_put() {
        let (status, body) = post_json(
            "/api/signals/recommend",
            json!({
                "signal": {"ticker": "AAPL", "direction": "bullish", "confidence": 0.75},
                "chain": {
                    "symbol": "AAPL",
                    "underlyingPrice": 100.0,
                    "dte": 30,
                    "puts": [
                        {"strike": 95, "bid": 1.9, "ask": 2.1, "delta": -0.30},
                        {"strike": 90, "bid": 0.7, "ask": 0.9, "delta": -0.15}
                    ]
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["side"], "put");
        assert_eq!(body["data"]["strategy"], "cash-secured put");
        assert_eq!(body["data"]["strike"]["quote"]["strike"], 95.0);
        assert_eq!(body["data"]["strike"]["quote"]["dte"], 30);
    }

    #[tokio::test]
    async fn test_signal_endpoint_with_empty_chain_has_no_strike() {
        let (_, body) = post_json(
            "/api/signals/recommend",
            json!({
                "signal": {"ticker": "AAPL", "direction": "bullish", "confidence": 0.75},
                "chain": {"symbol": "AAPL", "underlyingPrice": 100.0, "calls": [], "puts": []}
            }),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["side"], "put");
        assert!(body["data"]["strike"].is_null());
    }

    #[tokio::test]
    async fn test_chunks_endpoint() {
        let (_, body) = post_json(
            "/api/chunks",
            json!({"text": "a b c d e f g", "source": "memo", "page": 1}),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["count"], 2);
        assert_eq!(body["data"]["chunks"][1]["chunk_id"], "memo_p1_c3");
    }
}
