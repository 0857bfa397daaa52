use actix_web::{web, HttpResponse};
use crate::state::AppState;

/// GET /gemini - relays the BTC/USD ticker as-is
#[utoipa::path(
    get,
    path = "/gemini",
    tag = "External",
    responses(
        (status = 200, description = "Ticker JSON from the upstream API, unchanged"),
        (status = 500, description = "Upstream unreachable or returned non-2xx")
    )
)]
pub async fn get_gemini(state: web::Data<AppState>) -> HttpResponse {
    log::info!("💰 GET /gemini");

    match state.ticker.fetch().await {
        Ok(data) => {
            log::info!("✅ Gemini data relayed");
            HttpResponse::Ok().json(data)
        }
        Err(e) => {
            log::error!("❌ Error fetching data from Gemini API: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Error fetching Gemini data",
                "error": e.to_string()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{configure, test_support::{memory_state, memory_state_with_ticker}};
    use crate::services::ticker_service::tests::serve_upstream;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_gemini_passthrough() {
        let ticker = json!({ "bid": "67012.34", "ask": "67015.00", "last": "67013.10" });
        let (url, handle) = serve_upstream(StatusCode::OK, ticker.clone());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(memory_state_with_ticker(&url)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/gemini").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, ticker);

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn test_gemini_upstream_failure_is_500() {
        let (url, handle) = serve_upstream(StatusCode::TOO_MANY_REQUESTS, json!({ "reason": "RateLimited" }));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(memory_state_with_ticker(&url)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/gemini").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Error fetching Gemini data");

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn test_gemini_unreachable_is_500() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(memory_state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/gemini").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
