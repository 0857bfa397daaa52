use actix_web::{web, HttpResponse};
use crate::api::MessageResponse;

// GET / - liveness string
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("server is running....")
}

// POST /test - echo check, logs whatever was sent
pub async fn test_message(body: web::Bytes) -> HttpResponse {
    log::info!("🧪 POST /test - body: {}", String::from_utf8_lossy(&body));

    HttpResponse::Ok().json(MessageResponse {
        message: "got the test message".to_string(),
    })
}
