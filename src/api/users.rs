use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use crate::{
    api::{DocumentBody, EmailQuery},
    models::EMAIL_KEY,
    services::user_service,
    state::AppState,
    utils::AppError,
};

#[utoipa::path(
    post,
    path = "/adduser",
    tag = "Users",
    responses(
        (status = 200, description = "User added, email echoed back"),
        (status = 400, description = "Body is not a JSON object or form"),
        (status = 409, description = "A user with this email already exists"),
        (status = 500, description = "Store error")
    )
)]
pub async fn add_user(
    state: web::Data<AppState>,
    user: DocumentBody,
) -> HttpResponse {
    let user = user.into_inner();
    let email = user.get(EMAIL_KEY).cloned().unwrap_or(Value::Null);

    log::info!("👤 POST /adduser - email: {}", email);

    match user_service::add_user(&*state.store, user).await {
        Ok(_) => {
            log::info!("✅ User added successfully: {}", email);
            HttpResponse::Ok().json(json!({
                "message": "User added successfully",
                "email": email
            }))
        }
        Err(AppError::Conflict(_)) => {
            log::warn!("⚠️ User already exists: {}", email);
            HttpResponse::Conflict().json(json!({
                "message": "User already exists",
                "email": email
            }))
        }
        Err(AppError::InvalidDocument(e)) => {
            log::warn!("⚠️ Rejected user document: {}", e);
            HttpResponse::BadRequest().json(json!({
                "message": "Error adding user",
                "error": e
            }))
        }
        Err(e) => {
            log::error!("❌ Error adding user: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Error adding user",
                "error": e.to_string()
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/getuser",
    tag = "Users",
    params(EmailQuery),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "No user with this email"),
        (status = 500, description = "Store error")
    )
)]
pub async fn get_user(
    state: web::Data<AppState>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    log::info!("🔍 GET /getuser - email: {:?}", query.email);

    match user_service::get_user(&*state.store, query.email.as_deref()).await {
        Ok(user) => {
            log::info!("✅ User found");
            HttpResponse::Ok().json(json!({
                "message": "User found",
                "user": user
            }))
        }
        Err(AppError::NotFound(_)) => {
            log::warn!("⚠️ User not found: {:?}", query.email);
            let mut body = json!({ "message": "User not found" });
            if let Some(email) = &query.email {
                body["email"] = json!(email);
            }
            HttpResponse::NotFound().json(body)
        }
        Err(e) => {
            log::error!("❌ Error getting user: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Error getting user",
                "error": e.to_string()
            }))
        }
    }
}
