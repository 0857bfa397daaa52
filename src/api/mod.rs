pub mod health;
pub mod realtime;
pub mod root;
pub mod sensors;
pub mod swagger;
pub mod ticker;
pub mod users;

use actix_web::{
    dev::Payload, error::InternalError, web, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// `?email=` on the lookup endpoints; absent means `null`, as in the store.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: Option<String>,
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body for the document endpoints: a JSON value, or a
/// form-encoded body read as an object of string fields.
pub struct DocumentBody(pub Value);

impl DocumentBody {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl FromRequest for DocumentBody {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if req.content_type() == FORM_CONTENT_TYPE {
            let form = web::Form::<Map<String, Value>>::from_request(req, payload);
            Box::pin(async move { Ok(DocumentBody(Value::Object(form.await?.into_inner()))) })
        } else {
            let json = web::Json::<Value>::from_request(req, payload);
            Box::pin(async move { Ok(DocumentBody(json.await?.into_inner())) })
        }
    }
}

/// Routes shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(form_config())
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url("/api-docs/openapi.json", swagger::ApiDoc::openapi()),
        )
        .route("/", web::get().to(root::index))
        .route("/test", web::post().to(root::test_message))
        .route("/health", web::get().to(health::health_check))
        // Users
        .route("/adduser", web::post().to(users::add_user))
        .route("/getuser", web::get().to(users::get_user))
        // External ticker
        .route("/gemini", web::get().to(ticker::get_gemini))
        // Sensor readings
        .route("/sensor_data", web::post().to(sensors::record_sensor_data))
        .route("/get_sensor_data", web::get().to(sensors::list_sensor_data))
        // Real-time channel
        .route("/ws", web::get().to(realtime::connect));
}

/// Malformed JSON gets the same `{message, error}` shape as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        log::warn!("⚠️ Rejected request body: {}", detail);
        InternalError::from_response(err, invalid_body(&detail)).into()
    })
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        log::warn!("⚠️ Rejected form body: {}", detail);
        InternalError::from_response(err, invalid_body(&detail)).into()
    })
}

fn invalid_body(detail: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "message": "Invalid request body",
        "error": detail
    }))
}
