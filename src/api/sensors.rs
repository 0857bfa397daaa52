use actix_web::{web, HttpResponse};
use serde_json::json;
use crate::{
    api::{DocumentBody, EmailQuery, MessageResponse},
    services::sensor_service,
    state::AppState,
    utils::AppError,
};

#[utoipa::path(
    post,
    path = "/sensor_data",
    tag = "Sensors",
    responses(
        (status = 200, description = "Reading stored", body = MessageResponse),
        (status = 400, description = "Body is not a JSON object or form"),
        (status = 500, description = "Store error")
    )
)]
pub async fn record_sensor_data(
    state: web::Data<AppState>,
    reading: DocumentBody,
) -> HttpResponse {
    let current_time = chrono::Utc::now().format("%H:%M").to_string();
    let reading = reading.into_inner();

    log::info!("🌡️ POST /sensor_data - Current Time: {}, Sensor Data: {}", current_time, reading);

    match sensor_service::record_reading(&*state.store, reading).await {
        Ok(id) => {
            log::debug!("✅ Sensor data stored: {}", id);
            HttpResponse::Ok().json(MessageResponse {
                message: "Sensor data added successfully".to_string(),
            })
        }
        Err(AppError::InvalidDocument(e)) => {
            log::warn!("⚠️ Rejected sensor data at {}: {}", current_time, e);
            HttpResponse::BadRequest().json(json!({
                "message": "Error adding sensor data",
                "error": e
            }))
        }
        Err(e) => {
            log::error!("❌ Error adding sensor data at {}: {}", current_time, e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Error adding sensor data",
                "error": e.to_string()
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/get_sensor_data",
    tag = "Sensors",
    params(EmailQuery),
    responses(
        (status = 200, description = "Readings for the email, possibly empty"),
        (status = 500, description = "Store error")
    )
)]
pub async fn list_sensor_data(
    state: web::Data<AppState>,
    query: web::Query<EmailQuery>,
) -> HttpResponse {
    log::info!("📋 GET /get_sensor_data - email: {:?}", query.email);

    match sensor_service::list_readings(&*state.store, query.email.as_deref()).await {
        Ok(readings) => {
            log::info!("✅ Listed {} readings", readings.len());
            HttpResponse::Ok().json(readings)
        }
        Err(e) => {
            log::error!("❌ Error getting sensor data: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Error getting sensor data",
                "error": e.to_string()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{
        configure,
        test_support::{failing_state, memory_state, STORE_DOWN},
    };
    use crate::jobs::change_bridge::start_change_bridge;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use std::time::Duration;

    #[actix_web::test]
    async fn test_reading_is_visible_and_broadcast_once() {
        let state = memory_state();
        let (_, mut client) = state.broadcaster.connect();
        let _bridge = start_change_bridge(
            state.store.clone(),
            state.broadcaster.clone(),
            state.change_feed.clone(),
        )
        .await;

        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sensor_data")
            .set_json(json!({ "email": "a@x.com", "temp": 21 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Sensor data added successfully" }));

        let req = test::TestRequest::get().uri("/get_sensor_data?email=a@x.com").to_request();
        let readings: Value = test::call_and_read_body_json(&app, req).await;
        let readings = readings.as_array().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["email"], "a@x.com");
        assert_eq!(readings[0]["temp"], 21);

        let frame = tokio::time::timeout(Duration::from_secs(1), client.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame.event, "sensorDataUpdated");
        assert_eq!(frame.data["fullDocument"], readings[0]);
        assert!(client.try_recv().is_err());
    }

    #[actix_web::test]
    async fn test_email_without_readings_is_empty_array() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(memory_state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/get_sensor_data?email=nobody@x.com").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_readings_come_back_in_insert_order() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(memory_state())).configure(configure),
        )
        .await;

        for temp in [19.5, 20.0, 20.5] {
            let req = test::TestRequest::post()
                .uri("/sensor_data")
                .set_json(json!({ "email": "a@x.com", "temp": temp, "humidity": 40 }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get().uri("/get_sensor_data?email=a@x.com").to_request();
        let readings: Value = test::call_and_read_body_json(&app, req).await;
        let temps: Vec<f64> = readings
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["temp"].as_f64().unwrap())
            .collect();

        assert_eq!(temps, vec![19.5, 20.0, 20.5]);
    }

    #[actix_web::test]
    async fn test_form_encoded_reading_is_stored_as_strings() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(memory_state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sensor_data")
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("email=a%40x.com&temp=21")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/get_sensor_data?email=a@x.com").to_request();
        let readings: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(readings[0]["temp"], "21");
    }

    #[actix_web::test]
    async fn test_duplicate_id_is_store_error() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(memory_state())).configure(configure),
        )
        .await;

        let reading = json!({ "_id": 1, "email": "a@x.com" });
        let first = test::TestRequest::post().uri("/sensor_data").set_json(&reading).to_request();
        assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

        let second = test::TestRequest::post().uri("/sensor_data").set_json(&reading).to_request();
        let resp = test::call_service(&app, second).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Error adding sensor data");
        assert!(body["error"].as_str().unwrap().contains("duplicate key"));

        let req = test::TestRequest::get().uri("/get_sensor_data?email=a@x.com").to_request();
        let readings: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(readings.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_store_failure_is_500_on_record_and_list() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(failing_state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sensor_data")
            .set_json(json!({ "email": "a@x.com", "temp": 21 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Error adding sensor data");
        assert!(body["error"].as_str().unwrap().contains(STORE_DOWN));

        let req = test::TestRequest::get().uri("/get_sensor_data?email=a@x.com").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Error getting sensor data");
        assert!(body["error"].as_str().unwrap().contains(STORE_DOWN));
    }
}
