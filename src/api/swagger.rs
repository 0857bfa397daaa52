use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sensor Relay API",
        version = "1.0.0",
        description = "Users and IoT sensor readings over MongoDB.\n\n**Real-time:** connect a WebSocket to `/ws` to receive a `sensorDataUpdated` frame for every stored reading."
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::add_user,
        crate::api::users::get_user,

        // Sensors
        crate::api::sensors::record_sensor_data,
        crate::api::sensors::list_sensor_data,

        // External APIs
        crate::api::ticker::get_gemini,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::MessageResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service, store and change feed status."),
        (name = "Users", description = "User documents, one per email."),
        (name = "Sensors", description = "Sensor readings. Every insert is pushed to WebSocket clients."),
        (name = "External", description = "Third-party ticker passthrough."),
    )
)]
pub struct ApiDoc;
