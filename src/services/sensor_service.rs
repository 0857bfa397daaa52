// ==================== SENSOR READINGS ====================

use crate::{
    database::DocumentStore,
    models::{document, EMAIL_KEY, SENSOR_DATA},
    utils::AppError,
};
use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// POST /sensor_data - stores the reading as sent
pub async fn record_reading(store: &dyn DocumentStore, reading: Value) -> Result<Bson, AppError> {
    let doc = document::from_json(reading)?;
    store.insert(SENSOR_DATA, doc).await
}

/// GET /get_sensor_data - every reading for `email`, in store order
pub async fn list_readings(store: &dyn DocumentStore, email: Option<&str>) -> Result<Vec<Value>, AppError> {
    let mut filter = Document::new();
    filter.insert(EMAIL_KEY, email.map(Bson::from).unwrap_or(Bson::Null));

    let readings = store.find_many(SENSOR_DATA, filter).await?;
    Ok(readings.into_iter().map(document::to_json).collect())
}
