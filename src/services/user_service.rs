// ==================== USERS ====================
// One document per email; the existence check lives in insert_if_absent

use crate::{
    database::DocumentStore,
    models::{document, EMAIL_KEY, USERS},
    utils::AppError,
};
use mongodb::bson::Bson;
use serde_json::Value;

/// POST /adduser - inserts the user unless the email is already taken
pub async fn add_user(store: &dyn DocumentStore, user: Value) -> Result<Bson, AppError> {
    let doc = document::from_json(user)?;
    store.insert_if_absent(USERS, EMAIL_KEY, doc).await
}

/// GET /getuser - the stored user document for `email`
pub async fn get_user(store: &dyn DocumentStore, email: Option<&str>) -> Result<Value, AppError> {
    let key = email.map(Bson::from).unwrap_or(Bson::Null);
    let user = store.find_one(USERS, EMAIL_KEY, key).await?;
    Ok(document::to_json(user))
}
