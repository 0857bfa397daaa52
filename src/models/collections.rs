// Collection names and the key fields the handlers read

pub const USERS: &str = "users";
pub const SENSOR_DATA: &str = "sensor_data";

/// Users are unique per email; sensor readings are filtered by it.
pub const EMAIL_KEY: &str = "email";

/// Event name clients receive for every sensor_data change.
pub const SENSOR_DATA_UPDATED: &str = "sensorDataUpdated";
