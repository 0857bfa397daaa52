pub mod sensor_service;
pub mod ticker_service;
pub mod user_service;
