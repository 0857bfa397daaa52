// Utility functions
pub mod error;
pub mod network;

pub use error::*;
