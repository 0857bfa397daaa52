pub mod change_event;
pub mod collections;
pub mod document;

pub use change_event::*;
pub use collections::*;
