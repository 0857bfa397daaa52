pub mod change_bridge;
