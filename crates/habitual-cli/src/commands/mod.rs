pub mod config;
pub mod habit;
pub mod menu;
pub mod stats;
