pub mod config;
pub mod results;
