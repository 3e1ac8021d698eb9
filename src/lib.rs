pub mod config;
pub mod errors;
pub mod generate;
pub mod pipeline;
pub mod sandbox;
pub mod screen;
pub mod server;
pub mod ui;
