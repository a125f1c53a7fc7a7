pub mod app;
pub mod client;
pub mod config;
pub mod ingest;
pub mod recipes;
pub mod state;
