pub mod api;
pub mod config;
pub mod export;
pub mod mock;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod routes;
pub mod state;
