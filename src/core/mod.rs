// src/core/mod.rs
//! Configuration, storage and HTTP plumbing shared by every service

pub mod config_manager;
pub mod database;
pub mod service_client;

pub use config_manager::ConfigManager;
pub use database::Database;
pub use service_client::ServiceClient;
