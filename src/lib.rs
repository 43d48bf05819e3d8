// src/lib.rs
//! Job application tracker: status board, statistics, questionnaire and
//! job recommendations over a per-user application store.

pub mod applications;
pub mod auth;
pub mod board;
pub mod cli;
pub mod core;
pub mod emotions;
pub mod profiles;
pub mod proxy;
pub mod recommendations;
pub mod session;
pub mod stats;
pub mod types;
pub mod web;

pub use web::{build_rocket, start_web_server};
