// src/applications/mod.rs
pub mod client;
pub mod csv_io;
pub mod notify;
pub mod repository;

pub use client::ApplicationDataClient;
pub use notify::{ConsoleNotifier, Notification, NotificationBuffer, NotificationLevel, Notifier};
pub use repository::{ApplicationRepository, ApplicationUpdate};
